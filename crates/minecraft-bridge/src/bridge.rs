//! The bridge event loop
//!
//! Ties the session manager, normalizer, dispatcher, and responder into
//! one supervised pipeline: connect with a fresh identity, wait (bounded)
//! for the spawned state, pump signals until the session dies, then back
//! off and reconnect. A single bad signal never takes the loop down;
//! only exhausting the attempt cap does.

#[path = "bridge_tests.rs"]
mod bridge_tests;

use anyhow::Result;
use minecraft_nats::{subjects, Clock, MessageStream, Publish};
use minecraft_types::{
    ChatCommand, RespawnCommand, SignalEnvelope, WorldEvent, WorldSignal,
};
use rand::Rng;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dispatcher::NotificationDispatcher;
use crate::feedback::{FeedbackRecorder, FeedbackStore};
use crate::health::AppState;
use crate::llm::ReplyGenerator;
use crate::normalizer::Normalizer;
use crate::relay::Relay;
use crate::responder::{ChatResponder, ResponderSettings};
use crate::session::{SessionManager, SessionSettings};

/// Delay before auto-respawning after death
const RESPAWN_DELAY: Duration = Duration::from_secs(2);

/// Delay before greeting a joining player
const WELCOME_DELAY: Duration = Duration::from_secs(2);

/// Chance of greeting a joining player in chat
const WELCOME_CHANCE: f64 = 0.3;

/// What a processed signal means for the session
#[derive(Debug, PartialEq)]
pub enum SignalFlow {
    Continue,
    SessionOver(Option<String>),
}

enum SpawnOutcome {
    Spawned,
    Failed(String),
    Shutdown,
}

enum Pump {
    Shutdown,
    SessionOver(Option<String>),
}

pub struct WorldBridge<P, R, C, G, S>
where
    P: Publish + Clone + 'static,
    R: Relay,
    C: Clock + Clone,
    G: ReplyGenerator,
    S: FeedbackStore,
{
    pub(crate) manager: SessionManager<P>,
    pub(crate) normalizer: Normalizer,
    dispatcher: NotificationDispatcher<R>,
    responder: ChatResponder<P, C, G, S>,
    publisher: P,
    clock: C,
    auto_respawn: bool,
    welcome_chance: f64,
    health: Option<AppState>,
    shutdown: watch::Receiver<bool>,
}

impl<P, R, C, G, S> WorldBridge<P, R, C, G, S>
where
    P: Publish + Clone + 'static,
    R: Relay,
    C: Clock + Clone,
    G: ReplyGenerator,
    S: FeedbackStore,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        publisher: P,
        clock: C,
        relay: R,
        generator: Option<G>,
        store: S,
        config: &Config,
        health: Option<AppState>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let manager = SessionManager::new(
            publisher.clone(),
            SessionSettings::from_config(&config.minecraft),
        );
        let responder = ChatResponder::new(
            publisher.clone(),
            clock.clone(),
            generator,
            ResponderSettings::new(config.minecraft.username.clone(), &config.responder),
            config.responder.chunk_limit,
            FeedbackRecorder::new(store),
        );
        Self {
            manager,
            normalizer: Normalizer::new(&config.events),
            dispatcher: NotificationDispatcher::new(relay),
            responder,
            publisher,
            clock,
            auto_respawn: config.minecraft.auto_respawn,
            welcome_chance: WELCOME_CHANCE,
            health,
            shutdown,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_welcome_chance(&mut self, chance: f64) {
        self.welcome_chance = chance;
    }

    /// Run the bridge until shutdown or until the attempt cap is hit.
    pub async fn run(&mut self, signals: &mut MessageStream<SignalEnvelope>) -> Result<()> {
        loop {
            if *self.shutdown.borrow() {
                return Ok(());
            }
            if self.manager.attempts_exhausted() {
                anyhow::bail!(
                    "Giving up after {} failed connection attempts; operator intervention required",
                    self.manager.failures()
                );
            }

            let identity = match self.manager.begin_attempt().await {
                Ok(identity) => identity,
                Err(e) => {
                    warn!("Failed to start connection attempt: {:#}", e);
                    self.manager.record_failure(None);
                    if !self.backoff().await {
                        return Ok(());
                    }
                    continue;
                }
            };
            self.normalizer.begin_session(&identity);
            self.update_health().await;

            match self.await_spawn(signals).await? {
                SpawnOutcome::Shutdown => {
                    self.manager.teardown(Some("shutdown")).await;
                    self.update_health().await;
                    return Ok(());
                }
                SpawnOutcome::Failed(reason) => {
                    // Forced teardown so the next attempt starts clean
                    self.manager.teardown(Some(&reason)).await;
                    self.manager.record_failure(Some(&reason));
                    self.update_health().await;
                    self.dispatcher
                        .dispatch(&WorldEvent::TransportFault {
                            message: format!(
                                "Failed to connect: {}. Will retry automatically",
                                reason
                            ),
                        })
                        .await;
                    if !self.backoff().await {
                        return Ok(());
                    }
                    continue;
                }
                SpawnOutcome::Spawned => {}
            }

            self.manager.mark_active();
            self.update_health().await;
            let connected = self.connected_event();
            self.dispatcher.dispatch(&connected).await;

            match self.pump(signals).await? {
                Pump::Shutdown => {
                    info!("Shutdown requested, ending session");
                    self.manager.teardown(Some("shutdown")).await;
                    self.update_health().await;
                    return Ok(());
                }
                Pump::SessionOver(reason) => {
                    self.manager.teardown(reason.as_deref()).await;
                    self.manager.record_failure(reason.as_deref());
                    self.update_health().await;
                    if !self.backoff().await {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Wait for the spawned state, bounded by the configured timeout.
    /// A connect that never spawns is a failed attempt, not a hang.
    async fn await_spawn(
        &mut self,
        signals: &mut MessageStream<SignalEnvelope>,
    ) -> Result<SpawnOutcome> {
        let deadline = tokio::time::Instant::now() + self.manager.spawn_timeout();

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(SpawnOutcome::Failed("spawn timed out".to_string()));
            }

            let next = tokio::select! {
                _ = self.shutdown.changed() => return Ok(SpawnOutcome::Shutdown),
                next = tokio::time::timeout(remaining, signals.next()) => next,
            };

            let envelope = match next {
                Err(_) => return Ok(SpawnOutcome::Failed("spawn timed out".to_string())),
                Ok(None) => anyhow::bail!("signal stream closed"),
                Ok(Some(Err(e))) => {
                    warn!("Bad signal payload: {}", e);
                    continue;
                }
                Ok(Some(Ok(envelope))) => envelope,
            };

            if envelope.metadata.session != self.manager.session().identity {
                debug!(
                    "Dropping signal from stale session {}",
                    envelope.metadata.session
                );
                continue;
            }

            if matches!(envelope.signal, WorldSignal::Spawned { .. }) {
                let _ = self.normalizer.normalize(&envelope.signal);
                return Ok(SpawnOutcome::Spawned);
            }

            match self.handle_envelope(&envelope).await {
                Ok(SignalFlow::Continue) => {}
                Ok(SignalFlow::SessionOver(reason)) => {
                    return Ok(SpawnOutcome::Failed(
                        reason.unwrap_or_else(|| "connection ended".to_string()),
                    ));
                }
                Err(e) => error!("Signal processing failed: {:#}", e),
            }
        }
    }

    /// Process signals until the session ends or shutdown is requested.
    async fn pump(&mut self, signals: &mut MessageStream<SignalEnvelope>) -> Result<Pump> {
        loop {
            let next = tokio::select! {
                _ = self.shutdown.changed() => return Ok(Pump::Shutdown),
                next = signals.next() => next,
            };

            match next {
                None => anyhow::bail!("signal stream closed"),
                Some(Err(e)) => warn!("Bad signal payload: {}", e),
                Some(Ok(envelope)) => match self.handle_envelope(&envelope).await {
                    Ok(SignalFlow::Continue) => {}
                    Ok(SignalFlow::SessionOver(reason)) => {
                        return Ok(Pump::SessionOver(reason));
                    }
                    // One event's failure never stops the pipeline
                    Err(e) => error!("Signal processing failed, continuing: {:#}", e),
                },
            }
        }
    }

    /// Drop signals stamped with a previous session's identity, then
    /// normalize and fan out.
    pub(crate) async fn handle_envelope(&mut self, envelope: &SignalEnvelope) -> Result<SignalFlow> {
        if envelope.metadata.session != self.manager.session().identity {
            debug!(
                "Dropping signal from stale session {}",
                envelope.metadata.session
            );
            return Ok(SignalFlow::Continue);
        }
        self.handle_signal(&envelope.signal).await
    }

    async fn handle_signal(&mut self, signal: &WorldSignal) -> Result<SignalFlow> {
        let Some(event) = self.normalizer.normalize(signal) else {
            return Ok(SignalFlow::Continue);
        };

        self.dispatcher.dispatch(&event).await;

        match &event {
            WorldEvent::Chat {
                username,
                message,
                private,
            } => {
                if *private {
                    self.responder
                        .process_whisper(username, message, self.normalizer.snapshot())
                        .await?;
                } else {
                    self.responder
                        .process_chat(username, message, self.normalizer.snapshot())
                        .await?;
                }
            }
            WorldEvent::BotDied { .. } if self.auto_respawn => self.schedule_respawn(),
            WorldEvent::PlayerJoined { username, .. } => self.maybe_welcome(username),
            WorldEvent::Kicked { reason } => {
                return Ok(SignalFlow::SessionOver(Some(reason.clone())));
            }
            WorldEvent::Disconnected { reason, .. } => {
                return Ok(SignalFlow::SessionOver(reason.clone()));
            }
            _ => {}
        }

        Ok(SignalFlow::Continue)
    }

    fn connected_event(&self) -> WorldEvent {
        let session = self.manager.session();
        let snapshot = self.normalizer.snapshot();
        WorldEvent::Connected {
            identity: session.identity,
            host: session.host,
            port: session.port,
            health: snapshot.health,
            food: snapshot.food,
            phase: snapshot.phase,
            online: snapshot.online,
        }
    }

    fn schedule_respawn(&self) {
        let publisher = self.publisher.clone();
        let clock = self.clock.clone();
        tokio::spawn(async move {
            clock.sleep(RESPAWN_DELAY).await;
            let subject = subjects::gateway::player_respawn(publisher.prefix());
            match publisher.publish(&subject, &RespawnCommand::default()).await {
                Ok(()) => info!("Respawned after death"),
                Err(e) => warn!("Failed to publish respawn command: {}", e),
            }
        });
    }

    fn maybe_welcome(&self, username: &str) {
        if !rand::thread_rng().gen_bool(self.welcome_chance.clamp(0.0, 1.0)) {
            return;
        }
        let publisher = self.publisher.clone();
        let clock = self.clock.clone();
        let username = username.to_string();
        tokio::spawn(async move {
            clock.sleep(WELCOME_DELAY).await;
            let subject = subjects::gateway::chat_send(publisher.prefix());
            let cmd = ChatCommand {
                message: format!("Welcome to the server, {}! 👋", username),
            };
            if let Err(e) = publisher.publish(&subject, &cmd).await {
                warn!("Failed to send welcome message: {}", e);
            }
        });
    }

    /// Sleep out the reconnection delay; returns false when shutdown
    /// cancels the pending attempt.
    async fn backoff(&mut self) -> bool {
        let delay = self.manager.reconnect_delay();
        info!(
            "Reconnecting in {:?} ({} consecutive failure(s))",
            delay,
            self.manager.failures()
        );
        tokio::select! {
            _ = self.clock.sleep(delay) => true,
            _ = self.shutdown.changed() => {
                info!("Shutdown requested, canceling reconnection");
                false
            }
        }
    }

    async fn update_health(&self) {
        if let Some(ref health) = self.health {
            let session = self.manager.session();
            let identity = if session.identity.is_empty() {
                None
            } else {
                Some(session.identity)
            };
            health
                .set_session(session.state.label().to_string(), identity)
                .await;
        }
    }
}
