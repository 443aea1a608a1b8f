//! Automated chat responder
//!
//! Per inbound chat line: fixed commands are handled directly; anything
//! else passes the response gate (address heuristics + base probability),
//! then the process-wide cooldown, and only then reaches the generation
//! call. Generation failures are logged and mean "no reply" - they never
//! take the bridge down.

#[path = "responder_tests.rs"]
mod responder_tests;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use minecraft_nats::{subjects, Clock, Publish};
use minecraft_types::{
    ChatCommand, FollowCommand, PlayerSnapshot, StopMovementCommand, WhisperCommand,
};
use rand::Rng;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::commands::{self, Command};
use crate::config::ResponderConfig;
use crate::feedback::{FeedbackRecorder, FeedbackStore, RATING_CORRECTION};
use crate::llm::{ReplyContext, ReplyGenerator};
use crate::segmenter::ReplyScheduler;

const HELP_LINE: &str =
    "✦ AI: I'm an AI bot! Use Discord commands or just chat with me naturally. ✨";

const RATE_HINT_LINE: &str =
    "To rate my response, say: \"bot rate [1-5] [helpful/unhelpful/accurate/inaccurate]\"";

/// Delay before a whisper reply goes out
const WHISPER_DELAY: Duration = Duration::from_secs(1);

/// Process-wide reply pacing state.
///
/// `last_reply_at` only moves when a reply is actually emitted, and is
/// monotonically non-decreasing.
pub struct CooldownState {
    last_reply_at: Mutex<Option<Instant>>,
}

impl CooldownState {
    pub fn new() -> Self {
        Self {
            last_reply_at: Mutex::new(None),
        }
    }

    /// Whether the cooldown has elapsed at `now`.
    pub fn ready(&self, now: Instant, cooldown: Duration) -> bool {
        match *self.last_reply_at.lock().unwrap() {
            None => true,
            Some(last) => now.duration_since(last) >= cooldown,
        }
    }

    /// Record an emitted reply. Never moves the timestamp backwards.
    pub fn mark(&self, now: Instant) {
        let mut last = self.last_reply_at.lock().unwrap();
        *last = Some(match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        });
    }

    pub fn last_reply_at(&self) -> Option<Instant> {
        *self.last_reply_at.lock().unwrap()
    }
}

impl Default for CooldownState {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate settings derived from [`ResponderConfig`]
#[derive(Debug, Clone)]
pub struct ResponderSettings {
    /// Base name players use to address the bot
    pub bot_name: String,
    pub address_prefix: String,
    pub response_chance: f64,
    pub cooldown: Duration,
}

impl ResponderSettings {
    pub fn new(bot_name: impl Into<String>, config: &ResponderConfig) -> Self {
        Self {
            bot_name: bot_name.into(),
            address_prefix: config.address_prefix.clone(),
            response_chance: config.response_chance,
            cooldown: Duration::from_millis(config.chat_cooldown_ms),
        }
    }
}

pub struct ChatResponder<P, C, G, S>
where
    P: Publish + Clone + 'static,
    C: Clock + Clone,
    G: ReplyGenerator,
    S: FeedbackStore,
{
    publisher: P,
    clock: C,
    generator: Option<G>,
    settings: ResponderSettings,
    cooldown: Arc<CooldownState>,
    scheduler: ReplyScheduler<P, C>,
    feedback: FeedbackRecorder<S>,
}

impl<P, C, G, S> ChatResponder<P, C, G, S>
where
    P: Publish + Clone + 'static,
    C: Clock + Clone,
    G: ReplyGenerator,
    S: FeedbackStore,
{
    pub fn new(
        publisher: P,
        clock: C,
        generator: Option<G>,
        settings: ResponderSettings,
        chunk_limit: usize,
        feedback: FeedbackRecorder<S>,
    ) -> Self {
        let cooldown = Arc::new(CooldownState::new());
        let scheduler = ReplyScheduler::new(
            publisher.clone(),
            clock.clone(),
            cooldown.clone(),
            chunk_limit,
        );
        Self {
            publisher,
            clock,
            generator,
            settings,
            cooldown,
            scheduler,
            feedback,
        }
    }

    /// Handle one public chat line. Terminal in one pass: either a
    /// command fires, a reply is scheduled, or nothing happens.
    pub async fn process_chat(
        &self,
        username: &str,
        message: &str,
        snapshot: &PlayerSnapshot,
    ) -> Result<()> {
        if let Some(command) = commands::route(message) {
            return self.handle_command(command, username, snapshot).await;
        }

        if !self.should_respond(message, username) {
            return Ok(());
        }

        if !self
            .cooldown
            .ready(self.clock.now(), self.settings.cooldown)
        {
            debug!("Reply to {} suppressed by cooldown", username);
            return Ok(());
        }

        let Some(ref generator) = self.generator else {
            debug!("No generator configured, skipping reply to {}", username);
            return Ok(());
        };

        let clean = message
            .strip_prefix(&self.settings.address_prefix)
            .unwrap_or(message)
            .trim();
        let context = ReplyContext::from_snapshot(snapshot);

        match generator.generate(username, clean, &context).await {
            Ok(reply) if !reply.trim().is_empty() => {
                self.scheduler.deliver(username, &reply);
            }
            Ok(_) => debug!("Empty generation result for {}, no reply", username),
            Err(e) => warn!("Reply generation failed for {}: {}", username, e),
        }

        Ok(())
    }

    /// Handle a whisper: no probability gate, but the cooldown still
    /// paces output. The reply goes back over the whisper channel.
    pub async fn process_whisper(
        &self,
        username: &str,
        message: &str,
        snapshot: &PlayerSnapshot,
    ) -> Result<()> {
        if !self
            .cooldown
            .ready(self.clock.now(), self.settings.cooldown)
        {
            debug!("Whisper reply to {} suppressed by cooldown", username);
            return Ok(());
        }

        let Some(ref generator) = self.generator else {
            return Ok(());
        };

        let context = ReplyContext::from_snapshot(snapshot).private();
        let reply = match generator.generate(username, message, &context).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => return Ok(()),
            Err(e) => {
                warn!("Whisper generation failed for {}: {}", username, e);
                return Ok(());
            }
        };

        let publisher = self.publisher.clone();
        let clock = self.clock.clone();
        let cooldown = self.cooldown.clone();
        let username = username.to_string();
        tokio::spawn(async move {
            clock.sleep(WHISPER_DELAY).await;
            let subject = subjects::gateway::chat_whisper(publisher.prefix());
            let cmd = WhisperCommand {
                username: username.clone(),
                message: reply,
            };
            if let Err(e) = publisher.publish(&subject, &cmd).await {
                warn!("Failed to send whisper to {}: {}", username, e);
                return;
            }
            cooldown.mark(clock.now());
        });

        Ok(())
    }

    /// Explicit-address heuristics plus the configured base probability.
    fn should_respond(&self, message: &str, _sender: &str) -> bool {
        let lower = message.to_lowercase();
        if lower.contains(&self.settings.bot_name.to_lowercase()) {
            return true;
        }
        if !self.settings.address_prefix.is_empty()
            && message.starts_with(&self.settings.address_prefix)
        {
            return true;
        }
        rand::thread_rng().gen_bool(self.settings.response_chance.clamp(0.0, 1.0))
    }

    async fn handle_command(
        &self,
        command: Command,
        username: &str,
        snapshot: &PlayerSnapshot,
    ) -> Result<()> {
        match command {
            Command::Help => self.chat(HELP_LINE.to_string()).await,
            Command::Status => {
                let line = format!(
                    "⚡ AI: Health: {}/20, Food: {}/20, Players: {} ⭐",
                    snapshot.health, snapshot.food, snapshot.online
                );
                self.chat(line).await
            }
            Command::FollowMe => {
                let cmd = FollowCommand {
                    username: username.to_string(),
                    range: 3,
                };
                let subject = subjects::gateway::move_follow(self.publisher.prefix());
                self.publisher.publish(&subject, &cmd).await?;
                self.chat(format!("Following {}!", username)).await
            }
            Command::StopMoving => {
                let subject = subjects::gateway::move_stop(self.publisher.prefix());
                self.publisher
                    .publish(&subject, &StopMovementCommand::default())
                    .await?;
                self.chat("Stopped!".to_string()).await
            }
            Command::RateHint => self.chat(RATE_HINT_LINE.to_string()).await,
            Command::Rate { rating, kind } => {
                let ack = self.feedback.record(username, rating, kind).await;
                self.chat(ack).await
            }
            Command::RateOutOfRange { rating } => {
                debug!("Rejected out-of-range rating {} from {}", rating, username);
                self.chat(RATING_CORRECTION.to_string()).await
            }
        }
    }

    async fn chat(&self, message: String) -> Result<()> {
        let subject = subjects::gateway::chat_send(self.publisher.prefix());
        self.publisher
            .publish(&subject, &ChatCommand { message })
            .await?;
        Ok(())
    }
}
