//! World session lifecycle management
//!
//! Exactly one session exists at a time. The manager is its only owner:
//! it opens sessions with freshly rotated identities, tears them down
//! before any new attempt, and tracks consecutive failures against the
//! configured attempt cap. Everyone else observes the session through
//! [`SessionManager::session`], which hands out a snapshot, never a
//! reference that could outlive a reconnect.

#[path = "session_tests.rs"]
mod session_tests;

use anyhow::{ensure, Context, Result};
use minecraft_nats::{subjects, Publish};
use minecraft_types::{derive_identity, ConnectSessionCommand, EndSessionCommand};
use tokio::time::Duration;
use tracing::{info, warn};

use crate::config::MinecraftConfig;
use crate::errors::{log_disconnect, FaultKind};

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Active,
    Ending,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Active => "active",
            SessionState::Ending => "ending",
        }
    }
}

/// Snapshot of the single live session
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: String,
    pub host: String,
    pub port: u16,
    /// 1-based attempt number that opened this session
    pub attempt: u32,
    pub state: SessionState,
}

/// Lifecycle tuning taken from [`MinecraftConfig`]
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub host: String,
    pub port: u16,
    pub base_username: String,
    pub version: Option<String>,
    pub reconnect_delay: Duration,
    pub max_attempts: u32,
    pub spawn_timeout: Duration,
}

impl SessionSettings {
    pub fn from_config(config: &MinecraftConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            base_username: config.username.clone(),
            version: config.version.clone(),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            max_attempts: config.max_reconnect_attempts,
            spawn_timeout: Duration::from_millis(config.spawn_timeout_ms),
        }
    }
}

/// Owns the one-and-only world session
pub struct SessionManager<P: Publish> {
    publisher: P,
    settings: SessionSettings,
    session: Session,
    /// Consecutive failed attempts since the last active session
    failures: u32,
}

impl<P: Publish> SessionManager<P> {
    pub fn new(publisher: P, settings: SessionSettings) -> Self {
        let session = Session {
            identity: String::new(),
            host: settings.host.clone(),
            port: settings.port,
            attempt: 0,
            state: SessionState::Disconnected,
        };
        Self {
            publisher,
            settings,
            session,
            failures: 0,
        }
    }

    /// Read accessor: a snapshot of the current session
    pub fn session(&self) -> Session {
        self.session.clone()
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn spawn_timeout(&self) -> Duration {
        self.settings.spawn_timeout
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.settings.reconnect_delay
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// True once the consecutive-failure count has reached the cap
    pub fn attempts_exhausted(&self) -> bool {
        self.failures >= self.settings.max_attempts
    }

    /// Start a new connection attempt.
    ///
    /// Derives a fresh identity (duplicate-login protection rejects
    /// reused names) and publishes the connect command. The previous
    /// session must already be fully released.
    pub async fn begin_attempt(&mut self) -> Result<String> {
        ensure!(
            self.session.state == SessionState::Disconnected,
            "cannot start an attempt while the session is {}",
            self.session.state.label()
        );

        let identity = derive_identity(&self.settings.base_username);
        self.session = Session {
            identity: identity.clone(),
            host: self.settings.host.clone(),
            port: self.settings.port,
            attempt: self.failures + 1,
            state: SessionState::Connecting,
        };

        info!(
            "Connecting to {}:{} as {} (attempt {}/{})",
            self.session.host,
            self.session.port,
            identity,
            self.session.attempt,
            self.settings.max_attempts
        );

        let cmd = ConnectSessionCommand {
            host: self.settings.host.clone(),
            port: self.settings.port,
            username: identity.clone(),
            version: self.settings.version.clone(),
        };
        let subject = subjects::gateway::session_connect(self.publisher.prefix());
        self.publisher
            .publish(&subject, &cmd)
            .await
            .context("Failed to publish session connect command")?;

        Ok(identity)
    }

    /// The session reached the in-world state
    pub fn mark_active(&mut self) {
        self.session.state = SessionState::Active;
        self.failures = 0;
        info!("Session active as {}", self.session.identity);
    }

    /// Force-release the current transport before the next attempt.
    ///
    /// Publish failures are logged and swallowed; the gateway drops
    /// half-open sessions on its own.
    pub async fn teardown(&mut self, reason: Option<&str>) {
        if self.session.state == SessionState::Disconnected {
            return;
        }
        self.session.state = SessionState::Ending;

        let cmd = EndSessionCommand {
            reason: reason.map(String::from),
        };
        let subject = subjects::gateway::session_end(self.publisher.prefix());
        if let Err(e) = self.publisher.publish(&subject, &cmd).await {
            warn!("Failed to publish session end command: {}", e);
        }

        self.session.state = SessionState::Disconnected;
    }

    /// Record a failed attempt or a dropped session and classify it.
    pub fn record_failure(&mut self, reason: Option<&str>) -> FaultKind {
        self.failures += 1;
        self.session.state = SessionState::Disconnected;
        log_disconnect(
            "Session lost",
            reason.unwrap_or("connection ended without a reason"),
        )
    }
}
