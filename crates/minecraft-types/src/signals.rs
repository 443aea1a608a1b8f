//! Raw signals published by the world gateway to NATS
//!
//! The gateway speaks the Minecraft protocol and translates what it sees
//! into this signal set. The bridge never observes the wire protocol
//! directly, only these shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every gateway signal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalMetadata {
    /// Unique signal ID
    pub signal_id: Uuid,
    /// Identity the gateway session is connected as
    pub session: String,
    /// Signal timestamp
    pub timestamp: DateTime<Utc>,
    /// Monotonic sequence number within the gateway session
    pub sequence: u64,
}

impl SignalMetadata {
    pub fn new(session: impl Into<String>, sequence: u64) -> Self {
        Self {
            signal_id: Uuid::new_v4(),
            session: session.into(),
            timestamp: Utc::now(),
            sequence,
        }
    }
}

/// A block/entity position in the world
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Weather state reported by the server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherState {
    Clear,
    Rain,
    Thunder,
}

impl WeatherState {
    pub fn label(&self) -> &'static str {
        match self {
            WeatherState::Clear => "clear",
            WeatherState::Rain => "rain",
            WeatherState::Thunder => "thunder",
        }
    }
}

/// The raw signal set emitted by the world gateway.
///
/// Everything downstream (normalization, notifications, the responder)
/// consumes this closed set; signal kinds the bridge has no use for are
/// simply never emitted by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldSignal {
    /// The session reached the in-world (spawned) state
    Spawned {
        username: String,
        health: f32,
        food: u32,
        time_of_day: u64,
        online: u32,
    },
    /// A public chat line
    Chat { username: String, message: String },
    /// A private message addressed to the bot
    Whisper { username: String, message: String },
    /// Health/food gauge update
    Health { health: f32, food: u32 },
    /// World time tick update
    Time { time_of_day: u64 },
    /// Weather changed
    Weather { state: WeatherState },
    /// Another player joined the server
    PlayerJoined { username: String, online: u32 },
    /// Another player left the server
    PlayerLeft { username: String, online: u32 },
    /// The bot died
    Died { position: Option<Position> },
    /// An entity spawned near the bot
    EntitySpawned { name: String, distance: Option<f64> },
    /// The bot picked up an item
    ItemCollected { name: String, count: u32 },
    /// The bot finished mining a block
    BlockMined {
        name: String,
        position: Option<Position>,
    },
    /// A raw server broadcast line (advancements, console output, ...)
    ServerMessage { text: String },
    /// The server kicked the session
    Kicked { reason: String },
    /// The transport ended
    Ended { reason: Option<String> },
    /// A transport-level error the gateway could not recover from
    TransportError { message: String },
}

/// Envelope published on the signal subject
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalEnvelope {
    pub metadata: SignalMetadata,
    pub signal: WorldSignal,
}
