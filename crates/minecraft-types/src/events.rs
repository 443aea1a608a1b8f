//! Normalized world events
//!
//! The normalizer reduces the raw gateway signal stream to this small,
//! stable vocabulary. Downstream consumers (the notification dispatcher,
//! the chat responder) subscribe to the variants they care about and
//! never see raw signals.

use serde::{Deserialize, Serialize};

use crate::signals::{Position, WeatherState};
use crate::snapshot::DayPhase;

/// Connection lifecycle states surfaced to the relay
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    Kicked,
    Disconnected,
}

/// A normalized world event.
///
/// Emission rules (edge detection, allow-list filtering, duplicate
/// suppression) live in the normalizer; an event here means the condition
/// actually transitioned or passed its filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldEvent {
    /// Session reached the in-world state
    Connected {
        identity: String,
        host: String,
        port: u16,
        health: f32,
        food: u32,
        phase: Option<DayPhase>,
        online: u32,
    },
    /// Session was kicked by the server
    Kicked { reason: String },
    /// Session ended
    Disconnected {
        reason: Option<String>,
        deaths: u32,
    },
    /// A public or private chat line from another player
    Chat {
        username: String,
        message: String,
        private: bool,
    },
    PlayerJoined { username: String, online: u32 },
    PlayerLeft { username: String, online: u32 },
    /// Day/night flipped (emitted once per actual transition)
    TimeTransition { phase: DayPhase, time_of_day: u64 },
    WeatherChanged { state: WeatherState },
    /// Health fell through the critical threshold
    CriticalHealth { health: f32, food: u32 },
    /// Food fell through the critical threshold
    CriticalFood { food: u32, health: f32 },
    /// The bot died
    BotDied {
        deaths: u32,
        position: Option<Position>,
    },
    /// An allow-listed rare entity appeared nearby
    RareEntity { name: String, distance: Option<f64> },
    /// The bot collected an allow-listed valuable item
    ValuableItem { name: String, count: u32 },
    /// The bot mined an allow-listed notable block
    NotableBlock {
        name: String,
        position: Option<Position>,
    },
    /// A server advancement broadcast
    Advancement { text: String },
    /// A non-fatal transport error the session recovered from
    TransportFault { message: String },
}

impl WorldEvent {
    /// Connection-state classification, if this is a lifecycle event
    pub fn connection_state(&self) -> Option<ConnectionState> {
        match self {
            WorldEvent::Connected { .. } => Some(ConnectionState::Connected),
            WorldEvent::Kicked { .. } => Some(ConnectionState::Kicked),
            WorldEvent::Disconnected { .. } => Some(ConnectionState::Disconnected),
            _ => None,
        }
    }

    /// True when the event terminates the current session
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorldEvent::Kicked { .. } | WorldEvent::Disconnected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(WorldEvent::Kicked {
            reason: "duplicate_login".to_string()
        }
        .is_terminal());
        assert!(WorldEvent::Disconnected {
            reason: None,
            deaths: 0
        }
        .is_terminal());
        assert!(!WorldEvent::Chat {
            username: "alice".to_string(),
            message: "hi".to_string(),
            private: false,
        }
        .is_terminal());
    }

    #[test]
    fn test_connection_state_mapping() {
        let ev = WorldEvent::Kicked {
            reason: "afk".to_string(),
        };
        assert_eq!(ev.connection_state(), Some(ConnectionState::Kicked));

        let ev = WorldEvent::PlayerJoined {
            username: "bob".to_string(),
            online: 3,
        };
        assert_eq!(ev.connection_state(), None);
    }

    #[test]
    fn test_event_json_tagging() {
        let ev = WorldEvent::TimeTransition {
            phase: DayPhase::Night,
            time_of_day: 13000,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["kind"], "time_transition");
        assert_eq!(json["phase"], "night");
    }
}
