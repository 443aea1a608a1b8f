//! Last-known player state, cached between signals

use serde::{Deserialize, Serialize};

/// Day/night phase of the world clock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    Day,
    Night,
}

/// Ticks-of-day below this count as daytime
const DAYTIME_TICKS: u64 = 6000;

impl DayPhase {
    pub fn from_ticks(time_of_day: u64) -> Self {
        if time_of_day < DAYTIME_TICKS {
            DayPhase::Day
        } else {
            DayPhase::Night
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayPhase::Day => "day",
            DayPhase::Night => "night",
        }
    }
}

/// Cached last-known session state.
///
/// Mutated only by the normalizer; everyone else reads it through an
/// accessor. Not persisted across process restarts, and reset per session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSnapshot {
    pub health: f32,
    pub food: u32,
    pub time_of_day: u64,
    /// None until the first time sample of the session arrives
    pub phase: Option<DayPhase>,
    pub online: u32,
    /// Bot deaths in the current session
    pub deaths: u32,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            health: 20.0,
            food: 20,
            time_of_day: 0,
            phase: None,
            online: 0,
            deaths: 0,
        }
    }
}
