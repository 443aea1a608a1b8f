//! Raw signal normalization
//!
//! Reduces the gateway's signal stream to the normalized event
//! vocabulary. All duplicate suppression lives here: day/night flips
//! emit once per actual transition, critical health/food only on the
//! falling edge, and entity/item/block signals pass an allow-list.
//! The normalizer is also the sole writer of the [`PlayerSnapshot`].

#[path = "normalizer_tests.rs"]
mod normalizer_tests;

use minecraft_types::{DayPhase, PlayerSnapshot, WatchLists, WorldEvent, WorldSignal};

use crate::config::EventConfig;

/// Falling-edge thresholds for the health/food gauges
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub critical_health: f32,
    pub critical_food: u32,
}

pub struct Normalizer {
    snapshot: PlayerSnapshot,
    thresholds: Thresholds,
    watch: WatchLists,
    /// Identity of the current session, used to drop our own chat echo
    identity: String,
}

impl Normalizer {
    pub fn new(config: &EventConfig) -> Self {
        Self {
            snapshot: PlayerSnapshot::default(),
            thresholds: Thresholds {
                critical_health: config.critical_health,
                critical_food: config.critical_food,
            },
            watch: config.watchlists.clone(),
            identity: String::new(),
        }
    }

    /// Read accessor for the cached state
    pub fn snapshot(&self) -> &PlayerSnapshot {
        &self.snapshot
    }

    /// Reset per-session state at the start of a new attempt
    pub fn begin_session(&mut self, identity: &str) {
        self.snapshot = PlayerSnapshot::default();
        self.identity = identity.to_string();
    }

    /// Map a raw signal to a normalized event, or drop it.
    ///
    /// Updates the snapshot fields it is authoritative for before
    /// returning.
    pub fn normalize(&mut self, signal: &WorldSignal) -> Option<WorldEvent> {
        match signal {
            WorldSignal::Spawned {
                health,
                food,
                time_of_day,
                online,
                ..
            } => {
                // Cache fill only; the session manager announces the
                // connection once it marks the session active.
                self.snapshot.health = *health;
                self.snapshot.food = *food;
                self.snapshot.time_of_day = *time_of_day;
                self.snapshot.phase = Some(DayPhase::from_ticks(*time_of_day));
                self.snapshot.online = *online;
                None
            }

            WorldSignal::Chat { username, message } => {
                if *username == self.identity {
                    return None;
                }
                Some(WorldEvent::Chat {
                    username: username.clone(),
                    message: message.clone(),
                    private: false,
                })
            }

            WorldSignal::Whisper { username, message } => Some(WorldEvent::Chat {
                username: username.clone(),
                message: message.clone(),
                private: true,
            }),

            WorldSignal::Health { health, food } => {
                let previous_health = self.snapshot.health;
                let previous_food = self.snapshot.food;
                self.snapshot.health = *health;
                self.snapshot.food = *food;

                if *health <= self.thresholds.critical_health
                    && previous_health > self.thresholds.critical_health
                {
                    return Some(WorldEvent::CriticalHealth {
                        health: *health,
                        food: *food,
                    });
                }
                if *food <= self.thresholds.critical_food
                    && previous_food > self.thresholds.critical_food
                {
                    return Some(WorldEvent::CriticalFood {
                        food: *food,
                        health: *health,
                    });
                }
                None
            }

            WorldSignal::Time { time_of_day } => {
                let phase = DayPhase::from_ticks(*time_of_day);
                let previous = self.snapshot.phase;
                self.snapshot.time_of_day = *time_of_day;
                self.snapshot.phase = Some(phase);

                match previous {
                    Some(p) if p != phase => Some(WorldEvent::TimeTransition {
                        phase,
                        time_of_day: *time_of_day,
                    }),
                    // Unchanged, or the first sample of the session
                    _ => None,
                }
            }

            WorldSignal::Weather { state } => Some(WorldEvent::WeatherChanged { state: *state }),

            WorldSignal::PlayerJoined { username, online } => {
                self.snapshot.online = *online;
                Some(WorldEvent::PlayerJoined {
                    username: username.clone(),
                    online: *online,
                })
            }

            WorldSignal::PlayerLeft { username, online } => {
                self.snapshot.online = *online;
                Some(WorldEvent::PlayerLeft {
                    username: username.clone(),
                    online: *online,
                })
            }

            WorldSignal::Died { position } => {
                self.snapshot.deaths += 1;
                Some(WorldEvent::BotDied {
                    deaths: self.snapshot.deaths,
                    position: *position,
                })
            }

            WorldSignal::EntitySpawned { name, distance } => self
                .watch
                .is_rare_entity(name)
                .then(|| WorldEvent::RareEntity {
                    name: name.clone(),
                    distance: *distance,
                }),

            WorldSignal::ItemCollected { name, count } => self
                .watch
                .is_valuable_item(name)
                .then(|| WorldEvent::ValuableItem {
                    name: name.clone(),
                    count: *count,
                }),

            WorldSignal::BlockMined { name, position } => self
                .watch
                .is_notable_block(name)
                .then(|| WorldEvent::NotableBlock {
                    name: name.clone(),
                    position: *position,
                }),

            WorldSignal::ServerMessage { text } => {
                if text.contains("has made the advancement")
                    || text.contains("has completed the challenge")
                {
                    Some(WorldEvent::Advancement { text: text.clone() })
                } else {
                    None
                }
            }

            WorldSignal::Kicked { reason } => Some(WorldEvent::Kicked {
                reason: reason.clone(),
            }),

            WorldSignal::Ended { reason } => Some(WorldEvent::Disconnected {
                reason: reason.clone(),
                deaths: self.snapshot.deaths,
            }),

            WorldSignal::TransportError { message } => Some(WorldEvent::TransportFault {
                message: message.clone(),
            }),
        }
    }
}
