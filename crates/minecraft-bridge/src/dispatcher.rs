//! Notification dispatch to the relay channel
//!
//! Renders normalized events into bounded relay payloads and sends them
//! best-effort: nothing is queued, nothing is retried, and a failed send
//! never propagates past a warning.

#[path = "dispatcher_tests.rs"]
mod dispatcher_tests;

use minecraft_types::{DayPhase, WeatherState, WorldEvent};
use tracing::warn;

use crate::relay::{Notification, Relay, RelayPayload};

/// Longest body a notification may carry
const MAX_BODY_LEN: usize = 256;

pub struct NotificationDispatcher<R: Relay> {
    relay: R,
}

impl<R: Relay> NotificationDispatcher<R> {
    pub fn new(relay: R) -> Self {
        Self { relay }
    }

    /// Forward an event to the relay if it is ready; otherwise drop it.
    pub async fn dispatch(&self, event: &WorldEvent) {
        if !self.relay.ready() {
            return;
        }
        let Some(payload) = render(event) else {
            return;
        };
        if let Err(e) = self.relay.send(payload).await {
            warn!("Relay send failed: {}", e);
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max).collect();
        out.push('…');
        out
    }
}

fn gauge(value: impl std::fmt::Display) -> String {
    format!("{}/20", value)
}

/// Render an event into a relay payload, or None for events that don't
/// notify (private chat, for instance).
pub fn render(event: &WorldEvent) -> Option<RelayPayload> {
    let payload = match event {
        WorldEvent::Connected {
            identity,
            host,
            port,
            health,
            food,
            phase,
            online,
        } => RelayPayload::Notification(Notification {
            title: "🟢 Bot Connected".to_string(),
            body: format!("Connected to {}:{} as **{}**", host, port, identity),
            color: 0x00ff00,
            fields: vec![
                ("⚡ Health".to_string(), gauge(health)),
                ("🍖 Food".to_string(), gauge(food)),
                (
                    "🌙 Time".to_string(),
                    phase
                        .as_ref()
                        .map(|p| p.label().to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                ),
                ("👥 Players Online".to_string(), online.to_string()),
            ],
        }),

        WorldEvent::Kicked { reason } => RelayPayload::Notification(Notification {
            title: "⚠️ Bot Kicked".to_string(),
            body: truncate(reason, MAX_BODY_LEN),
            color: 0xff8800,
            fields: vec![(
                "🔄 Auto-Reconnect".to_string(),
                "Will attempt to reconnect".to_string(),
            )],
        }),

        WorldEvent::Disconnected { reason, deaths } => RelayPayload::Notification(Notification {
            title: "🔴 Bot Disconnected".to_string(),
            body: truncate(reason.as_deref().unwrap_or("Unknown reason"), MAX_BODY_LEN),
            color: 0xff0000,
            fields: vec![("📊 Session Deaths".to_string(), deaths.to_string())],
        }),

        WorldEvent::Chat {
            username,
            message,
            private,
        } => {
            if *private {
                // Whispers stay between the player and the bot
                return None;
            }
            RelayPayload::Text(format!("**[MC]** {}: {}", username, message))
        }

        WorldEvent::PlayerJoined { username, online } => {
            RelayPayload::Notification(Notification {
                title: "👋 Player Joined".to_string(),
                body: format!("**{}** joined the server", username),
                color: 0x00ff00,
                fields: vec![("👥 Players Online".to_string(), online.to_string())],
            })
        }

        WorldEvent::PlayerLeft { username, online } => RelayPayload::Notification(Notification {
            title: "👋 Player Left".to_string(),
            body: format!("**{}** left the server", username),
            color: 0xff6b6b,
            fields: vec![("👥 Players Online".to_string(), online.to_string())],
        }),

        WorldEvent::TimeTransition { phase, time_of_day } => {
            let (title, color) = match phase {
                DayPhase::Day => ("☀️ Sunrise", 0xffff00),
                DayPhase::Night => ("🌙 Sunset", 0x000080),
            };
            RelayPayload::Notification(Notification {
                title: title.to_string(),
                body: format!("It's now {}time on the server", phase.label()),
                color,
                fields: vec![(
                    "🕐 Time".to_string(),
                    format!("{} ticks", time_of_day),
                )],
            })
        }

        WorldEvent::WeatherChanged { state } => {
            let (emoji, color) = match state {
                WeatherState::Clear => ("☀️", 0xffff00),
                WeatherState::Rain => ("🌧️", 0x0099ff),
                WeatherState::Thunder => ("⛈️", 0x800080),
            };
            RelayPayload::Notification(Notification {
                title: format!("{} Weather Changed", emoji),
                body: format!("Weather is now **{}**", state.label()),
                color,
                fields: vec![],
            })
        }

        WorldEvent::CriticalHealth { health, food } => {
            RelayPayload::Notification(Notification {
                title: "⚠️ Critical Health".to_string(),
                body: "Bot health is critically low!".to_string(),
                color: 0xff0000,
                fields: vec![
                    ("❤️ Health".to_string(), gauge(health)),
                    ("🍖 Food".to_string(), gauge(food)),
                ],
            })
        }

        WorldEvent::CriticalFood { food, health } => RelayPayload::Notification(Notification {
            title: "🍖 Low Food".to_string(),
            body: "Bot is getting hungry!".to_string(),
            color: 0xff8800,
            fields: vec![
                ("🍖 Food Level".to_string(), gauge(food)),
                ("❤️ Health".to_string(), gauge(health)),
            ],
        }),

        WorldEvent::BotDied { deaths, position } => RelayPayload::Notification(Notification {
            title: "💀 Bot Died".to_string(),
            body: "The bot has died and will respawn".to_string(),
            color: 0xff0000,
            fields: vec![
                ("📊 Death Count".to_string(), deaths.to_string()),
                (
                    "🌍 Location".to_string(),
                    position
                        .as_ref()
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "Unknown".to_string()),
                ),
            ],
        }),

        WorldEvent::RareEntity { name, distance } => RelayPayload::Notification(Notification {
            title: "👹 Rare Entity Spotted".to_string(),
            body: format!("**{}** spawned nearby!", name),
            color: 0xff0080,
            fields: vec![(
                "📏 Distance".to_string(),
                distance
                    .as_ref()
                    .map(|d| format!("{} blocks", d.floor()))
                    .unwrap_or_else(|| "unknown".to_string()),
            )],
        }),

        WorldEvent::ValuableItem { name, count } => RelayPayload::Notification(Notification {
            title: "💎 Valuable Item Collected".to_string(),
            body: format!("Bot picked up **{}**", name),
            color: 0x00ff00,
            fields: vec![("🔢 Count".to_string(), count.to_string())],
        }),

        WorldEvent::NotableBlock { name, position } => RelayPayload::Notification(Notification {
            title: "⛏️ Block Mined".to_string(),
            body: format!("Bot mined **{}**", name),
            color: 0xff8800,
            fields: vec![(
                "🌍 Location".to_string(),
                position
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
            )],
        }),

        WorldEvent::Advancement { text } => RelayPayload::Notification(Notification {
            title: "🏆 Achievement Unlocked".to_string(),
            body: truncate(text, MAX_BODY_LEN),
            color: 0xffd700,
            fields: vec![],
        }),

        WorldEvent::TransportFault { message } => RelayPayload::Notification(Notification {
            title: "❌ Bot Error".to_string(),
            body: truncate(message, MAX_BODY_LEN),
            color: 0xff0000,
            fields: vec![(
                "🔄 Status".to_string(),
                "Will attempt to recover".to_string(),
            )],
        }),
    };

    Some(payload)
}
