//! Discord relay
//!
//! The dispatcher hands this seam platform-neutral payloads; the relay
//! owns the translation to Discord messages and embeds. Deliveries are
//! fire-and-forget from the core's perspective.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::http::Http;
use serenity::model::id::ChannelId;
use serenity::model::{Colour, Timestamp};

/// A rendered, bounded-size notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub color: u32,
    pub fields: Vec<(String, String)>,
}

/// What the dispatcher can send through the relay
#[derive(Debug, Clone, PartialEq)]
pub enum RelayPayload {
    Text(String),
    Notification(Notification),
}

/// Outbound channel to the messaging platform.
pub trait Relay: Send + Sync {
    /// Whether the relay can deliver right now. Not-ready relays make
    /// every dispatch a silent no-op.
    fn ready(&self) -> bool;

    fn send(&self, payload: RelayPayload) -> impl Future<Output = Result<()>> + Send;
}

/// Relay that posts into a single Discord channel
pub struct DiscordRelay {
    http: Arc<Http>,
    channel: Option<ChannelId>,
}

impl DiscordRelay {
    /// A zero channel ID leaves the relay permanently not-ready.
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        Self {
            http,
            channel: (channel_id != 0).then(|| ChannelId::new(channel_id)),
        }
    }
}

impl Relay for DiscordRelay {
    fn ready(&self) -> bool {
        self.channel.is_some()
    }

    async fn send(&self, payload: RelayPayload) -> Result<()> {
        let Some(channel) = self.channel else {
            return Ok(());
        };

        let message = match payload {
            RelayPayload::Text(text) => CreateMessage::new().content(text),
            RelayPayload::Notification(n) => {
                let mut embed = CreateEmbed::new()
                    .title(n.title)
                    .description(n.body)
                    .colour(Colour::new(n.color))
                    .timestamp(Timestamp::now());
                for (name, value) in n.fields {
                    embed = embed.field(name, value, true);
                }
                CreateMessage::new().embed(embed)
            }
        };

        channel.send_message(&*self.http, message).await?;
        Ok(())
    }
}
