//! Configuration management for the bridge

#[path = "config_tests.rs"]
mod config_tests;

use anyhow::{Context, Result};
use minecraft_nats::NatsConfig;
use minecraft_types::WatchLists;
use serde::{Deserialize, Serialize};
use std::fs;

/// Complete bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub minecraft: MinecraftConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub responder: ResponderConfig,
    #[serde(default)]
    pub events: EventConfig,
    #[serde(default)]
    pub nats: NatsConfig,
}

/// World server connection and session lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinecraftConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base identity; each attempt appends a uniqueness suffix
    #[serde(default = "default_username")]
    pub username: String,
    /// Protocol version to pin, if the server needs one
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// How long a connect may sit without reaching the spawned state
    #[serde(default = "default_spawn_timeout_ms")]
    pub spawn_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub auto_respawn: bool,
}

/// Discord relay settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Channel notifications are sent to; 0 disables the relay
    #[serde(default)]
    pub channel_id: u64,
}

/// Claude API settings for the reply generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Automated reply gating and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Probability of replying to a line that doesn't address the bot
    #[serde(default = "default_response_chance")]
    pub response_chance: f64,
    /// Minimum interval between observable replies
    #[serde(default = "default_chat_cooldown_ms")]
    pub chat_cooldown_ms: u64,
    /// Practical per-message length limit of world chat
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,
    /// Leading character stripped before the generation call
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,
}

/// Normalization thresholds and allow-lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default = "default_critical_health")]
    pub critical_health: f32,
    #[serde(default = "default_critical_food")]
    pub critical_food: u32,
    #[serde(default)]
    pub watchlists: WatchLists,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    25565
}

fn default_username() -> String {
    "AIBot".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    15_000
}

fn default_max_reconnect_attempts() -> u32 {
    50
}

fn default_spawn_timeout_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "claude-sonnet-4-6".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_temperature() -> f32 {
    1.0
}

fn default_response_chance() -> f64 {
    0.3
}

fn default_chat_cooldown_ms() -> u64 {
    2_000
}

fn default_chunk_limit() -> usize {
    75
}

fn default_address_prefix() -> String {
    ".".to_string()
}

fn default_critical_health() -> f32 {
    5.0
}

fn default_critical_food() -> u32 {
    5
}

impl Default for MinecraftConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            version: None,
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            spawn_timeout_ms: default_spawn_timeout_ms(),
            auto_respawn: true,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            response_chance: default_response_chance(),
            chat_cooldown_ms: default_chat_cooldown_ms(),
            chunk_limit: default_chunk_limit(),
            address_prefix: default_address_prefix(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            critical_health: default_critical_health(),
            critical_food: default_critical_food(),
            watchlists: WatchLists::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("MINECRAFT_HOST") {
            config.minecraft.host = host;
        }
        if let Ok(port) = std::env::var("MINECRAFT_PORT") {
            config.minecraft.port = port
                .parse()
                .context("MINECRAFT_PORT is not a valid port number")?;
        }
        if let Ok(username) = std::env::var("MINECRAFT_USERNAME") {
            config.minecraft.username = username;
        }
        if let Ok(delay) = std::env::var("RECONNECT_DELAY_MS") {
            config.minecraft.reconnect_delay_ms = delay
                .parse()
                .context("RECONNECT_DELAY_MS is not a valid number")?;
        }
        if let Ok(attempts) = std::env::var("MAX_RECONNECT_ATTEMPTS") {
            config.minecraft.max_reconnect_attempts = attempts
                .parse()
                .context("MAX_RECONNECT_ATTEMPTS is not a valid number")?;
        }
        if let Ok(v) = std::env::var("AUTO_RESPAWN") {
            config.minecraft.auto_respawn = v.to_lowercase() != "false";
        }

        if let Ok(token) = std::env::var("DISCORD_BOT_TOKEN") {
            config.discord.bot_token = token;
        }
        if let Ok(channel) = std::env::var("DISCORD_CHANNEL_ID") {
            config.discord.channel_id = channel
                .parse()
                .context("DISCORD_CHANNEL_ID is not a valid channel ID")?;
        }

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.ai.api_key = key;
        }
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            config.ai.model = model;
        }

        if let Ok(chance) = std::env::var("AI_RESPONSE_CHANCE") {
            config.responder.response_chance = chance
                .parse()
                .context("AI_RESPONSE_CHANCE is not a valid probability")?;
        }
        if let Ok(cooldown) = std::env::var("CHAT_COOLDOWN_MS") {
            config.responder.chat_cooldown_ms = cooldown
                .parse()
                .context("CHAT_COOLDOWN_MS is not a valid number")?;
        }

        let nats_url = std::env::var("NATS_URL").unwrap_or_else(|_| "localhost:4222".to_string());
        let prefix = std::env::var("MC_PREFIX").unwrap_or_else(|_| "prod".to_string());
        config.nats = NatsConfig::from_url(nats_url, prefix);

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minecraft: MinecraftConfig::default(),
            discord: DiscordConfig::default(),
            ai: AiConfig::default(),
            responder: ResponderConfig::default(),
            events: EventConfig::default(),
            nats: NatsConfig::default(),
        }
    }
}
