//! Minecraft ↔ Discord AI bridge
//!
//! Supervises a single world session over the NATS gateway, relays
//! normalized world events into a Discord channel, and layers a
//! rate-limited AI chat responder over the bridge.

mod bridge;
mod commands;
mod config;
mod dispatcher;
mod errors;
mod feedback;
mod health;
mod llm;
mod normalizer;
mod relay;
mod responder;
mod segmenter;
mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use minecraft_nats::{subjects, MessagePublisher, MessageSubscriber, SystemClock};
use minecraft_types::SignalEnvelope;
use serenity::http::Http;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bridge::WorldBridge;
use crate::config::Config;
use crate::feedback::MemoryFeedbackStore;
use crate::health::AppState;
use crate::llm::ClaudeClient;
use crate::relay::DiscordRelay;

/// Minecraft bridge CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/bridge.toml")]
    config: String,

    /// NATS URL (overrides config file)
    #[arg(long, env = "NATS_URL")]
    nats_url: Option<String>,

    /// NATS subject prefix (overrides config file)
    #[arg(long, env = "MC_PREFIX")]
    prefix: Option<String>,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3001")]
    health_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minecraft_bridge=debug,minecraft_nats=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Minecraft bridge");

    let args = Args::parse();

    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env()?
    };

    if let Some(nats_url) = args.nats_url {
        config.nats.servers = nats_url.split(',').map(|s| s.to_string()).collect();
    }
    if let Some(prefix) = args.prefix {
        config.nats.prefix = prefix;
    }
    if let Some(bot_token) = args.bot_token {
        config.discord.bot_token = bot_token;
    }

    info!(
        "World server: {}:{}, NATS prefix: {}",
        config.minecraft.host, config.minecraft.port, config.nats.prefix
    );

    let nats_client = minecraft_nats::connect(&config.nats)
        .await
        .context("NATS connection failed")?;

    let publisher = MessagePublisher::new(nats_client.clone(), config.nats.prefix.clone());
    let subscriber = MessageSubscriber::new(nats_client, config.nats.prefix.clone());
    let mut signals = subscriber
        .subscribe::<SignalEnvelope>(subjects::world::signal(&config.nats.prefix))
        .await
        .context("Failed to subscribe to world signals")?;

    // Discord relay: send-only, so the HTTP client is all we need
    if config.discord.bot_token.is_empty() {
        info!("No Discord token configured, relay notifications disabled");
    }
    let http = Arc::new(Http::new(&config.discord.bot_token));
    let relay = DiscordRelay::new(http, config.discord.channel_id);

    let generator = if config.ai.api_key.is_empty() {
        info!("No API key configured, automated replies disabled");
        None
    } else {
        Some(ClaudeClient::new(config.ai.clone()))
    };

    let health_state = AppState::new();
    let health_for_server = health_state.clone();
    let health_port = args.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_for_server, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    // Graceful shutdown on SIGTERM or Ctrl+C; also cancels any pending
    // reconnection timer.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut bridge = WorldBridge::new(
        publisher,
        SystemClock,
        relay,
        generator,
        MemoryFeedbackStore::new(),
        &config,
        Some(health_state),
        shutdown_rx,
    );

    bridge.run(&mut signals).await?;

    info!("Minecraft bridge stopped");
    Ok(())
}
