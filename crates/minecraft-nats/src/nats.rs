//! NATS connection bootstrap

use async_nats::Client;
use tracing::{info, warn};

use crate::config::NatsConfig;
use crate::error::{Error, Result};

/// Connect to the configured NATS server(s).
///
/// Reconnection at the NATS layer is unbounded; the world-session
/// reconnection policy is a separate concern handled by the bridge.
pub async fn connect(config: &NatsConfig) -> Result<Client> {
    info!("Connecting to NATS servers: {:?}", config.servers);

    let mut opts = async_nats::ConnectOptions::new().name("minecraft-bridge");

    if let Some(ref creds_file) = config.credentials_file {
        opts = opts
            .credentials_file(creds_file)
            .await
            .map_err(|e| Error::Connection(format!("Failed to load credentials: {}", e)))?;
    }

    opts = opts
        .event_callback(|event| async move {
            match event {
                async_nats::Event::Connected => info!("Connected to NATS"),
                async_nats::Event::Disconnected => warn!("Disconnected from NATS"),
                async_nats::Event::ClientError(e) => warn!("NATS client error: {}", e),
                _ => {}
            }
        })
        .retry_on_initial_connect()
        .max_reconnects(None);

    let servers = config.servers.join(",");
    let client = opts
        .connect(servers.as_str())
        .await
        .map_err(|e| Error::Connection(format!("Failed to connect to NATS: {}", e)))?;

    info!("Successfully connected to NATS");
    Ok(client)
}
