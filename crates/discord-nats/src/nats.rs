//! NATS connection management

use std::time::Duration;

use async_nats::{Client, ConnectOptions, Event};
use tracing::{info, instrument, warn};

use crate::config::NatsConfig;
use crate::error::{Error, Result};

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

fn reconnect_delay(attempts: usize) -> Duration {
    let secs = 2u64
        .saturating_pow(attempts as u32)
        .min(MAX_RECONNECT_DELAY.as_secs());
    Duration::from_secs(secs)
}

async fn handle_event(event: Event) {
    match event {
        Event::Connected => info!("NATS connected"),
        Event::Disconnected => warn!("NATS disconnected - will attempt reconnect"),
        Event::ServerError(err) => warn!(error = %err, "NATS server error"),
        Event::ClientError(err) => warn!(error = %err, "NATS client error"),
        Event::SlowConsumer(sid) => warn!(sid, "NATS slow consumer detected"),
        Event::Closed => info!("NATS connection closed"),
        _ => {}
    }
}

/// Connect to NATS with automatic reconnection.
///
/// `client_name` shows up in `nats server report connections`.
#[instrument(name = "nats.connect", skip(config), fields(servers = ?config.servers))]
pub async fn connect(config: &NatsConfig, client_name: &str) -> Result<Client> {
    let mut opts = ConnectOptions::new().name(client_name);

    if let Some(ref creds_file) = config.credentials_file {
        opts = opts
            .credentials_file(creds_file)
            .await
            .map_err(|e| Error::Connection(format!("Failed to load credentials: {}", e)))?;
    } else if let (Some(username), Some(password)) = (&config.username, &config.password) {
        opts = opts.user_and_password(username.clone(), password.clone());
    }

    let client = opts
        .retry_on_initial_connect()
        .connection_timeout(CONNECTION_TIMEOUT)
        .reconnect_delay_callback(reconnect_delay)
        .event_callback(|event| async move { handle_event(event).await })
        .connect(&config.servers)
        .await
        .map_err(|e| Error::Connection(format!("Failed to connect to NATS: {}", e)))?;

    info!("Connected to NATS");
    Ok(client)
}
