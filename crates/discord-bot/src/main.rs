//! Discord gateway receiver
//!
//! Acknowledges slash commands as they arrive and queues them on NATS
//! JetStream for the worker pool to execute.

mod config;
mod errors;
mod handlers;
mod health;
mod live;
mod receiver;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_nats::jetstream;
use clap::Parser;
use discord_nats::stream::ensure_stream;
use discord_nats::{connect, JetStreamJobQueue, NatsConfig, SystemEnv};
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::handlers::Handler;
use crate::health::AppState;
use crate::receiver::{Receiver, ReceiverSettings};

/// Discord Bot Receiver CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/discord-bot.toml")]
    config: String,

    /// NATS URL (overrides config file)
    #[arg(long, env = "NATS_URL")]
    nats_url: Option<String>,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN")]
    bot_token: Option<String>,

    /// NATS prefix (overrides config file)
    #[arg(long, env = "DISCORD_PREFIX")]
    prefix: Option<String>,

    /// Health check server port (overrides config file)
    #[arg(long, env = "HEALTH_CHECK_PORT")]
    health_port: Option<u16>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(nats_url) = self.nats_url {
            config.nats.servers = NatsConfig::from_url(nats_url, "").servers;
        }
        if let Some(bot_token) = self.bot_token {
            config.discord.bot_token = bot_token;
        }
        if let Some(prefix) = self.prefix {
            config.nats.prefix = prefix;
        }
        if let Some(port) = self.health_port {
            config.health_port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "discord_bot=debug,discord_nats=debug,discord_interactions=debug,info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Discord gateway receiver");

    let args = Args::parse();

    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env(&SystemEnv)?
    };
    args.apply(&mut config);
    anyhow::ensure!(
        !config.discord.bot_token.is_empty(),
        "Discord bot token not configured"
    );

    info!("NATS prefix: {}", config.nats.prefix);

    let nats_client = connect(&config.nats, "discord-bot")
        .await
        .context("Failed to connect to NATS")?;
    info!("Connected to NATS");

    let js = jetstream::new(nats_client.clone());
    ensure_stream(&js, &config.nats.prefix, &config.queue)
        .await
        .context("Failed to provision job stream")?;

    let receiver = Arc::new(Receiver::new(
        JetStreamJobQueue::new(js, &config.nats.prefix),
        ReceiverSettings {
            defer_before_enqueue: config.discord.defer_before_enqueue,
            ephemeral_notices: config.discord.ephemeral_notices,
        },
    ));
    let health_state = AppState::new(receiver.stats());

    // Slash commands arrive over the gateway without privileged intents
    let mut client = Client::builder(&config.discord.bot_token, GatewayIntents::GUILDS)
        .event_handler(Handler::new(receiver, health_state.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    // Blocks until all shards are stopped
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    if let Err(e) = nats_client.drain().await {
        warn!(error = %e, "Failed to drain NATS connection");
    }
    info!("Discord bot stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}
