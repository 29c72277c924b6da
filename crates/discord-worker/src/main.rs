//! Discord command worker
//!
//! Pulls slash-command jobs off the NATS job queue and runs them against the
//! registered command handlers, replying through Discord's REST API.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_nats::jetstream;
use clap::Parser;
use discord_interactions::DiscordRest;
use discord_nats::{connect, NatsConfig, SystemEnv};
use discord_worker::commands::{default_registry, InMemoryQuestionStore, QuestionStore};
use discord_worker::config::Config;
use discord_worker::health::{self, AppState};
use discord_worker::WorkerPool;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Discord Command Worker CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/discord-worker.toml")]
    config: String,

    /// NATS URL (overrides config file)
    #[arg(long, env = "NATS_URL")]
    nats_url: Option<String>,

    /// NATS prefix (overrides config file)
    #[arg(long, env = "DISCORD_PREFIX")]
    prefix: Option<String>,

    /// Jobs run at once by this process (overrides config file)
    #[arg(long, env = "DISCORD_WORKER_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Health check server port (overrides config file)
    #[arg(long, env = "HEALTH_CHECK_PORT")]
    health_port: Option<u16>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(nats_url) = self.nats_url {
            config.nats.servers = NatsConfig::from_url(nats_url, "").servers;
        }
        if let Some(prefix) = self.prefix {
            config.nats.prefix = prefix;
        }
        if let Some(n) = self.concurrency {
            config.queue.max_concurrency = n;
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
                "discord_worker=debug,discord_nats=debug,discord_interactions=debug,info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Discord command worker");

    let args = Args::parse();

    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env(&SystemEnv)
    };
    args.apply(&mut config);

    info!(
        prefix = %config.nats.prefix,
        max_concurrency = config.queue.max_concurrency,
        api = %config.discord.api_base_url,
        "Worker configured"
    );

    let nats_client = connect(&config.nats, "discord-worker")
        .await
        .context("Failed to connect to NATS")?;
    info!("Connected to NATS");
    let js = jetstream::new(nats_client.clone());

    let store: Arc<dyn QuestionStore> = Arc::new(InMemoryQuestionStore::new());
    let registry = default_registry(store).context("Failed to build command registry")?;
    info!(commands = ?registry.names(), "Commands registered");

    let api = Arc::new(DiscordRest::new(config.discord.api_base_url.clone()));
    let pool = WorkerPool::new(Arc::new(registry), api);

    let health_state = AppState::new(pool.stats());
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    pool.run(&js, &config.nats.prefix, &config.queue, shutdown_signal())
        .await
        .context("Worker pool stopped with an error")?;

    if let Err(e) = nats_client.drain().await {
        warn!(error = %e, "Failed to drain NATS connection");
    }
    info!("Discord command worker stopped");
    Ok(())
}

/// Resolves on SIGTERM or Ctrl+C.
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
    info!("Shutdown signal received, finishing in-flight jobs...");
}
