//! Configuration management for discord-bot

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

use std::fs;

use anyhow::{Context, Result};
use discord_nats::{NatsConfig, QueueConfig, ReadEnv};
use serde::{Deserialize, Serialize};

/// Complete bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordBotConfig,
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default = "default_health_port")]
    pub health_port: u16,
}

/// Discord bot specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordBotConfig {
    /// Bot token from the Discord developer portal
    #[serde(default)]
    pub bot_token: String,
    /// Send the "thinking…" acknowledgment before the job is queued
    #[serde(default = "default_true")]
    pub defer_before_enqueue: bool,
    /// Pipeline notices (queue outage, unknown command, failure) only visible to the invoker
    #[serde(default = "default_true")]
    pub ephemeral_notices: bool,
}

fn default_true() -> bool {
    true
}

fn default_health_port() -> u16 {
    3001
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
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self> {
        let bot_token = env
            .var("DISCORD_BOT_TOKEN")
            .context("DISCORD_BOT_TOKEN not set")?;

        Ok(Config {
            discord: DiscordBotConfig {
                bot_token,
                defer_before_enqueue: parse_flag(env, "DISCORD_DEFER_BEFORE_ENQUEUE", true),
                ephemeral_notices: parse_flag(env, "DISCORD_EPHEMERAL_NOTICES", true),
            },
            nats: NatsConfig::from_env(env),
            queue: QueueConfig::from_env(env),
            health_port: env
                .var("HEALTH_CHECK_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_health_port),
        })
    }
}

fn parse_flag<E: ReadEnv>(env: &E, key: &str, default: bool) -> bool {
    match env.var(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "true" || v == "1" => true,
        Some(v) if v == "false" || v == "0" => false,
        _ => default,
    }
}
