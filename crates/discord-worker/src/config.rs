//! Configuration management for discord-worker

use std::fs;

use anyhow::{Context, Result};
use discord_interactions::DEFAULT_API_BASE;
use discord_nats::{NatsConfig, QueueConfig, ReadEnv};
use serde::{Deserialize, Serialize};

/// Complete worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub discord: DiscordApiConfig,
    #[serde(default = "default_health_port")]
    pub health_port: u16,
}

/// Where interaction calls go
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscordApiConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for DiscordApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_health_port() -> u16 {
    3002
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Load configuration from environment variables
    pub fn from_env<E: ReadEnv>(env: &E) -> Self {
        Self {
            nats: NatsConfig::from_env(env),
            queue: QueueConfig::from_env(env),
            discord: DiscordApiConfig {
                api_base_url: env
                    .var("DISCORD_API_BASE_URL")
                    .unwrap_or_else(default_api_base_url),
            },
            health_port: env
                .var("HEALTH_CHECK_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_health_port),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
