//! Configuration types for the NATS job queue

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env::ReadEnv;

/// NATS connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    /// NATS server URLs (comma-separated when loaded from env)
    pub servers: Vec<String>,
    /// Subject prefix (e.g. "prod", "dev")
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_prefix() -> String {
    "prod".to_string()
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self::from_url("localhost:4222", default_prefix())
    }
}

impl NatsConfig {
    /// Parse servers from a comma-separated URL string
    pub fn from_url(url: impl AsRef<str>, prefix: impl Into<String>) -> Self {
        Self {
            servers: url
                .as_ref()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            prefix: prefix.into(),
            credentials_file: None,
            username: None,
            password: None,
        }
    }

    /// `NATS_URL`, `DISCORD_PREFIX`, `NATS_CREDS`, `NATS_USER` / `NATS_PASSWORD`
    pub fn from_env<E: ReadEnv>(env: &E) -> Self {
        let url = env.var("NATS_URL").unwrap_or_else(|| "localhost:4222".to_string());
        let prefix = env.var("DISCORD_PREFIX").unwrap_or_else(default_prefix);
        let mut config = Self::from_url(url, prefix);
        if let Some(creds) = env.var("NATS_CREDS") {
            config = config.with_credentials(creds);
        }
        if let (Some(user), Some(password)) = (env.var("NATS_USER"), env.var("NATS_PASSWORD")) {
            config = config.with_auth(user, password);
        }
        config
    }

    pub fn with_credentials(mut self, file: impl Into<String>) -> Self {
        self.credentials_file = Some(file.into());
        self
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// JetStream stream and consumer settings for the job queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueConfig {
    #[serde(default = "default_stream")]
    pub stream: String,
    /// Durable consumer shared by every worker process
    #[serde(default = "default_consumer")]
    pub consumer: String,
    /// Jobs in flight per worker process
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Delivery budget before the broker gives up on a job
    #[serde(default = "default_max_deliver")]
    pub max_deliver: i64,
    #[serde(default = "default_ack_wait_secs")]
    pub ack_wait_secs: u64,
    #[serde(default = "default_duplicate_window_secs")]
    pub duplicate_window_secs: u64,
}

fn default_stream() -> String {
    "DISCORD_JOBS".to_string()
}

fn default_consumer() -> String {
    "discord-workers".to_string()
}

fn default_max_concurrency() -> usize {
    8
}

fn default_max_deliver() -> i64 {
    3
}

fn default_ack_wait_secs() -> u64 {
    30
}

fn default_duplicate_window_secs() -> u64 {
    120
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            stream: default_stream(),
            consumer: default_consumer(),
            max_concurrency: default_max_concurrency(),
            max_deliver: default_max_deliver(),
            ack_wait_secs: default_ack_wait_secs(),
            duplicate_window_secs: default_duplicate_window_secs(),
        }
    }
}

impl QueueConfig {
    pub fn ack_wait(&self) -> Duration {
        Duration::from_secs(self.ack_wait_secs)
    }

    pub fn duplicate_window(&self) -> Duration {
        Duration::from_secs(self.duplicate_window_secs)
    }

    /// Defaults overridden by `DISCORD_JOBS_STREAM`, `DISCORD_JOBS_CONSUMER`,
    /// `DISCORD_WORKER_CONCURRENCY`, `DISCORD_JOBS_MAX_DELIVER`,
    /// `DISCORD_JOBS_ACK_WAIT_SECS`. Unparseable numbers fall back to defaults.
    pub fn from_env<E: ReadEnv>(env: &E) -> Self {
        let defaults = Self::default();
        Self {
            stream: env.var("DISCORD_JOBS_STREAM").unwrap_or(defaults.stream),
            consumer: env.var("DISCORD_JOBS_CONSUMER").unwrap_or(defaults.consumer),
            max_concurrency: parse_or(env, "DISCORD_WORKER_CONCURRENCY", defaults.max_concurrency),
            max_deliver: parse_or(env, "DISCORD_JOBS_MAX_DELIVER", defaults.max_deliver),
            ack_wait_secs: parse_or(env, "DISCORD_JOBS_ACK_WAIT_SECS", defaults.ack_wait_secs),
            duplicate_window_secs: defaults.duplicate_window_secs,
        }
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n;
        self
    }
}

fn parse_or<E: ReadEnv, T: std::str::FromStr>(env: &E, key: &str, default: T) -> T {
    env.var(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct InMemoryEnv(HashMap<&'static str, &'static str>);

    impl InMemoryEnv {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self(pairs.iter().cloned().collect())
        }
    }

    impl ReadEnv for InMemoryEnv {
        fn var(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn test_nats_from_env_defaults() {
        let cfg = NatsConfig::from_env(&InMemoryEnv::new(&[]));
        assert_eq!(cfg.servers, vec!["localhost:4222"]);
        assert_eq!(cfg.prefix, "prod");
        assert!(cfg.username.is_none());
    }

    #[test]
    fn test_nats_from_env_full() {
        let env = InMemoryEnv::new(&[
            ("NATS_URL", "n1:4222,n2:4222"),
            ("DISCORD_PREFIX", "staging"),
            ("NATS_USER", "bot"),
            ("NATS_PASSWORD", "pw"),
        ]);
        let cfg = NatsConfig::from_env(&env);
        assert_eq!(cfg.servers, vec!["n1:4222", "n2:4222"]);
        assert_eq!(cfg.prefix, "staging");
        assert_eq!(cfg.username.as_deref(), Some("bot"));
        assert_eq!(cfg.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_queue_from_env_overrides_and_ignores_garbage() {
        let env = InMemoryEnv::new(&[
            ("DISCORD_WORKER_CONCURRENCY", "16"),
            ("DISCORD_JOBS_MAX_DELIVER", "not-a-number"),
            ("DISCORD_JOBS_STREAM", "JOBS_TEST"),
        ]);
        let q = QueueConfig::from_env(&env);
        assert_eq!(q.max_concurrency, 16);
        assert_eq!(q.max_deliver, 3);
        assert_eq!(q.stream, "JOBS_TEST");
        assert_eq!(q.consumer, "discord-workers");
    }

    #[test]
    fn test_default_nats_config() {
        let cfg = NatsConfig::default();
        assert_eq!(cfg.servers, vec!["localhost:4222"]);
        assert_eq!(cfg.prefix, "prod");
        assert!(cfg.credentials_file.is_none());
    }

    #[test]
    fn test_from_url_splits_and_trims() {
        let cfg = NatsConfig::from_url("n1:4222 , n2:4222,", "dev");
        assert_eq!(cfg.servers, vec!["n1:4222", "n2:4222"]);
        assert_eq!(cfg.prefix, "dev");
    }

    #[test]
    fn test_with_credentials_and_auth() {
        let cfg = NatsConfig::from_url("localhost:4222", "test")
            .with_credentials("/path/to/creds")
            .with_auth("alice", "secret");
        assert_eq!(cfg.credentials_file.as_deref(), Some("/path/to/creds"));
        assert_eq!(cfg.username.as_deref(), Some("alice"));
        assert_eq!(cfg.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_nats_config_default_prefix_on_deserialization() {
        let cfg: NatsConfig = serde_json::from_str(r#"{"servers":["localhost:4222"]}"#).unwrap();
        assert_eq!(cfg.prefix, "prod");
    }

    #[test]
    fn test_queue_defaults() {
        let q = QueueConfig::default();
        assert_eq!(q.stream, "DISCORD_JOBS");
        assert_eq!(q.consumer, "discord-workers");
        assert_eq!(q.max_concurrency, 8);
        assert_eq!(q.max_deliver, 3);
        assert_eq!(q.ack_wait(), Duration::from_secs(30));
        assert_eq!(q.duplicate_window(), Duration::from_secs(120));
    }

    #[test]
    fn test_queue_partial_deserialization_fills_defaults() {
        let q: QueueConfig = serde_json::from_str(r#"{"max_concurrency": 2}"#).unwrap();
        assert_eq!(q.max_concurrency, 2);
        assert_eq!(q, QueueConfig::default().with_max_concurrency(2));
    }
}
