use std::collections::HashMap;
use std::io::Write;

use discord_interactions::DEFAULT_API_BASE;
use discord_nats::ReadEnv;
use tempfile::NamedTempFile;

use crate::config::Config;

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

fn write_toml(content: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f
}

// ── from_file ─────────────────────────────────────────────────────────────────

#[test]
fn test_from_file_full() {
    let toml = r#"
health_port = 9000

[nats]
servers = ["nats://n1:4222", "nats://n2:4222"]
prefix = "staging"

[queue]
stream = "JOBS"
consumer = "workers-a"
max_concurrency = 4
max_deliver = 5
ack_wait_secs = 60

[discord]
api_base_url = "http://localhost:9999/api/v10"
"#;
    let f = write_toml(toml);
    let cfg = Config::from_file(f.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.nats.servers, vec!["nats://n1:4222", "nats://n2:4222"]);
    assert_eq!(cfg.nats.prefix, "staging");
    assert_eq!(cfg.queue.stream, "JOBS");
    assert_eq!(cfg.queue.consumer, "workers-a");
    assert_eq!(cfg.queue.max_concurrency, 4);
    assert_eq!(cfg.queue.max_deliver, 5);
    assert_eq!(cfg.queue.ack_wait_secs, 60);
    assert_eq!(cfg.queue.duplicate_window_secs, 120);
    assert_eq!(cfg.discord.api_base_url, "http://localhost:9999/api/v10");
    assert_eq!(cfg.health_port, 9000);
}

#[test]
fn test_from_file_minimal_uses_defaults() {
    let f = write_toml("[nats]\nservers = [\"localhost:4222\"]\n");
    let cfg = Config::from_file(f.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.nats.prefix, "prod");
    assert_eq!(cfg.queue.max_concurrency, 8);
    assert_eq!(cfg.discord.api_base_url, DEFAULT_API_BASE);
    assert_eq!(cfg.health_port, 3002);
}

#[test]
fn test_from_file_missing_file() {
    let err = Config::from_file("/nonexistent/discord-worker.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_from_file_invalid_toml() {
    let f = write_toml("[queue\nmax_concurrency = ");
    let err = Config::from_file(f.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

// ── from_env ──────────────────────────────────────────────────────────────────

#[test]
fn test_from_env_defaults() {
    let cfg = Config::from_env(&InMemoryEnv::new(&[]));
    assert_eq!(cfg.nats.servers, vec!["localhost:4222"]);
    assert_eq!(cfg.queue.consumer, "discord-workers");
    assert_eq!(cfg.discord.api_base_url, DEFAULT_API_BASE);
    assert_eq!(cfg.health_port, 3002);
}

#[test]
fn test_from_env_overrides() {
    let env = InMemoryEnv::new(&[
        ("NATS_URL", "nats://a:4222"),
        ("DISCORD_PREFIX", "dev"),
        ("DISCORD_WORKER_CONCURRENCY", "3"),
        ("DISCORD_API_BASE_URL", "http://mock/api"),
        ("HEALTH_CHECK_PORT", "4000"),
    ]);
    let cfg = Config::from_env(&env);
    assert_eq!(cfg.nats.servers, vec!["nats://a:4222"]);
    assert_eq!(cfg.nats.prefix, "dev");
    assert_eq!(cfg.queue.max_concurrency, 3);
    assert_eq!(cfg.discord.api_base_url, "http://mock/api");
    assert_eq!(cfg.health_port, 4000);
}

#[test]
fn test_from_env_bad_port_falls_back() {
    let cfg = Config::from_env(&InMemoryEnv::new(&[("HEALTH_CHECK_PORT", "http")]));
    assert_eq!(cfg.health_port, 3002);
}
