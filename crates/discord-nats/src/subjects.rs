//! NATS subject patterns for the job queue
//!
//! Subject pattern: `discord.{prefix}.jobs.{kind}`
//!
//! - `discord.{prefix}.jobs.command`: slash-command jobs

/// Subject slash-command jobs are published on
pub fn command_jobs(prefix: &str) -> String {
    format!("discord.{}.jobs.command", prefix)
}

/// Wildcard the job stream captures
pub fn all_jobs(prefix: &str) -> String {
    format!("discord.{}.jobs.>", prefix)
}
