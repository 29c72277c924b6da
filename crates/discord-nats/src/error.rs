//! Error types for discord-nats

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for discord-nats operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("JetStream error: {0}")]
    JetStream(String),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Failure to hand a job to the broker.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The broker did not durably accept the job. Not retried here.
    #[error("Queue unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to encode job: {0}")]
    Encode(#[from] serde_json::Error),
}
