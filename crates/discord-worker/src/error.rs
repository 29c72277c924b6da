//! Error types for discord-worker

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("command '{0}' registered twice")]
    DuplicateCommand(String),

    #[error("command '{0}' not found")]
    CommandNotFound(String),

    /// Handler returned an error or panicked.
    #[error("command '{command}' failed: {reason}")]
    HandlerFailure { command: String, reason: String },
}
