//! Executes queued slash-command jobs against registered handlers.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod health;
pub mod pool;
pub mod registry;

pub use context::CommandContext;
pub use error::WorkerError;
pub use pool::{JobOutcome, PoolStats, WorkerPool};
pub use registry::{CommandHandler, CommandRegistry};
