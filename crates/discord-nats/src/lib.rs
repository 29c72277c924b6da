//! NATS JetStream job queue for Discord command jobs
//!
//! The receiver publishes [`CommandJob`](discord_types::CommandJob)s with a
//! [`JobQueue`]; workers pull them back with [`consume`] or [`run_bounded`].

pub mod config;
pub mod consumer;
pub mod env;
pub mod error;
pub mod nats;
pub mod queue;
pub mod stream;
pub mod subjects;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use config::{NatsConfig, QueueConfig};
pub use consumer::{consume, run_bounded, Delivery};
pub use env::{ReadEnv, SystemEnv};
pub use error::{Error, QueueError, Result};
pub use nats::connect;
pub use queue::{JetStreamJobQueue, JobQueue};
