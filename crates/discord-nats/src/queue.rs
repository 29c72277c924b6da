//! Producer side of the job queue

use std::future::Future;

use async_nats::header::NATS_MESSAGE_ID;
use async_nats::jetstream;
use async_nats::HeaderMap;
use discord_types::CommandJob;
use tracing::{debug, info};

use crate::error::QueueError;
use crate::subjects;

/// Durable hand-off of a job to the worker pool.
pub trait JobQueue: Send + Sync {
    /// Resolves once the broker has durably accepted the job.
    fn enqueue(&self, job: &CommandJob) -> impl Future<Output = Result<(), QueueError>> + Send;
}

/// [`JobQueue`] backed by a JetStream work-queue stream.
#[derive(Clone)]
pub struct JetStreamJobQueue {
    jetstream: jetstream::Context,
    subject: String,
}

impl JetStreamJobQueue {
    pub fn new(jetstream: jetstream::Context, prefix: &str) -> Self {
        Self {
            jetstream,
            subject: subjects::command_jobs(prefix),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl JobQueue for JetStreamJobQueue {
    async fn enqueue(&self, job: &CommandJob) -> Result<(), QueueError> {
        let payload = serde_json::to_vec(job)?;

        let mut headers = HeaderMap::new();
        headers.insert(NATS_MESSAGE_ID, job.idempotency_key());

        let ack = self
            .jetstream
            .publish_with_headers(self.subject.clone(), headers, payload.into())
            .await
            .map_err(|e| QueueError::Unavailable(e.to_string()))?
            .await
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;

        if ack.duplicate {
            debug!(command = %job.command, seq = ack.sequence, "Job already enqueued, broker dropped duplicate");
        } else {
            info!(command = %job.command, seq = ack.sequence, "Job enqueued");
        }
        Ok(())
    }
}
