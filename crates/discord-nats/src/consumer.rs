//! Consumer side of the job queue: a bounded pull loop.
//!
//! Each delivered job is decoded and handed to the handler on its own task.
//! A semaphore caps how many run at once, and a permit is taken before the
//! next message is read from the stream.
//!
//! [`consume`] pulls from JetStream in batches of at most `max_concurrency`
//! messages, so a saturated worker holds at most one batch beyond the jobs it
//! is running. Buffered jobs that are never handed out (on shutdown, say) are
//! redelivered once their `ack_wait` expires.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use async_nats::jetstream::{self, AckKind};
use discord_types::CommandJob;
use futures::{Stream, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::QueueConfig;
use crate::error::{Error, Result};
use crate::stream::{ensure_consumer, ensure_stream};

/// A message pulled from the queue that still has to be settled.
pub trait Delivery: Send + 'static {
    fn payload(&self) -> &[u8];

    /// Done; remove from the queue.
    fn ack(&self) -> impl Future<Output = std::result::Result<(), async_nats::Error>> + Send;

    /// Redeliver per broker policy.
    fn nak(&self) -> impl Future<Output = std::result::Result<(), async_nats::Error>> + Send;

    /// Never redeliver.
    fn term(&self) -> impl Future<Output = std::result::Result<(), async_nats::Error>> + Send;
}

impl Delivery for jetstream::Message {
    fn payload(&self) -> &[u8] {
        &self.message.payload
    }

    async fn ack(&self) -> std::result::Result<(), async_nats::Error> {
        jetstream::Message::ack(self).await
    }

    async fn nak(&self) -> std::result::Result<(), async_nats::Error> {
        self.ack_with(AckKind::Nak(None)).await
    }

    async fn term(&self) -> std::result::Result<(), async_nats::Error> {
        self.ack_with(AckKind::Term).await
    }
}

/// Pull jobs from `deliveries` until it ends or `shutdown` resolves, running
/// at most `max_concurrency` handlers at once.
///
/// `Ok` from the handler acks the job; `Err` naks it for redelivery.
/// Payloads that do not decode as a [`CommandJob`] are terminated.
/// In-flight handlers are awaited before this returns.
pub async fn run_bounded<S, D, E, H, Fut, HE>(
    mut deliveries: S,
    max_concurrency: usize,
    shutdown: impl Future<Output = ()>,
    handler: H,
) where
    S: Stream<Item = std::result::Result<D, E>> + Unpin,
    D: Delivery,
    E: Display,
    H: Fn(CommandJob) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = std::result::Result<(), HE>> + Send + 'static,
    HE: Display + Send + 'static,
{
    let max_concurrency = max_concurrency.max(1);
    let permits = Arc::new(Semaphore::new(max_concurrency));
    tokio::pin!(shutdown);

    loop {
        let permit = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            permit = permits.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let next = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            next = deliveries.next() => next,
        };

        let delivery = match next {
            Some(Ok(delivery)) => delivery,
            Some(Err(e)) => {
                error!(error = %e, "Error receiving job");
                continue;
            }
            None => break,
        };

        let job: CommandJob = match serde_json::from_slice(delivery.payload()) {
            Ok(job) => job,
            Err(e) => {
                warn!(error = %e, "Undecodable job payload; terminating");
                if let Err(e) = delivery.term().await {
                    warn!(error = %e, "Failed to terminate job");
                }
                continue;
            }
        };

        debug!(command = %job.command, "Received job");
        let handler = handler.clone();
        tokio::spawn(async move {
            let _permit = permit;
            match handler(job).await {
                Ok(()) => {
                    if let Err(e) = delivery.ack().await {
                        warn!(error = %e, "Failed to ack job");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Job failed; requesting redelivery");
                    if let Err(e) = delivery.nak().await {
                        warn!(error = %e, "Failed to nak job");
                    }
                }
            }
        });
    }

    info!("Job intake stopped, draining in-flight jobs");
    // Every permit back means every spawned handler has finished.
    let _ = permits.acquire_many(max_concurrency as u32).await;
    info!("Drained");
}

/// Provision the stream and consumer, then run [`run_bounded`] against it.
pub async fn consume<H, Fut, HE>(
    jetstream: &jetstream::Context,
    prefix: &str,
    queue: &QueueConfig,
    shutdown: impl Future<Output = ()>,
    handler: H,
) -> Result<()>
where
    H: Fn(CommandJob) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = std::result::Result<(), HE>> + Send + 'static,
    HE: Display + Send + 'static,
{
    let stream = ensure_stream(jetstream, prefix, queue)
        .await
        .map_err(|e| Error::JetStream(e.to_string()))?;
    let consumer = ensure_consumer(&stream, queue).await?;
    let messages = consumer
        .stream()
        .max_messages_per_batch(queue.max_concurrency.max(1))
        .messages()
        .await
        .map_err(|e| Error::JetStream(e.to_string()))?;

    info!(
        stream = %queue.stream,
        consumer = %queue.consumer,
        max_concurrency = queue.max_concurrency,
        "Worker started, pulling jobs"
    );

    run_bounded(messages, queue.max_concurrency, shutdown, handler).await;
    Ok(())
}
