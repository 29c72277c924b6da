//! JetStream provisioning for the job stream and its worker consumer.

use async_nats::jetstream::consumer::{pull, AckPolicy, Consumer, DeliverPolicy};
use async_nats::jetstream::stream::{Config as StreamConfig, RetentionPolicy, StorageType, Stream};
use async_nats::jetstream::{self, context::CreateStreamError};

use crate::config::QueueConfig;
use crate::error::{Error, Result};
use crate::subjects;

/// Ensure the job stream exists.
///
/// Idempotent, safe to call on every startup from both the receiver and the
/// workers. Work-queue retention removes a job once a worker acks it; the
/// duplicate window lets the broker drop re-enqueues of the same interaction.
pub async fn ensure_stream(
    jetstream: &jetstream::Context,
    prefix: &str,
    queue: &QueueConfig,
) -> std::result::Result<Stream, CreateStreamError> {
    let config = StreamConfig {
        name: queue.stream.clone(),
        subjects: vec![subjects::all_jobs(prefix)],
        retention: RetentionPolicy::WorkQueue,
        storage: StorageType::File,
        duplicate_window: queue.duplicate_window(),
        ..Default::default()
    };

    jetstream.get_or_create_stream(config).await
}

/// Durable pull consumer shared by all worker processes.
pub async fn ensure_consumer(stream: &Stream, queue: &QueueConfig) -> Result<Consumer<pull::Config>> {
    stream
        .get_or_create_consumer(
            &queue.consumer,
            pull::Config {
                durable_name: Some(queue.consumer.clone()),
                ack_policy: AckPolicy::Explicit,
                deliver_policy: DeliverPolicy::All,
                max_deliver: queue.max_deliver,
                ack_wait: queue.ack_wait(),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| Error::JetStream(e.to_string()))
}
