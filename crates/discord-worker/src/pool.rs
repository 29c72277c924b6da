//! Worker pool: resolve, build the proxy, run the handler, contain failures.

use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_nats::jetstream;
use discord_interactions::{InteractionApi, RemoteInteraction};
use discord_nats::QueueConfig;
use discord_types::{CommandJob, ReplyPayload};
use futures::FutureExt;
use tracing::{error, info, info_span, warn, Instrument};

use crate::context::CommandContext;
use crate::error::WorkerError;
use crate::registry::CommandRegistry;

const FAILURE_NOTICE: &str = "Something went wrong while running this command. Please try again.";

/// How a job ended. Every outcome is acked; none is retried by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    CommandNotFound,
    HandlerFailed,
    Panicked,
}

/// Counters exposed on the health endpoint.
#[derive(Debug, Default)]
pub struct PoolStats {
    in_flight: AtomicUsize,
    processed: AtomicU64,
    failed: AtomicU64,
    unknown_commands: AtomicU64,
}

impl PoolStats {
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Handler errors and panics.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn unknown_commands(&self) -> u64 {
        self.unknown_commands.load(Ordering::Relaxed)
    }

    fn begin(&self) -> InFlight<'_> {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlight(self)
    }

    fn record(&self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Completed => {}
            JobOutcome::CommandNotFound => {
                self.unknown_commands.fetch_add(1, Ordering::Relaxed);
            }
            JobOutcome::HandlerFailed | JobOutcome::Panicked => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

struct InFlight<'a>(&'a PoolStats);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.0.processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Cheap to clone; every clone shares the registry, API client and counters.
#[derive(Clone)]
pub struct WorkerPool {
    registry: Arc<CommandRegistry>,
    api: Arc<dyn InteractionApi>,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    pub fn new(registry: Arc<CommandRegistry>, api: Arc<dyn InteractionApi>) -> Self {
        Self {
            registry,
            api,
            stats: Arc::new(PoolStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<PoolStats> {
        self.stats.clone()
    }

    /// Run one job to completion. Never fails and never panics: handler
    /// errors and panics become a single best-effort notice to the user.
    pub async fn dispatch(&self, job: CommandJob) -> JobOutcome {
        let span = info_span!(
            "job",
            command = %job.command,
            user_id = %job.user_id,
            guild_id = job.guild_id.as_deref().unwrap_or("-"),
        );
        let outcome = self.dispatch_inner(job).instrument(span).await;
        self.stats.record(outcome);
        outcome
    }

    async fn dispatch_inner(&self, job: CommandJob) -> JobOutcome {
        let _in_flight = self.stats.begin();
        let ephemeral = job.ephemeral;
        let interaction = RemoteInteraction::from_job(job, self.api.clone());

        let handler = match self.registry.resolve(interaction.command()) {
            Ok(handler) => handler,
            Err(e) => {
                warn!(error = %e, "Dropping job");
                let mut ctx = CommandContext::new(interaction);
                let notice = format!("Unknown command `/{}`.", ctx.command());
                ctx.notify(&ReplyPayload::text(notice).ephemeral(ephemeral))
                    .await;
                return JobOutcome::CommandNotFound;
            }
        };

        let mut ctx = CommandContext::new(interaction);
        let result = AssertUnwindSafe(handler.execute(&mut ctx))
            .catch_unwind()
            .await;

        let (outcome, reason) = match result {
            Ok(Ok(())) => {
                info!(state = %ctx.state(), "Command completed");
                return JobOutcome::Completed;
            }
            Ok(Err(e)) => (JobOutcome::HandlerFailed, format!("{e:#}")),
            Err(panic) => (JobOutcome::Panicked, panic_message(panic.as_ref())),
        };

        let failure = WorkerError::HandlerFailure {
            command: ctx.command().to_string(),
            reason,
        };
        error!(error = %failure, ?outcome, "Command failed");
        ctx.notify(&ReplyPayload::text(FAILURE_NOTICE).ephemeral(ephemeral))
            .await;
        outcome
    }

    /// Pull jobs until `shutdown` resolves, then wait for in-flight jobs.
    pub async fn run(
        self,
        jetstream: &jetstream::Context,
        prefix: &str,
        queue: &QueueConfig,
        shutdown: impl Future<Output = ()>,
    ) -> discord_nats::Result<()> {
        let pool = self;
        discord_nats::consume(jetstream, prefix, queue, shutdown, move |job| {
            let pool = pool.clone();
            async move {
                pool.dispatch(job).await;
                Ok::<_, Infallible>(())
            }
        })
        .await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod pool_tests;
