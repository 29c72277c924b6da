//! Receiver: turns a slash command into a queued job.
//!
//! The interaction is deferred first (Discord wants an acknowledgment within
//! three seconds), the options are snapshotted, and the job is handed to the
//! queue. Workers take it from there.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use discord_interactions::{notify, Interaction, InteractionError};
use discord_nats::JobQueue;
use discord_types::{CommandJob, OptionValue, OptionsSnapshot, ReplyPayload};
use serenity::model::application::{CommandInteraction, ResolvedOption, ResolvedValue};
use tracing::{debug, error, info, warn};

const UNAVAILABLE_NOTICE: &str = "Commands are temporarily unavailable. Please try again in a moment.";

/// Behaviour switches taken from the bot config.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverSettings {
    pub defer_before_enqueue: bool,
    pub ephemeral_notices: bool,
}

/// What happened to one incoming command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Enqueued,
    /// The interaction was already dead when we tried to defer it.
    Dropped,
    /// The queue refused the job; the user was told.
    Unavailable,
}

/// Counters exposed on the health endpoint.
#[derive(Debug, Default)]
pub struct ReceiverStats {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    enqueue_failures: AtomicU64,
}

impl ReceiverStats {
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn enqueue_failures(&self) -> u64 {
        self.enqueue_failures.load(Ordering::Relaxed)
    }

    fn record(&self, outcome: SubmitOutcome) {
        let counter = match outcome {
            SubmitOutcome::Enqueued => &self.enqueued,
            SubmitOutcome::Dropped => &self.dropped,
            SubmitOutcome::Unavailable => &self.enqueue_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct Receiver<Q> {
    queue: Q,
    settings: ReceiverSettings,
    stats: Arc<ReceiverStats>,
}

impl<Q: JobQueue> Receiver<Q> {
    pub fn new(queue: Q, settings: ReceiverSettings) -> Self {
        Self {
            queue,
            settings,
            stats: Default::default(),
        }
    }

    pub fn settings(&self) -> ReceiverSettings {
        self.settings
    }

    pub fn stats(&self) -> Arc<ReceiverStats> {
        self.stats.clone()
    }

    /// Defer (when configured), then enqueue `job`. The job's `acknowledged`
    /// flag reflects what actually happened to `target`.
    pub async fn submit<I>(&self, target: &mut I, mut job: CommandJob) -> SubmitOutcome
    where
        I: Interaction + ?Sized,
    {
        let outcome = self.submit_inner(target, &mut job).await;
        self.stats.record(outcome);
        outcome
    }

    async fn submit_inner<I>(&self, target: &mut I, job: &mut CommandJob) -> SubmitOutcome
    where
        I: Interaction + ?Sized,
    {
        if self.settings.defer_before_enqueue && !target.is_acknowledged() {
            match target.defer_reply().await {
                Ok(()) => debug!(command = %job.command, "Interaction deferred"),
                Err(InteractionError::TokenExpired) => {
                    warn!(command = %job.command, "Interaction expired before it could be deferred; dropping");
                    return SubmitOutcome::Dropped;
                }
                Err(e) => {
                    warn!(command = %job.command, error = %e, "Failed to defer interaction; queueing unacknowledged");
                }
            }
        }
        job.acknowledged = target.is_acknowledged();

        match self.queue.enqueue(job).await {
            Ok(()) => {
                info!(command = %job.command, acknowledged = job.acknowledged, "Command queued");
                SubmitOutcome::Enqueued
            }
            Err(e) => {
                error!(command = %job.command, error = %e, "Failed to queue command");
                let notice = ReplyPayload::text(UNAVAILABLE_NOTICE).ephemeral(self.settings.ephemeral_notices);
                notify(target, &notice).await;
                SubmitOutcome::Unavailable
            }
        }
    }
}

/// Build the job for a gateway command interaction.
pub fn job_from_command(cmd: &CommandInteraction, ephemeral: bool) -> CommandJob {
    let mut job = CommandJob::new(
        cmd.data.name.clone(),
        cmd.application_id.to_string(),
        cmd.token.clone(),
        cmd.channel_id.to_string(),
        cmd.user.id.to_string(),
    )
    .with_interaction_id(cmd.id.to_string())
    .issued_at(Utc::now())
    .ephemeral(ephemeral);

    if let Some(guild_id) = cmd.guild_id {
        job = job.with_guild(guild_id.to_string());
    }
    job.options_snap = snapshot_options(&cmd.data.options());
    job
}

/// Snapshot resolved options; values a worker can't use are left out.
pub fn snapshot_options(options: &[ResolvedOption<'_>]) -> OptionsSnapshot {
    options
        .iter()
        .filter_map(|opt| match option_value(&opt.value) {
            Some(value) => Some((opt.name.to_string(), value)),
            None => {
                debug!(option = opt.name, "Skipping unsupported option value");
                None
            }
        })
        .collect()
}

pub(crate) fn option_value(value: &ResolvedValue<'_>) -> Option<OptionValue> {
    let value = match value {
        ResolvedValue::Boolean(b) => OptionValue::Boolean(*b),
        ResolvedValue::Integer(i) => OptionValue::Integer(*i),
        ResolvedValue::Number(n) => OptionValue::Number(*n),
        ResolvedValue::String(s) => OptionValue::String(s.to_string()),
        ResolvedValue::User(u, _) => OptionValue::User(u.id.to_string()),
        ResolvedValue::Channel(c) => OptionValue::Channel(c.id.to_string()),
        ResolvedValue::Role(r) => OptionValue::Role(r.id.to_string()),
        ResolvedValue::Attachment(a) => OptionValue::Attachment(a.id.to_string()),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod receiver_tests;
