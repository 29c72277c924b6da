//! In-memory queue doubles for unit testing without a real NATS connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use discord_types::CommandJob;

use crate::consumer::Delivery;
use crate::error::QueueError;
use crate::queue::JobQueue;

// ── Producer ──────────────────────────────────────────────────────────────────

/// Records every enqueued job. Flip [`MockJobQueue::set_unavailable`] to make
/// `enqueue` fail the way a broker outage would.
#[derive(Clone, Default)]
pub struct MockJobQueue {
    jobs: Arc<Mutex<Vec<CommandJob>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of accepted jobs in enqueue order.
    pub fn enqueued(&self) -> Vec<CommandJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().unwrap().is_empty()
    }
}

impl JobQueue for MockJobQueue {
    async fn enqueue(&self, job: &CommandJob) -> Result<(), QueueError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(QueueError::Unavailable("mock broker down".to_string()));
        }
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }
}

// ── Consumer ──────────────────────────────────────────────────────────────────

/// How a delivery was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    Acked,
    Naked,
    Terminated,
}

/// Shared record of settled deliveries, keyed by a label per delivery.
#[derive(Clone, Default)]
pub struct AckLog {
    entries: Arc<Mutex<Vec<(String, AckOutcome)>>>,
}

impl AckLog {
    pub fn entries(&self) -> Vec<(String, AckOutcome)> {
        self.entries.lock().unwrap().clone()
    }

    /// Last outcome recorded for `label`.
    pub fn outcome_of(&self, label: &str) -> Option<AckOutcome> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(l, _)| l == label)
            .map(|(_, o)| *o)
    }

    pub fn count(&self, outcome: AckOutcome) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, o)| *o == outcome)
            .count()
    }

    fn record(&self, label: &str, outcome: AckOutcome) {
        self.entries
            .lock()
            .unwrap()
            .push((label.to_string(), outcome));
    }
}

/// A delivery whose ack/nak/term land in an [`AckLog`].
pub struct MockDelivery {
    label: String,
    payload: Vec<u8>,
    log: AckLog,
}

impl MockDelivery {
    /// Serialize `job`; labelled by its idempotency key.
    pub fn job(job: &CommandJob, log: &AckLog) -> Self {
        Self {
            label: job.idempotency_key().to_string(),
            payload: serde_json::to_vec(job).unwrap(),
            log: log.clone(),
        }
    }

    pub fn raw(label: impl Into<String>, payload: &[u8], log: &AckLog) -> Self {
        Self {
            label: label.into(),
            payload: payload.to_vec(),
            log: log.clone(),
        }
    }
}

impl Delivery for MockDelivery {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    async fn ack(&self) -> Result<(), async_nats::Error> {
        self.log.record(&self.label, AckOutcome::Acked);
        Ok(())
    }

    async fn nak(&self) -> Result<(), async_nats::Error> {
        self.log.record(&self.label, AckOutcome::Naked);
        Ok(())
    }

    async fn term(&self) -> Result<(), async_nats::Error> {
        self.log.record(&self.label, AckOutcome::Terminated);
        Ok(())
    }
}
