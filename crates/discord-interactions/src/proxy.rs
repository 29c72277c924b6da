//! Remote interaction proxy: an interaction rebuilt from a queued job.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use discord_types::{CommandJob, OptionKind, OptionValue, OptionsSnapshot, ReplyPayload};
use tracing::debug;

use crate::api::{InitialResponse, InteractionApi};
use crate::delivery::Interaction;
use crate::error::InteractionError;
use crate::state::ReplyState;

type Result<T> = std::result::Result<T, InteractionError>;

/// Per-job stand-in for the live interaction. Every outbound call is a direct
/// REST call keyed by the job's token; nothing is shared across jobs.
pub struct RemoteInteraction {
    job: CommandJob,
    state: ReplyState,
    /// Set once Discord has told us the token is dead.
    expired: bool,
    api: Arc<dyn InteractionApi>,
}

impl RemoteInteraction {
    pub fn from_job(job: CommandJob, api: Arc<dyn InteractionApi>) -> Self {
        let state = ReplyState::from_acknowledged(job.acknowledged);
        Self {
            job,
            state,
            expired: false,
            api,
        }
    }

    pub fn command(&self) -> &str {
        &self.job.command
    }

    pub fn app_id(&self) -> &str {
        &self.job.app_id
    }

    pub fn channel_id(&self) -> &str {
        &self.job.channel_id
    }

    pub fn user_id(&self) -> &str {
        &self.job.user_id
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.job.guild_id.as_deref()
    }

    pub fn job(&self) -> &CommandJob {
        &self.job
    }

    pub fn state(&self) -> ReplyState {
        self.state
    }

    pub fn options(&self) -> &OptionsSnapshot {
        &self.job.options_snap
    }

    // ── Options ──────────────────────────────────────────────────────────────

    pub fn get_option(&self, name: &str) -> Result<&OptionValue> {
        self.job
            .options_snap
            .get(name)
            .ok_or_else(|| InteractionError::OptionNotFound {
                name: name.to_string(),
            })
    }

    pub fn get_option_value(&self, name: &str, kind: OptionKind) -> Result<&OptionValue> {
        let value = self.get_option(name)?;
        if value.kind() == kind {
            Ok(value)
        } else {
            Err(InteractionError::OptionKindMismatch {
                name: name.to_string(),
                expected: kind,
                actual: value.kind(),
            })
        }
    }

    /// String-valued option; user, channel, role and attachment ids count too.
    pub fn option_str(&self, name: &str) -> Result<&str> {
        let value = self.get_option(name)?;
        value.as_str().ok_or_else(|| mismatch(name, OptionKind::String, value))
    }

    pub fn option_i64(&self, name: &str) -> Result<i64> {
        let value = self.get_option(name)?;
        value.as_i64().ok_or_else(|| mismatch(name, OptionKind::Integer, value))
    }

    pub fn option_f64(&self, name: &str) -> Result<f64> {
        let value = self.get_option(name)?;
        value.as_f64().ok_or_else(|| mismatch(name, OptionKind::Number, value))
    }

    pub fn option_bool(&self, name: &str) -> Result<bool> {
        let value = self.get_option(name)?;
        value.as_bool().ok_or_else(|| mismatch(name, OptionKind::Boolean, value))
    }

    // ── Replies ──────────────────────────────────────────────────────────────

    fn ensure_token_alive(&self) -> Result<()> {
        if self.expired || self.job.is_token_expired(Utc::now()) {
            Err(InteractionError::TokenExpired)
        } else {
            Ok(())
        }
    }

    fn interaction_id(&self) -> Result<&str> {
        self.job
            .interaction_id
            .as_deref()
            .ok_or(InteractionError::MissingInteractionId)
    }

    fn note_failure(&mut self, err: InteractionError) -> InteractionError {
        if matches!(err, InteractionError::TokenExpired) {
            self.expired = true;
        }
        err
    }

    /// Initial response. Only valid before any acknowledgment.
    pub async fn reply(&mut self, payload: &ReplyPayload) -> Result<()> {
        self.ensure_token_alive()?;
        self.state.ensure_unacknowledged()?;
        let interaction_id = self.interaction_id()?;

        let sent = self
            .api
            .create_response(interaction_id, &self.job.token, InitialResponse::Message(payload))
            .await;
        if let Err(e) = sent {
            return Err(self.note_failure(e.into()));
        }

        debug!(command = %self.job.command, "Replied");
        self.state = ReplyState::Replied;
        Ok(())
    }

    /// "Thinking…" acknowledgment. Only valid before any acknowledgment.
    pub async fn defer_reply(&mut self) -> Result<()> {
        self.ensure_token_alive()?;
        self.state.ensure_unacknowledged()?;
        let interaction_id = self.interaction_id()?;

        let defer = InitialResponse::Defer {
            ephemeral: self.job.ephemeral,
        };
        let sent = self
            .api
            .create_response(interaction_id, &self.job.token, defer)
            .await;
        if let Err(e) = sent {
            return Err(self.note_failure(e.into()));
        }

        debug!(command = %self.job.command, "Deferred");
        self.state = ReplyState::Deferred;
        Ok(())
    }

    /// Replace the original response (or the deferred placeholder).
    pub async fn edit_reply(&mut self, payload: &ReplyPayload) -> Result<()> {
        self.ensure_token_alive()?;
        self.state.ensure_acknowledged()?;

        let sent = self
            .api
            .edit_original(&self.job.app_id, &self.job.token, payload)
            .await;
        if let Err(e) = sent {
            return Err(self.note_failure(e.into()));
        }

        self.state = ReplyState::Replied;
        Ok(())
    }

    /// Additional message after the initial response. State is unchanged.
    pub async fn follow_up(&mut self, payload: &ReplyPayload) -> Result<()> {
        self.ensure_token_alive()?;
        self.state.ensure_acknowledged()?;

        let sent = self
            .api
            .create_followup(&self.job.app_id, &self.job.token, payload)
            .await;
        sent.map_err(|e| self.note_failure(e.into()))
    }
}

fn mismatch(name: &str, expected: OptionKind, actual: &OptionValue) -> InteractionError {
    InteractionError::OptionKindMismatch {
        name: name.to_string(),
        expected,
        actual: actual.kind(),
    }
}

#[async_trait]
impl Interaction for RemoteInteraction {
    fn is_acknowledged(&self) -> bool {
        self.state.is_acknowledged()
    }

    async fn reply(&mut self, payload: &ReplyPayload) -> Result<()> {
        RemoteInteraction::reply(self, payload).await
    }

    async fn edit_reply(&mut self, payload: &ReplyPayload) -> Result<()> {
        RemoteInteraction::edit_reply(self, payload).await
    }

    async fn follow_up(&mut self, payload: &ReplyPayload) -> Result<()> {
        RemoteInteraction::follow_up(self, payload).await
    }

    async fn defer_reply(&mut self) -> Result<()> {
        RemoteInteraction::defer_reply(self).await
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod proxy_tests;
