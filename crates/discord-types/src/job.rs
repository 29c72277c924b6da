//! The job payload handed from the gateway receiver to workers

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::options::{OptionValue, OptionsSnapshot};

/// How long Discord keeps an interaction token valid after the interaction fires.
pub const INTERACTION_TOKEN_TTL_SECS: i64 = 15 * 60;

/// One slash-command invocation queued for a worker.
///
/// Everything a worker needs to act on the interaction travels in here; the
/// worker never calls back into the receiving process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandJob {
    /// Name of the registered handler to run
    pub command: String,
    pub app_id: String,
    /// Interaction token (opaque, time-limited)
    pub token: String,
    pub channel_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub options_snap: OptionsSnapshot,
    /// Needed for the initial-response callback endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<String>,
    /// When the receiver saw the interaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    /// True when the receiver already deferred the interaction before enqueueing.
    /// Absent on the wire means deferred.
    #[serde(default = "default_acknowledged")]
    pub acknowledged: bool,
    /// Pipeline-generated notices are sent ephemeral when set
    #[serde(default)]
    pub ephemeral: bool,
}

fn default_acknowledged() -> bool {
    true
}

impl CommandJob {
    pub fn new(
        command: impl Into<String>,
        app_id: impl Into<String>,
        token: impl Into<String>,
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            app_id: app_id.into(),
            token: token.into(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            guild_id: None,
            options_snap: OptionsSnapshot::new(),
            interaction_id: None,
            issued_at: None,
            acknowledged: false,
            ephemeral: false,
        }
    }

    pub fn with_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options_snap.insert(name.into(), value);
        self
    }

    pub fn with_interaction_id(mut self, id: impl Into<String>) -> Self {
        self.interaction_id = Some(id.into());
        self
    }

    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    /// Mark the interaction as already deferred by the receiver.
    pub fn acknowledged(mut self) -> Self {
        self.acknowledged = true;
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Last instant the token is usable, if the receipt time is known.
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
            .map(|t| t + Duration::seconds(INTERACTION_TOKEN_TTL_SECS))
    }

    /// Without `issued_at` expiry can only be learned from the platform, so this
    /// returns false.
    pub fn is_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at().is_some_and(|exp| now >= exp)
    }

    /// Broker de-duplication key: one job per interaction.
    pub fn idempotency_key(&self) -> &str {
        self.interaction_id.as_deref().unwrap_or(&self.token)
    }
}
