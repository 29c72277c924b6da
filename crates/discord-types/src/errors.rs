//! Discord JSON error codes met while answering interactions.

use serde::{Deserialize, Serialize};

/// Discord-specific error code (subset relevant to interaction replies).
///
/// Maps the actionable Discord JSON error codes
/// (<https://discord.com/developers/docs/topics/opcodes-and-status-codes#json>)
/// to named variants; everything else falls through to [`DiscordErrorCode::Unknown`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscordErrorCode {
    // ── Token lifetime ─────────────────────────────────────────────────────────
    /// 10062: Unknown interaction (token expired or never acknowledged in time).
    UnknownInteraction,
    /// 10015: Unknown webhook (interaction webhook gone).
    UnknownWebhook,
    /// 50027: Invalid webhook token.
    InvalidWebhookToken,

    // ── Reply state ────────────────────────────────────────────────────────────
    /// 40060: Interaction has already been acknowledged.
    AlreadyAcknowledged,
    /// 10008: Unknown message (original response missing or deleted).
    UnknownMessage,

    // ── Permission errors ──────────────────────────────────────────────────────
    /// 50001: Missing access.
    MissingAccess,
    /// 50013: Missing permissions.
    MissingPermissions,

    // ── Payload errors ─────────────────────────────────────────────────────────
    /// 50006: Cannot send an empty message.
    CannotSendEmptyMessage,
    /// 50035: Invalid form body (validation failed).
    InvalidFormBody,

    // ── Transient ──────────────────────────────────────────────────────────────
    /// HTTP 429: Global or per-route rate limit.
    RateLimited,
    /// 130000: API resource overloaded.
    ApiOverloaded,

    /// Any Discord JSON error code not listed above.
    Unknown,
}

impl DiscordErrorCode {
    /// Derive the code from a raw Discord JSON error code integer.
    pub fn from_raw(code: u32) -> Self {
        match code {
            10008 => Self::UnknownMessage,
            10015 => Self::UnknownWebhook,
            10062 => Self::UnknownInteraction,
            40060 => Self::AlreadyAcknowledged,
            50001 => Self::MissingAccess,
            50006 => Self::CannotSendEmptyMessage,
            50013 => Self::MissingPermissions,
            50027 => Self::InvalidWebhookToken,
            50035 => Self::InvalidFormBody,
            130000 => Self::ApiOverloaded,
            _ => Self::Unknown,
        }
    }

    /// Classify from the HTTP status and the optional JSON `code` of the body.
    pub fn from_response(status: u16, code: Option<u32>) -> Self {
        match code {
            Some(code) => Self::from_raw(code),
            None if status == 429 => Self::RateLimited,
            None => Self::Unknown,
        }
    }

    /// The interaction token can no longer be used for any call.
    pub fn means_token_expired(&self) -> bool {
        matches!(
            self,
            Self::UnknownInteraction | Self::UnknownWebhook | Self::InvalidWebhookToken
        )
    }

    /// True if the operation should **not** be retried (the error is permanent).
    pub fn is_permanent(&self) -> bool {
        self.means_token_expired()
            || matches!(
                self,
                Self::AlreadyAcknowledged
                    | Self::UnknownMessage
                    | Self::MissingAccess
                    | Self::MissingPermissions
                    | Self::CannotSendEmptyMessage
                    | Self::InvalidFormBody
            )
    }

    /// True if retrying the operation after a delay is worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ApiOverloaded)
    }
}
