//! Error types for discord-interactions

use discord_types::{DiscordErrorCode, OptionKind};
use thiserror::Error;

/// Failure of a Discord REST call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Client-side failure reported by another Discord client library.
    #[error("Discord client error: {0}")]
    Client(String),

    /// Non-success status; `code` is Discord's JSON error code when the body had one.
    #[error("Discord API returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<u32>,
        message: String,
    },
}

impl ApiError {
    pub fn error_code(&self) -> Option<DiscordErrorCode> {
        match self {
            Self::Status { status, code, .. } => Some(DiscordErrorCode::from_response(*status, *code)),
            Self::Transport(_) | Self::Client(_) => None,
        }
    }
}

/// Everything a reply or option operation can fail with.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("option '{name}' not found")]
    OptionNotFound { name: String },

    #[error("option '{name}' is {actual}, expected {expected}")]
    OptionKindMismatch {
        name: String,
        expected: OptionKind,
        actual: OptionKind,
    },

    #[error("interaction already acknowledged")]
    AlreadyAcknowledged,

    #[error("interaction not yet acknowledged")]
    NotYetAcknowledged,

    /// Terminal: no further call on this token can succeed.
    #[error("interaction token expired")]
    TokenExpired,

    #[error("job carries no interaction id; initial response impossible")]
    MissingInteractionId,

    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for InteractionError {
    fn from(err: ApiError) -> Self {
        match err.error_code() {
            Some(code) if code.means_token_expired() => Self::TokenExpired,
            _ => Self::Api(err),
        }
    }
}

impl InteractionError {
    /// Expected conditions, logged without alarm.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }
}
