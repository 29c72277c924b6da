//! Acknowledgment state of one interaction within one job execution

use std::fmt;

use crate::error::InteractionError;

/// The interaction's reply state; it only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyState {
    /// Nothing sent yet; the initial response is still owed.
    #[default]
    Unacknowledged,
    /// "Thinking…" placeholder shown.
    Deferred,
    /// Content shown.
    Replied,
}

impl ReplyState {
    pub fn is_acknowledged(self) -> bool {
        !matches!(self, Self::Unacknowledged)
    }

    /// Initial state for a job; the receiver may already have deferred.
    pub fn from_acknowledged(acknowledged: bool) -> Self {
        if acknowledged {
            Self::Deferred
        } else {
            Self::Unacknowledged
        }
    }

    /// Gate for `reply` and `defer_reply`.
    pub fn ensure_unacknowledged(self) -> Result<(), InteractionError> {
        if self.is_acknowledged() {
            Err(InteractionError::AlreadyAcknowledged)
        } else {
            Ok(())
        }
    }

    /// Gate for `edit_reply` and `follow_up`.
    pub fn ensure_acknowledged(self) -> Result<(), InteractionError> {
        if self.is_acknowledged() {
            Ok(())
        } else {
            Err(InteractionError::NotYetAcknowledged)
        }
    }
}

impl fmt::Display for ReplyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unacknowledged => "unacknowledged",
            Self::Deferred => "deferred",
            Self::Replied => "replied",
        })
    }
}
