//! Reply delivery: choose the outbound call from the acknowledgment state and
//! never let a delivery failure escape.
//!
//! Both the gateway receiver (live interaction) and workers (remote
//! interaction) send through here. Each call makes exactly one attempt.

use std::fmt;

use async_trait::async_trait;
use discord_types::ReplyPayload;
use tracing::{debug, info, warn};

use crate::error::InteractionError;

/// Reply operations shared by live and remote interactions.
#[async_trait]
pub trait Interaction: Send {
    fn is_acknowledged(&self) -> bool;

    async fn reply(&mut self, payload: &ReplyPayload) -> Result<(), InteractionError>;

    async fn edit_reply(&mut self, payload: &ReplyPayload) -> Result<(), InteractionError>;

    async fn follow_up(&mut self, payload: &ReplyPayload) -> Result<(), InteractionError>;

    async fn defer_reply(&mut self) -> Result<(), InteractionError>;
}

/// Which call carried the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Reply,
    EditReply,
    FollowUp,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reply => "reply",
            Self::EditReply => "edit_reply",
            Self::FollowUp => "follow_up",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(DeliveryMode),
    /// Token dead; nothing can reach the user any more.
    Expired,
    /// Logged and dropped.
    Failed,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Primary response: `reply` if nothing was sent yet, otherwise replace the
/// placeholder or previous content with `edit_reply`.
pub async fn respond<I>(target: &mut I, payload: &ReplyPayload) -> DeliveryOutcome
where
    I: Interaction + ?Sized,
{
    let mode = if target.is_acknowledged() {
        DeliveryMode::EditReply
    } else {
        DeliveryMode::Reply
    };
    deliver(target, mode, payload).await
}

/// Additional notice: `follow_up` once acknowledged, `reply` before that.
pub async fn notify<I>(target: &mut I, payload: &ReplyPayload) -> DeliveryOutcome
where
    I: Interaction + ?Sized,
{
    let mode = if target.is_acknowledged() {
        DeliveryMode::FollowUp
    } else {
        DeliveryMode::Reply
    };
    deliver(target, mode, payload).await
}

async fn deliver<I>(target: &mut I, mode: DeliveryMode, payload: &ReplyPayload) -> DeliveryOutcome
where
    I: Interaction + ?Sized,
{
    let result = match mode {
        DeliveryMode::Reply => target.reply(payload).await,
        DeliveryMode::EditReply => target.edit_reply(payload).await,
        DeliveryMode::FollowUp => target.follow_up(payload).await,
    };

    match result {
        Ok(()) => {
            debug!(%mode, "Reply delivered");
            DeliveryOutcome::Delivered(mode)
        }
        Err(InteractionError::TokenExpired) => {
            info!(%mode, "Interaction token expired; reply dropped");
            DeliveryOutcome::Expired
        }
        Err(e) => {
            warn!(%mode, error = %e, "Failed to deliver reply");
            DeliveryOutcome::Failed
        }
    }
}
