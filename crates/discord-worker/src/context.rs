//! What a handler sees of its job.

use std::ops::{Deref, DerefMut};

use discord_interactions::{delivery, DeliveryOutcome, RemoteInteraction};
use discord_types::ReplyPayload;

/// The remote interaction plus delivery helpers.
///
/// Derefs to [`RemoteInteraction`], so option accessors, ids and the raw
/// `reply` / `edit_reply` / `follow_up` / `defer_reply` calls are all here.
pub struct CommandContext {
    interaction: RemoteInteraction,
}

impl CommandContext {
    pub fn new(interaction: RemoteInteraction) -> Self {
        Self { interaction }
    }

    /// Primary answer; picks reply or edit from the acknowledgment state.
    pub async fn respond(&mut self, payload: &ReplyPayload) -> DeliveryOutcome {
        delivery::respond(&mut self.interaction, payload).await
    }

    /// Extra notice; picks follow-up or reply from the acknowledgment state.
    pub async fn notify(&mut self, payload: &ReplyPayload) -> DeliveryOutcome {
        delivery::notify(&mut self.interaction, payload).await
    }

    pub fn into_interaction(self) -> RemoteInteraction {
        self.interaction
    }
}

impl Deref for CommandContext {
    type Target = RemoteInteraction;

    fn deref(&self) -> &Self::Target {
        &self.interaction
    }
}

impl DerefMut for CommandContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.interaction
    }
}
