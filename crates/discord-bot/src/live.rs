//! The gateway-side interaction: the receiver's own view of a slash command,
//! answered through serenity's HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use discord_interactions::{Interaction, InteractionError, ReplyState};
use discord_types::{Embed, ReplyPayload};
use serenity::builder::{
    CreateEmbed, CreateEmbedFooter, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::http::Http;
use serenity::model::application::CommandInteraction;

use crate::errors::to_interaction_error;

/// A [`CommandInteraction`] with tracked reply state.
pub struct LiveInteraction {
    http: Arc<Http>,
    command: CommandInteraction,
    state: ReplyState,
    ephemeral: bool,
}

impl LiveInteraction {
    /// `ephemeral` decides whether a deferral hides the eventual response.
    pub fn new(http: Arc<Http>, command: CommandInteraction, ephemeral: bool) -> Self {
        Self {
            http,
            command,
            state: ReplyState::Unacknowledged,
            ephemeral,
        }
    }
}

#[async_trait]
impl Interaction for LiveInteraction {
    fn is_acknowledged(&self) -> bool {
        self.state.is_acknowledged()
    }

    async fn reply(&mut self, payload: &ReplyPayload) -> Result<(), InteractionError> {
        self.state.ensure_unacknowledged()?;
        let response = CreateInteractionResponse::Message(response_message(payload));
        self.http
            .create_interaction_response(self.command.id, &self.command.token, &response, Vec::new())
            .await
            .map_err(to_interaction_error)?;
        self.state = ReplyState::Replied;
        Ok(())
    }

    async fn edit_reply(&mut self, payload: &ReplyPayload) -> Result<(), InteractionError> {
        self.state.ensure_acknowledged()?;
        self.http
            .edit_original_interaction_response(&self.command.token, &edit_response(payload), Vec::new())
            .await
            .map_err(to_interaction_error)?;
        self.state = ReplyState::Replied;
        Ok(())
    }

    async fn follow_up(&mut self, payload: &ReplyPayload) -> Result<(), InteractionError> {
        self.state.ensure_acknowledged()?;
        self.http
            .create_followup_message(&self.command.token, &followup_message(payload), Vec::new())
            .await
            .map_err(to_interaction_error)?;
        Ok(())
    }

    async fn defer_reply(&mut self) -> Result<(), InteractionError> {
        self.state.ensure_unacknowledged()?;
        let response =
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().ephemeral(self.ephemeral));
        self.http
            .create_interaction_response(self.command.id, &self.command.token, &response, Vec::new())
            .await
            .map_err(to_interaction_error)?;
        self.state = ReplyState::Deferred;
        Ok(())
    }
}

// ── Builders ──────────────────────────────────────────────────────────────────

pub(crate) fn create_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(color) = embed.color {
        builder = builder.color(color);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(&footer.text));
    }
    if let Some(url) = &embed.image_url {
        builder = builder.image(url);
    }
    builder
}

fn embeds(payload: &ReplyPayload) -> Vec<CreateEmbed> {
    payload.embeds.iter().map(create_embed).collect()
}

pub(crate) fn response_message(payload: &ReplyPayload) -> CreateInteractionResponseMessage {
    let mut msg = CreateInteractionResponseMessage::new();
    if let Some(content) = &payload.content {
        msg = msg.content(content);
    }
    if !payload.embeds.is_empty() {
        msg = msg.embeds(embeds(payload));
    }
    if payload.ephemeral {
        msg = msg.ephemeral(true);
    }
    msg
}

pub(crate) fn edit_response(payload: &ReplyPayload) -> EditInteractionResponse {
    let mut edit = EditInteractionResponse::new();
    if let Some(content) = &payload.content {
        edit = edit.content(content);
    }
    if !payload.embeds.is_empty() {
        edit = edit.embeds(embeds(payload));
    }
    edit
}

pub(crate) fn followup_message(payload: &ReplyPayload) -> CreateInteractionResponseFollowup {
    let mut builder = CreateInteractionResponseFollowup::new();
    if let Some(content) = &payload.content {
        builder = builder.content(content);
    }
    if !payload.embeds.is_empty() {
        builder = builder.embeds(embeds(payload));
    }
    if payload.ephemeral {
        builder = builder.ephemeral(true);
    }
    builder
}
