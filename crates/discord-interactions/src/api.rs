//! Discord interaction endpoints over plain REST.
//!
//! Interaction callbacks and the interaction webhook are authorized by the
//! token in the URL, so no bot token is needed here.

use async_trait::async_trait;
use discord_types::ReplyPayload;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Interaction callback types
const CALLBACK_CHANNEL_MESSAGE: u8 = 4;
const CALLBACK_DEFERRED_CHANNEL_MESSAGE: u8 = 5;

/// Body of the first response to an interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialResponse<'a> {
    Message(&'a ReplyPayload),
    Defer { ephemeral: bool },
}

impl InitialResponse<'_> {
    pub fn to_discord_json(&self) -> Value {
        match self {
            Self::Message(payload) => json!({
                "type": CALLBACK_CHANNEL_MESSAGE,
                "data": payload.to_discord_message(),
            }),
            Self::Defer { ephemeral: true } => json!({
                "type": CALLBACK_DEFERRED_CHANNEL_MESSAGE,
                "data": { "flags": discord_types::EPHEMERAL_FLAG },
            }),
            Self::Defer { ephemeral: false } => json!({
                "type": CALLBACK_DEFERRED_CHANNEL_MESSAGE,
            }),
        }
    }
}

/// The three interaction calls a worker can make.
#[async_trait]
pub trait InteractionApi: Send + Sync {
    /// `POST /interactions/{id}/{token}/callback`
    async fn create_response(
        &self,
        interaction_id: &str,
        token: &str,
        response: InitialResponse<'_>,
    ) -> Result<(), ApiError>;

    /// `PATCH /webhooks/{app_id}/{token}/messages/@original`
    async fn edit_original(
        &self,
        app_id: &str,
        token: &str,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError>;

    /// `POST /webhooks/{app_id}/{token}`
    async fn create_followup(
        &self,
        app_id: &str,
        token: &str,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct DiscordErrorBody {
    code: u32,
    message: String,
}

/// [`InteractionApi`] over `reqwest`. One attempt per call; no client-side
/// rate limiting.
#[derive(Clone)]
pub struct DiscordRest {
    http: reqwest::Client,
    base_url: String,
}

impl DiscordRest {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<DiscordErrorBody>(&body) {
            Ok(err) => (Some(err.code), err.message),
            Err(_) => (None, body),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

impl Default for DiscordRest {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl InteractionApi for DiscordRest {
    async fn create_response(
        &self,
        interaction_id: &str,
        token: &str,
        response: InitialResponse<'_>,
    ) -> Result<(), ApiError> {
        let url = format!("{}/interactions/{}/{}/callback", self.base_url, interaction_id, token);
        debug!(interaction_id, "POST interaction callback");
        self.send(self.http.post(url).json(&response.to_discord_json()))
            .await
    }

    async fn edit_original(
        &self,
        app_id: &str,
        token: &str,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError> {
        let url = format!("{}/webhooks/{}/{}/messages/@original", self.base_url, app_id, token);
        debug!(app_id, "PATCH original response");
        self.send(self.http.patch(url).json(&payload.to_discord_message()))
            .await
    }

    async fn create_followup(
        &self,
        app_id: &str,
        token: &str,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError> {
        let url = format!("{}/webhooks/{}/{}", self.base_url, app_id, token);
        debug!(app_id, "POST follow-up");
        self.send(self.http.post(url).json(&payload.to_discord_message()))
            .await
    }
}
