//! In-memory [`InteractionApi`] for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use discord_types::ReplyPayload;

use crate::api::{InitialResponse, InteractionApi};
use crate::error::ApiError;

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Reply {
        interaction_id: String,
        token: String,
        payload: ReplyPayload,
    },
    Defer {
        interaction_id: String,
        token: String,
        ephemeral: bool,
    },
    EditOriginal {
        app_id: String,
        token: String,
        payload: ReplyPayload,
    },
    FollowUp {
        app_id: String,
        token: String,
        payload: ReplyPayload,
    },
}

impl ApiCall {
    /// Content of the payload, if the call carried one.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Reply { payload, .. }
            | Self::EditOriginal { payload, .. }
            | Self::FollowUp { payload, .. } => payload.content.as_deref(),
            Self::Defer { .. } => None,
        }
    }
}

/// Records every call; failed calls are recorded too.
#[derive(Clone, Default)]
pub struct MockInteractionApi {
    calls: Arc<Mutex<Vec<ApiCall>>>,
    failures: Arc<Mutex<VecDeque<(u16, Option<u32>)>>>,
}

impl MockInteractionApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with the given status and Discord JSON code.
    pub fn fail_next(&self, status: u16, code: Option<u32>) {
        self.failures.lock().unwrap().push_back((status, code));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front() {
            Some((status, code)) => Err(ApiError::Status {
                status,
                code,
                message: "mock failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InteractionApi for MockInteractionApi {
    async fn create_response(
        &self,
        interaction_id: &str,
        token: &str,
        response: InitialResponse<'_>,
    ) -> Result<(), ApiError> {
        let call = match response {
            InitialResponse::Message(payload) => ApiCall::Reply {
                interaction_id: interaction_id.to_string(),
                token: token.to_string(),
                payload: payload.clone(),
            },
            InitialResponse::Defer { ephemeral } => ApiCall::Defer {
                interaction_id: interaction_id.to_string(),
                token: token.to_string(),
                ephemeral,
            },
        };
        self.record(call)
    }

    async fn edit_original(
        &self,
        app_id: &str,
        token: &str,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::EditOriginal {
            app_id: app_id.to_string(),
            token: token.to_string(),
            payload: payload.clone(),
        })
    }

    async fn create_followup(
        &self,
        app_id: &str,
        token: &str,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::FollowUp {
            app_id: app_id.to_string(),
            token: token.to_string(),
            payload: payload.clone(),
        })
    }
}
