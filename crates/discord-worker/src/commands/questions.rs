//! Question storage consumed by `/addquestion`.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub guild_id: Option<String>,
    pub author_id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct: String,
    pub difficulty: Option<String>,
}

/// Persistence for quiz questions. Returns the stored question's id.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn add(&self, question: NewQuestion) -> anyhow::Result<String>;
}

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryQuestionStore {
    questions: Mutex<Vec<(String, NewQuestion)>>,
}

impl InMemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(String, NewQuestion)> {
        self.questions
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionStore {
    async fn add(&self, question: NewQuestion) -> anyhow::Result<String> {
        let id = Uuid::new_v4().to_string();
        self.questions
            .lock()
            .map_err(|_| anyhow::anyhow!("question store lock poisoned"))?
            .push((id.clone(), question));
        Ok(id)
    }
}
