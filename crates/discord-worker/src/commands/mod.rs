//! Built-in slash commands.

mod addquestion;
mod ping;
pub mod questions;

use std::sync::Arc;

pub use addquestion::AddQuestion;
pub use ping::Ping;
pub use questions::{InMemoryQuestionStore, NewQuestion, QuestionStore};

use crate::error::WorkerError;
use crate::registry::{CommandHandler, CommandRegistry};

/// Registry with every built-in command.
pub fn default_registry(store: Arc<dyn QuestionStore>) -> Result<CommandRegistry, WorkerError> {
    let handlers: Vec<Arc<dyn CommandHandler>> = vec![Arc::new(Ping), Arc::new(AddQuestion::new(store))];
    CommandRegistry::new(handlers)
}
