//! Command registry: name → handler, built once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::error::WorkerError;

/// One slash command's business logic.
///
/// Handlers are stateless per invocation and must tolerate running more than
/// once for the same interaction, since the queue redelivers.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Slash-command name this handler answers to.
    fn name(&self) -> &'static str;

    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()>;
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new(handlers: Vec<Arc<dyn CommandHandler>>) -> Result<Self, WorkerError> {
        let mut map: HashMap<&'static str, Arc<dyn CommandHandler>> = HashMap::new();
        for handler in handlers {
            let name = handler.name();
            if map.insert(name, handler).is_some() {
                return Err(WorkerError::DuplicateCommand(name.to_string()));
            }
        }
        Ok(Self { handlers: map })
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CommandHandler>, WorkerError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| WorkerError::CommandNotFound(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
