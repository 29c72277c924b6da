//! Shared types for the Discord command job pipeline

pub mod errors;
pub mod job;
pub mod options;
pub mod reply;

pub use errors::DiscordErrorCode;
pub use job::{CommandJob, INTERACTION_TOKEN_TTL_SECS};
pub use options::{OptionKind, OptionValue, OptionsSnapshot};
pub use reply::{Embed, EmbedField, EmbedFooter, ReplyPayload, EPHEMERAL_FLAG};
