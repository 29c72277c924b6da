//! Acting on a Discord interaction from a process that never saw it.
//!
//! - [`RemoteInteraction`] rebuilds an interaction from a queued
//!   [`CommandJob`](discord_types::CommandJob) and talks to Discord over REST.
//! - [`Interaction`] is the capability both live and remote interactions share.
//! - [`delivery`] picks the right outbound call from the reply state.

pub mod api;
pub mod delivery;
pub mod error;
pub mod proxy;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use api::{DiscordRest, InteractionApi, DEFAULT_API_BASE};
pub use delivery::{notify, respond, DeliveryMode, DeliveryOutcome, Interaction};
pub use error::{ApiError, InteractionError};
pub use proxy::RemoteInteraction;
pub use state::ReplyState;
