use std::sync::Arc;

use chrono::{Duration, Utc};
use discord_types::{CommandJob, OptionKind, OptionValue, ReplyPayload};

use crate::error::InteractionError;
use crate::mock::{ApiCall, MockInteractionApi};
use crate::proxy::RemoteInteraction;
use crate::state::ReplyState;

fn job() -> CommandJob {
    CommandJob::new("addquestion", "app-1", "tok-1", "chan-1", "user-1")
        .with_guild("guild-1")
        .with_interaction_id("ix-1")
        .with_option("question", OptionValue::String("2+2?".into()))
        .with_option("points", OptionValue::Integer(5))
        .with_option("weight", OptionValue::Number(0.5))
        .with_option("hidden", OptionValue::Boolean(true))
        .with_option("target", OptionValue::User("42".into()))
}

fn proxy(job: CommandJob) -> (RemoteInteraction, MockInteractionApi) {
    let api = MockInteractionApi::new();
    (RemoteInteraction::from_job(job, Arc::new(api.clone())), api)
}

// ── Options ───────────────────────────────────────────────────────────────────

#[test]
fn options_read_back_unchanged() {
    let job = job();
    let (ix, _) = proxy(job.clone());
    for (name, value) in &job.options_snap {
        assert_eq!(ix.get_option(name).unwrap(), value);
    }
}

#[test]
fn identifying_fields_come_from_job() {
    let (ix, _) = proxy(job());
    assert_eq!(ix.command(), "addquestion");
    assert_eq!(ix.app_id(), "app-1");
    assert_eq!(ix.channel_id(), "chan-1");
    assert_eq!(ix.user_id(), "user-1");
    assert_eq!(ix.guild_id(), Some("guild-1"));
}

#[test]
fn missing_option_is_option_not_found() {
    let (ix, _) = proxy(job());
    let err = ix.get_option("nope").unwrap_err();
    assert!(matches!(err, InteractionError::OptionNotFound { ref name } if name == "nope"));
}

#[test]
fn typed_lookup_checks_kind() {
    let (ix, _) = proxy(job());
    assert_eq!(
        ix.get_option_value("points", OptionKind::Integer).unwrap(),
        &OptionValue::Integer(5)
    );
    let err = ix.get_option_value("points", OptionKind::String).unwrap_err();
    assert!(matches!(
        err,
        InteractionError::OptionKindMismatch {
            expected: OptionKind::String,
            actual: OptionKind::Integer,
            ..
        }
    ));
}

#[test]
fn typed_helpers() {
    let (ix, _) = proxy(job());
    assert_eq!(ix.option_str("question").unwrap(), "2+2?");
    assert_eq!(ix.option_str("target").unwrap(), "42");
    assert_eq!(ix.option_i64("points").unwrap(), 5);
    assert_eq!(ix.option_f64("weight").unwrap(), 0.5);
    assert_eq!(ix.option_f64("points").unwrap(), 5.0);
    assert!(ix.option_bool("hidden").unwrap());
    assert!(matches!(
        ix.option_i64("question"),
        Err(InteractionError::OptionKindMismatch { .. })
    ));
}

// ── State machine ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn starts_unacknowledged_unless_receiver_deferred() {
    let (ix, _) = proxy(job());
    assert_eq!(ix.state(), ReplyState::Unacknowledged);
    let (ix, _) = proxy(job().acknowledged());
    assert_eq!(ix.state(), ReplyState::Deferred);
}

#[tokio::test]
async fn reply_twice_fails_already_acknowledged() {
    let (mut ix, api) = proxy(job());
    ix.reply(&ReplyPayload::text("first")).await.unwrap();
    assert_eq!(ix.state(), ReplyState::Replied);

    let err = ix.reply(&ReplyPayload::text("second")).await.unwrap_err();
    assert!(matches!(err, InteractionError::AlreadyAcknowledged));
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn edit_before_ack_fails_not_yet_acknowledged() {
    let (mut ix, api) = proxy(job());
    let err = ix.edit_reply(&ReplyPayload::text("x")).await.unwrap_err();
    assert!(matches!(err, InteractionError::NotYetAcknowledged));
    let err = ix.follow_up(&ReplyPayload::text("x")).await.unwrap_err();
    assert!(matches!(err, InteractionError::NotYetAcknowledged));
    assert_eq!(api.call_count(), 0);
    assert_eq!(ix.state(), ReplyState::Unacknowledged);
}

#[tokio::test]
async fn defer_then_edit_succeeds_and_reply_fails() {
    let (mut ix, api) = proxy(job());
    ix.defer_reply().await.unwrap();
    assert_eq!(ix.state(), ReplyState::Deferred);

    ix.edit_reply(&ReplyPayload::text("done")).await.unwrap();
    assert_eq!(ix.state(), ReplyState::Replied);

    assert!(matches!(
        ix.reply(&ReplyPayload::text("again")).await,
        Err(InteractionError::AlreadyAcknowledged)
    ));
    assert!(matches!(
        ix.defer_reply().await,
        Err(InteractionError::AlreadyAcknowledged)
    ));

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], ApiCall::Defer { interaction_id, ephemeral: false, .. } if interaction_id == "ix-1"));
    assert!(matches!(&calls[1], ApiCall::EditOriginal { app_id, token, .. } if app_id == "app-1" && token == "tok-1"));
}

#[tokio::test]
async fn follow_up_keeps_state() {
    let (mut ix, api) = proxy(job().acknowledged());
    ix.follow_up(&ReplyPayload::text("extra")).await.unwrap();
    assert_eq!(ix.state(), ReplyState::Deferred);
    assert_eq!(api.calls()[0].content(), Some("extra"));
}

#[tokio::test]
async fn ephemeral_job_defers_ephemeral() {
    let (mut ix, api) = proxy(job().ephemeral(true));
    ix.defer_reply().await.unwrap();
    assert!(matches!(api.calls()[0], ApiCall::Defer { ephemeral: true, .. }));
}

#[tokio::test]
async fn failed_call_leaves_state_unchanged() {
    let (mut ix, api) = proxy(job());
    api.fail_next(500, None);
    let err = ix.reply(&ReplyPayload::text("x")).await.unwrap_err();
    assert!(matches!(err, InteractionError::Api(_)));
    assert_eq!(ix.state(), ReplyState::Unacknowledged);

    // Still allowed to try again.
    ix.reply(&ReplyPayload::text("x")).await.unwrap();
    assert_eq!(ix.state(), ReplyState::Replied);
}

#[tokio::test]
async fn initial_response_needs_interaction_id() {
    let mut job = job();
    job.interaction_id = None;
    let (mut ix, api) = proxy(job);
    assert!(matches!(
        ix.reply(&ReplyPayload::text("x")).await,
        Err(InteractionError::MissingInteractionId)
    ));
    assert!(matches!(
        ix.defer_reply().await,
        Err(InteractionError::MissingInteractionId)
    ));
    assert_eq!(api.call_count(), 0);
}

// ── Token expiry ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn expired_token_fails_without_network_call() {
    let stale = job()
        .acknowledged()
        .issued_at(Utc::now() - Duration::minutes(16));
    let (mut ix, api) = proxy(stale);

    let err = ix.edit_reply(&ReplyPayload::text("late")).await.unwrap_err();
    assert!(matches!(err, InteractionError::TokenExpired));
    assert!(matches!(
        ix.follow_up(&ReplyPayload::text("late")).await,
        Err(InteractionError::TokenExpired)
    ));
    assert_eq!(api.call_count(), 0);
    assert_eq!(ix.state(), ReplyState::Deferred);
}

#[tokio::test]
async fn fresh_token_within_window_is_usable() {
    let fresh = job().issued_at(Utc::now() - Duration::minutes(5));
    let (mut ix, api) = proxy(fresh);
    ix.reply(&ReplyPayload::text("ok")).await.unwrap();
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn platform_token_rejection_sticks() {
    let (mut ix, api) = proxy(job().acknowledged());
    api.fail_next(401, Some(50027));
    assert!(matches!(
        ix.edit_reply(&ReplyPayload::text("x")).await,
        Err(InteractionError::TokenExpired)
    ));
    assert!(matches!(
        ix.follow_up(&ReplyPayload::text("y")).await,
        Err(InteractionError::TokenExpired)
    ));
    assert_eq!(api.call_count(), 1);
}
