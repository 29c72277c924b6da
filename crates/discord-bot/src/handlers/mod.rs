//! Serenity event handler implementation

use std::sync::Arc;

use discord_nats::JobQueue;
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, info};

use crate::health::AppState;
use crate::live::LiveInteraction;
use crate::receiver::{job_from_command, Receiver};

pub struct Handler<Q> {
    receiver: Arc<Receiver<Q>>,
    health: AppState,
}

impl<Q> Handler<Q> {
    pub fn new(receiver: Arc<Receiver<Q>>, health: AppState) -> Self {
        Self { receiver, health }
    }
}

#[async_trait]
impl<Q: JobQueue + 'static> EventHandler for Handler<Q> {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {}#{:04}",
            ready.user.name,
            ready.user.discriminator.map_or(0, |d| d.get())
        );
        self.health.set_bot_username(ready.user.name.clone()).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(cmd) = interaction else {
            // Components, autocomplete and modals are not queued
            debug!("Ignoring non-command interaction");
            return;
        };

        let ephemeral = self.receiver.settings().ephemeral_notices;
        let job = job_from_command(&cmd, ephemeral);
        let mut live = LiveInteraction::new(ctx.http.clone(), cmd, ephemeral);
        self.receiver.submit(&mut live, job).await;
    }
}
