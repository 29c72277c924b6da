use async_trait::async_trait;
use discord_types::ReplyPayload;

use crate::context::CommandContext;
use crate::registry::CommandHandler;

/// `/ping`: liveness check for the whole pipeline.
pub struct Ping;

#[async_trait]
impl CommandHandler for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        ctx.respond(&ReplyPayload::text("Pong!")).await;
        Ok(())
    }
}
