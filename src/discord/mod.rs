//! Discord transport - gateway client, heartbeat detection, /status command.
//!
//! Everything here is glue around the heartbeat core: matching inbound
//! embeds against the heartbeat marker, registering and answering the
//! /status slash command, startup housekeeping in the status channel and
//! signaling readiness to the health endpoint.

mod render;
mod sink;

pub use sink::DiscordStatusSink;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serenity::all::{
    ChannelId, Client, Command, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage, EventHandler, GatewayIntents, GetMessages, Http,
    Interaction, Message, Ready,
};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::heartbeat::{HeartbeatMonitor, STATUS_TITLE};

/// Marker identifying EverLink heartbeat embeds (case-sensitive substring
/// match against embed titles). EverLink stamps its heartbeats with the
/// same title the published status message carries, so the marker is the
/// status title rather than an independent literal.
pub const HEARTBEAT_MARKER: &str = STATUS_TITLE;

/// Name of the manual status query command.
pub const STATUS_COMMAND: &str = "status";

/// Returns the first embed title matching the heartbeat marker; remaining
/// embeds in the batch are ignored.
pub fn first_heartbeat_title<'a, I>(titles: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    titles
        .into_iter()
        .flatten()
        .find(|title| title.contains(HEARTBEAT_MARKER))
}

struct Handler {
    monitor: Arc<HeartbeatMonitor>,
    config: Config,
    ready_flag: Arc<AtomicBool>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot logged in as {}", ready.user.name);

        let status_channel = ChannelId::new(self.config.status_channel_id);
        if let Err(e) = cleanup_status_channel(&ctx.http, status_channel).await {
            warn!("Error cleaning status channel: {}", e);
        }

        match Command::create_global_command(
            &ctx.http,
            CreateCommand::new(STATUS_COMMAND)
                .description("Check EverLink's current status and last heartbeat"),
        )
        .await
        {
            Ok(_) => info!("Slash commands registered"),
            Err(e) => warn!("Error registering slash commands: {}", e),
        }

        info!(
            "Monitoring channel {} for EverLink heartbeats",
            self.config.heartbeat_channel_id
        );

        // Readiness is about the bot process, not EverLink's status.
        self.ready_flag.store(true, Ordering::SeqCst);

        self.monitor.clone().start_ticker();
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.channel_id.get() != self.config.heartbeat_channel_id
            || msg.guild_id.map(|g| g.get()) != Some(self.config.guild_id)
        {
            return;
        }

        debug!(
            "Message in heartbeat channel from {} ({} embeds)",
            msg.author.name,
            msg.embeds.len()
        );

        let titles = msg.embeds.iter().map(|embed| embed.title.as_deref());
        if first_heartbeat_title(titles).is_some() {
            let now = Utc::now();
            info!("EverLink heartbeat detected at {}", now.to_rfc3339());
            self.monitor.observe_heartbeat(now).await;
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.data.name != STATUS_COMMAND {
            return;
        }

        let now = Utc::now();
        let report = self.monitor.report(now).await;
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .embed(render::report_embed(&report, now))
                .ephemeral(true),
        );
        if let Err(e) = command.create_response(&ctx.http, response).await {
            error!("Failed to reply to /{}: {}", STATUS_COMMAND, e);
        }
    }
}

/// Deletes leftover messages from the status channel so the monitor starts
/// with a clean slate. Failures are logged, never fatal.
async fn cleanup_status_channel(http: &Http, channel: ChannelId) -> Result<()> {
    let messages = channel.messages(http, GetMessages::new().limit(100)).await?;
    if messages.is_empty() {
        return Ok(());
    }

    info!(
        "Cleaning up {} old message(s) from status channel",
        messages.len()
    );
    for message in messages {
        if let Err(e) = message.delete(http).await {
            warn!("Failed to delete message {}: {}", message.id, e);
        }
    }
    Ok(())
}

/// Connects to the Discord gateway and runs until the connection ends.
pub async fn run(
    config: Config,
    monitor: Arc<HeartbeatMonitor>,
    ready_flag: Arc<AtomicBool>,
) -> Result<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = Handler {
        monitor,
        config: config.clone(),
        ready_flag,
    };

    let mut client = Client::builder(&config.token, intents)
        .event_handler(handler)
        .await?;
    client.start().await?;
    Ok(())
}
