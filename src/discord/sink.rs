//! Status sink backed by the Discord REST API.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, CreateMessage, EditMessage, Http, MessageId};
use serenity::http::{HttpError, StatusCode};

use crate::error::{MonitorError, Result};
use crate::heartbeat::{ArtifactRef, StatusPayload, StatusSink};

use super::render::status_embed;

/// Publishes the status artifact as a message in the status channel.
pub struct DiscordStatusSink {
    http: Arc<Http>,
    channel: ChannelId,
}

impl DiscordStatusSink {
    pub fn new(http: Arc<Http>, status_channel_id: u64) -> Self {
        Self {
            http,
            channel: ChannelId::new(status_channel_id),
        }
    }
}

#[async_trait]
impl StatusSink for DiscordStatusSink {
    async fn send(&self, payload: &StatusPayload) -> Result<ArtifactRef> {
        let message = self
            .channel
            .send_message(&self.http, CreateMessage::new().embed(status_embed(payload)))
            .await?;
        Ok(ArtifactRef(message.id.get()))
    }

    async fn edit(&self, artifact: ArtifactRef, payload: &StatusPayload) -> Result<()> {
        self.channel
            .edit_message(
                &self.http,
                MessageId::new(artifact.0),
                EditMessage::new().embed(status_embed(payload)),
            )
            .await
            .map_err(map_not_found)?;
        Ok(())
    }
}

/// Maps Discord's unknown-message response onto the publisher's expected
/// create-fallback signal; everything else stays a Discord error.
fn map_not_found(err: serenity::Error) -> MonitorError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(ref response)) = err {
        if response.status_code == StatusCode::NOT_FOUND {
            return MonitorError::ArtifactNotFound;
        }
    }
    MonitorError::Discord(err)
}
