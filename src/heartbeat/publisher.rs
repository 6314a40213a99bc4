//! Idempotent status publishing.
//!
//! The publisher keeps exactly one status message alive in the output
//! channel: it edits the known message in place and only posts a new one
//! when none exists yet or the old one was deleted out-of-band.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{MonitorError, Result};

use super::tracker::{ArtifactRef, HeartbeatStatus};

/// Embed title shared by heartbeats and the published status message.
pub const STATUS_TITLE: &str = "EverLink Status";

/// Discord green, used for the operational state.
pub const COLOR_ONLINE: u32 = 0x57F287;
/// Discord red, used for the offline state.
pub const COLOR_OFFLINE: u32 = 0xED4245;

/// Service state displayed on the status artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Online,
    Offline,
}

impl ServiceState {
    pub fn from_online(online: bool) -> Self {
        if online {
            ServiceState::Online
        } else {
            ServiceState::Offline
        }
    }

    pub fn color(self) -> u32 {
        match self {
            ServiceState::Online => COLOR_ONLINE,
            ServiceState::Offline => COLOR_OFFLINE,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ServiceState::Online => "System is operational",
            ServiceState::Offline => "System is offline",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceState::Online => "ONLINE",
            ServiceState::Offline => "OFFLINE",
        }
    }
}

/// Payload handed to the renderer for the external status display.
#[derive(Debug, Clone)]
pub struct StatusPayload {
    pub title: &'static str,
    pub state: ServiceState,
    pub timestamp: DateTime<Utc>,
}

impl StatusPayload {
    pub fn new(state: ServiceState, timestamp: DateTime<Utc>) -> Self {
        Self {
            title: STATUS_TITLE,
            state,
            timestamp,
        }
    }
}

/// Capability to create and update the external status artifact.
///
/// `edit` must fail with [`MonitorError::ArtifactNotFound`] when the artifact
/// no longer exists, so the publisher can fall back to creating a new one.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Creates a new artifact and returns its reference.
    async fn send(&self, payload: &StatusPayload) -> Result<ArtifactRef>;

    /// Updates an existing artifact in place.
    async fn edit(&self, artifact: ArtifactRef, payload: &StatusPayload) -> Result<()>;
}

/// Presents the tracker's state as a single external status message.
pub struct StatusPublisher {
    sink: Arc<dyn StatusSink>,
}

impl StatusPublisher {
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        Self { sink }
    }

    /// Creates or updates the status artifact for the given state.
    ///
    /// Edits the stored artifact when one is known; a vanished artifact is
    /// not an error and triggers the create fallback, replacing the stored
    /// reference. At most one artifact is live at any time.
    pub async fn publish(
        &self,
        status: &mut HeartbeatStatus,
        state: ServiceState,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let payload = StatusPayload::new(state, now);

        if let Some(artifact) = status.artifact {
            match self.sink.edit(artifact, &payload).await {
                Ok(()) => {
                    debug!("Updated status message: {}", state.label());
                    return Ok(());
                }
                Err(MonitorError::ArtifactNotFound) => {
                    info!("Status message vanished, posting a new one");
                }
                Err(e) => return Err(e),
            }
        }

        let artifact = self.sink.send(&payload).await?;
        status.artifact = Some(artifact);
        info!("Posted status message: {}", state.label());
        Ok(())
    }
}
