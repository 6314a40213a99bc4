//! Discord embed rendering for the status message and /status replies.

use chrono::{DateTime, Utc};
use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter, Timestamp};

use crate::heartbeat::{StatusPayload, StatusReport, COLOR_OFFLINE, COLOR_ONLINE};

/// Builds the embed for the published status message.
pub fn status_embed(payload: &StatusPayload) -> CreateEmbed {
    let footer = format!(
        "EverLink | Today at {}",
        payload.timestamp.format("%-I:%M %p")
    );
    CreateEmbed::new()
        .title(payload.title)
        .description(payload.state.description())
        .colour(Colour::new(payload.state.color()))
        .timestamp(to_timestamp(payload.timestamp))
        .footer(CreateEmbedFooter::new(footer))
}

/// Builds the ephemeral embed answering a /status query.
pub fn report_embed(report: &StatusReport, now: DateTime<Utc>) -> CreateEmbed {
    let color = if report.online {
        COLOR_ONLINE
    } else {
        COLOR_OFFLINE
    };
    let current_status = match (report.online, report.ever_seen) {
        (true, _) => "\u{2705} **Online**".to_string(),
        (false, true) => "\u{274c} **Offline**".to_string(),
        (false, false) => "\u{274c} **Offline** (No heartbeat detected yet)".to_string(),
    };

    let mut embed = CreateEmbed::new()
        .title("EverLink Monitor Status")
        .colour(Colour::new(color))
        .timestamp(to_timestamp(now))
        .footer(CreateEmbedFooter::new("EverLink Monitoring Bot v1.0"))
        .field("Current Status", current_status, false)
        .field("Last Heartbeat", report.last_heartbeat.clone(), true);

    if let Some(ref next) = report.next_expected {
        embed = embed.field("Next Expected", next.clone(), true);
    }

    embed
}

fn to_timestamp(instant: DateTime<Utc>) -> Timestamp {
    Timestamp::from_unix_timestamp(instant.timestamp()).unwrap_or_else(|_| Timestamp::now())
}
