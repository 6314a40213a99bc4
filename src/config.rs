//! Process configuration loaded from environment variables.
//!
//! Only the bot token is mandatory; guild/channel ids and the health server
//! bind address carry defaults matching the production deployment and can be
//! overridden per environment.

use std::env;

use crate::error::{MonitorError, Result};

/// Discord guild hosting the heartbeat channel.
const DEFAULT_GUILD_ID: u64 = 1441548471906734173;
/// Channel watched for EverLink heartbeat embeds.
const DEFAULT_HEARTBEAT_CHANNEL_ID: u64 = 1442653565427646495;
/// Channel where the single status message lives.
const DEFAULT_STATUS_CHANNEL_ID: u64 = 1442640832325746728;
/// Bind address for the HTTP health endpoint.
const DEFAULT_HEALTH_ADDR: &str = "0.0.0.0:5000";

/// Runtime configuration for the monitor process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token. Required; startup aborts without it.
    pub token: String,
    /// Guild the heartbeat channel belongs to.
    pub guild_id: u64,
    /// Channel monitored for heartbeat embeds.
    pub heartbeat_channel_id: u64,
    /// Channel receiving the published status message.
    pub status_channel_id: u64,
    /// Address the health server listens on.
    pub health_addr: String,
}

impl Config {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Split out from [`Config::from_env`] so tests can inject variables
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                MonitorError::Config("DISCORD_BOT_TOKEN is not set".to_string())
            })?;

        Ok(Self {
            token,
            guild_id: parse_id(&lookup, "EVERLINK_GUILD_ID", DEFAULT_GUILD_ID)?,
            heartbeat_channel_id: parse_id(
                &lookup,
                "EVERLINK_HEARTBEAT_CHANNEL_ID",
                DEFAULT_HEARTBEAT_CHANNEL_ID,
            )?,
            status_channel_id: parse_id(
                &lookup,
                "EVERLINK_STATUS_CHANNEL_ID",
                DEFAULT_STATUS_CHANNEL_ID,
            )?,
            health_addr: lookup("EVERLINK_HEALTH_ADDR")
                .unwrap_or_else(|| DEFAULT_HEALTH_ADDR.to_string()),
        })
    }
}

fn parse_id<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            MonitorError::Config(format!("{} is not a valid snowflake: {:?}", key, raw))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn test_blank_token_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[("DISCORD_BOT_TOKEN", "  ")]));
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            Config::from_lookup(lookup_from(&[("DISCORD_BOT_TOKEN", "token")])).unwrap();
        assert_eq!(config.guild_id, DEFAULT_GUILD_ID);
        assert_eq!(config.heartbeat_channel_id, DEFAULT_HEARTBEAT_CHANNEL_ID);
        assert_eq!(config.status_channel_id, DEFAULT_STATUS_CHANNEL_ID);
        assert_eq!(config.health_addr, DEFAULT_HEALTH_ADDR);
    }

    #[test]
    fn test_id_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("EVERLINK_GUILD_ID", "42"),
            ("EVERLINK_HEARTBEAT_CHANNEL_ID", "43"),
            ("EVERLINK_STATUS_CHANNEL_ID", "44"),
            ("EVERLINK_HEALTH_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();
        assert_eq!(config.guild_id, 42);
        assert_eq!(config.heartbeat_channel_id, 43);
        assert_eq!(config.status_channel_id, 44);
        assert_eq!(config.health_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_id_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("EVERLINK_GUILD_ID", "not-a-number"),
        ]));
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }
}
