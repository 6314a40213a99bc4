//! EverLink Monitor - Discord liveness monitor for EverLink heartbeats

pub mod config;
pub mod discord;
pub mod error;
pub mod health;
pub mod heartbeat;

pub use config::Config;
