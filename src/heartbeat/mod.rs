//! Heartbeat core - status state machine, idempotent publisher, formatting.

mod format;
mod monitor;
mod publisher;
mod tracker;

pub use format::{format_eta, format_time_ago};
pub use monitor::{HeartbeatMonitor, StatusReport, TICK_PERIOD};
pub use publisher::{
    ServiceState, StatusPayload, StatusPublisher, StatusSink, COLOR_OFFLINE, COLOR_ONLINE,
    STATUS_TITLE,
};
pub use tracker::{
    heartbeat_interval, offline_threshold, ArtifactRef, HeartbeatStatus, NextHeartbeat,
    Transition,
};
