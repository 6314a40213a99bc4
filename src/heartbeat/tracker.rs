//! Heartbeat status record and the online/offline derivation.
//!
//! `HeartbeatStatus` is the single in-memory record the whole monitor hangs
//! off: the last observed heartbeat instant, the cached online flag and the
//! reference to the currently published status message. State resets on
//! process restart by design.

use chrono::{DateTime, Duration, Utc};

/// Cadence EverLink posts heartbeat embeds at.
pub fn heartbeat_interval() -> Duration {
    Duration::minutes(8)
}

/// Silence beyond this marks EverLink offline.
pub fn offline_threshold() -> Duration {
    Duration::minutes(10)
}

/// Opaque handle to the published status artifact (a Discord message id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactRef(pub u64);

/// Outcome of re-deriving the online flag.
///
/// Only a flip is a transition; a re-evaluation that confirms the current
/// state is `NoChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NoChange,
    BecameOnline,
    BecameOffline,
}

/// When the next heartbeat is due, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextHeartbeat {
    Overdue,
    In(Duration),
}

/// The single mutable status record.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatStatus {
    /// Instant of the most recently processed heartbeat. Last write wins;
    /// out-of-order observations are accepted as-is.
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    /// Cached derivation. Always recompute via [`HeartbeatStatus::refresh`]
    /// before reading; the derivation is the source of truth, not this field.
    pub is_online: bool,
    /// Reference to the last published status message, if any.
    pub artifact: Option<ArtifactRef>,
}

impl HeartbeatStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a heartbeat observation. No validation, no side effects:
    /// an older timestamp arriving late simply overwrites a newer one.
    pub fn record_heartbeat(&mut self, now: DateTime<Utc>) {
        self.last_heartbeat_at = Some(now);
    }

    /// Pure derivation of the online flag: a heartbeat has been seen and it
    /// is strictly younger than the offline threshold. The exact boundary
    /// counts as offline.
    pub fn derive_online(&self, now: DateTime<Utc>) -> bool {
        match self.last_heartbeat_at {
            Some(last) => now - last < offline_threshold(),
            None => false,
        }
    }

    /// Re-derives the online flag, stores it and reports whether it flipped.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Transition {
        let was_online = self.is_online;
        let online = self.derive_online(now);
        self.is_online = online;
        match (was_online, online) {
            (false, true) => Transition::BecameOnline,
            (true, false) => Transition::BecameOffline,
            _ => Transition::NoChange,
        }
    }

    /// Elapsed time since the last heartbeat; `None` if never observed.
    pub fn time_since(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_heartbeat_at.map(|last| now - last)
    }

    /// Remaining time until the next heartbeat is due, or `Overdue` once the
    /// nominal interval has elapsed. `None` if never observed.
    pub fn next_expected(&self, now: DateTime<Utc>) -> Option<NextHeartbeat> {
        let last = self.last_heartbeat_at?;
        let remaining = last + heartbeat_interval() - now;
        if remaining <= Duration::zero() {
            Some(NextHeartbeat::Overdue)
        } else {
            Some(NextHeartbeat::In(remaining))
        }
    }
}
