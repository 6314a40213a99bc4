//! Heartbeat monitor orchestration.
//!
//! Routes the three inbound events (heartbeat observed, periodic tick,
//! manual status query) into the tracker and applies the trigger policy:
//! heartbeat observations always re-publish so the displayed timestamp stays
//! fresh; ticks and queries publish only when the online flag flips.
//! Publish failures are logged and dropped - the next event is the retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::format::{format_eta, format_time_ago};
use super::publisher::{ServiceState, StatusPublisher, StatusSink};
use super::tracker::{offline_threshold, HeartbeatStatus, NextHeartbeat, Transition};

/// Period of the safety-net re-evaluation ticker.
pub const TICK_PERIOD: StdDuration = StdDuration::from_secs(30);

/// Snapshot answering a manual status query. Best effort: always available,
/// even before the first heartbeat.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub online: bool,
    /// Whether any heartbeat has ever been observed.
    pub ever_seen: bool,
    /// "Never", or e.g. "5 minutes ago".
    pub last_heartbeat: String,
    /// e.g. "in 3 minutes" or "overdue (10+ min)"; `None` before the first
    /// heartbeat.
    pub next_expected: Option<String>,
}

/// Owns the status record and drives tracker + publisher from inbound events.
pub struct HeartbeatMonitor {
    status: Mutex<HeartbeatStatus>,
    publisher: StatusPublisher,
    ticker_running: Arc<AtomicBool>,
}

impl HeartbeatMonitor {
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        Self {
            status: Mutex::new(HeartbeatStatus::new()),
            publisher: StatusPublisher::new(sink),
            ticker_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handles a heartbeat observation: records it, re-derives the flag and
    /// republishes unconditionally.
    pub async fn observe_heartbeat(&self, now: DateTime<Utc>) -> Transition {
        let mut status = self.status.lock().await;
        status.record_heartbeat(now);
        let transition = status.refresh(now);
        if transition == Transition::BecameOnline {
            info!("EverLink came online");
        }
        let state = ServiceState::from_online(status.is_online);
        if let Err(e) = self.publisher.publish(&mut status, state, now).await {
            error!("Failed to publish status after heartbeat: {}", e);
        }
        transition
    }

    /// Handles a periodic tick: re-derives the flag and publishes only on a
    /// transition.
    pub async fn tick(&self, now: DateTime<Utc>) -> Transition {
        let mut status = self.status.lock().await;
        let transition = status.refresh(now);
        match transition {
            Transition::NoChange => {}
            Transition::BecameOnline => info!("EverLink came online"),
            Transition::BecameOffline => warn!("EverLink went offline (no recent heartbeat)"),
        }
        if transition != Transition::NoChange {
            let state = ServiceState::from_online(status.is_online);
            if let Err(e) = self.publisher.publish(&mut status, state, now).await {
                error!("Failed to publish status change: {}", e);
            }
        }
        transition
    }

    /// Answers a manual status query. Re-derives the flag first (publishing
    /// if that happened to flip it) and never fails.
    pub async fn report(&self, now: DateTime<Utc>) -> StatusReport {
        let mut status = self.status.lock().await;
        let transition = status.refresh(now);
        if transition != Transition::NoChange {
            let state = ServiceState::from_online(status.is_online);
            if let Err(e) = self.publisher.publish(&mut status, state, now).await {
                error!("Failed to publish status change: {}", e);
            }
        }

        let online = status.is_online;
        let last_heartbeat = match status.time_since(now) {
            Some(elapsed) => format_time_ago(elapsed),
            None => "Never".to_string(),
        };
        let next_expected = status.next_expected(now).map(|next| match next {
            NextHeartbeat::In(remaining) => format_eta(remaining),
            NextHeartbeat::Overdue if online => "overdue".to_string(),
            NextHeartbeat::Overdue => {
                format!("overdue ({}+ min)", offline_threshold().num_minutes())
            }
        });

        StatusReport {
            online,
            ever_seen: status.last_heartbeat_at.is_some(),
            last_heartbeat,
            next_expected,
        }
    }

    /// Starts the 30s safety-net ticker that catches the online-to-offline
    /// transition when heartbeats simply stop arriving.
    pub fn start_ticker(self: Arc<Self>) {
        if self.ticker_running.swap(true, Ordering::SeqCst) {
            warn!("Status ticker already running");
            return;
        }

        let monitor = self;
        info!("Status ticker started (period={}s)", TICK_PERIOD.as_secs());

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK_PERIOD);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if !monitor.ticker_running.load(Ordering::SeqCst) {
                    info!("Status ticker stopped");
                    break;
                }

                monitor.tick(Utc::now()).await;
            }
        });
    }

    /// Stops the safety-net ticker on shutdown.
    pub fn stop_ticker(&self) {
        self.ticker_running.store(false, Ordering::SeqCst);
    }

    /// Returns whether the safety-net ticker is running.
    pub fn ticker_running(&self) -> bool {
        self.ticker_running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MonitorError, Result};
    use crate::heartbeat::publisher::StatusPayload;
    use crate::heartbeat::tracker::ArtifactRef;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex as StdMutex;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[derive(Default)]
    struct SinkState {
        next_id: u64,
        sends: Vec<ServiceState>,
        edits: Vec<(u64, ServiceState)>,
        edit_fails_not_found: bool,
    }

    #[derive(Default)]
    struct RecordingSink {
        state: StdMutex<SinkState>,
    }

    impl RecordingSink {
        fn publishes(&self) -> Vec<ServiceState> {
            let state = self.state.lock().unwrap();
            state
                .sends
                .iter()
                .chain(state.edits.iter().map(|(_, s)| s))
                .copied()
                .collect()
        }
    }

    #[async_trait]
    impl StatusSink for RecordingSink {
        async fn send(&self, payload: &StatusPayload) -> Result<ArtifactRef> {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            state.sends.push(payload.state);
            Ok(ArtifactRef(state.next_id))
        }

        async fn edit(&self, artifact: ArtifactRef, payload: &StatusPayload) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            if state.edit_fails_not_found {
                return Err(MonitorError::ArtifactNotFound);
            }
            state.edits.push((artifact.0, payload.state));
            Ok(())
        }
    }

    fn monitor_with_sink() -> (Arc<HeartbeatMonitor>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let monitor = Arc::new(HeartbeatMonitor::new(sink.clone()));
        (monitor, sink)
    }

    #[tokio::test]
    async fn test_query_before_any_heartbeat() {
        let (monitor, sink) = monitor_with_sink();

        let report = monitor.report(t0()).await;
        assert!(!report.online);
        assert!(!report.ever_seen);
        assert_eq!(report.last_heartbeat, "Never");
        assert_eq!(report.next_expected, None);
        // Confirming the offline state publishes nothing.
        assert!(sink.publishes().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_heartbeat_then_query() {
        let (monitor, _sink) = monitor_with_sink();

        let transition = monitor.observe_heartbeat(t0()).await;
        assert_eq!(transition, Transition::BecameOnline);

        let report = monitor.report(t0() + Duration::minutes(5)).await;
        assert!(report.online);
        assert_eq!(report.last_heartbeat, "5 minutes ago");
        assert_eq!(report.next_expected.as_deref(), Some("in 3 minutes"));
    }

    #[tokio::test]
    async fn test_scenario_tick_detects_offline() {
        let (monitor, sink) = monitor_with_sink();

        monitor.observe_heartbeat(t0()).await;
        let transition = monitor.tick(t0() + Duration::minutes(11)).await;
        assert_eq!(transition, Transition::BecameOffline);

        // One publish for the heartbeat, exactly one more for the flip.
        let publishes = sink.publishes();
        assert_eq!(
            publishes,
            vec![ServiceState::Online, ServiceState::Offline]
        );
    }

    #[tokio::test]
    async fn test_tick_without_transition_publishes_nothing() {
        let (monitor, sink) = monitor_with_sink();

        monitor.observe_heartbeat(t0()).await;
        monitor.tick(t0() + Duration::minutes(1)).await;
        monitor.tick(t0() + Duration::minutes(2)).await;

        assert_eq!(sink.publishes().len(), 1);
    }

    #[tokio::test]
    async fn test_heartbeats_always_republish_reusing_artifact() {
        let (monitor, sink) = monitor_with_sink();

        monitor.observe_heartbeat(t0()).await;
        monitor.observe_heartbeat(t0() + Duration::minutes(8)).await;

        let state = sink.state.lock().unwrap();
        assert_eq!(state.sends.len(), 1);
        assert_eq!(state.edits, vec![(1, ServiceState::Online)]);
    }

    #[tokio::test]
    async fn test_offline_report_shows_overdue_threshold() {
        let (monitor, _sink) = monitor_with_sink();

        monitor.observe_heartbeat(t0()).await;
        let report = monitor.report(t0() + Duration::minutes(15)).await;
        assert!(!report.online);
        assert_eq!(report.next_expected.as_deref(), Some("overdue (10+ min)"));
    }

    #[tokio::test]
    async fn test_online_but_overdue_report() {
        let (monitor, _sink) = monitor_with_sink();

        monitor.observe_heartbeat(t0()).await;
        // Past the 8 minute interval but inside the 10 minute threshold.
        let report = monitor.report(t0() + Duration::minutes(9)).await;
        assert!(report.online);
        assert_eq!(report.next_expected.as_deref(), Some("overdue"));
    }

    #[tokio::test]
    async fn test_report_survives_vanished_artifact() {
        let (monitor, sink) = monitor_with_sink();

        monitor.observe_heartbeat(t0()).await;
        sink.state.lock().unwrap().edit_fails_not_found = true;

        // The offline flip republished through the create fallback.
        let report = monitor.report(t0() + Duration::minutes(11)).await;
        assert!(!report.online);
        assert_eq!(sink.state.lock().unwrap().sends.len(), 2);
    }

    #[tokio::test]
    async fn test_ticker_start_stop() {
        let (monitor, _sink) = monitor_with_sink();

        assert!(!monitor.ticker_running());
        monitor.clone().start_ticker();
        assert!(monitor.ticker_running());
        // Second start is a no-op.
        monitor.clone().start_ticker();
        assert!(monitor.ticker_running());
        monitor.stop_ticker();
        assert!(!monitor.ticker_running());
    }
}
