//! Timing behaviour of a running watchdog task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::FutureExt;

use minigame_kiosk::orchestrator::watchdog::{
    Alert, Alerter, KillCallback, Watchdog, WatchdogHandle, WatchdogPhase,
};

use super::test_helpers::{short_thresholds, EventLog, RecordingFrontend};

fn recording_kill(log: &EventLog) -> KillCallback {
    let log = Arc::clone(log);
    Box::new(move || {
        async move {
            log.lock().unwrap().push("kill".into());
        }
        .boxed()
    })
}

fn start(warning_ms: u64, kill_ms: u64) -> (WatchdogHandle, Arc<RecordingFrontend>) {
    let frontend = Arc::new(RecordingFrontend::default());
    let handle = Watchdog::new(
        "test".into(),
        short_thresholds(warning_ms, kill_ms),
        frontend.clone(),
        recording_kill(&frontend.log()),
    )
    .spawn();
    (handle, frontend)
}

#[tokio::test]
async fn warning_then_kill_fire_once_in_order() {
    let (handle, frontend) = start(1000, 2000);

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(frontend.events(), ["warning", "expired", "kill"]);
    assert_eq!(handle.phase(), WatchdogPhase::Killed);
    assert!(!handle.is_active());
}

#[tokio::test]
async fn warning_fires_before_kill_threshold() {
    let (mut handle, frontend) = start(200, 60_000);

    let phase = tokio::time::timeout(
        Duration::from_secs(3),
        handle.wait_for(|p| p == WatchdogPhase::WarningFired),
    )
    .await
    .expect("warning should fire");

    assert_eq!(phase, WatchdogPhase::WarningFired);
    assert_eq!(frontend.events(), ["warning"]);
    assert!(handle.is_active());
    assert_eq!(handle.shutdown().await, WatchdogPhase::Cancelled);
}

#[tokio::test]
async fn cancel_before_warning_suppresses_everything() {
    let (handle, frontend) = start(1000, 2000);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let phase = handle.shutdown().await;
    tokio::time::sleep(Duration::from_millis(2000)).await;

    assert_eq!(phase, WatchdogPhase::Cancelled);
    assert!(frontend.events().is_empty());
}

#[tokio::test]
async fn cancel_after_warning_suppresses_kill() {
    let (mut handle, frontend) = start(200, 1200);

    tokio::time::timeout(
        Duration::from_secs(3),
        handle.wait_for(|p| p == WatchdogPhase::WarningFired),
    )
    .await
    .expect("warning should fire");
    handle.cancel();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(handle.phase(), WatchdogPhase::Cancelled);
    assert_eq!(frontend.events(), ["warning"]);
}

#[tokio::test]
async fn dropping_handle_cancels() {
    let (handle, frontend) = start(300, 600);

    drop(handle);
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert!(frontend.events().is_empty());
}

#[tokio::test]
async fn late_first_check_delivers_warning_before_kill() {
    let frontend = Arc::new(RecordingFrontend::default());
    let mut thresholds = short_thresholds(100, 200);
    thresholds.poll_interval = Duration::from_millis(800);
    let mut handle = Watchdog::new(
        "late".into(),
        thresholds,
        frontend.clone(),
        recording_kill(&frontend.log()),
    )
    .spawn();

    let phase = tokio::time::timeout(Duration::from_secs(3), handle.wait_for(WatchdogPhase::is_terminal))
        .await
        .expect("watchdog should finish");

    assert_eq!(phase, WatchdogPhase::Killed);
    assert_eq!(frontend.events(), ["warning", "expired", "kill"]);
}

/// Alerter whose warning blocks like a modal dialog.
struct SlowModal {
    inner: RecordingFrontend,
    hold: Duration,
}

impl Alerter for SlowModal {
    fn alert(&self, alert: Alert) {
        if matches!(alert, Alert::Warning { .. }) {
            std::thread::sleep(self.hold);
        }
        self.inner.alert(alert);
    }
}

#[tokio::test]
async fn cancel_during_blocking_warning_suppresses_kill() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let modal = Arc::new(SlowModal {
        inner: RecordingFrontend::with_log(Arc::clone(&log)),
        hold: Duration::from_millis(600),
    });
    let handle = Watchdog::new(
        "modal".into(),
        short_thresholds(100, 300),
        modal,
        recording_kill(&log),
    )
    .spawn();

    // The warning modal is still open past the kill threshold.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let phase = handle.shutdown().await;

    assert_eq!(phase, WatchdogPhase::Cancelled);
    assert_eq!(*log.lock().unwrap(), ["warning"]);
}

#[tokio::test]
async fn label_is_kept() {
    let (handle, _frontend) = start(60_000, 120_000);
    assert_eq!(handle.label(), "test");
    assert!(handle.is_active());
    handle.cancel();
    assert!(!handle.is_active());
}
