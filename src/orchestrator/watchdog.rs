//! Per-session time-limit watchdog.
//!
//! A [`Watchdog`] runs on its own tokio task and polls the wall clock every
//! `poll_interval`. Past the warning threshold it delivers a blocking
//! [`Alert::Warning`]; past the kill threshold it delivers
//! [`Alert::Expired`], awaits the kill callback and stops. Each action fires
//! at most once per run. Cancellation through the [`CancellationToken`] is
//! observed within one poll interval and suppresses every action that has
//! not fired yet.
//!
//! Alerts are delivered on the blocking pool so a modal dialog only ever
//! stalls the watchdog itself.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// Default warning threshold.
pub const DEFAULT_WARNING_AFTER: Duration = Duration::from_secs(300);

/// Default kill threshold.
pub const DEFAULT_KILL_AFTER: Duration = Duration::from_secs(600);

/// Default interval between threshold and cancellation checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Callback that reclaims the station once the kill threshold passes.
pub type KillCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// User-facing alert raised by the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// The session is nearing its limit.
    Warning {
        /// Session time when the alert was raised.
        elapsed: Duration,
    },
    /// The session is over and about to be terminated.
    Expired {
        /// Session time when the alert was raised.
        elapsed: Duration,
    },
}

/// Receiver of watchdog alerts.
///
/// `alert` may block until the attendee dismisses a modal; it is always
/// called from the blocking pool. Implementations bound to a UI thread must
/// marshal the call onto it themselves.
pub trait Alerter: Send + Sync {
    /// Present `alert` and return once it has been acknowledged.
    fn alert(&self, alert: Alert);
}

/// Warning and kill thresholds plus the poll interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Elapsed time before the warning alert.
    pub warning_after: Duration,
    /// Elapsed time before the station is reclaimed.
    pub kill_after: Duration,
    /// How often the loop wakes up.
    pub poll_interval: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_after: DEFAULT_WARNING_AFTER,
            kill_after: DEFAULT_KILL_AFTER,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Lifecycle of one watchdog run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogPhase {
    /// Counting; nothing fired yet.
    Running,
    /// The warning alert has been delivered.
    WarningFired,
    /// The kill alert and callback have run. Terminal.
    Killed,
    /// Cancelled before the kill. Terminal.
    Cancelled,
}

impl WatchdogPhase {
    /// Whether the run is over.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Killed | Self::Cancelled)
    }
}

/// Action due at a given poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogAction {
    /// Deliver the warning alert.
    Warn,
    /// Deliver the expiry alert and reclaim the station.
    Kill,
}

/// Fire-once bookkeeping for a single run.
#[derive(Debug, Clone, Copy)]
pub struct WatchdogState {
    started: Instant,
    warning_fired: bool,
    kill_fired: bool,
}

impl WatchdogState {
    /// Fresh state counting from `started`.
    #[must_use]
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            warning_fired: false,
            kill_fired: false,
        }
    }

    /// Time since the run started.
    #[must_use]
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Return the next action due at `now` and mark it fired.
    ///
    /// The warning always precedes the kill, even when both thresholds
    /// have already passed.
    pub fn due(&mut self, now: Instant, thresholds: &Thresholds) -> Option<WatchdogAction> {
        let elapsed = self.elapsed_at(now);
        if !self.warning_fired && elapsed >= thresholds.warning_after {
            self.warning_fired = true;
            return Some(WatchdogAction::Warn);
        }
        if !self.kill_fired && elapsed >= thresholds.kill_after {
            self.warning_fired = true;
            self.kill_fired = true;
            return Some(WatchdogAction::Kill);
        }
        None
    }

    /// Whether the warning has fired.
    #[must_use]
    pub fn warning_fired(&self) -> bool {
        self.warning_fired
    }

    /// Whether the kill has fired.
    #[must_use]
    pub fn kill_fired(&self) -> bool {
        self.kill_fired
    }
}

/// Builder for a per-session watchdog.
///
/// Call [`spawn`](Self::spawn) to start the background task.
pub struct Watchdog {
    label: String,
    thresholds: Thresholds,
    alerter: Arc<dyn Alerter>,
    on_kill: KillCallback,
    cancel: CancellationToken,
}

impl Watchdog {
    /// Construct a watchdog (does not start it yet).
    #[must_use]
    pub fn new(
        label: String,
        thresholds: Thresholds,
        alerter: Arc<dyn Alerter>,
        on_kill: KillCallback,
    ) -> Self {
        Self {
            label,
            thresholds,
            alerter,
            on_kill,
            cancel: CancellationToken::new(),
        }
    }

    /// Spawn the background task and return a handle for controlling it.
    #[must_use]
    pub fn spawn(self) -> WatchdogHandle {
        let (phase_tx, phase_rx) = watch::channel(WatchdogPhase::Running);
        let cancel = self.cancel.clone();
        let label = self.label.clone();

        let join_handle = tokio::spawn(
            self.run(phase_tx)
                .instrument(info_span!("watchdog", label = %label)),
        );

        WatchdogHandle {
            label,
            phase: phase_rx,
            cancel,
            join_handle: Some(join_handle),
        }
    }

    async fn run(self, phase: watch::Sender<WatchdogPhase>) {
        let Self {
            thresholds,
            alerter,
            on_kill,
            cancel,
            ..
        } = self;

        let mut state = WatchdogState::new(Instant::now());
        let mut ticker = tokio::time::interval(thresholds.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut on_kill = Some(on_kill);

        info!(
            warning_secs = thresholds.warning_after.as_secs(),
            kill_secs = thresholds.kill_after.as_secs(),
            "watchdog started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("watchdog cancelled");
                    phase.send_replace(WatchdogPhase::Cancelled);
                    return;
                }
                _ = ticker.tick() => {}
            }

            while let Some(action) = state.due(Instant::now(), &thresholds) {
                if cancel.is_cancelled() {
                    debug!("watchdog cancelled before pending action");
                    phase.send_replace(WatchdogPhase::Cancelled);
                    return;
                }

                let elapsed = state.elapsed_at(Instant::now());
                match action {
                    WatchdogAction::Warn => {
                        info!(elapsed_secs = elapsed.as_secs(), "session warning");
                        deliver(&alerter, Alert::Warning { elapsed }).await;
                        phase.send_replace(WatchdogPhase::WarningFired);
                    }
                    WatchdogAction::Kill => {
                        warn!(elapsed_secs = elapsed.as_secs(), "session time limit reached");
                        deliver(&alerter, Alert::Expired { elapsed }).await;
                        if cancel.is_cancelled() {
                            debug!("watchdog cancelled while the expiry alert was shown");
                            phase.send_replace(WatchdogPhase::Cancelled);
                            return;
                        }
                        if let Some(reclaim) = on_kill.take() {
                            reclaim().await;
                        }
                        phase.send_replace(WatchdogPhase::Killed);
                        info!("watchdog finished after reclaiming the station");
                        return;
                    }
                }
            }
        }
    }
}

/// Run a possibly blocking alert off the async workers.
async fn deliver(alerter: &Arc<dyn Alerter>, alert: Alert) {
    let alerter = Arc::clone(alerter);
    if let Err(err) = tokio::task::spawn_blocking(move || alerter.alert(alert)).await {
        warn!(%err, ?alert, "alert delivery panicked");
    }
}

/// Handle returned from [`Watchdog::spawn`].
pub struct WatchdogHandle {
    label: String,
    phase: watch::Receiver<WatchdogPhase>,
    cancel: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl Drop for WatchdogHandle {
    /// Cancel the background task when the handle is dropped.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl WatchdogHandle {
    /// Signal cancellation without waiting for the task.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Current phase of the run.
    #[must_use]
    pub fn phase(&self) -> WatchdogPhase {
        *self.phase.borrow()
    }

    /// Whether the run is still counting down.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
            && !self.phase().is_terminal()
            && self.join_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Label the watchdog was created with.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wait until the phase satisfies `pred`, returning the matching phase.
    ///
    /// Returns the last observed phase if the task ends first.
    pub async fn wait_for(&mut self, pred: impl Fn(WatchdogPhase) -> bool) -> WatchdogPhase {
        let observed = self.phase.wait_for(|phase| pred(*phase)).await.map(|phase| *phase);
        observed.unwrap_or_else(|_| *self.phase.borrow())
    }

    /// Cancel the task and wait for it to exit.
    ///
    /// A kill callback that is already running completes first.
    pub async fn shutdown(mut self) -> WatchdogPhase {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            if let Err(err) = handle.await {
                warn!(%err, label = self.label, "watchdog task failed");
            }
        }
        *self.phase.borrow()
    }
}
