use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::stepd_client::{HealthSignal, StatusReport};
use crate::types::PollerError;

use super::source::StatusSource;
use super::state::PollState;

/// Floor for both durations; `tokio::time::interval` panics on zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig::from(&Config::default())
    }
}

impl From<&Config> for PollerConfig {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            request_timeout: config.request_timeout(),
        }
    }
}

/// What a single call to [`StatusPoller::poll`] did.
#[derive(Debug)]
pub enum PollOutcome {
    /// A response arrived and replaced the state.
    Applied,
    /// Another request was still outstanding; nothing was sent.
    Skipped,
    /// The request failed and the previous state was kept.
    Stale(PollerError),
}

pub struct StatusPoller {
    shared: Arc<Shared>,
    interval: Duration,
    timer: Option<JoinHandle<()>>,
}

struct Shared {
    source: Arc<dyn StatusSource>,
    state: watch::Sender<PollState>,
    in_flight: AtomicBool,
    consecutive_errors: AtomicU32,
    request_timeout: Duration,
}

/// Holds the single-flight slot; released on drop so a cancelled or
/// panicking poll never wedges the poller.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl StatusPoller {
    pub fn new(source: Arc<dyn StatusSource>, config: PollerConfig) -> Self {
        let (state, _) = watch::channel(PollState::default());
        Self {
            shared: Arc::new(Shared {
                source,
                state,
                in_flight: AtomicBool::new(false),
                consecutive_errors: AtomicU32::new(0),
                request_timeout: config.request_timeout.max(MIN_PERIOD),
            }),
            interval: config.poll_interval.max(MIN_PERIOD),
            timer: None,
        }
    }

    /// Start the repeating timer. The first tick fires immediately.
    ///
    /// Calling this while the timer is already running does nothing. Must be
    /// called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Status poller already running");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        info!(interval_ms = period.as_millis() as u64, "Starting status poller");
        self.timer = Some(tokio::spawn(run_timer(shared, period)));
    }

    /// Cancel the timer and any request it has outstanding.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            info!("Stopped status poller");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    pub async fn poll(&self) -> PollOutcome {
        self.shared.poll().await
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> PollState {
        self.shared.state.borrow().clone()
    }

    pub fn status(&self) -> String {
        self.shared.state.borrow().status.clone()
    }

    pub fn updating(&self) -> bool {
        self.shared.state.borrow().updating
    }

    pub fn signal(&self) -> HealthSignal {
        self.shared.state.borrow().signal
    }

    pub fn failed(&self) -> bool {
        self.shared.state.borrow().failed()
    }

    /// True while a request is outstanding.
    pub fn is_polling(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.shared.consecutive_errors.load(Ordering::Relaxed)
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    async fn poll(&self) -> PollOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Status request still in flight, skipping tick");
            return PollOutcome::Skipped;
        };

        let result = match time::timeout(self.request_timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(PollerError::Timeout(self.request_timeout)),
        };

        match result {
            Ok(report) => {
                self.apply(report);
                self.consecutive_errors.store(0, Ordering::Relaxed);
                PollOutcome::Applied
            }
            Err(err) => {
                let failures = saturating_increment(&self.consecutive_errors);
                warn!(error = %err, failures, "Status poll failed, keeping last known status");
                PollOutcome::Stale(err)
            }
        }
    }

    fn apply(&self, report: StatusReport) {
        let next = PollState::from_report(report, Utc::now());
        let status_changed = self.state.borrow().status != next.status;
        let failed = next.failed();
        if status_changed {
            info!(status = %next.status, updating = next.updating, failed, "stepd status");
        } else {
            debug!(status = %next.status, updating = next.updating, failed, "stepd status unchanged");
        }
        self.state.send_replace(next);
    }
}

/// Returns the new value; sticks at `u32::MAX` instead of wrapping.
fn saturating_increment(counter: &AtomicU32) -> u32 {
    let previous = counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
            Some(n.saturating_add(1))
        })
        .unwrap_or_else(|n| n);
    previous.saturating_add(1)
}

async fn run_timer(shared: Arc<Shared>, period: Duration) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let shared = Arc::clone(&shared);
                polls.spawn(async move { shared.poll().await });
            }
            Some(joined) = polls.join_next(), if !polls.is_empty() => {
                if let Err(err) = joined {
                    if err.is_panic() {
                        error!(error = %err, "Status poll task panicked");
                    }
                }
            }
        }
    }
}
