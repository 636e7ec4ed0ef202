//! Scheduler background loop.
//!
//! Drives the polling cadence: every check interval it computes the current
//! wall-clock minute and runs one evaluation cycle for the triggers due in
//! that minute. The check interval is sub-minute so a minute boundary is
//! never missed under timer drift; a minute already evaluated in this run
//! is never evaluated twice.

use crate::evaluator::TriggerEvaluator;
use crate::store::{NotificationLog, TriggerStore};
use chrono::Local;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Interval between due-trigger checks.
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Lifecycle of a [`SchedulerLoop`] instance.
///
/// Owned by the instance; multiple loops (e.g. in tests) do not interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    /// Not running.
    Stopped = 0,
    /// Tick loop active.
    Running = 1,
    /// Stop signalled; the in-flight cycle may still finish.
    StopRequested = 2,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::StopRequested,
            _ => Self::Stopped,
        }
    }
}

/// Periodic driver that evaluates due triggers once per wall-clock minute.
///
/// Each cycle reads the trigger store fresh, evaluates every due trigger,
/// and appends one notification record per trigger, unconditionally, even
/// when the probe fails. No failure below the cycle aborts the loop.
pub struct SchedulerLoop {
    triggers: Arc<dyn TriggerStore>,
    log: Arc<dyn NotificationLog>,
    evaluator: TriggerEvaluator,
    check_interval: Duration,
    state: AtomicU8,
    cancel: CancellationToken,
    last_minute: Mutex<Option<String>>,
}

impl SchedulerLoop {
    /// Create a new scheduler over the given stores and evaluator.
    pub fn new(
        triggers: Arc<dyn TriggerStore>,
        log: Arc<dyn NotificationLog>,
        evaluator: TriggerEvaluator,
    ) -> Self {
        Self {
            triggers,
            log,
            evaluator,
            check_interval: DEFAULT_CHECK_INTERVAL,
            state: AtomicU8::new(LifecycleState::Stopped as u8),
            cancel: CancellationToken::new(),
            last_minute: Mutex::new(None),
        }
    }

    /// Override the tick check interval (useful for testing).
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Signal graceful termination. Idempotent; the in-flight cycle is
    /// allowed to finish, no new ticks start.
    pub fn stop(&self) {
        let _ = self.state.compare_exchange(
            LifecycleState::Running as u8,
            LifecycleState::StopRequested as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        self.cancel.cancel();
    }

    /// Run until [`stop`](Self::stop) is called.
    ///
    /// Share the loop behind an [`Arc`] to stop it from another task:
    ///
    /// ```rust,ignore
    /// let scheduler = Arc::new(SchedulerLoop::new(store.clone(), store, evaluator));
    /// let stopper = scheduler.clone();
    /// tokio::spawn(async move { stopper.stop() });
    /// scheduler.run().await;
    /// ```
    pub async fn run(&self) {
        self.state
            .store(LifecycleState::Running as u8, Ordering::SeqCst);
        info!(
            check_interval_secs = self.check_interval.as_secs(),
            "scheduler started"
        );

        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("scheduler stop requested");
                    break;
                }
                _ = interval.tick() => {
                    let minute = local_minute_key();
                    if !self.claim_minute(&minute) {
                        continue;
                    }
                    self.run_cycle(&minute).await;
                }
            }
        }

        self.state
            .store(LifecycleState::Stopped as u8, Ordering::SeqCst);
        info!("scheduler stopped");
    }

    /// Execute one evaluation cycle for the given `"HH:MM"` minute key.
    ///
    /// Per-trigger evaluation and append failures are logged and never
    /// abort the cycle; a store read failure skips the cycle and the loop
    /// self-heals on the next tick (the cadence is the retry interval).
    pub async fn run_cycle(&self, minute: &str) {
        let due = match self.triggers.find_due(minute).await {
            Ok(due) => due,
            Err(e) => {
                error!(minute, error = %e, "cannot query due triggers, skipping cycle");
                return;
            }
        };

        debug!(minute, count = due.len(), "found due triggers");

        for trigger in &due {
            let record = self.evaluator.evaluate(trigger).await;
            if let Err(e) = self.log.append(record).await {
                warn!(trigger_id = %trigger.id, error = %e, "cannot append notification record");
            }
        }
    }

    /// Mark `minute` as evaluated. Returns `false` when this run already
    /// evaluated it: a trigger matched in one minute is evaluated once,
    /// not once per sub-minute check.
    fn claim_minute(&self, minute: &str) -> bool {
        let mut last = self.last_minute.lock().unwrap_or_else(|e| e.into_inner());
        if last.as_deref() == Some(minute) {
            return false;
        }
        *last = Some(minute.to_owned());
        true
    }
}

/// Current local wall-clock minute, formatted `"HH:MM"`.
pub fn local_minute_key() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::probe::{ActivityDetail, ActivityProbe, DailyActivity, ProbeError};
    use crate::store::MemoryStore;
    use crate::trigger::{Platform, Trigger};
    use async_trait::async_trait;

    struct AlwaysIdleProbe;

    #[async_trait]
    impl ActivityProbe for AlwaysIdleProbe {
        fn platform(&self) -> Platform {
            Platform::Github
        }

        async fn check_today(&self, _username: &str) -> Result<DailyActivity, ProbeError> {
            Ok(DailyActivity {
                activity_present: false,
                detail: ActivityDetail::Commits {
                    count: 0,
                    commits: Vec::new(),
                },
            })
        }
    }

    fn make_scheduler(store: Arc<MemoryStore>) -> SchedulerLoop {
        let evaluator = TriggerEvaluator::new().with_probe(Arc::new(AlwaysIdleProbe));
        SchedulerLoop::new(store.clone(), store, evaluator)
    }

    #[test]
    fn new_scheduler_is_stopped() {
        let scheduler = make_scheduler(Arc::new(MemoryStore::new()));
        assert_eq!(scheduler.state(), LifecycleState::Stopped);
    }

    #[test]
    fn claim_minute_dedupes_within_a_minute() {
        let scheduler = make_scheduler(Arc::new(MemoryStore::new()));
        assert!(scheduler.claim_minute("09:00"));
        assert!(!scheduler.claim_minute("09:00"));
        assert!(scheduler.claim_minute("09:01"));
        assert!(!scheduler.claim_minute("09:01"));
    }

    #[test]
    fn local_minute_key_is_hh_mm() {
        let key = local_minute_key();
        assert_eq!(key.len(), 5);
        assert_eq!(key.as_bytes()[2], b':');
    }

    #[tokio::test]
    async fn cycle_appends_one_record_per_due_trigger() {
        let store = Arc::new(MemoryStore::new());
        store.insert_trigger(Trigger::new(Platform::Github, "alice", "09:00"));
        store.insert_trigger(Trigger::new(Platform::Github, "bob", "09:00"));
        store.insert_trigger(Trigger::new(Platform::Github, "carol", "09:01"));

        let scheduler = make_scheduler(store.clone());
        scheduler.run_cycle("09:00").await;

        let records = store.records();
        assert_eq!(records.len(), 2);
        let users: Vec<&str> = records.iter().map(|r| r.username.as_str()).collect();
        assert!(users.contains(&"alice"));
        assert!(users.contains(&"bob"));
    }

    #[tokio::test]
    async fn disabled_triggers_never_produce_records() {
        let store = Arc::new(MemoryStore::new());
        let mut trigger = Trigger::new(Platform::Github, "alice", "09:00");
        trigger.enabled = false;
        store.insert_trigger(trigger);

        let scheduler = make_scheduler(store.clone());
        scheduler.run_cycle("09:00").await;

        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let scheduler = make_scheduler(Arc::new(MemoryStore::new()));
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn run_stops_on_signal_and_restores_stopped_state() {
        let store = Arc::new(MemoryStore::new());
        let scheduler =
            Arc::new(make_scheduler(store).with_check_interval(Duration::from_millis(10)));

        let runner = scheduler.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(scheduler.state(), LifecycleState::Running);

        scheduler.stop();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop exits after stop")
            .expect("loop task not panicked");
        assert_eq!(scheduler.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn run_evaluates_current_minute_once_across_ticks() {
        let store = Arc::new(MemoryStore::new());
        store.insert_trigger(Trigger::new(Platform::Github, "alice", local_minute_key()));
        // Cover a wall-clock rollover mid-test: the next minute is also armed.
        let next_minute = (Local::now() + chrono::Duration::minutes(1))
            .format("%H:%M")
            .to_string();
        store.insert_trigger(Trigger::new(Platform::Github, "alice", next_minute));

        let scheduler =
            Arc::new(make_scheduler(store.clone()).with_check_interval(Duration::from_millis(5)));

        let runner = scheduler.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        // Many sub-minute ticks elapse; the minute must be evaluated once.
        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.stop();
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;

        // At most one extra record if the wall clock rolled over mid-test.
        let count = store.records().len();
        assert!((1..=2).contains(&count), "evaluated {count} times");
    }
}
