//! Trigger evaluation: one trigger in, one notification record out.

use crate::probe::{ActivityDetail, ActivityProbe, DailyActivity, ProbeError, error_codes};
use crate::trigger::{NotificationRecord, Outcome, Platform, Trigger};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Code recorded when a trigger names a platform with no registered probe.
pub const CODE_UNSUPPORTED_PLATFORM: &str = "UNSUPPORTED_PLATFORM";

/// Default ceiling for a single probe call.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns one [`Trigger`] into one [`NotificationRecord`].
///
/// The evaluator trusts the caller's selection (it does not re-check
/// `enabled`) and never touches the stores; its only side effect is the
/// probe's network call. Every probe failure becomes an error outcome,
/// never a propagated error.
pub struct TriggerEvaluator {
    probes: HashMap<Platform, Arc<dyn ActivityProbe>>,
    probe_timeout: Duration,
}

impl TriggerEvaluator {
    /// Create an evaluator with no probes registered.
    pub fn new() -> Self {
        Self {
            probes: HashMap::new(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Register a probe for its platform, replacing any existing one.
    pub fn with_probe(mut self, probe: Arc<dyn ActivityProbe>) -> Self {
        self.probes.insert(probe.platform(), probe);
        self
    }

    /// Override the per-probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Evaluate one trigger, producing the record to append.
    pub async fn evaluate(&self, trigger: &Trigger) -> NotificationRecord {
        let outcome = self.check(trigger).await;
        NotificationRecord {
            trigger_id: trigger.id.clone(),
            username: trigger.username.clone(),
            platform: trigger.platform,
            checked_at: Utc::now(),
            outcome,
        }
    }

    async fn check(&self, trigger: &Trigger) -> Outcome {
        let Some(probe) = self.probes.get(&trigger.platform) else {
            return Outcome::Error {
                code: CODE_UNSUPPORTED_PLATFORM.to_owned(),
                message: format!("no probe registered for platform '{}'", trigger.platform),
            };
        };

        let checked =
            tokio::time::timeout(self.probe_timeout, probe.check_today(&trigger.username)).await;

        match checked {
            Ok(Ok(activity)) => decide(trigger, &activity),
            Ok(Err(e)) => {
                warn!(
                    username = %trigger.username,
                    platform = %trigger.platform,
                    error = %e,
                    "probe failed"
                );
                Outcome::Error {
                    code: e.code().to_owned(),
                    message: e.message().to_owned(),
                }
            }
            Err(_) => {
                warn!(
                    username = %trigger.username,
                    platform = %trigger.platform,
                    timeout_secs = self.probe_timeout.as_secs(),
                    "probe timed out"
                );
                Outcome::Error {
                    code: error_codes::TRANSPORT_ERROR.to_owned(),
                    message: format!(
                        "probe timed out after {}s",
                        self.probe_timeout.as_secs()
                    ),
                }
            }
        }
    }
}

impl Default for TriggerEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold a successful probe result into a fired/completed outcome.
fn decide(trigger: &Trigger, activity: &DailyActivity) -> Outcome {
    if activity.activity_present {
        info!(
            username = %trigger.username,
            platform = %trigger.platform,
            "activity already done today"
        );
        return Outcome::Completed;
    }

    let message = reminder_message(&trigger.username, &activity.detail);
    info!(
        username = %trigger.username,
        platform = %trigger.platform,
        "reminder fired"
    );
    Outcome::Fired { message }
}

/// Build the reminder text for a missing activity.
fn reminder_message(username: &str, detail: &ActivityDetail) -> String {
    match detail {
        ActivityDetail::Commits { .. } => {
            format!("Hey {username}! You haven't made any commits today. Time to code!")
        }
        ActivityDetail::Challenge { title, .. } => {
            format!("Hey {username}! Today's daily challenge '{title}' is still waiting for you.")
        }
    }
}
