//! Trigger and notification-record domain types.
//!
//! A [`Trigger`] names a platform, a username, and a wall-clock minute at
//! which to check for activity. Evaluating one trigger in one cycle yields
//! one [`NotificationRecord`], an entry in the append-only ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracked activity platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub commit activity (push events).
    Github,
    /// LeetCode daily coding challenge.
    Leetcode,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Github => write!(f, "github"),
            Self::Leetcode => write!(f, "leetcode"),
        }
    }
}

/// A user-defined reminder rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    /// Opaque unique identifier, assigned at creation.
    pub id: String,
    /// Platform to check.
    pub platform: Platform,
    /// Username on the platform.
    pub username: String,
    /// Wall-clock minute to fire at, `"HH:MM"` 24h, server-local time.
    pub trigger_time: String,
    /// Disabled triggers are never selected.
    pub enabled: bool,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

impl Trigger {
    /// Create an enabled trigger with a generated id.
    pub fn new(
        platform: Platform,
        username: impl Into<String>,
        trigger_time: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            platform,
            username: username.into(),
            trigger_time: trigger_time.into(),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` if this trigger should be evaluated at `minute`.
    ///
    /// Matching is exact `"HH:MM"` equality, not a range.
    pub fn is_due_at(&self, minute: &str) -> bool {
        self.enabled && self.trigger_time == minute
    }
}

/// Outcome of evaluating one trigger in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Activity absent today; a reminder should go out.
    Fired {
        /// Human-readable reminder text.
        message: String,
    },
    /// Activity already happened today; no reminder needed.
    Completed,
    /// The probe failed; the failure is recorded, not raised.
    Error {
        /// Stable probe error code (e.g. `"TRANSPORT_ERROR"`).
        code: String,
        /// Failure description.
        message: String,
    },
}

/// Durable outcome of evaluating one trigger in one cycle.
///
/// Records reference their trigger by id only; the trigger may be deleted
/// independently and the ledger entry survives. Never mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Id of the evaluated trigger.
    pub trigger_id: String,
    /// Username at evaluation time.
    pub username: String,
    /// Platform at evaluation time.
    pub platform: Platform,
    /// When the evaluation ran.
    pub checked_at: DateTime<Utc>,
    /// What the evaluation decided.
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn new_trigger_has_correct_defaults() {
        let trigger = Trigger::new(Platform::Github, "alice", "09:00");
        assert!(!trigger.id.is_empty());
        assert_eq!(trigger.username, "alice");
        assert_eq!(trigger.trigger_time, "09:00");
        assert!(trigger.enabled);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Trigger::new(Platform::Github, "alice", "09:00");
        let b = Trigger::new(Platform::Github, "alice", "09:00");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn is_due_at_exact_minute() {
        let trigger = Trigger::new(Platform::Github, "alice", "09:00");
        assert!(trigger.is_due_at("09:00"));
    }

    #[test]
    fn is_due_at_is_not_a_range() {
        let trigger = Trigger::new(Platform::Github, "alice", "09:01");
        assert!(!trigger.is_due_at("09:00"));
        assert!(!trigger.is_due_at("09:02"));
    }

    #[test]
    fn is_due_at_false_when_disabled() {
        let mut trigger = Trigger::new(Platform::Github, "alice", "09:00");
        trigger.enabled = false;
        assert!(!trigger.is_due_at("09:00"));
    }

    #[test]
    fn platform_display() {
        assert_eq!(Platform::Github.to_string(), "github");
        assert_eq!(Platform::Leetcode.to_string(), "leetcode");
    }

    #[test]
    fn platform_serde_lowercase() {
        let json = serde_json::to_string(&Platform::Leetcode).unwrap();
        assert_eq!(json, "\"leetcode\"");
        let restored: Platform = serde_json::from_str("\"github\"").unwrap();
        assert_eq!(restored, Platform::Github);
    }

    #[test]
    fn outcome_serde_tagged() {
        let fired = Outcome::Fired {
            message: "go code".to_owned(),
        };
        let json = serde_json::to_value(&fired).unwrap();
        assert_eq!(json["status"], "fired");
        assert_eq!(json["message"], "go code");

        let completed = serde_json::to_value(Outcome::Completed).unwrap();
        assert_eq!(completed["status"], "completed");

        let error = Outcome::Error {
            code: "TRANSPORT_ERROR".to_owned(),
            message: "connection refused".to_owned(),
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "TRANSPORT_ERROR");
    }

    #[test]
    fn record_serde_round_trip() {
        let record = NotificationRecord {
            trigger_id: "t-1".to_owned(),
            username: "alice".to_owned(),
            platform: Platform::Leetcode,
            checked_at: Utc::now(),
            outcome: Outcome::Completed,
        };
        let json = serde_json::to_string(&record).unwrap();
        let restored: NotificationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.trigger_id, "t-1");
        assert_eq!(restored.platform, Platform::Leetcode);
        assert_eq!(restored.outcome, Outcome::Completed);
    }
}
