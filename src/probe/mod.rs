//! Platform activity probes.
//!
//! A probe answers one question: did the tracked daily action happen today
//! for a given username? Each probe is a stateless adapter over a
//! third-party HTTP API with its failures classified into [`ProbeError`].

pub mod github;
pub mod leetcode;

pub use github::GithubProbe;
pub use leetcode::LeetCodeProbe;

use crate::trigger::Platform;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable error codes for probe failures.
///
/// These codes are preserved verbatim in notification records. Use them to
/// distinguish failures rather than parsing Display output.
pub mod error_codes {
    /// Username unknown upstream.
    pub const NOT_FOUND: &str = "NOT_FOUND";

    /// Upstream rate limit hit.
    pub const RATE_LIMITED: &str = "RATE_LIMITED";

    /// Bad or missing credential for the upstream API.
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";

    /// Network or connection failure.
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";

    /// Unexpected response shape or status from the upstream.
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";

    /// Malformed payload that could not be decoded.
    pub const PARSE_FAILURE: &str = "PARSE_FAILURE";
}

/// Errors produced by platform probes.
///
/// Probe errors never propagate as process failures; the evaluator folds
/// them into an error-outcome notification record. The Display impl formats
/// as `[CODE] message`.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Username unknown upstream.
    #[error("[{}] {}", error_codes::NOT_FOUND, .0)]
    NotFound(String),

    /// Upstream rate limit hit.
    #[error("[{}] {}", error_codes::RATE_LIMITED, .0)]
    RateLimited(String),

    /// Bad or missing credential for the upstream API.
    #[error("[{}] {}", error_codes::UNAUTHORIZED, .0)]
    Unauthorized(String),

    /// Network or connection failure.
    #[error("[{}] {}", error_codes::TRANSPORT_ERROR, .0)]
    Transport(String),

    /// Unexpected response shape or status from the upstream.
    #[error("[{}] {}", error_codes::UPSTREAM_ERROR, .0)]
    Upstream(String),

    /// Malformed payload that could not be decoded.
    #[error("[{}] {}", error_codes::PARSE_FAILURE, .0)]
    Parse(String),
}

impl ProbeError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => error_codes::NOT_FOUND,
            Self::RateLimited(_) => error_codes::RATE_LIMITED,
            Self::Unauthorized(_) => error_codes::UNAUTHORIZED,
            Self::Transport(_) => error_codes::TRANSPORT_ERROR,
            Self::Upstream(_) => error_codes::UPSTREAM_ERROR,
            Self::Parse(_) => error_codes::PARSE_FAILURE,
        }
    }

    /// Returns the failure description without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::RateLimited(m)
            | Self::Unauthorized(m)
            | Self::Transport(m)
            | Self::Upstream(m)
            | Self::Parse(m) => m,
        }
    }
}

/// Result of one activity check, produced fresh on every evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyActivity {
    /// `true` if the tracked action already happened today.
    pub activity_present: bool,
    /// Platform-specific payload, advisory only; feeds the reminder text.
    pub detail: ActivityDetail,
}

/// Platform-specific activity payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityDetail {
    /// Commits pushed today.
    Commits {
        /// Number of commits counted.
        count: usize,
        /// The commits themselves.
        commits: Vec<CommitInfo>,
    },
    /// Today's daily challenge.
    Challenge {
        /// Problem title.
        title: String,
        /// Problem difficulty label.
        difficulty: String,
        /// Challenge date, `YYYY-MM-DD`.
        date: String,
    },
}

/// One commit extracted from a push event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit SHA.
    pub sha: String,
    /// Commit message.
    pub message: String,
    /// Author name.
    pub author: String,
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Push event timestamp.
    pub committed_at: DateTime<Utc>,
    /// Web URL of the commit.
    pub url: String,
}

/// A stateless adapter that checks today's activity for a username.
#[async_trait]
pub trait ActivityProbe: Send + Sync {
    /// Platform this probe answers for.
    fn platform(&self) -> Platform;

    /// Check whether the tracked action happened today for `username`.
    async fn check_today(&self, username: &str) -> Result<DailyActivity, ProbeError>;
}
