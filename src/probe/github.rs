//! GitHub commit-activity probe.
//!
//! Queries the public events feed for a user and counts the commits from
//! `PushEvent`s that landed on or after UTC midnight. "Today" is the UTC
//! calendar day at evaluation time, regardless of the trigger's local
//! wall-clock minute.

use crate::config::GithubConfig;
use crate::probe::{ActivityDetail, ActivityProbe, CommitInfo, DailyActivity, ProbeError};
use crate::trigger::Platform;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use serde::Deserialize;
use tracing::{debug, error};

/// Events fetched per request; the feed caps out at 100.
const EVENTS_PER_PAGE: u32 = 100;

/// GitHub commit-activity probe.
pub struct GithubProbe {
    config: GithubConfig,
    client: reqwest::Client,
}

/// Relevant slice of a GitHub event.
#[derive(Debug, Deserialize)]
struct UserEvent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    repo: Option<EventRepo>,
    #[serde(default)]
    payload: EventPayload,
}

#[derive(Debug, Deserialize)]
struct EventRepo {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct EventPayload {
    #[serde(default)]
    commits: Vec<PushCommit>,
}

#[derive(Debug, Deserialize)]
struct PushCommit {
    #[serde(default)]
    sha: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    author: CommitAuthor,
}

#[derive(Debug, Default, Deserialize)]
struct CommitAuthor {
    #[serde(default)]
    name: String,
}

impl GithubProbe {
    /// Create a new probe from explicit configuration.
    pub fn new(config: GithubConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// Returns a reference to the probe configuration.
    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// Fetch the first page of recent public events for `username`.
    async fn fetch_events(&self, username: &str) -> Result<Vec<UserEvent>, ProbeError> {
        let url = format!("{}/users/{username}/events", self.config.base_url);
        let per_page = EVENTS_PER_PAGE.to_string();
        let mut request = self
            .client
            .get(&url)
            .query(&[("page", "1"), ("per_page", per_page.as_str())])
            .header("accept", "application/vnd.github+json")
            .header("x-github-api-version", "2022-11-28")
            .header("user-agent", concat!("vigil/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "GitHub request failed");
            ProbeError::Transport(format!("connection error: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read body".into());
            error!(status = %status, body = %body, "GitHub request returned error");
            return Err(map_http_error(status, &body));
        }

        response
            .json::<Vec<UserEvent>>()
            .await
            .map_err(|e| ProbeError::Parse(format!("events payload: {e}")))
    }
}

/// Map HTTP error responses to classified probe errors.
fn map_http_error(status: reqwest::StatusCode, body: &str) -> ProbeError {
    let detail = extract_error_message(body);

    match status.as_u16() {
        404 => ProbeError::NotFound(detail),
        401 => ProbeError::Unauthorized(detail),
        // GitHub reports primary rate limiting as 403.
        403 | 429 => ProbeError::RateLimited(detail),
        _ => ProbeError::Upstream(format!("HTTP {status}: {detail}")),
    }
}

/// Extract the `message` field from a GitHub error body, falling back to
/// the raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                "no response body".to_owned()
            } else {
                body.chars().take(200).collect()
            }
        })
}

#[async_trait]
impl ActivityProbe for GithubProbe {
    fn platform(&self) -> Platform {
        Platform::Github
    }

    async fn check_today(&self, username: &str) -> Result<DailyActivity, ProbeError> {
        let today_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

        let events = self.fetch_events(username).await?;

        let mut commits = Vec::new();
        for event in events {
            if event.kind != "PushEvent" {
                continue;
            }
            let Some(event_date) = event.created_at else {
                continue;
            };
            if event_date < today_start {
                continue;
            }

            let repo = event.repo.map(|r| r.name).unwrap_or_default();
            for commit in event.payload.commits {
                let url = format!("https://github.com/{repo}/commit/{}", commit.sha);
                commits.push(CommitInfo {
                    sha: commit.sha,
                    message: commit.message,
                    author: commit.author.name,
                    repository: repo.clone(),
                    committed_at: event_date,
                    url,
                });
            }
        }

        debug!(username, commit_count = commits.len(), "GitHub activity checked");

        Ok(DailyActivity {
            activity_present: !commits.is_empty(),
            detail: ActivityDetail::Commits {
                count: commits.len(),
                commits,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn probe_answers_for_github() {
        let probe = GithubProbe::new(GithubConfig::default());
        assert_eq!(probe.platform(), Platform::Github);
    }

    #[test]
    fn config_accessible() {
        let probe = GithubProbe::new(GithubConfig::default().with_token("ghp_x"));
        assert_eq!(probe.config().token.as_deref(), Some("ghp_x"));
    }

    #[test]
    fn http_error_404_is_not_found() {
        let err = map_http_error(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"message":"Not Found"}"#,
        );
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.message(), "Not Found");
    }

    #[test]
    fn http_error_401_is_unauthorized() {
        let err = map_http_error(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"message":"Bad credentials"}"#,
        );
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn http_error_403_is_rate_limited() {
        let err = map_http_error(
            reqwest::StatusCode::FORBIDDEN,
            r#"{"message":"API rate limit exceeded"}"#,
        );
        assert_eq!(err.code(), "RATE_LIMITED");
    }

    #[test]
    fn http_error_429_is_rate_limited() {
        let err = map_http_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err.code(), "RATE_LIMITED");
    }

    #[test]
    fn http_error_500_is_upstream() {
        let err = map_http_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.code(), "UPSTREAM_ERROR");
        assert!(err.message().contains("no response body"));
    }

    #[test]
    fn extract_error_from_json() {
        assert_eq!(
            extract_error_message(r#"{"message":"Not Found"}"#),
            "Not Found"
        );
    }

    #[test]
    fn extract_error_from_non_json() {
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn event_deserializes_with_missing_fields() {
        let event: UserEvent = serde_json::from_str(r#"{"type":"WatchEvent"}"#).unwrap();
        assert_eq!(event.kind, "WatchEvent");
        assert!(event.created_at.is_none());
        assert!(event.payload.commits.is_empty());
    }
}
