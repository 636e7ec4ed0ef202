//! LeetCode daily-challenge probe.
//!
//! Fetches today's Problem of the Day via the public GraphQL endpoint.
//!
//! Per-user solved status requires an authenticated LeetCode session, which
//! this probe does not carry, so `activity_present` is always
//! reported as `false`. This is a limitation of the upstream data source,
//! not of the scheduling core, and a challenge trigger always either fires
//! or errors.

use crate::config::LeetCodeConfig;
use crate::probe::{ActivityDetail, ActivityProbe, DailyActivity, ProbeError};
use crate::trigger::Platform;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

/// GraphQL query for today's Problem of the Day.
const DAILY_CHALLENGE_QUERY: &str = r#"
query questionOfToday {
    activeDailyCodingChallengeQuestion {
        date
        userStatus
        link
        question {
            difficulty
            frontendQuestionId: questionFrontendId
            title
            titleSlug
        }
    }
}
"#;

/// The endpoint rejects requests without a browser-looking User-Agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// LeetCode daily-challenge probe.
pub struct LeetCodeProbe {
    config: LeetCodeConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "activeDailyCodingChallengeQuestion")]
    challenge: Option<ChallengeNode>,
}

#[derive(Debug, Deserialize)]
struct ChallengeNode {
    #[serde(default)]
    date: String,
    question: QuestionNode,
}

#[derive(Debug, Deserialize)]
struct QuestionNode {
    #[serde(default)]
    title: String,
    #[serde(default)]
    difficulty: String,
}

impl LeetCodeProbe {
    /// Create a new probe from explicit configuration.
    pub fn new(config: LeetCodeConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// Returns a reference to the probe configuration.
    pub fn config(&self) -> &LeetCodeConfig {
        &self.config
    }

    /// Fetch today's challenge from the GraphQL endpoint.
    async fn fetch_daily_challenge(&self) -> Result<ChallengeNode, ProbeError> {
        let url = format!("{}/graphql", self.config.base_url);
        let body = serde_json::json!({ "query": DAILY_CHALLENGE_QUERY });

        let response = self
            .client
            .post(&url)
            .header("user-agent", USER_AGENT)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "LeetCode request failed");
                ProbeError::Transport(format!("connection error: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "LeetCode request returned error");
            return Err(ProbeError::Upstream(format!(
                "GraphQL endpoint returned HTTP {status}"
            )));
        }

        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::Parse(format!("challenge payload: {e}")))?;

        parsed
            .data
            .and_then(|d| d.challenge)
            .ok_or_else(|| ProbeError::Upstream("no daily challenge data in response".to_owned()))
    }
}

#[async_trait]
impl ActivityProbe for LeetCodeProbe {
    fn platform(&self) -> Platform {
        Platform::Leetcode
    }

    async fn check_today(&self, username: &str) -> Result<DailyActivity, ProbeError> {
        let challenge = self.fetch_daily_challenge().await?;

        debug!(
            username,
            title = %challenge.question.title,
            date = %challenge.date,
            "LeetCode daily challenge fetched"
        );

        // Solved status is invisible without a user session; see module docs.
        Ok(DailyActivity {
            activity_present: false,
            detail: ActivityDetail::Challenge {
                title: challenge.question.title,
                difficulty: challenge.question.difficulty,
                date: challenge.date,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn probe_answers_for_leetcode() {
        let probe = LeetCodeProbe::new(LeetCodeConfig::default());
        assert_eq!(probe.platform(), Platform::Leetcode);
    }

    #[test]
    fn query_names_the_daily_challenge_operation() {
        assert!(DAILY_CHALLENGE_QUERY.contains("questionOfToday"));
        assert!(DAILY_CHALLENGE_QUERY.contains("activeDailyCodingChallengeQuestion"));
    }

    #[test]
    fn response_parses_challenge_node() {
        let raw = r#"{
            "data": {
                "activeDailyCodingChallengeQuestion": {
                    "date": "2025-03-01",
                    "userStatus": "NotStart",
                    "link": "/problems/two-sum/",
                    "question": {
                        "difficulty": "Easy",
                        "frontendQuestionId": "1",
                        "title": "Two Sum",
                        "titleSlug": "two-sum"
                    }
                }
            }
        }"#;
        let parsed: GraphqlResponse = serde_json::from_str(raw).unwrap();
        let challenge = parsed.data.unwrap().challenge.unwrap();
        assert_eq!(challenge.date, "2025-03-01");
        assert_eq!(challenge.question.title, "Two Sum");
        assert_eq!(challenge.question.difficulty, "Easy");
    }

    #[test]
    fn response_tolerates_null_data() {
        let parsed: GraphqlResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(parsed.data.is_none());
    }
}
