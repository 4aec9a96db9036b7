//! GitHub API client
//!
//! Thin, rate-aware wrapper over the GitHub REST API. All reads the pipeline
//! needs go through the [`RepositoryApi`] trait so tests and alternative
//! hosts can substitute their own implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::{
    ContentEntry, ContentFile, ContributorSummary, IssueSummary, PullSummary, ReleaseSummary,
    RepoMetadata,
};

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw";

/// Alternate README locations probed when `GET /readme` fails
const README_FALLBACKS: &[&str] = &["readme.md", "README.md", "Readme.md"];

/// Errors from the repository API
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The API signalled rate limiting (429, or 403 with a rate-limit body)
    #[error("GitHub API rate limit reached")]
    RateLimited,
    /// Any other non-success status
    #[error("GitHub API error: {status} {message}")]
    Status { status: u16, message: String },
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Read operations against a remote source-hosting API
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    async fn get_repo(&self, repo: &str) -> Result<RepoMetadata, GitHubError>;
    async fn get_readme(&self, repo: &str) -> Result<String, GitHubError>;
    async fn get_languages(&self, repo: &str) -> Result<BTreeMap<String, u64>, GitHubError>;
    async fn list_issues(&self, repo: &str) -> Result<Vec<IssueSummary>, GitHubError>;
    async fn list_pulls(&self, repo: &str) -> Result<Vec<PullSummary>, GitHubError>;
    async fn list_releases(&self, repo: &str) -> Result<Vec<ReleaseSummary>, GitHubError>;
    async fn list_contributors(&self, repo: &str) -> Result<Vec<ContributorSummary>, GitHubError>;
    /// List the immediate children of a directory (empty path = root)
    async fn list_dir(&self, repo: &str, path: &str) -> Result<Vec<ContentEntry>, GitHubError>;
    /// Fetch a file's raw text, optionally truncated to `limit` characters
    async fn get_file_text(
        &self,
        repo: &str,
        path: &str,
        limit: Option<usize>,
    ) -> Result<String, GitHubError>;
}

/// Classify a non-success response into a typed error
fn classify_failure(status: u16, body: &str) -> GitHubError {
    if status == 429 || (status == 403 && body.to_lowercase().contains("rate limit")) {
        return GitHubError::RateLimited;
    }
    GitHubError::Status {
        status,
        message: body.to_string(),
    }
}

/// GitHub REST API client
pub struct GitHubClient {
    base_url: String,
    token: Option<String>,
    client: Client,
    content_timeout: Duration,
}

impl GitHubClient {
    /// Create a client from application configuration
    pub fn new(config: &Config) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.github_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.github_api_url.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
            client,
            content_timeout: Duration::from_secs(config.content_timeout_secs),
        })
    }

    fn get(&self, url: &str, accept: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }
        request
    }

    /// Resolve a response to itself on success, or a typed error otherwise
    async fn ensure_success(response: Response) -> Result<Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, GitHubError> {
        let response = self.get(url, ACCEPT_JSON).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RepositoryApi for GitHubClient {
    async fn get_repo(&self, repo: &str) -> Result<RepoMetadata, GitHubError> {
        debug!(repo, "fetching repository metadata");
        self.get_json(&format!("{}/repos/{repo}", self.base_url)).await
    }

    async fn get_readme(&self, repo: &str) -> Result<String, GitHubError> {
        let url = format!("{}/repos/{repo}/readme", self.base_url);
        let response = self.get(&url, ACCEPT_RAW).send().await?;
        if response.status().is_success() {
            return Ok(response.text().await?);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        // Some repositories keep their README at a nonstandard casing; probe
        // the contents endpoint before giving up
        debug!(repo, status, "no standard README, trying alternate locations");
        for name in README_FALLBACKS {
            let url = format!("{}/repos/{repo}/contents/{name}", self.base_url);
            let Ok(response) = self.get(&url, ACCEPT_JSON).send().await else {
                continue;
            };
            if !response.status().is_success() {
                continue;
            }
            let Ok(file) = response.json::<ContentFile>().await else {
                continue;
            };
            if file.encoding.as_deref() == Some("base64") {
                if let Some(content) = file.content {
                    let packed: String = content.split_whitespace().collect();
                    if let Ok(bytes) = STANDARD.decode(packed) {
                        return Ok(String::from_utf8_lossy(&bytes).into_owned());
                    }
                }
            }
        }

        Err(classify_failure(status, &body))
    }

    async fn get_languages(&self, repo: &str) -> Result<BTreeMap<String, u64>, GitHubError> {
        self.get_json(&format!("{}/repos/{repo}/languages", self.base_url))
            .await
    }

    async fn list_issues(&self, repo: &str) -> Result<Vec<IssueSummary>, GitHubError> {
        // Up to three pages of ten to bound API usage on busy repositories
        let mut issues = Vec::new();
        for page in 1..=3 {
            let url = format!(
                "{}/repos/{repo}/issues?state=all&per_page=10&page={page}",
                self.base_url
            );
            let page_items: Vec<IssueSummary> = self.get_json(&url).await?;
            let count = page_items.len();
            issues.extend(page_items);
            if count < 10 {
                break;
            }
        }
        Ok(issues)
    }

    async fn list_pulls(&self, repo: &str) -> Result<Vec<PullSummary>, GitHubError> {
        self.get_json(&format!(
            "{}/repos/{repo}/pulls?state=all&per_page=10",
            self.base_url
        ))
        .await
    }

    async fn list_releases(&self, repo: &str) -> Result<Vec<ReleaseSummary>, GitHubError> {
        self.get_json(&format!("{}/repos/{repo}/releases?per_page=10", self.base_url))
            .await
    }

    async fn list_contributors(&self, repo: &str) -> Result<Vec<ContributorSummary>, GitHubError> {
        self.get_json(&format!(
            "{}/repos/{repo}/contributors?per_page=15",
            self.base_url
        ))
        .await
    }

    async fn list_dir(&self, repo: &str, path: &str) -> Result<Vec<ContentEntry>, GitHubError> {
        let url = format!("{}/repos/{repo}/contents/{path}", self.base_url);
        let response = self.get(&url, ACCEPT_JSON).send().await?;
        let response = Self::ensure_success(response).await?;

        // The contents endpoint returns an array for directories but a bare
        // object when the path is a single file
        let value: serde_json::Value = response.json().await?;
        let entries = if value.is_array() {
            serde_json::from_value(value)
        } else {
            serde_json::from_value(value).map(|entry| vec![entry])
        };
        entries.map_err(|e| GitHubError::Status {
            status: 200,
            message: format!("unexpected contents payload: {e}"),
        })
    }

    async fn get_file_text(
        &self,
        repo: &str,
        path: &str,
        limit: Option<usize>,
    ) -> Result<String, GitHubError> {
        let url = format!("{}/repos/{repo}/contents/{path}", self.base_url);
        let response = self
            .get(&url, ACCEPT_RAW)
            .timeout(self.content_timeout)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        Ok(match limit {
            Some(limit) if text.chars().count() > limit => text.chars().take(limit).collect(),
            _ => text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_classifies_as_rate_limited() {
        assert!(matches!(
            classify_failure(429, "slow down"),
            GitHubError::RateLimited
        ));
    }

    #[test]
    fn status_403_with_rate_limit_body_classifies_as_rate_limited() {
        assert!(matches!(
            classify_failure(403, "API rate limit exceeded for ..."),
            GitHubError::RateLimited
        ));
    }

    #[test]
    fn status_403_without_rate_limit_body_is_a_plain_status_error() {
        assert!(matches!(
            classify_failure(403, "Resource not accessible"),
            GitHubError::Status { status: 403, .. }
        ));
    }

    #[test]
    fn status_404_is_a_plain_status_error() {
        match classify_failure(404, "Not Found") {
            GitHubError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }
}
