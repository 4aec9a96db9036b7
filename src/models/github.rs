//! Typed GitHub REST API response shapes
//!
//! Every field the upstream API may omit is modeled as optional or defaulted
//! rather than relying on implicit absence.

use serde::Deserialize;

/// Repository metadata from `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoMetadata {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    pub language: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Issue from `GET /repos/{owner}/{repo}/issues`
///
/// The issues endpoint also returns pull requests; those carry a
/// `pull_request` marker object and are filtered out downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSummary {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    pub pull_request: Option<serde_json::Value>,
}

/// Pull request from `GET /repos/{owner}/{repo}/pulls`
#[derive(Debug, Clone, Deserialize)]
pub struct PullSummary {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
}

/// Release from `GET /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSummary {
    pub tag_name: Option<String>,
    pub name: Option<String>,
}

/// Contributor from `GET /repos/{owner}/{repo}/contributors`
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorSummary {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub contributions: u64,
}

/// Directory entry from `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type", default)]
    pub entry_type: String,
    #[serde(default)]
    pub size: u64,
    pub html_url: Option<String>,
}

/// File object from the contents endpoint when a single file is requested
/// with the JSON accept header (used by the README fallback path)
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub encoding: Option<String>,
    pub content: Option<String>,
}
