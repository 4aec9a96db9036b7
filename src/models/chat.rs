//! Request and response payloads at the handler boundary

use serde::{Deserialize, Serialize};

/// Request payload for `POST /chat`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub repo_path: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Response payload for `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub answer: String,
    pub conversation_id: String,
}

/// Request payload for `POST /repo-info`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfoRequest {
    #[serde(default)]
    pub repo_path: String,
}

/// Response payload for `POST /repo-info`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfoResponse {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
    pub language: String,
    pub url: String,
    pub topics: Vec<String>,
}
