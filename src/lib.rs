//! GitSage - Repository Q&A Service
//!
//! This library provides the core services for answering natural-language
//! questions about GitHub repositories: a bounded crawl of repository
//! metadata, tree, and file contents, budget-constrained prompt assembly,
//! and resilient model invocation.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;

pub use models::{
    ChatRequest, ChatResponse, FileContentRecord, FileEntry, MediaFile, RepoInfoRequest,
    RepoInfoResponse, RepositorySnapshot,
};

pub use services::{
    AnthropicClient, ChatCompletionApi, ContentFetcher, ContextAssembler, ConversationStore,
    GitHubClient, InMemoryConversationStore, ModelInvoker, RepositoryApi, SnapshotBuilder,
    TreeCrawler,
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub repo_api: Arc<dyn RepositoryApi>,
    pub model_api: Arc<dyn ChatCompletionApi>,
    pub conversations: Arc<dyn ConversationStore>,
}
