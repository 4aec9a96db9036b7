pub mod assembler;
pub mod auth;
pub mod conversation;
pub mod crawler;
pub mod fetcher;
pub mod filetypes;
pub mod github;
pub mod invoker;
pub mod snapshot;

pub use assembler::{AssemblerLimits, ContextAssembler};
pub use auth::caller_id_from_bearer;
pub use conversation::{
    ConversationRecord, ConversationStore, ConversationStoreError, InMemoryConversationStore,
};
pub use crawler::{CrawlerConfig, TreeCrawler};
pub use fetcher::{ContentFetcher, FetcherConfig};
pub use github::{GitHubClient, GitHubError, RepositoryApi};
pub use invoker::{
    AnthropicClient, ChatCompletionApi, ChatCompletionRequest, ChatCompletionResponse,
    ChatMessage, ContentBlock, ModelApiError, ModelInvoker, RetryPolicy,
};
pub use snapshot::{SnapshotBuilder, SnapshotError};
