pub mod chat;
pub mod github;
pub mod snapshot;

pub use chat::{ChatRequest, ChatResponse, RepoInfoRequest, RepoInfoResponse};
pub use github::{
    ContentEntry, ContentFile, ContributorSummary, IssueSummary, PullSummary, ReleaseSummary,
    RepoMetadata,
};
pub use snapshot::{EntryType, FileContentRecord, FileEntry, MediaFile, RepositorySnapshot};
