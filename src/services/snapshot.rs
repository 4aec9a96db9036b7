//! Snapshot Builder
//!
//! Gathers everything known about a repository for one request: metadata
//! first (a non-success answer aborts the pipeline with the upstream
//! status), then the optional metadata sections, the tree crawl, the
//! content fetch, and finally the derived media-file listing.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::crawler::{CrawlerConfig, TreeCrawler};
use super::fetcher::{ContentFetcher, FetcherConfig};
use super::filetypes::media_type;
use super::github::{GitHubError, RepositoryApi};
use crate::models::{EntryType, MediaFile, RepositorySnapshot};

/// Errors that abort snapshot construction
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The repository metadata request answered with a non-success status
    #[error("GitHub API error: {message}")]
    Upstream { status: u16, message: String },
    /// Transport-level failure before any metadata was obtained
    #[error("GitHub API unreachable: {0}")]
    Unreachable(String),
}

/// Builds one immutable [`RepositorySnapshot`] per request
pub struct SnapshotBuilder {
    api: Arc<dyn RepositoryApi>,
    crawler_config: CrawlerConfig,
    fetcher_config: FetcherConfig,
}

impl SnapshotBuilder {
    pub fn new(api: Arc<dyn RepositoryApi>) -> Self {
        Self {
            api,
            crawler_config: CrawlerConfig::default(),
            fetcher_config: FetcherConfig::default(),
        }
    }

    pub fn with_configs(
        api: Arc<dyn RepositoryApi>,
        crawler_config: CrawlerConfig,
        fetcher_config: FetcherConfig,
    ) -> Self {
        Self {
            api,
            crawler_config,
            fetcher_config,
        }
    }

    /// Gather all repository data for one question.
    ///
    /// Only the initial metadata read can fail the build; every later stage
    /// degrades to "less context" and continues.
    pub async fn build(&self, repo: &str) -> Result<RepositorySnapshot, SnapshotError> {
        let mut snapshot = RepositorySnapshot::default();

        snapshot.info = match self.api.get_repo(repo).await {
            Ok(info) => info,
            Err(GitHubError::RateLimited) => {
                return Err(SnapshotError::Upstream {
                    status: 429,
                    message: "GitHub API rate limit reached".to_string(),
                })
            }
            Err(GitHubError::Status { status, message }) => {
                return Err(SnapshotError::Upstream { status, message })
            }
            Err(GitHubError::Http(e)) => return Err(SnapshotError::Unreachable(e.to_string())),
        };
        info!(repo, full_name = ?snapshot.info.full_name, "fetched repository metadata");

        match self.api.get_readme(repo).await {
            Ok(readme) => {
                debug!(repo, chars = readme.len(), "fetched README");
                snapshot.readme = Some(readme);
            }
            Err(e) => debug!(repo, error = %e, "no README available"),
        }

        match self.api.get_languages(repo).await {
            Ok(languages) => snapshot.languages = languages,
            Err(e) => warn!(repo, error = %e, "failed to fetch languages"),
        }

        match self.api.list_issues(repo).await {
            Ok(mut issues) => {
                // The issues endpoint mixes in pull requests; drop anything
                // carrying the pull-request marker
                issues.retain(|issue| issue.pull_request.is_none());
                snapshot.issues = issues;
            }
            Err(e) => warn!(repo, error = %e, "failed to fetch issues"),
        }

        match self.api.list_pulls(repo).await {
            Ok(pulls) => snapshot.pull_requests = pulls,
            Err(e) => warn!(repo, error = %e, "failed to fetch pull requests"),
        }

        match self.api.list_releases(repo).await {
            Ok(releases) => snapshot.releases = releases,
            Err(e) => warn!(repo, error = %e, "failed to fetch releases"),
        }

        match self.api.list_contributors(repo).await {
            Ok(contributors) => snapshot.contributors = contributors,
            Err(e) => warn!(repo, error = %e, "failed to fetch contributors"),
        }

        let crawler = TreeCrawler::with_config(self.api.clone(), self.crawler_config.clone());
        snapshot.file_structure = crawler.crawl(repo).await;
        info!(repo, entries = snapshot.file_structure.len(), "crawled file structure");

        let fetcher = ContentFetcher::with_config(self.api.clone(), self.fetcher_config.clone());
        snapshot.file_contents = fetcher.fetch(repo, &snapshot.file_structure).await;
        info!(repo, files = snapshot.file_contents.len(), "fetched file contents");

        snapshot.media_files = snapshot
            .file_structure
            .values()
            .filter(|entry| entry.entry_type == EntryType::File)
            .filter_map(|entry| {
                media_type(&entry.path).map(|kind| MediaFile {
                    path: entry.path.clone(),
                    name: entry.name.clone(),
                    media_type: kind.to_string(),
                    url: entry.url.clone(),
                })
            })
            .collect();
        debug!(repo, media = snapshot.media_files.len(), "derived media files");

        Ok(snapshot)
    }
}
