//! Tree Crawler
//!
//! Breadth-first, non-recursive traversal of a repository's directory tree.
//! The crawl is bounded by a hard request ceiling so pathological trees cost
//! a known maximum of API calls; hitting the ceiling yields a partial tree,
//! which is a degraded result rather than an error.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::filetypes::is_binary_path;
use super::github::{GitHubError, RepositoryApi};
use crate::models::{EntryType, FileEntry};

/// Crawl limits and pacing
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Hard ceiling on directory-listing requests per crawl
    pub max_requests: u32,
    /// Self-imposed throttle: pause after every N requests
    pub throttle_every: u32,
    /// Length of the self-imposed throttle pause
    pub throttle_pause: Duration,
    /// Pause before retrying after an upstream rate-limit signal
    pub rate_limit_pause: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            throttle_every: 10,
            throttle_pause: Duration::from_secs(1),
            rate_limit_pause: Duration::from_secs(10),
        }
    }
}

/// Queue-based directory tree crawler
pub struct TreeCrawler {
    api: Arc<dyn RepositoryApi>,
    config: CrawlerConfig,
}

impl TreeCrawler {
    pub fn new(api: Arc<dyn RepositoryApi>) -> Self {
        Self {
            api,
            config: CrawlerConfig::default(),
        }
    }

    /// Create a crawler with custom limits (used by tests to zero the pauses)
    pub fn with_config(api: Arc<dyn RepositoryApi>, config: CrawlerConfig) -> Self {
        Self { api, config }
    }

    /// Populate a file-structure map with every reachable entry.
    ///
    /// `.git`-prefixed paths and binary extensions are excluded at crawl
    /// time. Directories that fail to list are skipped; only a rate-limit
    /// signal triggers a retry of the same directory.
    pub async fn crawl(&self, repo: &str) -> BTreeMap<String, FileEntry> {
        let mut structure = BTreeMap::new();
        let mut queue: VecDeque<(String, u32)> = VecDeque::from([(String::new(), 0)]);
        let mut requests = 0u32;

        while requests < self.config.max_requests {
            let Some((path, depth)) = queue.pop_front() else {
                break;
            };

            debug!(repo, path = %path, "listing directory");
            requests += 1;

            let entries = match self.api.list_dir(repo, &path).await {
                Ok(entries) => entries,
                Err(GitHubError::RateLimited) => {
                    warn!(repo, path = %path, "rate limit reached, waiting before retry");
                    queue.push_front((path, depth));
                    tokio::time::sleep(self.config.rate_limit_pause).await;
                    continue;
                }
                Err(e) => {
                    // Subtree is silently dropped
                    warn!(repo, path = %path, error = %e, "could not list directory, skipping");
                    continue;
                }
            };

            for entry in entries {
                if entry.path.starts_with(".git") || is_binary_path(&entry.path) {
                    continue;
                }

                let entry_type = match entry.entry_type.as_str() {
                    "dir" => EntryType::Dir,
                    _ => EntryType::File,
                };

                if entry_type == EntryType::Dir {
                    queue.push_back((entry.path.clone(), depth + 1));
                }

                structure.insert(
                    entry.path.clone(),
                    FileEntry {
                        name: entry.name,
                        path: entry.path,
                        entry_type,
                        size: entry.size,
                        url: entry.html_url,
                    },
                );
            }

            if requests % self.config.throttle_every == 0 {
                tokio::time::sleep(self.config.throttle_pause).await;
            }
        }

        if !queue.is_empty() {
            warn!(
                repo,
                requests,
                pending = queue.len(),
                "crawl request ceiling reached, returning partial tree"
            );
        }

        structure
    }
}
