//! Content Fetcher
//!
//! Selects a bounded, priority-ordered subset of the crawled files and
//! downloads their contents through a fixed-size worker pool. Three budgets
//! apply: a per-file size cap, a candidate-set cap, and an aggregate cap on
//! accepted content. Per-file failures degrade to "no content for this
//! path"; they are never fatal to the fetch as a whole.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::filetypes::{has_important_name, is_binary_path, is_priority_path};
use super::github::RepositoryApi;
use crate::models::{EntryType, FileContentRecord, FileEntry};

const TRUNCATION_NOTE: &str =
    "\n\n[FILE TRUNCATED] This file was too large to display completely.";

/// Fetch budgets and concurrency limits
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Number of top-priority candidates submitted for download
    pub max_candidates: usize,
    /// Size of the worker pool
    pub workers: usize,
    /// Files larger than this are downloaded via the truncated-read path
    pub per_file_cap: u64,
    /// Character count for a truncated read of an oversized file
    pub truncated_read_chars: usize,
    /// Files above this size start accruing a priority penalty
    pub size_penalty_threshold: u64,
    /// Stop accepting results once accepted content exceeds this many bytes
    pub max_total_bytes: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_candidates: 500,
            workers: 5,
            per_file_cap: 10 * 1024 * 1024,
            truncated_read_chars: 100_000,
            size_penalty_threshold: 500 * 1024,
            max_total_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Heuristic fetch priority for a file; higher scores download first
pub fn priority_score(path: &str, size: u64, config: &FetcherConfig) -> i64 {
    let mut score = 0i64;

    if is_priority_path(path) {
        score += 10;
    }
    if has_important_name(path) {
        score += 5;
    }
    if !path.contains('/') {
        score += 3;
    }
    if size > config.size_penalty_threshold {
        let size_mb = size as f64 / (1024.0 * 1024.0);
        score -= (size_mb * 2.0) as i64;
    }

    score
}

/// Bounded-parallelism file content fetcher
pub struct ContentFetcher {
    api: Arc<dyn RepositoryApi>,
    config: FetcherConfig,
}

impl ContentFetcher {
    pub fn new(api: Arc<dyn RepositoryApi>) -> Self {
        Self {
            api,
            config: FetcherConfig::default(),
        }
    }

    pub fn with_config(api: Arc<dyn RepositoryApi>, config: FetcherConfig) -> Self {
        Self { api, config }
    }

    /// Pick candidates from the file structure, highest priority first.
    ///
    /// Sorting is stable, so files with equal scores keep the structure
    /// map's iteration order.
    fn select_candidates<'a>(
        &self,
        structure: &'a BTreeMap<String, FileEntry>,
    ) -> Vec<&'a FileEntry> {
        let mut candidates: Vec<&FileEntry> = structure
            .values()
            .filter(|entry| entry.entry_type == EntryType::File)
            .filter(|entry| !is_binary_path(&entry.path))
            .collect();

        candidates.sort_by(|a, b| {
            priority_score(&b.path, b.size, &self.config)
                .cmp(&priority_score(&a.path, a.size, &self.config))
        });
        candidates.truncate(self.config.max_candidates);
        candidates
    }

    /// Download contents for the selected candidates.
    ///
    /// Results are collected in completion order. Once accepted content
    /// exceeds the aggregate cap no further results are accepted; fetches
    /// still in flight are dropped.
    pub async fn fetch(
        &self,
        repo: &str,
        structure: &BTreeMap<String, FileEntry>,
    ) -> BTreeMap<String, FileContentRecord> {
        let candidates = self.select_candidates(structure);
        debug!(repo, count = candidates.len(), "fetching file contents");

        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut join_set = JoinSet::new();

        for entry in candidates {
            let api = self.api.clone();
            let semaphore = semaphore.clone();
            let repo = repo.to_string();
            let path = entry.path.clone();
            let name = entry.name.clone();
            let size = entry.size;
            let limit = if size > self.config.per_file_cap {
                Some(self.config.truncated_read_chars)
            } else {
                None
            };

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = api.get_file_text(&repo, &path, limit).await;
                (path, name, size, limit.is_some(), result)
            });
        }

        let mut contents = BTreeMap::new();
        let mut total_bytes = 0usize;

        while let Some(joined) = join_set.join_next().await {
            let Ok((path, name, size, truncated, result)) = joined else {
                continue;
            };

            match result {
                Ok(mut text) => {
                    if truncated {
                        text.push_str(TRUNCATION_NOTE);
                    }
                    total_bytes += text.len();
                    contents.insert(
                        path,
                        FileContentRecord {
                            name,
                            content: text,
                            truncated,
                            size,
                        },
                    );
                    if total_bytes > self.config.max_total_bytes {
                        warn!(
                            repo,
                            total_bytes, "aggregate content cap reached, dropping in-flight fetches"
                        );
                        break;
                    }
                }
                Err(e) => {
                    warn!(repo, path = %path, error = %e, "failed to fetch file content");
                }
            }
        }

        debug!(repo, files = contents.len(), total_bytes, "content fetch complete");
        contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap as Map;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::super::github::GitHubError;
    use crate::models::{
        ContentEntry, ContributorSummary, IssueSummary, PullSummary, ReleaseSummary, RepoMetadata,
    };

    fn entry(path: &str, size: u64) -> FileEntry {
        FileEntry {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            entry_type: EntryType::File,
            size,
            url: None,
        }
    }

    fn structure_of(entries: Vec<FileEntry>) -> Map<String, FileEntry> {
        entries.into_iter().map(|e| (e.path.clone(), e)).collect()
    }

    /// Fake API that serves fixed content per path and can fail some paths
    struct FakeContentApi {
        contents: Map<String, String>,
        failing: Vec<String>,
        fetch_calls: AtomicU32,
    }

    impl FakeContentApi {
        fn new(contents: Map<String, String>) -> Self {
            Self {
                contents,
                failing: Vec::new(),
                fetch_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl RepositoryApi for FakeContentApi {
        async fn get_repo(&self, _repo: &str) -> Result<RepoMetadata, GitHubError> {
            unimplemented!("not used by the fetcher")
        }
        async fn get_readme(&self, _repo: &str) -> Result<String, GitHubError> {
            unimplemented!("not used by the fetcher")
        }
        async fn get_languages(&self, _repo: &str) -> Result<Map<String, u64>, GitHubError> {
            unimplemented!("not used by the fetcher")
        }
        async fn list_issues(&self, _repo: &str) -> Result<Vec<IssueSummary>, GitHubError> {
            unimplemented!("not used by the fetcher")
        }
        async fn list_pulls(&self, _repo: &str) -> Result<Vec<PullSummary>, GitHubError> {
            unimplemented!("not used by the fetcher")
        }
        async fn list_releases(&self, _repo: &str) -> Result<Vec<ReleaseSummary>, GitHubError> {
            unimplemented!("not used by the fetcher")
        }
        async fn list_contributors(
            &self,
            _repo: &str,
        ) -> Result<Vec<ContributorSummary>, GitHubError> {
            unimplemented!("not used by the fetcher")
        }
        async fn list_dir(
            &self,
            _repo: &str,
            _path: &str,
        ) -> Result<Vec<ContentEntry>, GitHubError> {
            unimplemented!("not used by the fetcher")
        }
        async fn get_file_text(
            &self,
            _repo: &str,
            path: &str,
            limit: Option<usize>,
        ) -> Result<String, GitHubError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|p| p == path) {
                return Err(GitHubError::Status {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            let text = self.contents.get(path).cloned().unwrap_or_default();
            Ok(match limit {
                Some(limit) if text.chars().count() > limit => {
                    text.chars().take(limit).collect()
                }
                _ => text,
            })
        }
    }

    #[test]
    fn priority_favors_docs_and_root_files() {
        let config = FetcherConfig::default();

        // Root README: priority extension + important name + root level
        assert_eq!(priority_score("README.md", 100, &config), 18);
        // Nested source file: extension only
        assert_eq!(priority_score("src/app/main.py", 100, &config), 10);
        // Root LICENSE without extension: name + root
        assert_eq!(priority_score("LICENSE", 100, &config), 8);
        // Plain nested file with unknown extension
        assert_eq!(priority_score("data/values.csv", 100, &config), 0);
    }

    #[test]
    fn large_files_are_penalized() {
        let config = FetcherConfig::default();

        // 2 MB markdown file: +10 ext, -4 size penalty
        let two_mb = 2 * 1024 * 1024;
        assert_eq!(priority_score("notes/big.md", two_mb, &config), 6);
        // Under the 500 KB threshold there is no penalty
        assert_eq!(priority_score("notes/small.md", 400 * 1024, &config), 10);
    }

    #[test]
    fn candidate_set_is_capped() {
        let entries: Vec<FileEntry> = (0..700)
            .map(|i| entry(&format!("src/file_{i:04}.py"), 100))
            .collect();
        let structure = structure_of(entries);

        let api = Arc::new(FakeContentApi::new(Map::new()));
        let fetcher = ContentFetcher::new(api);
        let candidates = fetcher.select_candidates(&structure);

        assert_eq!(candidates.len(), 500);
    }

    #[tokio::test]
    async fn fetches_contents_and_tolerates_per_file_failures() {
        let structure = structure_of(vec![
            entry("README.md", 20),
            entry("src/main.py", 30),
            entry("src/broken.py", 30),
        ]);
        let mut contents = Map::new();
        contents.insert("README.md".to_string(), "# readme".to_string());
        contents.insert("src/main.py".to_string(), "print('hi')".to_string());
        contents.insert("src/broken.py".to_string(), "unused".to_string());

        let mut api = FakeContentApi::new(contents);
        api.failing.push("src/broken.py".to_string());
        let api = Arc::new(api);

        let fetcher = ContentFetcher::new(api.clone());
        let fetched = fetcher.fetch("octo/repo", &structure).await;

        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched["README.md"].content, "# readme");
        assert!(!fetched["README.md"].truncated);
        assert!(!fetched.contains_key("src/broken.py"));
    }

    #[tokio::test]
    async fn oversized_files_take_the_truncated_read_path() {
        let structure = structure_of(vec![entry("huge.md", 20 * 1024 * 1024)]);
        let mut contents = Map::new();
        contents.insert("huge.md".to_string(), "x".repeat(200_000));

        let api = Arc::new(FakeContentApi::new(contents));
        let config = FetcherConfig::default();
        let fetcher = ContentFetcher::with_config(api, config.clone());
        let fetched = fetcher.fetch("octo/repo", &structure).await;

        let record = &fetched["huge.md"];
        assert!(record.truncated);
        assert!(record.content.ends_with(TRUNCATION_NOTE));
        assert!(record.content.len() <= config.truncated_read_chars + TRUNCATION_NOTE.len());
    }

    #[tokio::test]
    async fn aggregate_cap_stops_acceptance() {
        let entries: Vec<FileEntry> = (0..20)
            .map(|i| entry(&format!("f{i:02}.md"), 100))
            .collect();
        let structure = structure_of(entries);

        let mut contents = Map::new();
        for i in 0..20 {
            contents.insert(format!("f{i:02}.md"), "y".repeat(1000));
        }

        let api = Arc::new(FakeContentApi::new(contents));
        let config = FetcherConfig {
            max_total_bytes: 2500,
            ..FetcherConfig::default()
        };
        let fetcher = ContentFetcher::with_config(api, config);
        let fetched = fetcher.fetch("octo/repo", &structure).await;

        // 1000 bytes per file: the third accepted file crosses 2500 and
        // acceptance stops there
        assert_eq!(fetched.len(), 3);
        let total: usize = fetched.values().map(|r| r.content.len()).sum();
        assert_eq!(total, 3000);
    }
}
