//! Repository snapshot model
//!
//! A snapshot is the complete set of repository data gathered for a single
//! question. It is built once per request, is immutable after assembly, and
//! is never persisted.

use std::collections::BTreeMap;

use serde::Serialize;

use super::github::{ContributorSummary, IssueSummary, PullSummary, ReleaseSummary, RepoMetadata};

/// Kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
}

/// A single file or directory discovered by the tree crawl
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub entry_type: EntryType,
    pub size: u64,
    pub url: Option<String>,
}

/// Downloaded content for one file
///
/// `content` never exceeds the per-file cap; `truncated` is true exactly
/// when the content was cut.
#[derive(Debug, Clone, Serialize)]
pub struct FileContentRecord {
    pub name: String,
    pub content: String,
    pub truncated: bool,
    pub size: u64,
}

/// A media file derived from the file structure by extension
#[derive(Debug, Clone, Serialize)]
pub struct MediaFile {
    pub path: String,
    pub name: String,
    pub media_type: String,
    pub url: Option<String>,
}

/// Aggregate of everything gathered about a repository for one request.
///
/// The two maps use `BTreeMap` so iteration order is deterministic, which
/// makes context assembly reproducible for identical snapshots.
#[derive(Debug, Clone, Default)]
pub struct RepositorySnapshot {
    pub info: RepoMetadata,
    pub readme: Option<String>,
    pub languages: BTreeMap<String, u64>,
    pub issues: Vec<IssueSummary>,
    pub pull_requests: Vec<PullSummary>,
    pub releases: Vec<ReleaseSummary>,
    pub contributors: Vec<ContributorSummary>,
    pub file_structure: BTreeMap<String, FileEntry>,
    pub file_contents: BTreeMap<String, FileContentRecord>,
    pub media_files: Vec<MediaFile>,
}
