//! Curated file-type sets shared by the crawler, fetcher, and snapshot builder

/// Extensions (and basenames) that get a fetch-priority boost
pub const PRIORITY_EXTENSIONS: &[&str] = &[
    ".md",
    ".py",
    ".js",
    ".java",
    ".ts",
    ".jsx",
    ".tsx",
    ".html",
    ".css",
    "dockerfile",
    ".yml",
    ".yaml",
    ".json",
];

/// Filename fragments that mark a file as important regardless of extension
pub const IMPORTANT_NAMES: &[&str] = &[
    "readme",
    "license",
    "contributing",
    "changelog",
    "dockerfile",
];

/// Extensions classified as media for the snapshot's media-file listing
pub const MEDIA_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".mp4", ".mov", ".webm",
];

/// Extensions excluded from the crawl and fetch entirely
pub const BINARY_EXTENSIONS: &[&str] = &[
    ".jar", ".zip", ".tar.gz", ".class", ".pyc", ".so", ".dll", ".exe", ".bin",
];

/// True when the path ends with a known binary extension
pub fn is_binary_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    BINARY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Returns the media type (extension without the dot) when the path is a
/// media file, `None` otherwise
pub fn media_type(path: &str) -> Option<&'static str> {
    let lower = path.to_lowercase();
    MEDIA_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map(|ext| ext.trim_start_matches('.'))
}

/// True when the path ends with a priority extension or basename
pub fn is_priority_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    PRIORITY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// True when the path contains one of the important filename fragments
pub fn has_important_name(path: &str) -> bool {
    let lower = path.to_lowercase();
    IMPORTANT_NAMES.iter().any(|name| lower.contains(name))
}
