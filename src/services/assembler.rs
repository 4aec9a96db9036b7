//! Context Assembler
//!
//! Deterministically renders a repository snapshot into a single bounded
//! text block used as model input. Every section is independently capped so
//! heterogeneous, unbounded-size data always fits the prompt envelope.
//! Assembling the same snapshot twice yields byte-identical output.

use std::fmt::Write as _;

use crate::models::RepositorySnapshot;

/// Per-section caps for the assembled context
#[derive(Debug, Clone)]
pub struct AssemblerLimits {
    pub readme_chars: usize,
    pub contributors: usize,
    pub issues: usize,
    pub top_level_entries: usize,
    pub media_files: usize,
    /// Per-file cap for specifically important files (pass 1)
    pub important_file_chars: usize,
    /// Per-file cap for all other files (pass 2)
    pub file_chars: usize,
    /// Cap on the total rendered file-content text
    pub total_file_chars: usize,
}

impl Default for AssemblerLimits {
    fn default() -> Self {
        Self {
            readme_chars: 4000,
            contributors: 50,
            issues: 50,
            top_level_entries: 50,
            media_files: 100,
            important_file_chars: 10_000,
            file_chars: 5_000,
            total_file_chars: 50_000,
        }
    }
}

/// Path fragments whose files are rendered first, under the larger per-file cap
const IMPORTANT_CONTENT_HINTS: &[&str] = &["utils.py", "agent.py", "bedrock"];

const TRUNCATED_MARKER: &str = "\n\n[TRUNCATED]";
const README_TRUNCATED_MARKER: &str = "... [README truncated]";

/// Snapshot-to-prompt renderer
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    limits: AssemblerLimits,
}

impl ContextAssembler {
    pub fn new() -> Self {
        Self {
            limits: AssemblerLimits::default(),
        }
    }

    pub fn with_limits(limits: AssemblerLimits) -> Self {
        Self { limits }
    }

    /// Render the full prompt: instructional preamble, every context
    /// section in order, and the user's literal question.
    pub fn assemble(&self, repo_path: &str, snapshot: &RepositorySnapshot, question: &str) -> String {
        let info = &snapshot.info;
        let language_text = self.format_languages(snapshot);
        let contributor_text = self.format_contributors(snapshot);
        let issues_text = self.format_issues(snapshot);
        let structure_summary = self.format_structure(snapshot);
        let media_text = self.format_media(snapshot);
        let readme_text = self.format_readme(snapshot);
        let (file_content_text, truncated_files) = self.format_file_contents(snapshot);

        let mut system_message = format!(
            "You are an AI assistant that helps users understand GitHub repositories.\n\
             You are currently analyzing the repository: {repo_path}\n\
             \n\
             Repository Information:\n\
             - Name: {name}\n\
             - Full Name: {full_name}\n\
             - Description: {description}\n\
             - Stars: {stars}\n\
             - Forks: {forks}\n\
             - Open Issues: {open_issues}\n\
             - Topics: {topics}\n\
             \n\
             Languages:\n{language_text}\n\
             \n\
             Top Contributors:\n{contributor_text}\n\
             \n\
             Recent Issues:\n{issues_text}\n\
             \n\
             Repository Structure:\n{structure_summary}\n\
             \n\
             Media Files:\n{media_text}\n\
             \n\
             README Content:\n{readme_text}\n\
             \n\
             File Contents:\n{file_content_text}\n\
             \n\
             Answer the user's question based on this repository information. \
             Be specific and detailed, citing files and code when relevant. \
             If you don't know the answer, say so rather than making up information.",
            name = info.name.as_deref().unwrap_or(""),
            full_name = info.full_name.as_deref().unwrap_or(""),
            description = info.description.as_deref().unwrap_or(""),
            stars = info.stargazers_count,
            forks = info.forks_count,
            open_issues = info.open_issues_count,
            topics = info.topics.join(", "),
        );

        if !truncated_files.is_empty() {
            let _ = write!(
                system_message,
                "\n\nNote: The following files were truncated due to size: {}",
                truncated_files.join(", ")
            );
        }

        format!("<instructions>\n{system_message}\n</instructions>\n\n{question}")
    }

    /// Languages as percentage of total bytes, descending by byte count.
    /// Empty when the snapshot carries no language data.
    fn format_languages(&self, snapshot: &RepositorySnapshot) -> String {
        let total: u64 = snapshot.languages.values().sum();
        if total == 0 {
            return String::new();
        }

        let mut ranked: Vec<(&String, &u64)> = snapshot.languages.iter().collect();
        // Stable sort keeps the map's name order for equal byte counts
        ranked.sort_by(|a, b| b.1.cmp(a.1));

        ranked
            .iter()
            .map(|(lang, bytes)| {
                format!("- {lang}: {:.1}%", **bytes as f64 / total as f64 * 100.0)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_contributors(&self, snapshot: &RepositorySnapshot) -> String {
        snapshot
            .contributors
            .iter()
            .take(self.limits.contributors)
            .map(|c| format!("- {}: {} contributions", c.login, c.contributions))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_issues(&self, snapshot: &RepositorySnapshot) -> String {
        snapshot
            .issues
            .iter()
            .take(self.limits.issues)
            .map(|i| format!("- #{}: {} ({})", i.number, i.title, i.state))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Counts plus alphabetical top-level directories and files.
    /// "Top-level" means the path contains no separator.
    fn format_structure(&self, snapshot: &RepositorySnapshot) -> String {
        use crate::models::EntryType;

        let file_count = snapshot
            .file_structure
            .values()
            .filter(|e| e.entry_type == EntryType::File)
            .count();
        let dir_count = snapshot
            .file_structure
            .values()
            .filter(|e| e.entry_type == EntryType::Dir)
            .count();

        // BTreeMap iteration is already alphabetical
        let top_dirs: Vec<String> = snapshot
            .file_structure
            .values()
            .filter(|e| e.entry_type == EntryType::Dir && !e.path.contains('/'))
            .take(self.limits.top_level_entries)
            .map(|e| format!("- {}/", e.path))
            .collect();

        let top_files: Vec<String> = snapshot
            .file_structure
            .values()
            .filter(|e| e.entry_type == EntryType::File && !e.path.contains('/'))
            .take(self.limits.top_level_entries)
            .map(|e| format!("- {}", e.path))
            .collect();

        format!(
            "Total: {file_count} files, {dir_count} directories\n\
             \n\
             Top-level directories:\n{}\n\
             \n\
             Top-level files:\n{}",
            top_dirs.join("\n"),
            top_files.join("\n")
        )
    }

    fn format_media(&self, snapshot: &RepositorySnapshot) -> String {
        snapshot
            .media_files
            .iter()
            .take(self.limits.media_files)
            .map(|m| format!("- {} ({})", m.path, m.media_type))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_readme(&self, snapshot: &RepositorySnapshot) -> String {
        let readme = snapshot.readme.as_deref().unwrap_or("No README found.");
        let (text, cut) = truncate_chars(readme, self.limits.readme_chars);
        if cut {
            format!("{text}{README_TRUNCATED_MARKER}")
        } else {
            text
        }
    }

    /// Two-pass file-content rendering.
    ///
    /// Pass 1 includes files matching the specifically important hints under
    /// the larger per-file cap. Pass 2 appends the remaining files in map
    /// order under the smaller cap, stopping entirely once the total would
    /// exceed the overall budget. Returns the rendered text and every path
    /// that was truncated in either pass.
    fn format_file_contents(&self, snapshot: &RepositorySnapshot) -> (String, Vec<String>) {
        let mut text = String::new();
        let mut truncated_files = Vec::new();

        let is_important = |path: &str| {
            let lower = path.to_lowercase();
            IMPORTANT_CONTENT_HINTS.iter().any(|hint| lower.contains(hint))
        };

        for (path, record) in &snapshot.file_contents {
            if !is_important(path) {
                continue;
            }
            let (mut content, cut) = truncate_chars(&record.content, self.limits.important_file_chars);
            if cut {
                content.push_str(TRUNCATED_MARKER);
                truncated_files.push(path.clone());
            }
            let _ = write!(text, "\n\nFILE: {path}\n{content}");
        }

        let remaining = self
            .limits
            .total_file_chars
            .saturating_sub(text.chars().count());
        if remaining > self.limits.file_chars {
            for (path, record) in &snapshot.file_contents {
                if is_important(path) {
                    continue;
                }
                let (mut content, cut) = truncate_chars(&record.content, self.limits.file_chars);
                if cut {
                    content.push_str(TRUNCATED_MARKER);
                }
                let file_text = format!("\n\nFILE: {path}\n{content}");
                if text.chars().count() + file_text.chars().count() > self.limits.total_file_chars {
                    break;
                }
                if cut {
                    truncated_files.push(path.clone());
                }
                text.push_str(&file_text);
            }
        }

        (text, truncated_files)
    }
}

/// Truncate to at most `max` characters; the flag reports whether a cut was made
fn truncate_chars(s: &str, max: usize) -> (String, bool) {
    if s.chars().count() > max {
        (s.chars().take(max).collect(), true)
    } else {
        (s.to_string(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::models::{
        ContributorSummary, EntryType, FileContentRecord, FileEntry, IssueSummary, MediaFile,
        RepoMetadata,
    };

    fn entry(path: &str, entry_type: EntryType) -> FileEntry {
        FileEntry {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            entry_type,
            size: 100,
            url: None,
        }
    }

    fn record(name: &str, content: &str) -> FileContentRecord {
        FileContentRecord {
            name: name.to_string(),
            content: content.to_string(),
            truncated: false,
            size: content.len() as u64,
        }
    }

    fn sample_snapshot() -> RepositorySnapshot {
        let mut languages = BTreeMap::new();
        languages.insert("Python".to_string(), 7500u64);
        languages.insert("Rust".to_string(), 2500u64);

        let mut file_structure = BTreeMap::new();
        for e in [
            entry("README.md", EntryType::File),
            entry("LICENSE", EntryType::File),
            entry("src", EntryType::Dir),
            entry("src/main.py", EntryType::File),
        ] {
            file_structure.insert(e.path.clone(), e);
        }

        let mut file_contents = BTreeMap::new();
        file_contents.insert("LICENSE".to_string(), record("LICENSE", "MIT License"));
        file_contents.insert(
            "src/main.py".to_string(),
            record("main.py", "print('hello')"),
        );

        RepositorySnapshot {
            info: RepoMetadata {
                name: Some("Hello-World".to_string()),
                full_name: Some("octocat/Hello-World".to_string()),
                description: Some("My first repository".to_string()),
                stargazers_count: 1984,
                topics: vec!["example".to_string()],
                ..RepoMetadata::default()
            },
            readme: Some("# Hello World\nThis is the readme.".to_string()),
            languages,
            issues: vec![IssueSummary {
                number: 7,
                title: "Things are broken".to_string(),
                state: "open".to_string(),
                pull_request: None,
            }],
            contributors: vec![ContributorSummary {
                login: "octocat".to_string(),
                contributions: 42,
            }],
            media_files: vec![MediaFile {
                path: "docs/demo.gif".to_string(),
                name: "demo.gif".to_string(),
                media_type: "gif".to_string(),
                url: None,
            }],
            file_structure,
            file_contents,
            ..RepositorySnapshot::default()
        }
    }

    #[test]
    fn renders_all_sections_in_order() {
        let assembler = ContextAssembler::new();
        let snapshot = sample_snapshot();
        let prompt = assembler.assemble("octocat/Hello-World", &snapshot, "What license?");

        for section in [
            "Repository Information:",
            "Languages:",
            "Top Contributors:",
            "Recent Issues:",
            "Repository Structure:",
            "Media Files:",
            "README Content:",
            "File Contents:",
        ] {
            assert!(prompt.contains(section), "missing section {section}");
        }

        // Section ordering
        let lang_at = prompt.find("Languages:").unwrap();
        let readme_at = prompt.find("README Content:").unwrap();
        let files_at = prompt.find("File Contents:").unwrap();
        assert!(lang_at < readme_at && readme_at < files_at);

        // The question is appended after the instructions block
        assert!(prompt.ends_with("</instructions>\n\nWhat license?"));
        assert!(prompt.contains("FILE: LICENSE"));
    }

    #[test]
    fn assembly_is_idempotent() {
        let assembler = ContextAssembler::new();
        let snapshot = sample_snapshot();
        let a = assembler.assemble("octocat/Hello-World", &snapshot, "q");
        let b = assembler.assemble("octocat/Hello-World", &snapshot, "q");
        assert_eq!(a, b);
    }

    #[test]
    fn language_percentages_descend_by_bytes() {
        let assembler = ContextAssembler::new();
        let snapshot = sample_snapshot();
        let prompt = assembler.assemble("octocat/Hello-World", &snapshot, "q");

        let python_at = prompt.find("- Python: 75.0%").expect("python line");
        let rust_at = prompt.find("- Rust: 25.0%").expect("rust line");
        assert!(python_at < rust_at);
    }

    #[test]
    fn language_section_is_omitted_without_data() {
        let assembler = ContextAssembler::new();
        let mut snapshot = sample_snapshot();
        snapshot.languages.clear();
        let prompt = assembler.assemble("octocat/Hello-World", &snapshot, "q");
        assert!(prompt.contains("Languages:\n\n"));
    }

    #[test]
    fn readme_is_capped_with_marker() {
        let assembler = ContextAssembler::new();
        let mut snapshot = sample_snapshot();
        snapshot.readme = Some("r".repeat(9000));
        let prompt = assembler.assemble("octocat/Hello-World", &snapshot, "q");

        assert!(prompt.contains(README_TRUNCATED_MARKER));
        let rendered_readme_len = 4000 + README_TRUNCATED_MARKER.len();
        let start = prompt.find("README Content:\n").unwrap() + "README Content:\n".len();
        let section = &prompt[start..start + rendered_readme_len];
        assert!(section.starts_with("rrrr"));
        assert!(section.ends_with(README_TRUNCATED_MARKER));
    }

    #[test]
    fn important_files_come_first_with_larger_cap() {
        let assembler = ContextAssembler::new();
        let mut snapshot = sample_snapshot();
        snapshot.file_contents.insert(
            "src/utils.py".to_string(),
            record("utils.py", &"u".repeat(12_000)),
        );
        let prompt = assembler.assemble("octocat/Hello-World", &snapshot, "q");

        let utils_at = prompt.find("FILE: src/utils.py").unwrap();
        let license_at = prompt.find("FILE: LICENSE").unwrap();
        assert!(utils_at < license_at);

        // Truncated to the pass-1 cap and listed in the closing note
        assert!(prompt.contains(TRUNCATED_MARKER));
        assert!(prompt.contains("truncated due to size: src/utils.py"));
    }

    #[test]
    fn pass_two_files_are_capped_individually() {
        let assembler = ContextAssembler::new();
        let mut snapshot = sample_snapshot();
        snapshot.file_contents.insert(
            "src/big.py".to_string(),
            record("big.py", &"b".repeat(8_000)),
        );
        let prompt = assembler.assemble("octocat/Hello-World", &snapshot, "q");

        let start = prompt.find("FILE: src/big.py\n").unwrap() + "FILE: src/big.py\n".len();
        let rest = &prompt[start..];
        let run = rest.chars().take_while(|c| *c == 'b').count();
        assert_eq!(run, 5_000);
        assert!(prompt.contains("truncated due to size:"));
    }

    #[test]
    fn total_file_text_budget_stops_acceptance() {
        let limits = AssemblerLimits {
            total_file_chars: 12_000,
            ..AssemblerLimits::default()
        };
        let assembler = ContextAssembler::with_limits(limits);
        let mut snapshot = sample_snapshot();
        snapshot.file_contents.clear();
        for i in 0..10 {
            snapshot.file_contents.insert(
                format!("src/f{i}.py"),
                record(&format!("f{i}.py"), &"z".repeat(4_000)),
            );
        }
        let prompt = assembler.assemble("octocat/Hello-World", &snapshot, "q");

        // Each rendered file costs just over 4000 chars, so only the first
        // two fit under the 12000-char budget; the rest are omitted whole
        let included = (0..10)
            .filter(|i| prompt.contains(&format!("FILE: src/f{i}.py")))
            .count();
        assert!(included < 10);
        assert!(prompt.contains("FILE: src/f0.py"));
        // No partially added files: every included file renders fully
        for i in 0..included {
            let start = prompt
                .find(&format!("FILE: src/f{i}.py\n"))
                .expect("included file")
                + format!("FILE: src/f{i}.py\n").len();
            let run = prompt[start..].chars().take_while(|c| *c == 'z').count();
            assert_eq!(run, 4_000);
        }
    }
}
