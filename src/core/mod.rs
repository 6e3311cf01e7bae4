pub mod error;
pub mod git;
pub mod ignore;
pub mod language;
pub mod markdown;
pub mod pr;
pub mod scanner;
pub mod scope;
pub mod tree_generator;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A file accepted into an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoFile {
    pub path: PathBuf,
    pub content: String,
    pub size: u64,
    pub language: Option<&'static str>,
}

impl RepoFile {
    /// The path relative to `root`, with forward slashes.
    pub fn relative_path(&self, root: &Path) -> String {
        ignore::normalize_relative(&self.path, root)
    }
}

/// Why a path was left out of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Matched an ignore pattern (caller-supplied or from `.gitignore`).
    Pattern { pattern: String },
    /// A meta file (README, LICENSE, ...) while meta files are excluded.
    MetaFile,
    TooLarge { size: u64, limit: u64 },
    Binary,
    Unreadable { error: String },
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::Pattern { pattern } => write!(f, "matches ignore pattern '{pattern}'"),
            IgnoreReason::MetaFile => write!(f, "meta file"),
            IgnoreReason::TooLarge { size, limit } => {
                write!(f, "too large ({size} bytes > {limit} bytes)")
            }
            IgnoreReason::Binary => write!(f, "binary"),
            IgnoreReason::Unreadable { error } => write!(f, "unreadable: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredFile {
    pub path: PathBuf,
    pub reason: IgnoreReason,
}

/// The outcome of one scan.
///
/// `files` is in tree-walk order; `included_files` mirrors it path for path
/// and `total_size` is the sum of the file sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub files: Vec<RepoFile>,
    pub repo_root: PathBuf,
    pub total_size: u64,
    pub included_files: Vec<PathBuf>,
    pub ignored_files: Vec<IgnoredFile>,
}

impl ScanResult {
    pub fn new(repo_root: PathBuf) -> Self {
        Self {
            files: Vec::new(),
            repo_root,
            total_size: 0,
            included_files: Vec::new(),
            ignored_files: Vec::new(),
        }
    }

    /// Builds a result from already-read files, computing the totals.
    pub fn from_files(repo_root: PathBuf, files: Vec<RepoFile>) -> Self {
        let mut result = Self::new(repo_root);
        for file in files {
            result.push_file(file);
        }
        result
    }

    pub(crate) fn push_file(&mut self, file: RepoFile) {
        self.total_size += file.size;
        self.included_files.push(file.path.clone());
        self.files.push(file);
    }

    /// The last path component of the repository root.
    pub fn repo_name(&self) -> String {
        self.repo_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.repo_root.display().to_string())
    }
}

pub use error::CoreError;
pub use git::{GitCli, GitQuery};
pub use ignore::{load_gitignore, matches_pattern, PatternSet};
pub use markdown::{default_output_filename, generate_markdown, generate_pr_markdown};
pub use pr::{pr_context, read_changed_files, target_branch, PrContext};
pub use scanner::{scan_repository, RepoScanner, ScanOptions};
pub use scope::{expand_globs, resolve_scope, ScopeConfig};
pub use tree_generator::TreeGenerator;
