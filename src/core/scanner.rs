use super::error::CoreError;
use super::git::{GitCli, GitQuery};
use super::ignore::{load_gitignore, PatternSet};
use super::language;
use super::scope::{resolve_scope, ScopeConfig};
use super::{IgnoreReason, IgnoredFile, RepoFile, ScanResult};
use crate::utils::file_detection::{check_eligibility, Eligibility};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default size ceiling for a single file (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Name of the ignore file read from the repository root.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Conventional non-source files dropped when meta files are excluded.
pub const META_FILE_PATTERNS: &[&str] = &[
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    ".editorconfig",
    ".dockerignore",
    "README*",
    "readme*",
    "LICENSE*",
    "LICENCE*",
    "COPYING*",
    "CHANGELOG*",
    "CHANGES*",
    "CONTRIBUTING*",
    "CODE_OF_CONDUCT*",
    "AUTHORS*",
    "SECURITY*",
];

/// Everything that decides which files a scan keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Extra gitignore-style patterns, merged with the root `.gitignore`.
    pub ignore_patterns: Vec<String>,
    /// Drop the built-in meta files (README, LICENSE, ...).
    pub exclude_meta_files: bool,
    /// Meta file names (or globs) kept even when meta files are excluded.
    pub include_meta: Vec<String>,
    /// Additional specific files to exclude, treated as ignore patterns.
    pub exclude_meta: Vec<String>,
    pub max_file_size: u64,
    pub scope: ScopeConfig,
    /// Record ignored paths on the result.
    pub verbose: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            exclude_meta_files: false,
            include_meta: Vec::new(),
            exclude_meta: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            scope: ScopeConfig::default(),
            verbose: false,
        }
    }
}

/// Which meta files to drop, minus explicit overrides.
struct MetaPolicy {
    meta: PatternSet,
    overrides: PatternSet,
}

impl MetaPolicy {
    fn from_options(options: &ScanOptions) -> Option<Self> {
        options.exclude_meta_files.then(|| Self {
            meta: PatternSet::new(META_FILE_PATTERNS),
            overrides: PatternSet::new(&options.include_meta),
        })
    }

    fn excludes(&self, path: &Path, root: &Path) -> bool {
        self.meta.is_match(path, root) && !self.overrides.is_match(path, root)
    }
}

/// Walks a repository and applies scope, ignore, meta, size, and binary
/// filters to produce a [`ScanResult`].
pub struct RepoScanner<G: GitQuery = GitCli> {
    options: ScanOptions,
    git: G,
}

impl RepoScanner<GitCli> {
    pub fn new(options: ScanOptions) -> Self {
        Self::with_git(options, GitCli::new())
    }
}

impl<G: GitQuery> RepoScanner<G> {
    pub fn with_git(options: ScanOptions, git: G) -> Self {
        Self { options, git }
    }

    /// Scans `root`. Only an invalid root or configuration is fatal; every
    /// per-file problem is recorded as ignored and the walk continues.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, CoreError> {
        let root = Self::canonical_root(root)?;
        if self.options.max_file_size == 0 {
            return Err(CoreError::InvalidConfig(
                "max file size must be positive".to_string(),
            ));
        }

        let ignore_set = self.build_ignore_set(&root);
        let meta_policy = MetaPolicy::from_options(&self.options);
        let scope = resolve_scope(&root, &self.options.scope, &self.git);

        tracing::info!(
            "Scanning {} ({} ignore patterns, scope: {})",
            root.display(),
            ignore_set.len(),
            match &scope {
                Some(files) => format!("{} files", files.len()),
                None => "unrestricted".to_string(),
            }
        );

        let mut result = ScanResult::new(root.clone());
        let mut walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if let Some(path) = e.path() {
                        self.record_ignored(
                            &mut result,
                            path.to_path_buf(),
                            IgnoreReason::Unreadable {
                                error: e.to_string(),
                            },
                        );
                    } else {
                        tracing::warn!("Skipping unreadable entry: {}", e);
                    }
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }
            let path = entry.path();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if entry.file_name() == ".git" {
                    walker.skip_current_dir();
                } else if let Some(pattern) = ignore_set.first_match(path, &root) {
                    tracing::debug!("Pruning {} ({})", path.display(), pattern);
                    let reason = IgnoreReason::Pattern {
                        pattern: pattern.to_string(),
                    };
                    self.record_ignored(&mut result, path.to_path_buf(), reason);
                    walker.skip_current_dir();
                }
                continue;
            }

            // Symlinks are not followed into directories, but a link to a
            // regular file is exported like the file itself.
            if file_type.is_symlink() && path.is_dir() {
                continue;
            }
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            if let Some(scope) = &scope {
                if !scope.contains(path) {
                    continue;
                }
            }

            if let Some(reason) =
                self.rejection_reason(path, &root, &ignore_set, meta_policy.as_ref())
            {
                tracing::debug!("Ignoring {}: {}", path.display(), reason);
                self.record_ignored(&mut result, path.to_path_buf(), reason);
                continue;
            }

            match fs::read_to_string(path) {
                Ok(content) => {
                    let file = RepoFile {
                        path: path.to_path_buf(),
                        size: content.len() as u64,
                        language: language::classify(path),
                        content,
                    };
                    tracing::debug!("Including {} ({} bytes)", path.display(), file.size);
                    result.push_file(file);
                }
                Err(e) => {
                    let reason = IgnoreReason::Unreadable {
                        error: e.to_string(),
                    };
                    self.record_ignored(&mut result, path.to_path_buf(), reason);
                }
            }
        }

        tracing::info!(
            "Scan complete: {} files included ({} bytes)",
            result.files.len(),
            result.total_size
        );
        Ok(result)
    }

    fn canonical_root(root: &Path) -> Result<PathBuf, CoreError> {
        let canonical = root.canonicalize().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(root.to_path_buf()),
            _ => CoreError::Io(e, root.to_path_buf()),
        })?;

        if !canonical.is_dir() {
            return Err(CoreError::NotADirectory(canonical));
        }
        Ok(canonical)
    }

    /// Caller patterns, explicit meta exclusions, and the root `.gitignore`.
    fn build_ignore_set(&self, root: &Path) -> PatternSet {
        let gitignore = load_gitignore(&root.join(GITIGNORE_FILE));
        tracing::debug!("Loaded {} patterns from {}", gitignore.len(), GITIGNORE_FILE);

        let mut seen = HashSet::new();
        let patterns: Vec<String> = self
            .options
            .ignore_patterns
            .iter()
            .chain(&self.options.exclude_meta)
            .cloned()
            .chain(gitignore)
            .filter(|p| seen.insert(p.clone()))
            .collect();

        PatternSet::new(patterns)
    }

    fn rejection_reason(
        &self,
        path: &Path,
        root: &Path,
        ignore_set: &PatternSet,
        meta_policy: Option<&MetaPolicy>,
    ) -> Option<IgnoreReason> {
        if let Some(pattern) = ignore_set.first_match(path, root) {
            return Some(IgnoreReason::Pattern {
                pattern: pattern.to_string(),
            });
        }

        if meta_policy.is_some_and(|m| m.excludes(path, root)) {
            return Some(IgnoreReason::MetaFile);
        }

        match check_eligibility(path, self.options.max_file_size) {
            Eligibility::Eligible => None,
            Eligibility::TooLarge { size, limit } => Some(IgnoreReason::TooLarge { size, limit }),
            Eligibility::Binary => Some(IgnoreReason::Binary),
            Eligibility::Unreadable(error) => Some(IgnoreReason::Unreadable { error }),
        }
    }

    fn record_ignored(&self, result: &mut ScanResult, path: PathBuf, reason: IgnoreReason) {
        if self.options.verbose {
            result.ignored_files.push(IgnoredFile { path, reason });
        }
    }
}

/// Scans `root` with the given options, querying git through the `git`
/// executable.
pub fn scan_repository(root: &Path, options: &ScanOptions) -> Result<ScanResult, CoreError> {
    RepoScanner::new(options.clone()).scan(root)
}
