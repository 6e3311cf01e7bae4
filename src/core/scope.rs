//! Scope resolution: narrowing a scan to a subset of the tree.
//!
//! A scope is built from up to three sources (recent commits, uncommitted
//! changes, include globs). Active sources are unioned; each one widens the
//! set of eligible files. `None` means "no restriction", while an empty set
//! means "nothing is eligible". The two are never interchangeable.

use super::git::GitQuery;
use super::ignore::{compile_glob, normalize_relative};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which parts of the tree a scan is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Files touched in the last `n` commits.
    pub recent: Option<usize>,
    /// Modified, staged, and untracked files.
    pub uncommitted: bool,
    /// Glob patterns relative to the repository root.
    pub include_patterns: Vec<String>,
}

impl ScopeConfig {
    pub fn with_recent(mut self, n: usize) -> Self {
        self.recent = Some(n);
        self
    }

    pub fn with_uncommitted(mut self, uncommitted: bool) -> Self {
        self.uncommitted = uncommitted;
        self
    }

    pub fn with_include_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// `true` if any scope source is active.
    pub fn is_scoped(&self) -> bool {
        self.recent.is_some() || self.uncommitted || !self.include_patterns.is_empty()
    }
}

/// Expands include globs to the set of matching files under `root`.
///
/// `**` matches zero or more directories and `*` stays within a single
/// segment, so `tests/*` only yields direct children of `tests`. Patterns
/// that match nothing (or fail to parse) simply contribute nothing.
pub fn expand_globs<S: AsRef<str>>(root: &Path, patterns: &[S]) -> HashSet<PathBuf> {
    let matchers: Vec<_> = patterns
        .iter()
        .map(|p| {
            let p = p.as_ref().trim();
            p.strip_prefix("./").unwrap_or(p).trim_start_matches('/')
        })
        .filter(|p| !p.is_empty())
        .filter_map(compile_glob)
        .collect();

    if matchers.is_empty() {
        return HashSet::new();
    }

    let files: HashSet<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git")
        .filter_map(Result::ok)
        // A link to a file counts as that file, matching the scan walk.
        .filter(|e| {
            e.file_type().is_file() || (e.file_type().is_symlink() && e.path().is_file())
        })
        .filter(|e| {
            let relative = normalize_relative(e.path(), root);
            matchers.iter().any(|m| m.is_match(&relative))
        })
        .map(|e| e.into_path())
        .collect();

    tracing::debug!(
        "{} files matched include patterns {:?}",
        files.len(),
        patterns.iter().map(AsRef::as_ref).collect::<Vec<_>>()
    );
    files
}

/// Combines all active scope sources into one optional restriction.
pub fn resolve_scope<G: GitQuery + ?Sized>(
    root: &Path,
    config: &ScopeConfig,
    git: &G,
) -> Option<HashSet<PathBuf>> {
    if !config.is_scoped() {
        return None;
    }

    let mut scoped = HashSet::new();

    if let Some(n) = config.recent {
        let recent = git.recent_commit_files(root, n);
        tracing::info!("Scope: {} files from the last {} commits", recent.len(), n);
        scoped.extend(recent);
    }

    if config.uncommitted {
        let uncommitted = git.uncommitted_files(root);
        tracing::info!("Scope: {} uncommitted files", uncommitted.len());
        scoped.extend(uncommitted);
    }

    if !config.include_patterns.is_empty() {
        let globbed = expand_globs(root, &config.include_patterns);
        tracing::info!("Scope: {} files from include patterns", globbed.len());
        scoped.extend(globbed);
    }

    Some(scoped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::FakeGit;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in [
            "src/main.py",
            "src/module/core.py",
            "src/module/utils.py",
            "tests/test_main.py",
            "README.md",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "# content").unwrap();
        }
        dir
    }

    #[test]
    fn test_scope_config_defaults() {
        let config = ScopeConfig::default();
        assert_eq!(config.recent, None);
        assert!(!config.uncommitted);
        assert!(config.include_patterns.is_empty());
    }

    #[test]
    fn test_is_scoped() {
        assert!(!ScopeConfig::default().is_scoped());
        assert!(ScopeConfig::default().with_recent(1).is_scoped());
        assert!(ScopeConfig::default().with_uncommitted(true).is_scoped());
        assert!(ScopeConfig::default()
            .with_include_patterns(["*.py"])
            .is_scoped());
    }

    #[test]
    fn test_recursive_glob_includes_top_level() {
        let dir = project();
        let files = expand_globs(dir.path(), &["**/*.py"]);
        assert_eq!(files.len(), 4);
        assert!(files.contains(&dir.path().join("tests/test_main.py")));
    }

    #[test]
    fn test_directory_scoped_glob() {
        let dir = project();
        let files = expand_globs(dir.path(), &["src/**/*.py"]);
        assert_eq!(files.len(), 3);
        assert!(files.contains(&dir.path().join("src/main.py")));
        assert!(files.contains(&dir.path().join("src/module/core.py")));
        assert!(!files.contains(&dir.path().join("tests/test_main.py")));
    }

    #[test]
    fn test_multiple_patterns_are_unioned() {
        let dir = project();
        let files = expand_globs(
            dir.path(),
            &["src/module/*.py", "*.md", "src/module/core.py"],
        );
        assert_eq!(files.len(), 3);
        assert!(files.contains(&dir.path().join("README.md")));
        assert!(!files.contains(&dir.path().join("src/main.py")));
    }

    #[test]
    fn test_single_level_pattern_only_matches_direct_children() {
        let dir = project();
        fs::create_dir_all(dir.path().join("tests/fixtures")).unwrap();
        fs::write(dir.path().join("tests/fixtures/data.json"), "{}").unwrap();

        let files = expand_globs(dir.path(), &["tests/*"]);
        assert_eq!(files.len(), 1);
        assert!(files.contains(&dir.path().join("tests/test_main.py")));
    }

    #[test]
    fn test_no_scope_is_unrestricted() {
        let result = resolve_scope(
            Path::new("/fake"),
            &ScopeConfig::default(),
            &FakeGit::default(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_scope_matching_nothing_is_empty_not_none() {
        let dir = project();
        let config = ScopeConfig::default().with_include_patterns(["*.none"]);
        let result = resolve_scope(dir.path(), &config, &FakeGit::default());
        assert_eq!(result, Some(HashSet::new()));
    }

    #[test]
    fn test_scope_sources_are_unioned() {
        let a = PathBuf::from("/repo/a.rs");
        let b = PathBuf::from("/repo/b.rs");
        let git = FakeGit {
            recent: HashSet::from([a.clone()]),
            uncommitted: HashSet::from([b.clone()]),
            ..Default::default()
        };
        let config = ScopeConfig::default().with_recent(1).with_uncommitted(true);

        let result = resolve_scope(Path::new("/repo"), &config, &git).unwrap();
        assert_eq!(result, HashSet::from([a, b]));
    }

    #[test]
    fn test_empty_source_does_not_short_circuit_others() {
        let dir = project();
        let config = ScopeConfig::default()
            .with_recent(3)
            .with_include_patterns(["*.md"]);

        let result = resolve_scope(dir.path(), &config, &FakeGit::default()).unwrap();
        assert_eq!(result, HashSet::from([dir.path().join("README.md")]));
    }

    #[cfg(unix)]
    #[test]
    fn test_glob_selects_symlinked_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("real.txt"), "content").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        std::os::unix::fs::symlink(root.join("sub"), root.join("dirlink.txt")).unwrap();

        let files = expand_globs(root, &["*.txt"]);
        assert_eq!(
            files,
            HashSet::from([root.join("real.txt"), root.join("link.txt")])
        );
    }
}
