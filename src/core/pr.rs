//! Branch comparison for PR review mode.

use super::error::CoreError;
use super::git::{GitCli, GitQuery};
use super::ignore::normalize_relative;
use crate::utils::file_detection::{check_eligibility, Eligibility};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything needed to review the current branch against its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrContext {
    pub current_branch: String,
    pub target_branch: String,
    pub diff: String,
    /// Absolute paths of files that differ from the merge base, sorted.
    pub changed_files: Vec<PathBuf>,
    pub commit_count: usize,
}

/// Picks the branch to compare against.
///
/// An explicit target wins. Otherwise the upstream's branch name is used,
/// then `main` or `master` if they exist locally, falling back to `main`.
pub fn target_branch(root: &Path, explicit: Option<&str>) -> String {
    if let Some(target) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return target.to_string();
    }

    let git = GitCli::new();
    if let Some(upstream) = git.run(
        root,
        &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"],
    ) {
        let upstream = upstream.trim();
        let branch = upstream.split_once('/').map_or(upstream, |(_, b)| b);
        if !branch.is_empty() {
            tracing::debug!("Using upstream branch '{}' as target", branch);
            return branch.to_string();
        }
    }

    for candidate in ["main", "master"] {
        let reference = format!("refs/heads/{candidate}");
        if git
            .run(root, &["rev-parse", "--verify", "--quiet", &reference])
            .is_some()
        {
            return candidate.to_string();
        }
    }

    "main".to_string()
}

/// Collects the diff, changed files, and commit count between `HEAD` and
/// the target branch.
pub fn pr_context(root: &Path, explicit_target: Option<&str>) -> Result<PrContext, CoreError> {
    let git = GitCli::new();
    if !git.is_git_repository(root) {
        return Err(CoreError::Git(format!(
            "'{}' is not inside a git repository",
            root.display()
        )));
    }

    let current_branch = git
        .current_branch(root)
        .ok_or_else(|| CoreError::Git("HEAD is detached; check out a branch first".to_string()))?;
    let target_branch = target_branch(root, explicit_target);

    let range = format!("{target_branch}...HEAD");
    let diff = git.run(root, &["diff", &range]).unwrap_or_default();

    let mut changed_files: Vec<PathBuf> = git
        .changed_files(root, &target_branch)
        .into_iter()
        .collect();
    changed_files.sort();

    let count_range = format!("{target_branch}..HEAD");
    let commit_count = git
        .run(root, &["rev-list", "--count", &count_range])
        .and_then(|out| out.trim().parse().ok())
        .unwrap_or(0);

    tracing::info!(
        "PR context: {} -> {} ({} commits, {} files)",
        current_branch,
        target_branch,
        commit_count,
        changed_files.len()
    );

    Ok(PrContext {
        current_branch,
        target_branch,
        diff,
        changed_files,
        commit_count,
    })
}

/// Reads the changed files that are text and within `max_file_size`, keyed
/// by their path relative to `root`.
pub fn read_changed_files(
    root: &Path,
    context: &PrContext,
    max_file_size: u64,
) -> BTreeMap<String, String> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut contents = BTreeMap::new();

    for path in &context.changed_files {
        match check_eligibility(path, max_file_size) {
            Eligibility::Eligible => {}
            other => {
                tracing::debug!("Skipping changed file {:?}: {:?}", path, other);
                continue;
            }
        }
        match std::fs::read_to_string(path) {
            Ok(body) => {
                contents.insert(normalize_relative(path, &root), body);
            }
            Err(e) => tracing::warn!("Failed to read {:?}: {}", path, e),
        }
    }

    contents
}
