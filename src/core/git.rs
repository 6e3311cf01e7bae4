//! File-identity queries against a git working tree.
//!
//! Git is driven through its command line rather than bound as a library.
//! Every query degrades to an empty result when the directory is not a
//! repository, `git` is missing, or the command exits non-zero.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The narrow git capability the scope resolution needs.
///
/// All paths returned are absolute and refer to files that exist on disk.
pub trait GitQuery {
    /// Files touched by the `n` most recent commits reachable from `HEAD`.
    fn recent_commit_files(&self, root: &Path, n: usize) -> HashSet<PathBuf>;

    /// Modified, staged, and untracked (but not ignored) files.
    fn uncommitted_files(&self, root: &Path) -> HashSet<PathBuf>;

    /// The checked-out branch name, `None` when detached or not a repository.
    fn current_branch(&self, root: &Path) -> Option<String>;

    /// Files that differ between the merge base with `base` and `HEAD`.
    fn changed_files(&self, root: &Path, base: &str) -> HashSet<PathBuf>;
}

/// [`GitQuery`] backed by the `git` executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }

    /// Runs `git <args>` in `root`, returning stdout on success.
    pub(crate) fn run(&self, root: &Path, args: &[&str]) -> Option<String> {
        let output = match Command::new("git")
            .arg("-c")
            .arg("core.quotePath=false")
            .args(args)
            .current_dir(root)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Failed to run git {:?}: {}", args, e);
                return None;
            }
        };

        if !output.status.success() {
            tracing::debug!(
                "git {:?} exited with {}: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Returns `true` if `root` lies inside a git working tree.
    pub fn is_git_repository(&self, root: &Path) -> bool {
        self.run(root, &["rev-parse", "--is-inside-work-tree"])
            .is_some_and(|out| out.trim() == "true")
    }

    /// The canonical top-level directory of the working tree.
    fn toplevel(&self, root: &Path) -> Option<PathBuf> {
        let out = self.run(root, &["rev-parse", "--show-toplevel"])?;
        let top = PathBuf::from(out.trim());
        top.canonicalize().ok().or(Some(top))
    }

    /// Joins repository-relative paths onto the top level, keeping only
    /// files that still exist.
    fn existing_files<'a, I>(top: &Path, relative: I) -> HashSet<PathBuf>
    where
        I: IntoIterator<Item = &'a str>,
    {
        relative
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| top.join(p))
            .filter(|p| p.is_file())
            .collect()
    }
}

impl GitQuery for GitCli {
    fn recent_commit_files(&self, root: &Path, n: usize) -> HashSet<PathBuf> {
        if n == 0 {
            return HashSet::new();
        }
        let Some(top) = self.toplevel(root) else {
            return HashSet::new();
        };

        let count = n.to_string();
        let Some(out) = self.run(
            root,
            &["log", "-z", "-n", &count, "--name-only", "--pretty=format:", "HEAD"],
        ) else {
            return HashSet::new();
        };

        let files = Self::existing_files(&top, split_nul_paths(&out));
        tracing::debug!("{} files touched in the last {} commits", files.len(), n);
        files
    }

    fn uncommitted_files(&self, root: &Path) -> HashSet<PathBuf> {
        let Some(top) = self.toplevel(root) else {
            return HashSet::new();
        };
        let Some(out) = self.run(
            root,
            &["status", "--porcelain=v1", "-z", "--untracked-files=all"],
        ) else {
            return HashSet::new();
        };

        let files = Self::existing_files(&top, parse_porcelain_z(&out));
        tracing::debug!("{} uncommitted files", files.len());
        files
    }

    fn current_branch(&self, root: &Path) -> Option<String> {
        let out = self.run(root, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        let branch = out.trim();
        (!branch.is_empty() && branch != "HEAD").then(|| branch.to_string())
    }

    fn changed_files(&self, root: &Path, base: &str) -> HashSet<PathBuf> {
        let Some(top) = self.toplevel(root) else {
            return HashSet::new();
        };
        let range = format!("{base}...HEAD");
        let Some(out) = self.run(root, &["diff", "-z", "--name-only", &range]) else {
            return HashSet::new();
        };
        Self::existing_files(&top, split_nul_paths(&out))
    }
}

/// Splits `-z` name output into paths. `git log` separates commits with a
/// newline that ends up in front of the next commit's first path.
pub(crate) fn split_nul_paths(output: &str) -> impl Iterator<Item = &str> {
    output
        .split('\0')
        .map(|p| p.trim_start_matches('\n'))
        .filter(|p| !p.is_empty())
}

/// Extracts paths from `git status --porcelain=v1 -z` output.
///
/// Rename and copy entries are followed by their source path, which is
/// skipped. Ignored entries (`!!`) are dropped.
pub(crate) fn parse_porcelain_z(output: &str) -> Vec<&str> {
    let mut paths = Vec::new();
    let mut entries = output.split('\0');

    while let Some(entry) = entries.next() {
        if entry.len() < 4 {
            continue;
        }
        let (status, path) = entry.split_at(3);
        let status = &status[..2];

        if status == "!!" {
            continue;
        }
        if status.contains('R') || status.contains('C') {
            entries.next();
        }
        paths.push(path);
    }

    paths
}
