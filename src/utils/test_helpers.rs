use crate::core::git::GitQuery;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Initializes the tracing subscriber for tests.
///
/// This function is wrapped in a `Once` block to ensure that the global
/// subscriber is set exactly one time, even when tests are run in parallel.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok(); // Ignore the error if it's already set by another crate.
    });
}

/// Returns true when the current process runs as root (UID 0).
/// Permission-sensitive tests are skipped in that case.
#[inline]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: libc call has no side effects; used for testing only.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Returns true when a usable `git` binary is on the PATH.
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A [`GitQuery`] double with canned answers, so scope logic can be tested
/// without spawning `git`.
#[derive(Debug, Default, Clone)]
pub struct FakeGit {
    pub recent: HashSet<PathBuf>,
    pub uncommitted: HashSet<PathBuf>,
    pub changed: HashSet<PathBuf>,
    pub branch: Option<String>,
}

impl GitQuery for FakeGit {
    fn recent_commit_files(&self, _root: &Path, _n: usize) -> HashSet<PathBuf> {
        self.recent.clone()
    }

    fn uncommitted_files(&self, _root: &Path) -> HashSet<PathBuf> {
        self.uncommitted.clone()
    }

    fn current_branch(&self, _root: &Path) -> Option<String> {
        self.branch.clone()
    }

    fn changed_files(&self, _root: &Path, _base: &str) -> HashSet<PathBuf> {
        self.changed.clone()
    }
}
