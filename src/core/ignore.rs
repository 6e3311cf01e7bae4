//! Gitignore-style pattern matching and `.gitignore` loading.
//!
//! Only a practical subset of gitignore semantics is supported: there are no
//! negation patterns (a `!pattern` line is matched literally) and only the
//! ignore file at the repository root is read.

use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::path::Path;

/// Builds a glob matcher where `*` never crosses a `/`.
///
/// Malformed globs yield `None`; callers treat that as "never matches".
pub(crate) fn compile_glob(pattern: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            tracing::debug!("Ignoring malformed glob pattern '{}': {}", pattern, e);
            None
        }
    }
}

/// Returns `path` relative to `root` with forward slashes.
///
/// Paths outside `root` are returned as given, forward-slashed.
pub fn normalize_relative(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone)]
enum Rule {
    /// `name/`: any segment equal to `name`.
    DirName(String),
    /// `a/b/`: glob against every ancestor prefix of the path.
    DirPath(Option<GlobMatcher>),
    /// `*.log`: glob against the file name, or equality with a directory name.
    Name {
        literal: String,
        glob: Option<GlobMatcher>,
    },
    /// `src/*.rs`: glob against the full relative path.
    Path(Option<GlobMatcher>),
}

/// A single compiled ignore pattern that remembers its source text.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    raw: String,
    rule: Rule,
}

impl IgnorePattern {
    pub fn new(raw: &str) -> Self {
        let rule = if let Some(dir) = raw.strip_suffix('/') {
            let dir = dir.trim_start_matches('/');
            if dir.contains('/') {
                Rule::DirPath(compile_glob(dir))
            } else {
                Rule::DirName(dir.to_string())
            }
        } else if raw.contains('/') {
            Rule::Path(compile_glob(raw.trim_start_matches('/')))
        } else {
            Rule::Name {
                literal: raw.to_string(),
                glob: compile_glob(raw),
            }
        };

        Self {
            raw: raw.to_string(),
            rule,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches an already-normalized relative path (`a/b/c.txt`).
    pub fn matches_relative(&self, relative: &str) -> bool {
        if relative.is_empty() {
            return false;
        }
        let segments: Vec<&str> = relative.split('/').collect();

        match &self.rule {
            Rule::DirName(name) => segments.iter().any(|s| s == name),
            Rule::DirPath(glob) => glob.as_ref().is_some_and(|g| {
                (1..=segments.len()).any(|n| g.is_match(segments[..n].join("/")))
            }),
            Rule::Name { literal, glob } => {
                let (file_name, parents) = match segments.split_last() {
                    Some((last, parents)) => (*last, parents),
                    None => return false,
                };
                glob.as_ref().is_some_and(|g| g.is_match(file_name))
                    || parents.iter().any(|s| s == literal)
            }
            Rule::Path(glob) => glob.as_ref().is_some_and(|g| g.is_match(relative)),
        }
    }
}

/// Evaluates a single pattern against `path`, relative to `repo_root`.
pub fn matches_pattern(path: &Path, repo_root: &Path, pattern: &str) -> bool {
    IgnorePattern::new(pattern).matches_relative(&normalize_relative(path, repo_root))
}

/// A compiled, match-if-any list of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<IgnorePattern>,
}

impl PatternSet {
    /// Compiles the given patterns. Blank entries are skipped; order and
    /// duplicates do not affect the result.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|p| {
                let p = p.as_ref().trim();
                (!p.is_empty()).then(|| IgnorePattern::new(p))
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns the first pattern that matches `path`, if any.
    pub fn first_match(&self, path: &Path, repo_root: &Path) -> Option<&str> {
        let relative = normalize_relative(path, repo_root);
        self.patterns
            .iter()
            .find(|p| p.matches_relative(&relative))
            .map(IgnorePattern::as_str)
    }

    pub fn is_match(&self, path: &Path, repo_root: &Path) -> bool {
        self.first_match(path, repo_root).is_some()
    }
}

/// Reads a `.gitignore`-style file into its ordered list of patterns.
///
/// A missing or unreadable file yields an empty list.
pub fn load_gitignore(path: &Path) -> Vec<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("No ignore file loaded from {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
