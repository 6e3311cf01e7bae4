//! Renders scan results and PR contexts as Markdown documents.

use super::pr::PrContext;
use super::{ScanResult, TreeGenerator};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Builds the full export document for a scan.
pub fn generate_markdown(result: &ScanResult) -> String {
    let repo_name = result.repo_name();
    let relative_paths: Vec<String> = result
        .files
        .iter()
        .map(|f| f.relative_path(&result.repo_root))
        .collect();

    let mut content = String::new();
    content.push_str(&format!("# {repo_name}\n\n"));

    content.push_str("## Repository Summary\n\n");
    content.push_str(&format!("- **Files:** {}\n", result.files.len()));
    content.push_str(&format!(
        "- **Total Size:** {}\n",
        format_size(result.total_size)
    ));
    content.push_str(&format!(
        "- **Generated:** {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    let breakdown = language_breakdown(result);
    if !breakdown.is_empty() {
        content.push_str("\n### Languages\n\n");
        for (language, count) in breakdown {
            let noun = if count == 1 { "file" } else { "files" };
            content.push_str(&format!("- {language}: {count} {noun}\n"));
        }
    }
    content.push('\n');

    content.push_str("## File Structure\n\n```\n");
    content.push_str(&TreeGenerator::generate_tree(&relative_paths, &repo_name));
    content.push_str("```\n\n");

    content.push_str("## File Contents\n\n");
    for (file, relative) in result.files.iter().zip(&relative_paths) {
        push_file_section(&mut content, relative, file.language, &file.content);
    }

    tracing::debug!(
        "Rendered {} files into {} bytes of markdown",
        result.files.len(),
        content.len()
    );
    content
}

/// Builds the review document for a branch diff. `file_contents` is keyed by
/// repository-relative path.
pub fn generate_pr_markdown(context: &PrContext, file_contents: &BTreeMap<String, String>) -> String {
    let mut content = String::new();
    content.push_str(&format!(
        "# PR Review: {} → {}\n\n",
        context.current_branch, context.target_branch
    ));

    content.push_str("## Summary\n\n");
    content.push_str(&format!("- **Branch:** `{}`\n", context.current_branch));
    content.push_str(&format!("- **Target:** `{}`\n", context.target_branch));
    content.push_str(&format!("- **Commits:** {}\n", context.commit_count));
    content.push_str(&format!(
        "- **Changed Files:** {}\n\n",
        context.changed_files.len()
    ));

    content.push_str("## Diff\n\n");
    let fence = fence_for(&context.diff);
    content.push_str(&format!("{fence}diff\n"));
    content.push_str(&context.diff);
    if !context.diff.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&format!("{fence}\n\n"));

    content.push_str("## Changed Files\n\n");
    for (relative, body) in file_contents {
        let language = super::language::classify(Path::new(relative));
        push_file_section(&mut content, relative, language, body);
    }

    content
}

/// `<name>_export.md` for the repository at `root`.
pub fn default_output_filename(root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string());
    PathBuf::from(format!("{name}_export.md"))
}

fn push_file_section(content: &mut String, relative: &str, language: Option<&str>, body: &str) {
    let fence = fence_for(body);
    content.push_str(&format!("### {relative}\n\n"));
    content.push_str(&format!("{fence}{}\n", language.unwrap_or("")));
    content.push_str(body);
    if !body.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&format!("{fence}\n\n"));
}

/// A backtick fence longer than any backtick run inside `body`.
fn fence_for(body: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in body.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Per-language file counts, most common first.
fn language_breakdown(result: &ScanResult) -> Vec<(&'static str, usize)> {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for file in &result.files {
        *counts.entry(file.language.unwrap_or("other")).or_default() += 1;
    }
    let mut breakdown: Vec<_> = counts.into_iter().collect();
    breakdown.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    breakdown
}

fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{bytes} bytes")
    } else if value < KIB * KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{:.1} MB", value / (KIB * KIB))
    }
}
