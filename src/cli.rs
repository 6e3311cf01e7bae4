//! Command-line surface: argument parsing, validation, and the export run.

use crate::config::AppConfig;
use crate::core::{
    default_output_filename, generate_markdown, generate_pr_markdown, pr_context,
    read_changed_files, scan_repository, ScanOptions, ScanResult, ScopeConfig,
};
use crate::output::{
    chat_payload, handle_output, open_ai_chat, AiService, OutputError, OutputTargets,
    SystemClipboard,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Export a repository (or a slice of it) as a single Markdown document
///
/// Examples:
///   repo-export .                              # Export to stdout
///   repo-export ./project -o docs.md           # Export to a file
///   repo-export . -o                           # Export to <repo>_export.md
///   repo-export . --recent 3 --uncommitted     # Only recently touched files
///   repo-export . --include 'src/**/*.rs'      # Only files matching a glob
///   repo-export . --pr --target develop        # Review the current branch
///   repo-export . --open-chat claude --prompt "Review this"
#[derive(Parser, Debug, Clone)]
#[command(name = "repo-export")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Path to the repository
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Write the document to this file; without a value, to `<repo>_export.md`
    #[arg(short, long, value_name = "FILE", help_heading = "Output")]
    pub output: Option<Option<PathBuf>>,

    /// Copy the document to the clipboard
    #[arg(short, long, help_heading = "Output")]
    pub clipboard: bool,

    /// Print the document to stdout (default if no other output is chosen)
    #[arg(short, long, help_heading = "Output")]
    pub stdout: bool,

    /// Additional ignore pattern (repeatable)
    #[arg(long, visible_alias = "ignore", value_name = "PATTERN", help_heading = "Filtering")]
    pub exclude: Vec<String>,

    /// Exclude meta files like .gitignore, README, LICENSE
    #[arg(long, visible_alias = "exclude-meta-files", help_heading = "Filtering")]
    pub no_meta: bool,

    /// Keep a specific meta file even when meta files are excluded (repeatable)
    #[arg(long, value_name = "NAME", help_heading = "Filtering")]
    pub include_meta: Vec<String>,

    /// Exclude a specific file (repeatable)
    #[arg(long, value_name = "NAME", help_heading = "Filtering")]
    pub exclude_meta: Vec<String>,

    /// Maximum file size in bytes [default: 1048576]
    #[arg(long, value_name = "BYTES", help_heading = "Filtering")]
    pub max_file_size: Option<u64>,

    /// Only files touched in the last N commits
    #[arg(long, value_name = "N", help_heading = "Scope")]
    pub recent: Option<usize>,

    /// Only modified, staged, and untracked files
    #[arg(long, help_heading = "Scope")]
    pub uncommitted: bool,

    /// Only files matching this glob, relative to the repository root (repeatable)
    #[arg(long, value_name = "GLOB", help_heading = "Scope")]
    pub include: Vec<String>,

    /// Export the current branch's diff against its target instead of the tree
    #[arg(long, help_heading = "PR review")]
    pub pr: bool,

    /// Branch to compare against in PR mode
    #[arg(long, value_name = "BRANCH", requires = "pr", help_heading = "PR review")]
    pub target: Option<String>,

    /// Open an AI chat service with the document on the clipboard
    #[arg(long, value_enum, value_name = "SERVICE", help_heading = "AI chat")]
    pub open_chat: Option<AiService>,

    /// Open every supported AI chat service
    #[arg(long, help_heading = "AI chat")]
    pub chat_all: bool,

    /// Prompt placed above the document for AI chat
    #[arg(long, help_heading = "AI chat")]
    pub prompt: Option<String>,

    /// Browser to use (default, chrome, firefox, safari, edge)
    #[arg(long, default_value = "default", help_heading = "AI chat")]
    pub browser: String,

    /// List every included and ignored file on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// `true` when an AI chat service was requested.
    pub fn chat_mode(&self) -> bool {
        self.open_chat.is_some() || self.chat_all
    }

    /// The chat services to open, in a stable order.
    pub fn chat_services(&self) -> Vec<AiService> {
        if self.chat_all {
            AiService::ALL.to_vec()
        } else {
            self.open_chat.into_iter().collect()
        }
    }

    /// Checks the arguments and resolves the repository root.
    ///
    /// Chat mode switches the clipboard on; a prompt without chat mode only
    /// warns.
    pub fn validate(&mut self) -> Result<PathBuf> {
        if !self.path.exists() {
            bail!("Repository path does not exist: {}", self.path.display());
        }
        if !self.path.is_dir() {
            bail!("Repository path is not a directory: {}", self.path.display());
        }
        let root = self
            .path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", self.path.display()))?;

        if self.max_file_size == Some(0) {
            bail!("Max file size must be positive");
        }
        if self.recent == Some(0) {
            bail!("--recent must be a positive number of commits");
        }

        if self.prompt.is_some() && !self.chat_mode() {
            eprintln!(
                "Warning: --prompt specified but no chat service selected. Use --open-chat or --chat-all"
            );
        }
        if self.chat_mode() && !self.clipboard {
            eprintln!("Info: Enabling clipboard mode for AI chat integration");
            self.clipboard = true;
        }

        Ok(root)
    }

    /// The sinks to use; a bare `-o` names the file after the repository at
    /// `root`.
    pub fn output_targets(&self, root: &Path) -> OutputTargets {
        OutputTargets {
            file: self
                .output
                .as_ref()
                .map(|file| file.clone().unwrap_or_else(|| default_output_filename(root))),
            clipboard: self.clipboard,
            stdout: self.stdout,
        }
    }
}

/// The scope requested on the command line, or `None` for the whole tree.
pub fn build_scope_config(cli: &Cli) -> Option<ScopeConfig> {
    let mut scope = ScopeConfig::default()
        .with_uncommitted(cli.uncommitted)
        .with_include_patterns(cli.include.iter().cloned());
    if let Some(n) = cli.recent {
        scope = scope.with_recent(n);
    }
    scope.is_scoped().then_some(scope)
}

/// Layers CLI flags over the stored settings.
pub fn scan_options(cli: &Cli, config: &AppConfig) -> ScanOptions {
    let mut ignore_patterns = config.ignore_patterns.clone();
    ignore_patterns.extend(cli.exclude.iter().cloned());

    ScanOptions {
        ignore_patterns,
        exclude_meta_files: cli.no_meta || config.exclude_meta_files,
        include_meta: cli.include_meta.clone(),
        exclude_meta: cli.exclude_meta.clone(),
        max_file_size: cli.max_file_size.unwrap_or(config.max_file_size),
        scope: build_scope_config(cli).unwrap_or_default(),
        verbose: cli.verbose,
    }
}

/// The included/ignored listing printed in verbose mode.
pub fn verbose_report(result: &ScanResult) -> String {
    let root = &result.repo_root;
    let mut report = String::from("=== Verbose File Report ===\nIncluded files:\n");
    for path in &result.included_files {
        let _ = writeln!(report, "  {}", display_relative(path, root));
    }
    report.push_str("\nIgnored files:\n");
    for ignored in &result.ignored_files {
        let _ = writeln!(
            report,
            "  {} ({})",
            display_relative(&ignored.path, root),
            ignored.reason
        );
    }
    report.push_str("===========================\n");
    report
}

fn display_relative(path: &Path, root: &Path) -> String {
    crate::core::ignore::normalize_relative(path, root)
}

/// Runs one export end to end.
pub fn run(mut cli: Cli) -> Result<()> {
    let root = cli.validate()?;
    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load settings, using defaults: {:#}", e);
        AppConfig::default()
    });

    let markdown = if cli.pr {
        eprintln!("Collecting branch changes...");
        let context = pr_context(&root, cli.target.as_deref())?;
        let max_file_size = cli.max_file_size.unwrap_or(config.max_file_size);
        let contents = read_changed_files(&root, &context, max_file_size);
        generate_pr_markdown(&context, &contents)
    } else {
        eprintln!("Scanning repository...");
        let options = scan_options(&cli, &config);
        let result = scan_repository(&root, &options)?;
        if cli.verbose {
            eprint!("{}", verbose_report(&result));
        }
        eprintln!(
            "Processed {} files ({:.2} MB)",
            result.files.len(),
            result.total_size as f64 / (1024.0 * 1024.0)
        );
        generate_markdown(&result)
    };

    let prompt = cli.prompt.as_deref().filter(|_| cli.chat_mode());
    let content = chat_payload(prompt, &markdown);

    match handle_output(&content, &cli.output_targets(&root), &SystemClipboard::new()) {
        Ok(()) => {}
        Err(OutputError::ClipboardUnavailable) => {
            eprintln!("Warning: {}", OutputError::ClipboardUnavailable);
            if cli.chat_mode() {
                eprintln!("Warning: Skipping AI chat because nothing was copied");
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    if cli.chat_mode() {
        eprintln!("Opening AI chat...");
        if !open_ai_chat(&cli.chat_services(), prompt, &cli.browser) {
            eprintln!("Warning: Could not open any AI chat service");
        }
    }

    Ok(())
}
