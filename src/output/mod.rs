//! Destinations for a finished document.
//!
//! Each sink receives the same content; selecting one never changes what
//! another receives.

pub mod browser;
pub mod clipboard;

pub use browser::{chat_payload, chat_url, open_ai_chat, AiService};
pub use clipboard::{Clipboard, SystemClipboard};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {1}: {0}")]
    File(#[source] io::Error, PathBuf),

    #[error("No clipboard tool available (install pbcopy, wl-copy, xclip, or xsel)")]
    ClipboardUnavailable,

    #[error("Failed to copy to clipboard: {0}")]
    Clipboard(String),

    #[error("Failed to write to stdout: {0}")]
    Stdout(#[from] io::Error),
}

/// Which sinks receive the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTargets {
    pub file: Option<PathBuf>,
    pub clipboard: bool,
    pub stdout: bool,
}

impl OutputTargets {
    /// Stdout is used when nothing else was selected.
    pub fn writes_stdout(&self) -> bool {
        self.stdout || (self.file.is_none() && !self.clipboard)
    }
}

/// Writes `content` to `path`, creating missing parent directories.
pub fn write_to_file(path: &Path, content: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OutputError::File(e, path.to_path_buf()))?;
    }
    fs::write(path, content).map_err(|e| OutputError::File(e, path.to_path_buf()))?;
    tracing::info!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

/// Sends `content` to every selected sink.
pub fn handle_output(
    content: &str,
    targets: &OutputTargets,
    clipboard: &dyn Clipboard,
) -> Result<(), OutputError> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    handle_output_to(content, targets, clipboard, &mut lock)
}

/// [`handle_output`] with an explicit stdout writer.
///
/// A missing clipboard does not stop the other sinks. When it was the only
/// sink selected the content goes to stdout instead, and
/// [`OutputError::ClipboardUnavailable`] is returned once everything else
/// has been written.
pub fn handle_output_to<W: Write>(
    content: &str,
    targets: &OutputTargets,
    clipboard: &dyn Clipboard,
    stdout: &mut W,
) -> Result<(), OutputError> {
    if let Some(path) = &targets.file {
        write_to_file(path, content)?;
        eprintln!("Markdown exported to: {}", path.display());
    }

    let mut clipboard_missing = false;
    if targets.clipboard {
        if clipboard.is_available() {
            clipboard.copy(content)?;
            eprintln!("Markdown copied to clipboard");
        } else {
            tracing::warn!("Clipboard requested but no clipboard tool was found");
            clipboard_missing = true;
        }
    }

    if targets.writes_stdout() || (clipboard_missing && targets.file.is_none()) {
        writeln!(stdout, "{content}")?;
        stdout.flush()?;
    }

    if clipboard_missing {
        return Err(OutputError::ClipboardUnavailable);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingClipboard {
        available: bool,
        copied: RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn is_available(&self) -> bool {
            self.available
        }

        fn copy(&self, content: &str) -> Result<(), OutputError> {
            self.copied.borrow_mut().push(content.to_string());
            Ok(())
        }
    }

    const CONTENT: &str = "# Test Content\n\nThis is test markdown content.";

    #[test]
    fn test_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        let targets = OutputTargets {
            file: Some(path.clone()),
            ..Default::default()
        };
        let mut stdout = Vec::new();

        handle_output_to(CONTENT, &targets, &RecordingClipboard::default(), &mut stdout).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), CONTENT);
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_stdout_is_default() {
        let mut stdout = Vec::new();
        handle_output_to(
            CONTENT,
            &OutputTargets::default(),
            &RecordingClipboard::default(),
            &mut stdout,
        )
        .unwrap();
        assert_eq!(String::from_utf8(stdout).unwrap().trim_end(), CONTENT);
    }

    #[test]
    fn test_clipboard_output() {
        let clipboard = RecordingClipboard {
            available: true,
            ..Default::default()
        };
        let targets = OutputTargets {
            clipboard: true,
            ..Default::default()
        };
        let mut stdout = Vec::new();

        handle_output_to(CONTENT, &targets, &clipboard, &mut stdout).unwrap();
        assert_eq!(*clipboard.copied.borrow(), vec![CONTENT.to_string()]);
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_clipboard_unavailable_falls_back_to_stdout() {
        let targets = OutputTargets {
            clipboard: true,
            ..Default::default()
        };
        let mut stdout = Vec::new();
        let err = handle_output_to(CONTENT, &targets, &RecordingClipboard::default(), &mut stdout)
            .unwrap_err();
        assert!(matches!(err, OutputError::ClipboardUnavailable));
        assert_eq!(String::from_utf8(stdout).unwrap().trim_end(), CONTENT);
    }

    #[test]
    fn test_clipboard_unavailable_still_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        let targets = OutputTargets {
            file: Some(path.clone()),
            clipboard: true,
            stdout: false,
        };
        let mut stdout = Vec::new();
        let err = handle_output_to(CONTENT, &targets, &RecordingClipboard::default(), &mut stdout)
            .unwrap_err();
        assert!(matches!(err, OutputError::ClipboardUnavailable));
        assert_eq!(fs::read_to_string(&path).unwrap(), CONTENT);
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_multiple_outputs_receive_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        let clipboard = RecordingClipboard {
            available: true,
            ..Default::default()
        };
        let targets = OutputTargets {
            file: Some(path.clone()),
            clipboard: true,
            stdout: true,
        };
        let mut stdout = Vec::new();

        handle_output_to(CONTENT, &targets, &clipboard, &mut stdout).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), CONTENT);
        assert_eq!(*clipboard.copied.borrow(), vec![CONTENT.to_string()]);
        assert_eq!(String::from_utf8(stdout).unwrap().trim_end(), CONTENT);
    }

    #[test]
    fn test_file_output_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdir").join("deeper").join("out.md");
        write_to_file(&path, CONTENT).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), CONTENT);
    }

    #[test]
    fn test_file_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_to_file(&blocker.join("out.md"), CONTENT).unwrap_err();
        assert!(matches!(err, OutputError::File(_, _)));
    }
}
