//! Clipboard access through the platform's command-line tools.

use super::OutputError;
use std::env;
use std::io::Write;
use std::process::{Command, Stdio};

/// Somewhere the document can be copied for pasting.
pub trait Clipboard {
    fn is_available(&self) -> bool;
    fn copy(&self, content: &str) -> Result<(), OutputError>;
}

/// A clipboard program and the arguments that make it read stdin.
type Tool = (&'static str, &'static [&'static str]);

const PBCOPY: Tool = ("pbcopy", &[]);
const CLIP: Tool = ("clip", &[]);
const WL_COPY: Tool = ("wl-copy", &[]);
const XCLIP: Tool = ("xclip", &["-selection", "clipboard"]);
const XSEL: Tool = ("xsel", &["--clipboard", "--input"]);

/// Pipes content into `pbcopy`, `wl-copy`, `xclip`, `xsel`, or `clip`,
/// whichever is found first for the current platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    fn candidates() -> Vec<Tool> {
        if cfg!(target_os = "macos") {
            vec![PBCOPY]
        } else if cfg!(windows) {
            vec![CLIP]
        } else if env::var_os("WAYLAND_DISPLAY").is_some() {
            vec![WL_COPY, XCLIP, XSEL]
        } else {
            vec![XCLIP, XSEL]
        }
    }

    fn tool(&self) -> Option<Tool> {
        Self::candidates()
            .into_iter()
            .find(|(program, _)| on_path(program))
    }
}

impl Clipboard for SystemClipboard {
    fn is_available(&self) -> bool {
        self.tool().is_some()
    }

    fn copy(&self, content: &str) -> Result<(), OutputError> {
        let (program, args) = self.tool().ok_or(OutputError::ClipboardUnavailable)?;
        tracing::debug!("Copying {} bytes with {}", content.len(), program);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| OutputError::Clipboard(format!("{program}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(content.as_bytes())
                .map_err(|e| OutputError::Clipboard(format!("{program}: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| OutputError::Clipboard(format!("{program}: {e}")))?;
        if !output.status.success() {
            return Err(OutputError::Clipboard(format!(
                "{program} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Whether `program` resolves to an executable on `PATH`.
fn on_path(program: &str) -> bool {
    which::which(program).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_are_never_empty() {
        assert!(!SystemClipboard::candidates().is_empty());
    }

    #[test]
    fn test_missing_program_is_not_on_path() {
        assert!(!on_path("definitely-not-a-clipboard-tool-4242"));
    }

    #[cfg(unix)]
    #[test]
    fn test_installed_program_is_on_path() {
        assert!(on_path("sh"));
    }
}
