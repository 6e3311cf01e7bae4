//! Size and content based eligibility checks for exported files.
//!
//! Binary detection is a heuristic: a file is considered binary when its
//! leading window contains a NUL byte or is not valid UTF-8. Text files in
//! other encodings (UTF-16, Latin-1) are therefore reported as binary, and a
//! binary file whose first window happens to be clean UTF-8 slips through.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of leading bytes inspected by [`is_binary`].
pub const SNIFF_WINDOW: usize = 8 * 1024;

/// Outcome of [`check_eligibility`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    TooLarge { size: u64, limit: u64 },
    Binary,
    Unreadable(String),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Returns `true` if the leading bytes of `bytes` look binary.
pub fn looks_binary(bytes: &[u8]) -> bool {
    if bytes.contains(&0) {
        return true;
    }

    match std::str::from_utf8(bytes) {
        Ok(_) => false,
        // `error_len() == None` means the input ended mid-character, which is
        // expected when the window cuts a multi-byte sequence in half.
        Err(e) => e.error_len().is_some(),
    }
}

/// Reads the leading window of a file and decides whether it is binary.
pub fn is_binary(path: &Path) -> io::Result<bool> {
    let file = File::open(path)?;
    let mut buffer = Vec::with_capacity(SNIFF_WINDOW);
    file.take(SNIFF_WINDOW as u64).read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        return Ok(false);
    }

    Ok(looks_binary(&buffer))
}

/// Decides whether a file can be exported under the given size ceiling.
///
/// The size check runs first so oversized files are never opened.
pub fn check_eligibility(path: &Path, max_bytes: u64) -> Eligibility {
    let metadata = match std::fs::metadata(path) {
        Ok(md) => md,
        Err(e) => return Eligibility::Unreadable(e.to_string()),
    };

    if metadata.len() > max_bytes {
        return Eligibility::TooLarge {
            size: metadata.len(),
            limit: max_bytes,
        };
    }

    match is_binary(path) {
        Ok(true) => Eligibility::Binary,
        Ok(false) => Eligibility::Eligible,
        Err(e) => Eligibility::Unreadable(e.to_string()),
    }
}

/// Convenience wrapper around [`check_eligibility`].
pub fn eligible(path: &Path, max_bytes: u64) -> bool {
    check_eligibility(path, max_bytes).is_eligible()
}
