pub mod settings;

use crate::core::scanner::DEFAULT_MAX_FILE_SIZE;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Persistent defaults that CLI flags layer on top of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Extra ignore patterns applied to every export.
    pub ignore_patterns: Vec<String>,
    pub max_file_size: u64,
    pub exclude_meta_files: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let ignore_patterns = [
            "node_modules/",
            "venv/",
            ".venv/",
            "target/",
            "__pycache__/",
            ".idea/",
            ".DS_Store",
            "Thumbs.db",
            "*.log",
            "*.tmp",
            "*.pyc",
            "package-lock.json",
            "*.lock",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            ignore_patterns,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            exclude_meta_files: false,
        }
    }
}
