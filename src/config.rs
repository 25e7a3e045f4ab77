//! Run configuration, loadable from a JSON file with per-field defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::download::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS};

/// Default archive root directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "Peraturan-RI";

/// Default politeness delay between listing fetches, in milliseconds.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// The config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for this configuration.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Harvest settings. Every field has a default, so a partial (or absent)
/// config file is fine; CLI flags override loaded values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    /// Root directory of the archive tree.
    pub output_root: PathBuf,
    /// Concurrent document downloads.
    pub max_concurrency: usize,
    /// Politeness delay between listing fetches, in milliseconds.
    pub request_delay_ms: u64,
    /// Fetch attempts per document (including the first).
    pub retry_count: u32,
    /// When set, report what would be downloaded without any I/O.
    pub demo_mode: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            max_concurrency: DEFAULT_CONCURRENCY,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            retry_count: DEFAULT_MAX_ATTEMPTS,
            demo_mode: false,
        }
    }
}

impl HarvestConfig {
    /// Loads configuration from a JSON file.
    ///
    /// A missing file yields the defaults; fields absent from the file
    /// keep their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read or
    /// parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
