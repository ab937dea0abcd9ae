//! Session configuration
//!
//! The helper script location is always supplied by the caller, either
//! directly or through a TOML file:
//!
//! ```toml
//! helper = "/usr/local/share/dtruss-stream/dtruss.sh"
//! shell = "/bin/bash"
//! poll_interval_ms = 50
//! temp_dir = "/var/tmp"
//! ```

use crate::error::{Result, TraceError};
use crate::follow::MIN_POLL_INTERVAL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_helper() -> PathBuf {
    PathBuf::from("dtruss.sh")
}

fn default_shell() -> PathBuf {
    PathBuf::from("/bin/bash")
}

fn default_poll_interval() -> u64 {
    100
}

/// How a trace session launches the helper and follows its output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Helper script passed to `shell`
    #[serde(default = "default_helper")]
    pub helper: PathBuf,

    /// Interpreter that runs the helper
    #[serde(default = "default_shell")]
    pub shell: PathBuf,

    /// Wait between output-file reads that found no new data
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Directory for the per-session output file (None = system temp dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            helper: default_helper(),
            shell: default_shell(),
            poll_interval_ms: default_poll_interval(),
            temp_dir: None,
        }
    }
}

impl TraceConfig {
    /// Default configuration pointing at a specific helper script
    pub fn with_helper(helper: impl Into<PathBuf>) -> Self {
        Self {
            helper: helper.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TraceError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TraceError::Config(e.to_string()))
    }

    /// Get poll interval as Duration, never below 1ms
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }
}
