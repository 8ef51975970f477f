//! Editor configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base URL of the plugin's web server.
    pub base_url: String,

    /// Directory holding document snapshots. `None` keeps them in memory.
    pub data_dir: Option<PathBuf>,

    /// Seconds between status polls.
    pub status_interval_secs: u64,

    /// Seconds before a slow initial load is reported.
    pub load_timeout_secs: u64,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Language used when nothing else is stored.
    pub default_language: String,

    /// Buffer size of notification subscriptions.
    pub event_buffer: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            data_dir: None,
            status_interval_secs: 60,
            load_timeout_secs: 10,
            request_timeout_secs: 15,
            default_language: "en".to_string(),
            event_buffer: 256,
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs.max(1))
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
