//! Configuration types for pullbox-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External tool location settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Directory holding the bundled, per-platform yt-dlp binary (default: "resources/bin")
    #[serde(default = "default_bin_dir")]
    pub bin_dir: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit or bundled binary is found (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            bin_dir: default_bin_dir(),
            search_path: true,
        }
    }
}

/// Settings for the metadata probes (`fetch_formats`, `check_playlist`)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum number of playlist entries returned by a playlist check (default: 50)
    ///
    /// The reported playlist count is not affected; only the entry list is truncated.
    #[serde(default = "default_playlist_preview_limit")]
    pub playlist_preview_limit: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            playlist_preview_limit: default_playlist_preview_limit(),
        }
    }
}

/// Main configuration for [`Downloader`](crate::Downloader)
///
/// Sub-config fields are flattened, so the serialized form has no nesting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Metadata probe settings
    #[serde(flatten)]
    pub probe: ProbeConfig,

    /// Capacity of the event broadcast channel (default: 1000)
    ///
    /// A subscriber that falls further behind than this receives
    /// `RecvError::Lagged` and skips the oldest events.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tools: ToolsConfig::default(),
            probe: ProbeConfig::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    /// Check settings that would otherwise fail later at runtime
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(Error::Config {
                message: "event_capacity must be greater than zero".to_string(),
                key: Some("event_capacity".to_string()),
            });
        }
        if self.probe.playlist_preview_limit == 0 {
            return Err(Error::Config {
                message: "playlist_preview_limit must be greater than zero".to_string(),
                key: Some("playlist_preview_limit".to_string()),
            });
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_bin_dir() -> Option<PathBuf> {
    Some(PathBuf::from("resources").join("bin"))
}

fn default_playlist_preview_limit() -> usize {
    50
}

fn default_event_capacity() -> usize {
    1000
}
