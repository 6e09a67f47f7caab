//! Error types for pullbox-dl
//!
//! This module provides the error taxonomy for download jobs:
//! - Structural failures (missing binary, spawn failure, non-zero exit) that end a job
//! - Request and configuration validation errors
//! - A translation of raw `yt-dlp` error text into a small set of user-facing categories
//!
//! Lines of binary output that match no known pattern are not errors at all; the
//! progress classifier ignores them so newer `yt-dlp` releases keep working.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pullbox-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pullbox-dl
#[derive(Debug, Error)]
pub enum Error {
    /// The `yt-dlp` binary could not be located; raised before anything is spawned
    #[error("yt-dlp binary not found (searched: {})", display_paths(.searched))]
    BinaryMissing {
        /// Every location that was checked, in search order
        searched: Vec<PathBuf>,
    },

    /// The operating system refused to start the process
    #[error("failed to start yt-dlp: {0}")]
    Spawn(String),

    /// The process ran but exited with a non-zero status
    #[error("yt-dlp exited with {}{}", display_code(.code), display_stderr(.stderr))]
    Runtime {
        /// Exit code (`None` when the process was terminated by a signal)
        code: Option<i32>,
        /// Last text observed on the error stream, if any
        stderr: Option<String>,
    },

    /// The job was cancelled and its process terminated
    #[error("download cancelled")]
    Cancelled,

    /// Another download job is already running on this downloader
    #[error("a download is already in progress")]
    Busy,

    /// The download request failed validation
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "event_capacity")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON from `yt-dlp -J`
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

fn display_stderr(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) => format!(": {}", text),
        None => String::new(),
    }
}

impl Error {
    /// Machine-readable error code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            Error::BinaryMissing { .. } => "binary_missing",
            Error::Spawn(_) => "spawn_failure",
            Error::Runtime { .. } => "runtime_failure",
            Error::Cancelled => "cancelled",
            Error::Busy => "busy",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Message suitable for showing to an end user
    ///
    /// Runtime failures are translated through [`ErrorCategory`]; when the error
    /// text matches no category, the raw text is returned unchanged.
    pub fn user_message(&self) -> String {
        match self {
            Error::Runtime {
                stderr: Some(text), ..
            } => friendly_message(text),
            Error::Runtime { stderr: None, code } => format!(
                "the download failed ({}).",
                display_code(code)
            ),
            Error::BinaryMissing { .. } => {
                "yt-dlp could not be found. please reinstall the application.".to_string()
            }
            Error::Spawn(_) => "yt-dlp could not be started.".to_string(),
            Error::Cancelled => "the download was cancelled.".to_string(),
            Error::Busy => "a download is already in progress.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error details handed to the presentation layer
///
/// # Example JSON
///
/// ```json
/// {
///   "code": "runtime_failure",
///   "message": "this video is private and cannot be downloaded."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (see [`Error::code`])
    pub code: String,
    /// Human-readable, already translated message
    pub message: String,
}

impl From<&Error> for ErrorDetail {
    fn from(error: &Error) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.user_message(),
        }
    }
}

impl From<Error> for ErrorDetail {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}

/// User-facing category of a `yt-dlp` failure
///
/// Categories are matched by substring against the raw error text, in the
/// order of the variants below; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// DNS or host resolution failed
    NetworkUnreachable,
    /// The media was removed or is unavailable
    Removed,
    /// The media is private
    Private,
    /// The site requires signing in
    AuthenticationRequired,
    /// The media does not exist or is blocked in this region
    RegionBlocked,
    /// No extractor supports this URL
    UnsupportedUrl,
    /// Any other HTTP-level failure
    Network,
}

impl ErrorCategory {
    /// Classify raw error text, or `None` when nothing matches
    pub fn from_message(message: &str) -> Option<Self> {
        let category = if message.contains("Failed to resolve")
            || message.contains("Name or service not known")
        {
            Self::NetworkUnreachable
        } else if message.contains("Video unavailable") || message.contains("Video not available")
        {
            Self::Removed
        } else if message.contains("Private video") {
            Self::Private
        } else if message.contains("Sign in to confirm") {
            Self::AuthenticationRequired
        } else if message.contains("This video is not available") {
            Self::RegionBlocked
        } else if message.contains("Unsupported URL") {
            Self::UnsupportedUrl
        } else if message.to_lowercase().contains("http") {
            Self::Network
        } else {
            return None;
        };
        Some(category)
    }

    /// Fixed user-facing wording for this category
    pub fn message(self) -> &'static str {
        match self {
            Self::NetworkUnreachable => {
                "unable to access the URL. please check your internet connection or verify the URL is correct."
            }
            Self::Removed => "video is unavailable or has been removed.",
            Self::Private => "this video is private and cannot be downloaded.",
            Self::AuthenticationRequired => {
                "this content requires authentication. it cannot be downloaded."
            }
            Self::RegionBlocked => {
                "this video does not exist or is not available in your region."
            }
            Self::UnsupportedUrl => "this URL is not supported. please try a different link.",
            Self::Network => "network error. please check your internet connection and try again.",
        }
    }
}

/// Translate raw `yt-dlp` error text into a user-facing message
///
/// Falls back to the raw text when no [`ErrorCategory`] matches.
pub fn friendly_message(raw: &str) -> String {
    match ErrorCategory::from_message(raw) {
        Some(category) => category.message().to_string(),
        None => raw.to_string(),
    }
}
