//! Discovery of the `yt-dlp` executable

use crate::config::ToolsConfig;
use crate::error::{Error, Result};
use std::path::PathBuf;

/// Name of the yt-dlp binary on the system PATH
pub const PATH_BINARY_NAME: &str = "yt-dlp";

/// File name of the bundled binary for the current platform
///
/// Matches the names the release-fetch script writes into the bundle directory.
pub fn bundled_binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else if cfg!(target_os = "macos") {
        "yt-dlp-macos"
    } else {
        "yt-dlp-linux"
    }
}

/// Locate the yt-dlp executable
///
/// Search order:
/// 1. `ytdlp_path`, when configured (it must exist; no fallback)
/// 2. The bundled binary inside `bin_dir`
/// 3. `yt-dlp` on the system PATH, when `search_path` is enabled
///
/// # Errors
///
/// Returns [`Error::BinaryMissing`] listing every location checked.
pub fn locate_binary(tools: &ToolsConfig) -> Result<PathBuf> {
    if let Some(path) = &tools.ytdlp_path {
        if path.is_file() {
            return Ok(path.clone());
        }
        return Err(Error::BinaryMissing {
            searched: vec![path.clone()],
        });
    }

    let mut searched = Vec::new();

    if let Some(dir) = &tools.bin_dir {
        let bundled = dir.join(bundled_binary_name());
        if bundled.is_file() {
            return Ok(bundled);
        }
        searched.push(bundled);
    }

    if tools.search_path {
        match which::which(PATH_BINARY_NAME) {
            Ok(path) => return Ok(path),
            Err(e) => {
                tracing::debug!(error = %e, "yt-dlp not found on PATH");
                searched.push(PathBuf::from(PATH_BINARY_NAME));
            }
        }
    }

    Err(Error::BinaryMissing { searched })
}
