//! Argument vectors for the `yt-dlp` binary
//!
//! Every function here is pure: it maps its input to an ordered argument list
//! and performs no I/O. The media URL is always the final argument.

use crate::types::{DownloadRequest, FormatSelection};

/// Runtime-selection prefix the binary requires before any other option
pub const RUNTIME_PREFIX: [&str; 2] = ["--js-runtimes", "node"];

/// Container audio-only downloads are converted to
pub const AUDIO_FORMAT: &str = "mp3";

/// Language requested for manual and automatic subtitles
pub const SUBTITLE_LANGUAGE: &str = "en";

/// Format expression used when neither an explicit id nor audio-only is requested
pub const BEST_FORMAT: &str = "bestvideo+bestaudio/best";

/// Build the argument vector for a download job
///
/// # Examples
///
/// ```
/// use pullbox_dl::{DownloadRequest, command::build_download_args};
///
/// let request = DownloadRequest::builder("https://example.com/watch?v=1")
///     .audio_only(true)
///     .build()?;
/// let args = build_download_args(&request);
///
/// assert!(args.contains(&"-x".to_string()));
/// assert_eq!(args.last().map(String::as_str), Some("https://example.com/watch?v=1"));
/// # Ok::<(), pullbox_dl::Error>(())
/// ```
pub fn build_download_args(request: &DownloadRequest) -> Vec<String> {
    let mut args = prefix();
    args.push("--progress".to_string());
    args.push("--newline".to_string());

    match request.format() {
        FormatSelection::Explicit(id) => {
            args.push("-f".to_string());
            args.push(id.clone());
        }
        FormatSelection::AudioOnly => {
            args.push("-f".to_string());
            args.push("bestaudio".to_string());
            args.push("-x".to_string());
            args.push("--audio-format".to_string());
            args.push(AUDIO_FORMAT.to_string());
        }
        FormatSelection::Best => {
            args.push("-f".to_string());
            args.push(BEST_FORMAT.to_string());
        }
    }

    if let Some(dir) = request.output_directory() {
        args.push("-o".to_string());
        args.push(
            dir.join(request.output_template())
                .to_string_lossy()
                .into_owned(),
        );
    }

    if request.include_subtitles() {
        args.push("--write-subs".to_string());
        args.push("--write-auto-subs".to_string());
        args.push("--sub-langs".to_string());
        args.push(SUBTITLE_LANGUAGE.to_string());
    }

    if request.include_metadata() {
        args.push("--embed-metadata".to_string());
        args.push("--embed-thumbnail".to_string());
    }

    if !request.download_entire_playlist() {
        args.push("--no-playlist".to_string());
    }

    args.push(request.url().to_string());
    args
}

/// Build the argument vector that dumps media metadata and formats as JSON
pub fn build_formats_args(url: &str) -> Vec<String> {
    let mut args = prefix();
    args.extend(["-J", "--no-playlist", "--no-warnings"].map(String::from));
    args.push(url.to_string());
    args
}

/// Build the argument vector that lists a playlist without resolving its entries
pub fn build_playlist_args(url: &str) -> Vec<String> {
    let mut args = prefix();
    args.extend(["-J", "--flat-playlist", "--no-warnings"].map(String::from));
    args.push(url.to_string());
    args
}

fn prefix() -> Vec<String> {
    RUNTIME_PREFIX.iter().map(|s| s.to_string()).collect()
}
