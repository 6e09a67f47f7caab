//! Core types for pullbox-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output template used when a request does not supply one
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Sentinel for a speed or ETA the binary has not reported yet
pub const UNKNOWN: &str = "unknown";

/// How the media format is chosen for a download
///
/// The three strategies are mutually exclusive; a request carrying both an
/// explicit format id and the audio-only flag is rejected when built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "format_id", rename_all = "snake_case")]
pub enum FormatSelection {
    /// Pass a format identifier through verbatim
    Explicit(String),
    /// Best audio stream, extracted to a fixed container
    AudioOnly,
    /// Best combined video+audio, falling back to the best single stream
    Best,
}

/// A validated, immutable download request
///
/// Built with [`DownloadRequest::builder`]; the only validation performed is that
/// the URL is not empty. Malformed URLs are left for the binary to reject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    url: String,
    output_directory: Option<PathBuf>,
    format: FormatSelection,
    include_subtitles: bool,
    include_metadata: bool,
    download_entire_playlist: bool,
    output_template: String,
}

impl DownloadRequest {
    /// Start building a request for `url`
    pub fn builder(url: impl Into<String>) -> DownloadRequestBuilder {
        DownloadRequestBuilder::new(url)
    }

    /// Media URL, always handed to the binary as the last argument
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Directory the binary should write into, if any
    pub fn output_directory(&self) -> Option<&Path> {
        self.output_directory.as_deref()
    }

    /// Resolved format strategy
    pub fn format(&self) -> &FormatSelection {
        &self.format
    }

    /// Whether manual and automatic subtitles are requested
    pub fn include_subtitles(&self) -> bool {
        self.include_subtitles
    }

    /// Whether metadata and a thumbnail are embedded
    pub fn include_metadata(&self) -> bool {
        self.include_metadata
    }

    /// Whether a playlist URL downloads every item instead of a single one
    pub fn download_entire_playlist(&self) -> bool {
        self.download_entire_playlist
    }

    /// `yt-dlp` output template (e.g. `%(title)s.%(ext)s`)
    pub fn output_template(&self) -> &str {
        &self.output_template
    }
}

/// Builder for [`DownloadRequest`]
#[derive(Clone, Debug, Default)]
pub struct DownloadRequestBuilder {
    url: String,
    output_directory: Option<PathBuf>,
    format_id: Option<String>,
    audio_only: bool,
    include_subtitles: bool,
    include_metadata: bool,
    download_entire_playlist: bool,
    output_template: Option<String>,
}

impl DownloadRequestBuilder {
    /// Create a builder for `url` with every option off
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Directory the download is written into
    pub fn output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(dir.into());
        self
    }

    /// Explicit format identifier (cannot be combined with [`audio_only`](Self::audio_only))
    ///
    /// A blank id is treated as absent.
    pub fn format_id(mut self, id: impl Into<String>) -> Self {
        self.format_id = Some(id.into());
        self
    }

    /// Download only the audio stream and convert it to mp3
    pub fn audio_only(mut self, enabled: bool) -> Self {
        self.audio_only = enabled;
        self
    }

    /// Download English subtitles, including auto-generated ones
    pub fn include_subtitles(mut self, enabled: bool) -> Self {
        self.include_subtitles = enabled;
        self
    }

    /// Embed metadata and thumbnail into the output file
    pub fn include_metadata(mut self, enabled: bool) -> Self {
        self.include_metadata = enabled;
        self
    }

    /// Download every item when the URL resolves to a playlist
    pub fn download_entire_playlist(mut self, enabled: bool) -> Self {
        self.download_entire_playlist = enabled;
        self
    }

    /// Override the default output template
    pub fn output_template(mut self, template: impl Into<String>) -> Self {
        self.output_template = Some(template.into());
        self
    }

    /// Validate and freeze the request
    pub fn build(self) -> Result<DownloadRequest> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::InvalidRequest("url must not be empty".to_string()));
        }

        let format = match (non_empty(self.format_id), self.audio_only) {
            (Some(_), true) => {
                return Err(Error::InvalidRequest(
                    "format_id and audio_only are mutually exclusive".to_string(),
                ));
            }
            (Some(id), false) => FormatSelection::Explicit(id),
            (None, true) => FormatSelection::AudioOnly,
            (None, false) => FormatSelection::Best,
        };

        Ok(DownloadRequest {
            url: url.to_string(),
            output_directory: self.output_directory,
            format,
            include_subtitles: self.include_subtitles,
            include_metadata: self.include_metadata,
            download_entire_playlist: self.download_entire_playlist,
            output_template: self
                .output_template
                .unwrap_or_else(|| DEFAULT_OUTPUT_TEMPLATE.to_string()),
        })
    }
}

/// Download options as sent by a front-end (camelCase JSON)
///
/// Empty strings are treated as absent values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadOptions {
    /// Media URL
    pub url: String,
    /// Output directory
    pub output_path: Option<String>,
    /// Explicit format identifier
    pub format_id: Option<String>,
    /// Audio-only download
    pub audio_only: bool,
    /// Include subtitles
    pub include_subtitles: bool,
    /// Embed metadata and thumbnail
    pub include_metadata: bool,
    /// Download the whole playlist
    pub download_playlist: bool,
    /// Output template
    pub output_template: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<DownloadOptions> for DownloadRequest {
    type Error = Error;

    fn try_from(options: DownloadOptions) -> Result<Self> {
        let mut builder = DownloadRequest::builder(options.url)
            .audio_only(options.audio_only)
            .include_subtitles(options.include_subtitles)
            .include_metadata(options.include_metadata)
            .download_entire_playlist(options.download_playlist);

        if let Some(dir) = non_empty(options.output_path) {
            builder = builder.output_directory(dir);
        }
        if let Some(id) = non_empty(options.format_id) {
            builder = builder.format_id(id);
        }
        if let Some(template) = non_empty(options.output_template) {
            builder = builder.output_template(template);
        }

        builder.build()
    }
}

/// Latest reconciled progress of a download job
///
/// Fields the binary did not mention on a given line keep their previous value.
/// `playlist_index` and `playlist_total` are always set together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Progress of the current media item (0.0 to 100.0)
    pub percentage: f64,
    /// Transfer rate as printed by the binary (e.g. "1.20MiB/s")
    pub speed: String,
    /// Remaining time as printed by the binary (e.g. "00:08")
    pub eta: String,
    /// Last announced destination path
    pub filename: String,
    /// 1-based position of the current item within a playlist
    pub playlist_index: Option<u32>,
    /// Number of items in the playlist
    pub playlist_total: Option<u32>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            percentage: 0.0,
            speed: UNKNOWN.to_string(),
            eta: UNKNOWN.to_string(),
            filename: String::new(),
            playlist_index: None,
            playlist_total: None,
        }
    }
}

/// Event emitted while a download job runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The binary was spawned for a new job
    Started {
        /// Media URL
        url: String,
    },

    /// The progress snapshot changed
    Progress {
        /// Snapshot after the change
        snapshot: ProgressSnapshot,
        /// True for the synthetic snapshot emitted when the binary reports completion
        ///
        /// This is a display hint only; success is decided by the exit code.
        complete: bool,
    },

    /// Text written by the binary to its error stream, forwarded verbatim
    ErrorOutput {
        /// Raw text
        message: String,
    },

    /// The process exited successfully
    Finished {
        /// Always true; kept for consumers that mirror the `DownloadResult` shape
        success: bool,
    },

    /// The job failed
    Failed {
        /// Technical description of the failure
        error: String,
        /// Translated, user-facing message
        message: String,
    },

    /// The job was cancelled and its process terminated
    Cancelled,
}

/// Outcome of a finished download job
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResult {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Short human-readable summary
    pub message: String,
}

/// A single downloadable format reported by `yt-dlp -J`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatInfo {
    /// Format identifier accepted by `-f`
    pub format_id: String,
    /// Container extension
    pub ext: String,
    /// Resolution label (e.g. "1920x1080" or "audio only")
    pub resolution: String,
    /// Size in bytes, exact or approximate (0 when unknown)
    pub filesize: u64,
    /// Video codec ("none" for audio-only formats)
    pub vcodec: String,
    /// Audio codec ("none" for video-only formats)
    pub acodec: String,
    /// Frame rate (0 when unknown)
    pub fps: f64,
    /// Frame height in pixels (0 when unknown)
    pub height: u32,
    /// Frame width in pixels (0 when unknown)
    pub width: u32,
}

impl FormatInfo {
    /// Whether the format carries a video stream
    pub fn has_video(&self) -> bool {
        !self.vcodec.is_empty() && self.vcodec != "none"
    }

    /// Whether the format carries an audio stream
    pub fn has_audio(&self) -> bool {
        !self.acodec.is_empty() && self.acodec != "none"
    }
}

/// Media metadata and available formats for a single URL
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    /// Media title
    pub title: String,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// Duration in seconds (0 when unknown)
    pub duration: f64,
    /// All reported formats
    pub formats: Vec<FormatInfo>,
    /// Distinct video heights, highest first
    pub resolutions: Vec<u32>,
    /// Distinct container extensions in first-seen order
    pub extensions: Vec<String>,
    /// Whether any format carries audio
    pub has_audio: bool,
    /// Whether any format carries video
    pub has_video: bool,
}

/// One entry of a flat playlist listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Entry title
    pub title: String,
    /// Entry id
    pub id: String,
    /// Duration in seconds (0 when unknown)
    pub duration: f64,
}

/// Result of a playlist check
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    /// Whether the URL resolves to a playlist
    pub is_playlist: bool,
    /// Playlist title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_title: Option<String>,
    /// Number of items in the playlist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_count: Option<usize>,
    /// Playlist id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,
    /// Leading entries, truncated to the configured preview limit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<PlaylistEntry>,
}
