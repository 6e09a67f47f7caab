//! Metadata probes
//!
//! Both probes run `yt-dlp -J` to completion and decode the single JSON document
//! it prints. No events are emitted and the job slot is not claimed, so a probe
//! may run while a download is in progress.

use super::Downloader;
use super::job::StderrTail;
use crate::command::{build_formats_args, build_playlist_args};
use crate::error::{Error, Result};
use crate::process::{CapturedOutput, capture_output, locate_binary};
use crate::types::{FormatInfo, MediaInfo, PlaylistEntry, PlaylistInfo};
use serde::Deserialize;

/// Subset of the `yt-dlp -J` document for a single video
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMedia {
    title: Option<String>,
    thumbnail: Option<String>,
    duration: Option<f64>,
    formats: Vec<RawFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFormat {
    format_id: Option<String>,
    ext: Option<String>,
    resolution: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
    vcodec: Option<String>,
    acodec: Option<String>,
    fps: Option<f64>,
    height: Option<u32>,
    width: Option<u32>,
}

/// Subset of the `yt-dlp -J --flat-playlist` document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlaylist {
    #[serde(rename = "_type")]
    kind: Option<String>,
    id: Option<String>,
    title: Option<String>,
    playlist_count: Option<usize>,
    entries: Vec<RawEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEntry {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
}

impl From<RawFormat> for FormatInfo {
    fn from(raw: RawFormat) -> Self {
        // yt-dlp reports sizes as JSON numbers that are sometimes floats
        let filesize = raw
            .filesize
            .or(raw.filesize_approx)
            .filter(|size| size.is_finite() && *size > 0.0)
            .map_or(0, |size| size as u64);

        Self {
            format_id: raw.format_id.unwrap_or_default(),
            ext: raw.ext.unwrap_or_default(),
            resolution: raw.resolution.unwrap_or_default(),
            filesize,
            vcodec: raw.vcodec.unwrap_or_default(),
            acodec: raw.acodec.unwrap_or_default(),
            fps: raw.fps.unwrap_or(0.0),
            height: raw.height.unwrap_or(0),
            width: raw.width.unwrap_or(0),
        }
    }
}

pub(crate) fn parse_media_info(json: &str) -> Result<MediaInfo> {
    let raw: RawMedia = serde_json::from_str(json)?;
    let formats: Vec<FormatInfo> = raw.formats.into_iter().map(FormatInfo::from).collect();

    let mut resolutions: Vec<u32> = formats
        .iter()
        .filter(|f| f.has_video() && f.height > 0)
        .map(|f| f.height)
        .collect();
    resolutions.sort_unstable_by(|a, b| b.cmp(a));
    resolutions.dedup();

    let mut extensions: Vec<String> = Vec::new();
    for format in &formats {
        if !format.ext.is_empty() && !extensions.contains(&format.ext) {
            extensions.push(format.ext.clone());
        }
    }

    Ok(MediaInfo {
        title: raw.title.unwrap_or_default(),
        thumbnail: raw.thumbnail,
        duration: raw.duration.unwrap_or(0.0),
        has_audio: formats.iter().any(FormatInfo::has_audio),
        has_video: formats.iter().any(FormatInfo::has_video),
        resolutions,
        extensions,
        formats,
    })
}

pub(crate) fn parse_playlist_info(json: &str, preview_limit: usize) -> Result<PlaylistInfo> {
    let raw: RawPlaylist = serde_json::from_str(json)?;

    if raw.kind.as_deref() != Some("playlist") {
        return Ok(PlaylistInfo::default());
    }

    let playlist_count = raw.playlist_count.unwrap_or(raw.entries.len());
    let entries = raw
        .entries
        .into_iter()
        .take(preview_limit)
        .map(|entry| PlaylistEntry {
            title: entry.title.unwrap_or_default(),
            id: entry.id.unwrap_or_default(),
            duration: entry.duration.unwrap_or(0.0),
        })
        .collect();

    Ok(PlaylistInfo {
        is_playlist: true,
        playlist_title: raw.title,
        playlist_count: Some(playlist_count),
        playlist_id: raw.id,
        entries,
    })
}

impl Downloader {
    /// List the formats available for `url`
    ///
    /// # Errors
    ///
    /// [`Error::BinaryMissing`], [`Error::Spawn`], [`Error::Runtime`] on a non-zero
    /// exit, or [`Error::Serialization`] if the output is not the expected JSON.
    pub async fn fetch_formats(&self, url: &str) -> Result<MediaInfo> {
        let output = self.probe(&build_formats_args(url)).await?;
        let info = parse_media_info(&output.stdout_text())?;
        tracing::debug!(
            url,
            formats = info.formats.len(),
            resolutions = ?info.resolutions,
            "Fetched formats"
        );
        Ok(info)
    }

    /// Check whether `url` is a playlist
    ///
    /// Entries are listed flat (no per-entry extraction) and truncated to
    /// `playlist_preview_limit`; `playlist_count` still reports the full size.
    pub async fn check_playlist(&self, url: &str) -> Result<PlaylistInfo> {
        let output = self.probe(&build_playlist_args(url)).await?;
        let info = parse_playlist_info(&output.stdout_text(), self.config.probe.playlist_preview_limit)?;
        tracing::debug!(
            url,
            is_playlist = info.is_playlist,
            count = ?info.playlist_count,
            "Checked playlist"
        );
        Ok(info)
    }

    async fn probe(&self, args: &[String]) -> Result<CapturedOutput> {
        let binary = locate_binary(&self.config.tools)?;
        let output = capture_output(self.executor.as_ref(), &binary, args).await?;

        if !output.exit.is_success() {
            let mut tail = StderrTail::default();
            tail.push(&output.stderr);
            let stderr = tail.into_failure_text();
            tracing::warn!(code = ?output.exit.code, stderr = ?stderr, "yt-dlp probe failed");
            return Err(Error::Runtime {
                code: output.exit.code,
                stderr,
            });
        }
        Ok(output)
    }
}
