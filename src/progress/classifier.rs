//! Line classification for `yt-dlp` progress output

use regex::Regex;
use std::num::NonZeroU32;
use std::sync::LazyLock;

/// Structured facts extracted from one line of binary output
///
/// A field is `Some` only when the line carried that piece of information.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineFacts {
    /// Download percentage of the current item
    pub percentage: Option<f64>,
    /// Transfer rate text (e.g. "1.20MiB/s")
    pub speed: Option<String>,
    /// Remaining time text (e.g. "00:08")
    pub eta: Option<String>,
    /// Announced destination path
    pub filename: Option<String>,
    /// Playlist position as `(index, total)`
    pub playlist: Option<(u32, u32)>,
    /// The line reports a finished download or an "already downloaded" shortcut
    pub complete: bool,
}

impl LineFacts {
    /// Whether the line matched none of the known patterns
    pub fn is_empty(&self) -> bool {
        self.percentage.is_none()
            && self.speed.is_none()
            && self.eta.is_none()
            && self.filename.is_none()
            && self.playlist.is_none()
            && !self.complete
    }
}

/// Turns a single line of output into [`LineFacts`]
///
/// Implementations hold every pattern tied to a particular binary's wording, so
/// the merge logic never changes when that wording does.
pub trait LineClassifier: Send + Sync {
    /// Extract whatever the line reports; unknown lines yield empty facts
    fn classify(&self, line: &str) -> LineFacts;
}

struct Patterns {
    percentage: Regex,
    speed: Regex,
    eta: Regex,
    destination: Regex,
    merger: Regex,
    already_downloaded: Regex,
    playlist: Regex,
}

// Constant patterns; every one of them is exercised by the tests below.
#[allow(clippy::expect_used)]
static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    percentage: Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%").expect("valid regex"),
    speed: Regex::new(r"\bat\s+(\d+(?:\.\d+)?\s*[A-Za-z]+/s)").expect("valid regex"),
    eta: Regex::new(r"\bETA\s+(\d[\d:]*)").expect("valid regex"),
    destination: Regex::new(r"^\[[^\]]+\]\s+Destination:\s*(.+?)\s*$").expect("valid regex"),
    merger: Regex::new(r#"^\[Merger\]\s+Merging formats into "(.+)"\s*$"#).expect("valid regex"),
    already_downloaded: Regex::new(r"^\[download\]\s+(.+?) has already been downloaded")
        .expect("valid regex"),
    playlist: Regex::new(r"Downloading (?:video|item) (\d+) of (\d+)").expect("valid regex"),
});

/// Classifier for the text format of `yt-dlp --progress --newline`
#[derive(Clone, Copy, Debug, Default)]
pub struct YtDlpLineClassifier;

impl YtDlpLineClassifier {
    /// Create the classifier
    pub fn new() -> Self {
        Self
    }
}

impl LineClassifier for YtDlpLineClassifier {
    fn classify(&self, line: &str) -> LineFacts {
        let patterns = &*PATTERNS;
        let mut facts = LineFacts::default();

        // A line announcing a file carries nothing else; the path may contain
        // text that looks like a rate, an ETA or a playlist marker.
        if let Some(caps) = patterns.already_downloaded.captures(line) {
            facts.filename = Some(caps[1].to_string());
            facts.complete = true;
            return facts;
        }
        if let Some(caps) = patterns
            .destination
            .captures(line)
            .or_else(|| patterns.merger.captures(line))
        {
            facts.filename = Some(caps[1].to_string());
            return facts;
        }

        if let Some(caps) = patterns.percentage.captures(line)
            && let Ok(value) = caps[1].parse::<f64>()
        {
            facts.percentage = Some(value);
            facts.complete = value >= 100.0;
        }

        if let Some(caps) = patterns.speed.captures(line) {
            facts.speed = Some(caps[1].to_string());
        }

        if let Some(caps) = patterns.eta.captures(line) {
            facts.eta = Some(caps[1].to_string());
        }

        // Index and total are only ever recorded as a pair, both positive
        if let Some(caps) = patterns.playlist.captures(line)
            && let (Ok(index), Ok(total)) =
                (caps[1].parse::<NonZeroU32>(), caps[2].parse::<NonZeroU32>())
        {
            facts.playlist = Some((index.get(), total.get()));
        }

        facts
    }
}
