//! Canned yt-dlp output and helpers for replaying it

use pullbox_dl::{Event, ProgressSnapshot};
use tokio::sync::broadcast;

/// Single video: destination, three progress lines, completion
pub const SINGLE_VIDEO: &str = "\
[youtube] Extracting URL: https://www.youtube.com/watch?v=abc
[youtube] abc: Downloading webpage
[info] abc: Downloading 1 format(s): 22
[download] Destination: Test Video [abc].mp4
[download]   0.0% of   12.50MiB at  Unknown B/s ETA Unknown
[download]  12.3% of   12.50MiB at    1.20MiB/s ETA 00:08
[download]  64.0% of   12.50MiB at    2.75MiB/s ETA 00:02
[download] 100% of   12.50MiB in 00:00:05 at 2.41MiB/s
";

/// Two-item playlist where the first item is merged from two streams
pub const PLAYLIST: &str = "\
[youtube:tab] Extracting URL: https://www.youtube.com/playlist?list=PL1
[download] Downloading playlist: Mix
[download] Downloading item 1 of 2
[youtube] a: Downloading webpage
[download] Destination: First.f137.mp4
[download]  50.0% of   10.00MiB at    5.00MiB/s ETA 00:01
[download] 100% of   10.00MiB in 00:00:02 at 5.00MiB/s
[download] Destination: First.f140.m4a
[download]  30.0% of    1.00MiB at  800.00KiB/s ETA 00:01
[download] 100% of    1.00MiB in 00:00:01 at 900.00KiB/s
[Merger] Merging formats into \"First.mp4\"
[download] Downloading item 2 of 2
[youtube] b: Downloading webpage
[download] Destination: Second.mp4
[download]   5.0% of   20.00MiB at    1.00MiB/s ETA 00:19
";

/// A file that exists from an earlier run
pub const ALREADY_DOWNLOADED: &str = "\
[youtube] abc: Downloading webpage
[download] Test Video [abc].mp4 has already been downloaded
";

/// Error stream of a private video
pub const PRIVATE_VIDEO_STDERR: &str =
    "ERROR: [youtube] abc: Private video. Sign in if you've been granted access to this video\n";

/// `yt-dlp -J` output for a single video with audio and video formats
pub const FORMATS_JSON: &str = r#"{"id": "abc", "title": "Test Video", "duration": 93,
"thumbnail": "https://i.example.com/abc.jpg",
"formats": [
  {"format_id": "251", "ext": "webm", "resolution": "audio only", "vcodec": "none", "acodec": "opus", "filesize": 1500000},
  {"format_id": "22", "ext": "mp4", "resolution": "1280x720", "vcodec": "avc1.64001F", "acodec": "mp4a.40.2", "height": 720, "width": 1280, "fps": 30, "filesize_approx": 9000000},
  {"format_id": "137", "ext": "mp4", "resolution": "1920x1080", "vcodec": "avc1.640028", "acodec": "none", "height": 1080, "width": 1920, "fps": 30}
]}"#;

/// `yt-dlp -J --flat-playlist` output for a three-item playlist
pub const PLAYLIST_JSON: &str = r#"{"_type": "playlist", "id": "PL1", "title": "Mix", "playlist_count": 3,
"entries": [
  {"_type": "url", "id": "a", "title": "First", "duration": 61},
  {"_type": "url", "id": "b", "title": "Second", "duration": 122.5},
  {"_type": "url", "id": "c", "title": "Third"}
]}"#;

/// Drain every event currently buffered in `rx`
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Snapshots carried by the progress events, with their completion flag
pub fn progress_of(events: &[Event]) -> Vec<(ProgressSnapshot, bool)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Progress { snapshot, complete } => Some((snapshot.clone(), *complete)),
            _ => None,
        })
        .collect()
}
