//! Stream-level progress reconciliation

use super::classifier::{LineClassifier, YtDlpLineClassifier};
use super::line_buffer::LineBuffer;
use super::reducer::{ItemBoundary, completion_snapshot, fold_line};
use crate::types::ProgressSnapshot;

/// One snapshot change produced by the reconciler
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressUpdate {
    /// Snapshot after the change
    pub snapshot: ProgressSnapshot,
    /// True for the synthetic completion snapshot
    pub complete: bool,
}

/// Folds a chunked output stream into a running [`ProgressSnapshot`]
///
/// One reconciler belongs to one job and is driven by that job's single output
/// consumer. It performs no I/O and can be fed from any source.
#[derive(Debug)]
pub struct ProgressReconciler<C = YtDlpLineClassifier> {
    classifier: C,
    buffer: LineBuffer,
    snapshot: ProgressSnapshot,
    boundary: ItemBoundary,
}

impl ProgressReconciler {
    /// Create a reconciler for `yt-dlp` output with an empty snapshot
    pub fn new() -> Self {
        Self::with_classifier(YtDlpLineClassifier::new())
    }
}

impl Default for ProgressReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: LineClassifier> ProgressReconciler<C> {
    /// Create a reconciler with a custom line classifier
    pub fn with_classifier(classifier: C) -> Self {
        Self {
            classifier,
            buffer: LineBuffer::new(),
            snapshot: ProgressSnapshot::default(),
            boundary: ItemBoundary::default(),
        }
    }

    /// Feed a raw chunk; returns the updates of every line the chunk completed
    ///
    /// A trailing partial line is held back until a later chunk terminates it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ProgressUpdate> {
        let mut updates = Vec::new();
        for line in self.buffer.push(chunk) {
            self.apply_into(&line, &mut updates);
        }
        updates
    }

    /// Process the trailing unterminated line once the stream has ended
    pub fn finish(&mut self) -> Vec<ProgressUpdate> {
        let mut updates = Vec::new();
        if let Some(line) = self.buffer.finish() {
            self.apply_into(&line, &mut updates);
        }
        updates
    }

    /// Apply one complete logical line
    ///
    /// Yields at most one parsed update, followed by the synthetic completion
    /// snapshot when the line reports completion.
    pub fn apply_line(&mut self, line: &str) -> Vec<ProgressUpdate> {
        let mut updates = Vec::new();
        self.apply_into(line, &mut updates);
        updates
    }

    /// Latest reconciled snapshot
    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    /// Consume the reconciler, keeping the final snapshot
    pub fn into_snapshot(self) -> ProgressSnapshot {
        self.snapshot
    }

    fn apply_into(&mut self, line: &str, updates: &mut Vec<ProgressUpdate>) {
        let facts = self.classifier.classify(line);

        if let Some(next) = fold_line(&self.snapshot, &facts, &mut self.boundary) {
            self.snapshot = next;
            updates.push(ProgressUpdate {
                snapshot: self.snapshot.clone(),
                complete: false,
            });
        }

        if facts.complete {
            self.snapshot = completion_snapshot(&self.snapshot);
            updates.push(ProgressUpdate {
                snapshot: self.snapshot.clone(),
                complete: true,
            });
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::LineFacts;

    #[test]
    fn scenario_progress_line_keeps_filename_and_playlist() {
        let mut reconciler = ProgressReconciler::new();
        reconciler.feed(b"[download] Downloading item 2 of 4\n");
        reconciler.feed(b"[download] Destination: /tmp/a.mp4\n");

        let updates = reconciler.feed(b"[download]  45.3% of 10.00MiB at 1.20MiB/s ETA 00:08\n");

        assert_eq!(updates.len(), 1);
        let snapshot = &updates[0].snapshot;
        assert_eq!(snapshot.percentage, 45.3);
        assert_eq!(snapshot.speed, "1.20MiB/s");
        assert_eq!(snapshot.eta, "00:08");
        assert_eq!(snapshot.filename, "/tmp/a.mp4");
        assert_eq!(snapshot.playlist_index, Some(2));
        assert_eq!(snapshot.playlist_total, Some(4));
    }

    #[test]
    fn scenario_playlist_marker_then_percentage() {
        let mut reconciler = ProgressReconciler::new();
        reconciler.feed(b"[download] Destination: /tmp/first.mp4\n");
        reconciler.feed(b"[download] 100% of 1.00MiB in 00:01\n");
        reconciler.feed(b"[download] Downloading item 3 of 10\n");
        let updates = reconciler.feed(b"[download]   7.5% of 3.00MiB\n");

        assert_eq!(updates.len(), 1);
        let snapshot = reconciler.snapshot();
        assert_eq!(snapshot.playlist_index, Some(3));
        assert_eq!(snapshot.playlist_total, Some(10));
        assert_eq!(snapshot.percentage, 7.5);
        assert_eq!(snapshot.filename, "/tmp/first.mp4");
    }

    #[test]
    fn scenario_completion_line() {
        let mut reconciler = ProgressReconciler::new();
        reconciler.feed(b"[download] Downloading item 1 of 2\n");
        reconciler.feed(b"[download] Destination: /tmp/v.mp4\n");
        reconciler.feed(b"[download]  99.0% of 5.00MiB at 3.00MiB/s ETA 00:01\n");

        let updates = reconciler.feed(b"[download] 100% of 5.00MiB in 00:03\n");

        assert_eq!(updates.len(), 2);
        assert!(!updates[0].complete);
        assert!(updates[1].complete);

        let done = &updates[1].snapshot;
        assert_eq!(done.percentage, 100.0);
        assert_eq!(done.speed, "0KB/s");
        assert_eq!(done.eta, "00:00");
        assert_eq!(done.filename, "/tmp/v.mp4");
        assert_eq!(done.playlist_index, Some(1));
        assert_eq!(done.playlist_total, Some(2));
    }

    #[test]
    fn destination_name_leaves_rate_and_position_alone() {
        let mut reconciler = ProgressReconciler::new();
        reconciler.feed(b"[download] Downloading item 1 of 3\n");
        reconciler.feed(b"[download]  40.0% of 8.00MiB at 2.00MiB/s ETA 00:03\n");

        let updates = reconciler.feed(
            b"[download] Destination: /tmp/Racing at 300km/s - Downloading video 7 of 9 (ETA 5).mp4\n",
        );

        assert_eq!(updates.len(), 1);
        let snapshot = reconciler.snapshot();
        assert_eq!(
            snapshot.filename,
            "/tmp/Racing at 300km/s - Downloading video 7 of 9 (ETA 5).mp4"
        );
        assert_eq!(snapshot.speed, "2.00MiB/s");
        assert_eq!(snapshot.eta, "00:03");
        assert_eq!(snapshot.percentage, 40.0);
        assert_eq!(snapshot.playlist_index, Some(1));
        assert_eq!(snapshot.playlist_total, Some(3));
    }

    #[test]
    fn completion_is_idempotent() {
        let mut reconciler = ProgressReconciler::new();
        let line = b"[download] 100% of 5.00MiB in 00:03\n";

        reconciler.feed(line);
        let first = reconciler.snapshot().clone();
        reconciler.feed(line);

        assert_eq!(reconciler.snapshot(), &first);
        assert_eq!(first.percentage, 100.0);
    }

    #[test]
    fn already_downloaded_shortcut_completes() {
        let mut reconciler = ProgressReconciler::new();
        let updates =
            reconciler.feed(b"[download] /tmp/cached.mp4 has already been downloaded\n");

        let last = updates.last().unwrap();
        assert!(last.complete);
        assert_eq!(last.snapshot.filename, "/tmp/cached.mp4");
        assert_eq!(last.snapshot.percentage, 100.0);
    }

    #[test]
    fn scenario_partial_second_line_waits() {
        let mut reconciler = ProgressReconciler::new();
        let updates =
            reconciler.feed(b"[download] Destination: /tmp/My Video.mp4\n[download]  12.0% at ");

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].snapshot.filename, "/tmp/My Video.mp4");
        assert_eq!(updates[0].snapshot.percentage, 0.0);

        let updates = reconciler.feed(b"1.00MiB/s ETA 00:10\n");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].snapshot.percentage, 12.0);
        assert_eq!(updates[0].snapshot.speed, "1.00MiB/s");
        assert_eq!(updates[0].snapshot.filename, "/tmp/My Video.mp4");
    }

    #[test]
    fn chunk_boundaries_do_not_change_the_result() {
        let line = "[download]  45.3% of 10.00MiB at 1.20MiB/s ETA 00:08\n".as_bytes();

        let mut whole = ProgressReconciler::new();
        let expected = whole.feed(line);

        for first in 0..=line.len() {
            for second in first..=line.len() {
                let mut split = ProgressReconciler::new();
                let mut updates = split.feed(&line[..first]);
                updates.extend(split.feed(&line[first..second]));
                updates.extend(split.feed(&line[second..]));
                assert_eq!(updates, expected, "split at {first}/{second}");
            }
        }
    }

    #[test]
    fn unmatched_lines_emit_nothing() {
        let mut reconciler = ProgressReconciler::new();
        let updates = reconciler.feed(
            b"[youtube] Extracting URL: https://example.com\n[info] Downloading 1 format(s): 22\n",
        );
        assert!(updates.is_empty());
        assert_eq!(reconciler.snapshot(), &ProgressSnapshot::default());
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut reconciler = ProgressReconciler::new();
        assert!(reconciler.feed(b"[download]  50.0% of 2.00MiB").is_empty());
        let updates = reconciler.finish();
        assert_eq!(updates.len(), 1);
        assert_eq!(reconciler.into_snapshot().percentage, 50.0);
    }

    #[test]
    fn custom_classifier_is_used() {
        struct Everything;
        impl LineClassifier for Everything {
            fn classify(&self, line: &str) -> LineFacts {
                LineFacts {
                    eta: Some(line.to_string()),
                    ..Default::default()
                }
            }
        }

        let mut reconciler = ProgressReconciler::with_classifier(Everything);
        let updates = reconciler.apply_line("soon");
        assert_eq!(updates[0].snapshot.eta, "soon");
    }
}
