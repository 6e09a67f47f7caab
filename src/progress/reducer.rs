//! Sticky-merge reducer over progress snapshots

use super::classifier::LineFacts;
use crate::types::ProgressSnapshot;

/// Speed reported in the synthetic completion snapshot
pub const COMPLETE_SPEED: &str = "0KB/s";

/// ETA reported in the synthetic completion snapshot
pub const COMPLETE_ETA: &str = "00:00";

/// Tracks whether a new media item began since the last applied percentage
///
/// Percentage never decreases within one item. A playlist item marker or a new
/// destination file opens the boundary, letting the next percentage restart
/// from a lower value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemBoundary {
    open: bool,
}

impl ItemBoundary {
    /// Whether the next percentage may be lower than the current one
    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Merge the facts of one line into the previous snapshot
///
/// Returns `None` when the line changed nothing, in which case no update should
/// be emitted. Fields the line did not mention are copied from `prev` unchanged.
pub fn fold_line(
    prev: &ProgressSnapshot,
    facts: &LineFacts,
    boundary: &mut ItemBoundary,
) -> Option<ProgressSnapshot> {
    if facts.is_empty() {
        return None;
    }

    let mut next = prev.clone();
    let mut applied = false;

    if let Some((index, total)) = facts.playlist {
        next.playlist_index = Some(index);
        next.playlist_total = Some(total);
        boundary.open = true;
        applied = true;
    }

    if let Some(filename) = &facts.filename {
        if *filename != prev.filename {
            boundary.open = true;
        }
        next.filename = filename.clone();
        applied = true;
    }

    if let Some(percentage) = facts.percentage
        && (boundary.open || percentage >= prev.percentage)
    {
        next.percentage = percentage;
        boundary.open = false;
        applied = true;
    }

    if let Some(speed) = &facts.speed {
        next.speed = speed.clone();
        applied = true;
    }

    if let Some(eta) = &facts.eta {
        next.eta = eta.clone();
        applied = true;
    }

    applied.then_some(next)
}

/// Snapshot emitted as soon as the binary reports completion
///
/// Filename and playlist position carry over from `prev`.
pub fn completion_snapshot(prev: &ProgressSnapshot) -> ProgressSnapshot {
    ProgressSnapshot {
        percentage: 100.0,
        speed: COMPLETE_SPEED.to_string(),
        eta: COMPLETE_ETA.to_string(),
        ..prev.clone()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> ProgressSnapshot {
        ProgressSnapshot {
            percentage: 20.0,
            speed: "2.00MiB/s".into(),
            eta: "00:30".into(),
            filename: "/tmp/a.mp4".into(),
            playlist_index: Some(2),
            playlist_total: Some(5),
        }
    }

    #[test]
    fn empty_facts_produce_no_update() {
        let mut boundary = ItemBoundary::default();
        assert_eq!(
            fold_line(&populated(), &LineFacts::default(), &mut boundary),
            None
        );
    }

    #[test]
    fn single_field_updates_leave_others_untouched() {
        let prev = populated();
        let cases: Vec<(LineFacts, Box<dyn Fn(&mut ProgressSnapshot)>)> = vec![
            (
                LineFacts {
                    percentage: Some(30.0),
                    ..Default::default()
                },
                Box::new(|s: &mut ProgressSnapshot| s.percentage = 30.0),
            ),
            (
                LineFacts {
                    speed: Some("9KiB/s".into()),
                    ..Default::default()
                },
                Box::new(|s: &mut ProgressSnapshot| s.speed = "9KiB/s".into()),
            ),
            (
                LineFacts {
                    eta: Some("01:00".into()),
                    ..Default::default()
                },
                Box::new(|s: &mut ProgressSnapshot| s.eta = "01:00".into()),
            ),
            (
                LineFacts {
                    filename: Some("/tmp/b.mp4".into()),
                    ..Default::default()
                },
                Box::new(|s: &mut ProgressSnapshot| s.filename = "/tmp/b.mp4".into()),
            ),
            (
                LineFacts {
                    playlist: Some((3, 5)),
                    ..Default::default()
                },
                Box::new(|s: &mut ProgressSnapshot| {
                    s.playlist_index = Some(3);
                    s.playlist_total = Some(5);
                }),
            ),
        ];

        for (facts, edit) in cases {
            let mut boundary = ItemBoundary::default();
            let next = fold_line(&prev, &facts, &mut boundary).unwrap();
            let mut expected = prev.clone();
            edit(&mut expected);
            assert_eq!(next, expected, "facts: {facts:?}");
        }
    }

    #[test]
    fn percentage_does_not_regress_within_an_item() {
        let mut boundary = ItemBoundary::default();
        let facts = LineFacts {
            percentage: Some(10.0),
            ..Default::default()
        };
        assert_eq!(fold_line(&populated(), &facts, &mut boundary), None);
    }

    #[test]
    fn regression_keeps_other_fields_of_the_line() {
        let mut boundary = ItemBoundary::default();
        let facts = LineFacts {
            percentage: Some(10.0),
            speed: Some("1KiB/s".into()),
            ..Default::default()
        };
        let next = fold_line(&populated(), &facts, &mut boundary).unwrap();
        assert_eq!(next.percentage, 20.0);
        assert_eq!(next.speed, "1KiB/s");
    }

    #[test]
    fn playlist_marker_allows_percentage_restart() {
        let mut boundary = ItemBoundary::default();
        let marker = LineFacts {
            playlist: Some((3, 5)),
            ..Default::default()
        };
        let after_marker = fold_line(&populated(), &marker, &mut boundary).unwrap();
        assert_eq!(after_marker.percentage, 20.0);
        assert!(boundary.is_open());

        let restart = LineFacts {
            percentage: Some(1.5),
            ..Default::default()
        };
        let next = fold_line(&after_marker, &restart, &mut boundary).unwrap();
        assert_eq!(next.percentage, 1.5);
        assert!(!boundary.is_open());
    }

    #[test]
    fn new_destination_allows_percentage_restart() {
        let mut boundary = ItemBoundary::default();
        let mut prev = populated();
        prev.percentage = 100.0;

        let dest = LineFacts {
            filename: Some("/tmp/a.f140.m4a".into()),
            ..Default::default()
        };
        let prev = fold_line(&prev, &dest, &mut boundary).unwrap();
        let pct = LineFacts {
            percentage: Some(4.0),
            ..Default::default()
        };
        assert_eq!(
            fold_line(&prev, &pct, &mut boundary).unwrap().percentage,
            4.0
        );
    }

    #[test]
    fn same_destination_keeps_boundary_closed() {
        let mut boundary = ItemBoundary::default();
        let facts = LineFacts {
            filename: Some("/tmp/a.mp4".into()),
            ..Default::default()
        };
        fold_line(&populated(), &facts, &mut boundary).unwrap();
        assert!(!boundary.is_open());
    }

    #[test]
    fn out_of_range_percentage_passes_through() {
        let mut boundary = ItemBoundary::default();
        let facts = LineFacts {
            percentage: Some(104.2),
            ..Default::default()
        };
        let next = fold_line(&populated(), &facts, &mut boundary).unwrap();
        assert_eq!(next.percentage, 104.2);
    }

    #[test]
    fn completion_resets_rate_and_time_only() {
        let done = completion_snapshot(&populated());
        assert_eq!(done.percentage, 100.0);
        assert_eq!(done.speed, COMPLETE_SPEED);
        assert_eq!(done.eta, COMPLETE_ETA);
        assert_eq!(done.filename, "/tmp/a.mp4");
        assert_eq!(done.playlist_index, Some(2));
        assert_eq!(done.playlist_total, Some(5));
    }
}
