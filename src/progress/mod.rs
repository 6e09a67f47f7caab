//! Download progress reconciliation
//!
//! `yt-dlp` reports progress as unstructured text on its standard output. This
//! module turns that text into a consistent [`ProgressSnapshot`](crate::ProgressSnapshot)
//! stream:
//!
//! - [`LineBuffer`] reconstructs logical lines from arbitrarily chunked bytes
//! - [`LineClassifier`] extracts [`LineFacts`] from a single line; every
//!   pattern tied to the binary's wording lives in [`YtDlpLineClassifier`]
//! - [`fold_line`] merges facts into the previous snapshot (sticky merge)
//! - [`ProgressReconciler`] ties the three together and produces updates
//!
//! ## Usage
//!
//! ```
//! use pullbox_dl::progress::ProgressReconciler;
//!
//! let mut reconciler = ProgressReconciler::new();
//! let updates = reconciler.feed(b"[download]  45.3% of 10.00MiB at 1.20MiB/s ETA 00:08\n");
//!
//! assert_eq!(updates.len(), 1);
//! assert_eq!(reconciler.snapshot().percentage, 45.3);
//! assert_eq!(reconciler.snapshot().speed, "1.20MiB/s");
//! ```

mod classifier;
mod line_buffer;
mod reconciler;
mod reducer;

pub use classifier::{LineClassifier, LineFacts, YtDlpLineClassifier};
pub use line_buffer::{ChunkDecoder, LineBuffer};
pub use reconciler::{ProgressReconciler, ProgressUpdate};
pub use reducer::{COMPLETE_ETA, COMPLETE_SPEED, ItemBoundary, completion_snapshot, fold_line};
