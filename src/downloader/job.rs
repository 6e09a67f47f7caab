//! Download job execution
//!
//! A job runs the binary once and folds its output into events. Standard output
//! feeds the progress reconciler; standard error is forwarded verbatim. Both
//! streams arrive on one channel with a single consumer, which is the only
//! writer of the job's snapshot.

use super::Downloader;
use crate::command::build_download_args;
use crate::error::{Error, Result};
use crate::process::{OUTPUT_CHANNEL_CAPACITY, OutputChunk, ProcessExecutor, locate_binary};
use crate::progress::{ChunkDecoder, LineBuffer, ProgressReconciler};
use crate::types::{DownloadRequest, DownloadResult, Event};
use std::path::Path;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

impl Downloader {
    /// Run a download job and resolve when the process exits
    ///
    /// While the job runs, subscribers receive [`Event::Started`], then any number
    /// of [`Event::Progress`] and [`Event::ErrorOutput`] events, then exactly one of
    /// [`Event::Finished`], [`Event::Failed`] or [`Event::Cancelled`].
    ///
    /// Exit status 0 is success, whatever the last reported percentage was (a cached
    /// download may report no progress at all). A completion line in the output
    /// never implies success on its own.
    ///
    /// # Errors
    ///
    /// - [`Error::BinaryMissing`] before anything is spawned
    /// - [`Error::Busy`] when another job is running on this downloader
    /// - [`Error::Spawn`] when the process cannot be started
    /// - [`Error::Runtime`] on a non-zero exit, with the last error-stream text
    /// - [`Error::Cancelled`] after [`cancel`](Self::cancel)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pullbox_dl::{Config, DownloadRequest, Downloader};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = Downloader::new(Config::default())?;
    /// let request = DownloadRequest::builder("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    ///     .output_directory("downloads")
    ///     .include_metadata(true)
    ///     .build()?;
    ///
    /// match downloader.start_download(request).await {
    ///     Ok(result) => println!("{}", result.message),
    ///     Err(e) => eprintln!("{}", e.user_message()),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_download(&self, request: DownloadRequest) -> Result<DownloadResult> {
        self.start_download_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Like [`start_download`](Self::start_download), with a caller-owned cancellation token
    ///
    /// Cancelling `cancel` terminates the process, exactly like [`cancel`](Self::cancel).
    pub async fn start_download_with_cancel(
        &self,
        request: DownloadRequest,
        cancel: CancellationToken,
    ) -> Result<DownloadResult> {
        let binary = match locate_binary(&self.config.tools) {
            Ok(binary) => binary,
            Err(e) => {
                tracing::error!(url = %request.url(), error = %e, "yt-dlp binary not found");
                self.emit_failure(&e);
                return Err(e);
            }
        };

        let _slot = self.claim_job(cancel.clone())?;

        let args = build_download_args(&request);
        tracing::info!(
            url = %request.url(),
            binary = %binary.display(),
            format = ?request.format(),
            "Starting download"
        );
        tracing::debug!(?args, "yt-dlp arguments");

        self.emit_event(Event::Started {
            url: request.url().to_string(),
        });

        match run_job(
            self.executor.as_ref(),
            &binary,
            &args,
            &self.event_tx,
            cancel,
        )
        .await
        {
            Ok(()) => {
                tracing::info!(url = %request.url(), "Download finished");
                self.emit_event(Event::Finished { success: true });
                Ok(DownloadResult {
                    success: true,
                    message: "download completed".to_string(),
                })
            }
            Err(e) => {
                match &e {
                    Error::Cancelled => tracing::info!(url = %request.url(), "Download cancelled"),
                    _ => tracing::warn!(url = %request.url(), error = %e, "Download failed"),
                }
                self.emit_failure(&e);
                Err(e)
            }
        }
    }

    fn emit_failure(&self, error: &Error) {
        let event = match error {
            Error::Cancelled => Event::Cancelled,
            other => Event::Failed {
                error: other.to_string(),
                message: other.user_message(),
            },
        };
        self.emit_event(event);
    }
}

/// Error-stream lines worth reporting with a runtime failure
///
/// Keeps the last line starting with `ERROR` and the last non-empty line.
#[derive(Debug, Default)]
pub(super) struct StderrTail {
    lines: LineBuffer,
    last_error_line: Option<String>,
    last_line: Option<String>,
}

impl StderrTail {
    pub(super) fn push(&mut self, bytes: &[u8]) {
        for line in self.lines.push(bytes) {
            self.remember(&line);
        }
    }

    fn remember(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.starts_with("ERROR") {
            self.last_error_line = Some(line.to_string());
        }
        self.last_line = Some(line.to_string());
    }

    /// The last `ERROR` line, else the last line
    pub(super) fn into_failure_text(mut self) -> Option<String> {
        if let Some(line) = self.lines.finish() {
            self.remember(&line);
        }
        self.last_error_line.or(self.last_line)
    }
}

/// Per-job state owned by the output consumer
struct JobState {
    reconciler: ProgressReconciler,
    stderr_text: ChunkDecoder,
    stderr_tail: StderrTail,
}

impl JobState {
    fn new() -> Self {
        Self {
            reconciler: ProgressReconciler::new(),
            stderr_text: ChunkDecoder::new(),
            stderr_tail: StderrTail::default(),
        }
    }

    fn handle(&mut self, chunk: OutputChunk, events: &broadcast::Sender<Event>) {
        match chunk {
            OutputChunk::Stdout(bytes) => {
                tracing::debug!(output = %String::from_utf8_lossy(&bytes), "yt-dlp stdout");
                for update in self.reconciler.feed(&bytes) {
                    events
                        .send(Event::Progress {
                            snapshot: update.snapshot,
                            complete: update.complete,
                        })
                        .ok();
                }
            }
            OutputChunk::Stderr(bytes) => {
                self.stderr_tail.push(&bytes);
                let text = self.stderr_text.push(&bytes);
                forward_stderr(text, events);
            }
        }
    }

    fn finish(&mut self, events: &broadcast::Sender<Event>) {
        for update in self.reconciler.finish() {
            events
                .send(Event::Progress {
                    snapshot: update.snapshot,
                    complete: update.complete,
                })
                .ok();
        }
        if let Some(rest) = self.stderr_text.finish() {
            forward_stderr(rest, events);
        }
    }
}

fn forward_stderr(text: String, events: &broadcast::Sender<Event>) {
    if text.is_empty() {
        return;
    }
    tracing::debug!(output = %text, "yt-dlp stderr");
    events.send(Event::ErrorOutput { message: text }).ok();
}

/// Run the binary and reconcile its output until it exits
pub(crate) async fn run_job(
    executor: &dyn ProcessExecutor,
    binary: &Path,
    args: &[String],
    events: &broadcast::Sender<Event>,
    cancel: CancellationToken,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);

    let run = executor.execute(binary, args, tx, cancel.clone());
    let consume = async {
        let mut state = JobState::new();
        while let Some(chunk) = rx.recv().await {
            state.handle(chunk, events);
        }
        state.finish(events);
        state
    };

    let (exit, state) = tokio::join!(run, consume);
    let exit = exit?;

    if exit.is_success() {
        return Ok(());
    }
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Err(Error::Runtime {
        code: exit.code,
        stderr: state.stderr_tail.into_failure_text(),
    })
}
