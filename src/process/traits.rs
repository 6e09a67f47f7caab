//! Traits and types for process execution

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A chunk of raw output read from one of the child's streams
///
/// Chunks have arbitrary sizes and need not end on a line boundary. Order is
/// preserved within a stream; the two streams are independent timelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputChunk {
    /// Bytes read from standard output
    Stdout(Vec<u8>),
    /// Bytes read from standard error
    Stderr(Vec<u8>),
}

/// How a child process ended
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, or `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl ProcessExit {
    /// Returns `true` if the process exited with status 0
    pub fn is_success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Trait for running an external program while streaming its output
///
/// Implementations must not block the caller while the child runs: output is
/// delivered through `output` as it arrives. Closing the sender (by returning)
/// tells the consumer that both streams have ended.
///
/// # Examples
///
/// ```no_run
/// use pullbox_dl::process::{OutputChunk, ProcessExecutor, TokioProcessExecutor};
/// use std::path::Path;
/// use tokio::sync::mpsc;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = TokioProcessExecutor::new();
/// let (tx, mut rx) = mpsc::channel(64);
///
/// let args = ["--version".to_string()];
/// let run = executor.execute(
///     Path::new("yt-dlp"),
///     &args,
///     tx,
///     CancellationToken::new(),
/// );
/// let read = async {
///     while let Some(chunk) = rx.recv().await {
///         if let OutputChunk::Stdout(bytes) = chunk {
///             print!("{}", String::from_utf8_lossy(&bytes));
///         }
///     }
/// };
/// let (exit, ()) = tokio::join!(run, read);
/// println!("exit: {:?}", exit?.code);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Spawn `program` with `args` and stream its output until it exits
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`](crate::Error::Spawn) if the process cannot be
    /// started, or an I/O error if waiting on it fails. A non-zero exit is not an
    /// error at this level; it is reported through [`ProcessExit`].
    async fn execute(
        &self,
        program: &Path,
        args: &[String],
        output: mpsc::Sender<OutputChunk>,
        cancel: CancellationToken,
    ) -> crate::Result<ProcessExit>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
