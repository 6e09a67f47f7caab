//! External process execution
//!
//! This module is the seam between the library and the operating system. The
//! [`ProcessExecutor`] trait spawns a program and streams its output as raw
//! chunks; [`TokioProcessExecutor`] is the real implementation, and tests plug in
//! scripted executors that replay canned output.
//!
//! ## Usage
//!
//! ```no_run
//! use pullbox_dl::config::ToolsConfig;
//! use pullbox_dl::process::{TokioProcessExecutor, capture_output, locate_binary};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let binary = locate_binary(&ToolsConfig::default())?;
//! let output = capture_output(&TokioProcessExecutor::new(), &binary, &["--version".to_string()]).await?;
//! println!("yt-dlp {}", output.stdout_text().trim());
//! # Ok(())
//! # }
//! ```

mod binary;
mod tokio_executor;
mod traits;

pub use binary::{PATH_BINARY_NAME, bundled_binary_name, locate_binary};
pub use tokio_executor::TokioProcessExecutor;
pub use traits::{OutputChunk, ProcessExecutor, ProcessExit};

use std::path::Path;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Capacity of the channel carrying output chunks from reader to consumer
pub(crate) const OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// Complete output of a finished process
#[must_use]
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// How the process ended
    pub exit: ProcessExit,
    /// Everything written to standard output
    pub stdout: Vec<u8>,
    /// Everything written to standard error
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    /// Standard output decoded lossily as UTF-8
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error decoded lossily as UTF-8
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Run a program to completion and collect both of its streams
pub async fn capture_output(
    executor: &dyn ProcessExecutor,
    program: &Path,
    args: &[String],
) -> crate::Result<CapturedOutput> {
    let (tx, mut rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);

    let run = executor.execute(program, args, tx, CancellationToken::new());
    let collect = async {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Some(chunk) = rx.recv().await {
            match chunk {
                OutputChunk::Stdout(bytes) => stdout.extend_from_slice(&bytes),
                OutputChunk::Stderr(bytes) => stderr.extend_from_slice(&bytes),
            }
        }
        (stdout, stderr)
    };

    let (exit, (stdout, stderr)) = tokio::join!(run, collect);
    Ok(CapturedOutput {
        exit: exit?,
        stdout,
        stderr,
    })
}
