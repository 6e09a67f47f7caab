//! Process execution on top of `tokio::process`

use super::traits::{OutputChunk, ProcessExecutor, ProcessExit};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Executor that spawns real child processes
///
/// Standard output and standard error are piped and read concurrently, each
/// forwarded in whatever chunk sizes the OS delivers. Cancelling the token kills
/// the child; there is no timeout of any kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessExecutor;

impl TokioProcessExecutor {
    /// Create a new executor
    pub fn new() -> Self {
        Self
    }
}

async fn pump<R>(
    mut reader: R,
    output: mpsc::Sender<OutputChunk>,
    wrap: fn(Vec<u8>) -> OutputChunk,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        if output.send(wrap(buf[..n].to_vec())).await.is_err() {
            // Consumer went away; keep draining so the child never blocks on a full pipe
            tracing::debug!("output receiver dropped, discarding remaining output");
        }
    }
}

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn execute(
        &self,
        program: &Path,
        args: &[String],
        output: mpsc::Sender<OutputChunk>,
        cancel: CancellationToken,
    ) -> crate::Result<ProcessExit> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                crate::Error::Spawn(format!("failed to execute {}: {}", program.display(), e))
            })?;

        tracing::debug!(program = %program.display(), pid = ?child.id(), "process spawned");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| crate::Error::Spawn("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| crate::Error::Spawn("stderr was not captured".to_string()))?;

        let readers = async {
            let (out, err) = futures::join!(
                pump(stdout, output.clone(), OutputChunk::Stdout),
                pump(stderr, output.clone(), OutputChunk::Stderr),
            );
            if let Err(e) = out.and(err) {
                tracing::warn!(error = %e, "failed reading process output");
            }
        };

        let waited = async {
            tokio::select! {
                status = child.wait() => status,
                _ = cancel.cancelled() => {
                    tracing::info!(program = %program.display(), "cancelling process");
                    if let Err(e) = child.start_kill() {
                        tracing::warn!(error = %e, "failed to kill process");
                    }
                    child.wait().await
                }
            }
        };

        let ((), status) = tokio::join!(readers, waited);
        drop(output);

        let exit = ProcessExit::from(status?);
        tracing::debug!(program = %program.display(), code = ?exit.code, "process exited");
        Ok(exit)
    }

    fn name(&self) -> &'static str {
        "tokio-process"
    }
}
