//! Process executors and fake binaries for driving the downloader in tests

use async_trait::async_trait;
use pullbox_dl::process::{OutputChunk, ProcessExecutor, ProcessExit};
use pullbox_dl::{Config, Downloader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Executor that replays canned chunks and exits with a fixed code
pub struct ScriptedExecutor {
    chunks: Vec<OutputChunk>,
    exit: Option<i32>,
    invocations: Mutex<Vec<Vec<String>>>,
}

impl ScriptedExecutor {
    /// Replay `stdout` and `stderr` split into `chunk_size`-byte pieces
    pub fn new(stdout: &str, stderr: &str, chunk_size: usize, exit: Option<i32>) -> Self {
        let mut chunks: Vec<OutputChunk> = stdout
            .as_bytes()
            .chunks(chunk_size)
            .map(|c| OutputChunk::Stdout(c.to_vec()))
            .collect();
        chunks.extend(
            stderr
                .as_bytes()
                .chunks(chunk_size)
                .map(|c| OutputChunk::Stderr(c.to_vec())),
        );
        Self {
            chunks,
            exit,
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Argument vectors of every call so far
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        _program: &Path,
        args: &[String],
        output: mpsc::Sender<OutputChunk>,
        _cancel: CancellationToken,
    ) -> pullbox_dl::Result<ProcessExit> {
        self.invocations.lock().unwrap().push(args.to_vec());
        for chunk in &self.chunks {
            output.send(chunk.clone()).await.ok();
        }
        Ok(ProcessExit { code: self.exit })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Write an empty placeholder binary into `dir` and return its path
pub fn placeholder_binary(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("yt-dlp");
    std::fs::write(&path, b"").unwrap();
    path
}

/// Downloader that replays through `executor` with a placeholder binary
pub fn scripted_downloader(dir: &TempDir, executor: Arc<ScriptedExecutor>) -> Downloader {
    let mut config = Config::default();
    config.tools.ytdlp_path = Some(placeholder_binary(dir));
    config.tools.search_path = false;
    Downloader::with_executor(config, executor).unwrap()
}

/// Write an executable shell script standing in for yt-dlp
#[cfg(unix)]
pub fn fake_ytdlp(dir: &TempDir, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("fake-yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Downloader that spawns `binary` as a real child process
pub fn process_downloader(binary: PathBuf) -> Downloader {
    let mut config = Config::default();
    config.tools.ytdlp_path = Some(binary);
    config.tools.search_path = false;
    Downloader::new(config).unwrap()
}
