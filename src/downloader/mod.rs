//! Download orchestration around the `yt-dlp` binary.
//!
//! The `Downloader` struct and its methods are organized by concern:
//! - [`job`] - Running one download job and reconciling its output
//! - [`probe`] - Metadata probes (available formats, playlist detection)

mod job;
mod probe;


use crate::config::Config;
use crate::error::{Error, Result};
use crate::process::{ProcessExecutor, TokioProcessExecutor};
use crate::types::Event;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
///
/// At most one download job runs per downloader at a time. Every clone shares
/// the same event channel and the same active-job slot.
#[derive(Clone)]
pub struct Downloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Process executor (trait object so tests can replay canned output)
    pub(crate) executor: Arc<dyn ProcessExecutor>,
    /// Cancellation token of the running job, if any
    pub(crate) active_job: Arc<Mutex<Option<CancellationToken>>>,
}

impl Downloader {
    /// Create a downloader that runs real child processes
    ///
    /// The yt-dlp binary is located lazily, at the start of every job, so a
    /// missing binary surfaces as [`Error::BinaryMissing`] from the operation
    /// that needed it.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_executor(config, Arc::new(TokioProcessExecutor::new()))
    }

    /// Create a downloader with a custom process executor
    pub fn with_executor(config: Config, executor: Arc<dyn ProcessExecutor>) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(config.event_capacity);

        tracing::info!(
            executor = executor.name(),
            search_path = config.tools.search_path,
            "Downloader initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            event_tx,
            executor,
            active_job: Arc::new(Mutex::new(None)),
        })
    }

    /// Subscribe to download events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// A subscriber that falls behind by more than `event_capacity` events receives
    /// `RecvError::Lagged` and skips the oldest ones.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pullbox_dl::{Config, Downloader, Event};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = Downloader::new(Config::default())?;
    /// let mut events = downloader.subscribe();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         if let Event::Progress { snapshot, .. } = event {
    ///             println!("{:.1}% {}", snapshot.percentage, snapshot.speed);
    ///         }
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Subscribe to download events as a [`Stream`](futures::Stream)
    ///
    /// Lagged notifications surface as `Err(BroadcastStreamRecvError::Lagged(n))` items.
    pub fn event_stream(&self) -> tokio_stream::wrappers::BroadcastStream<Event> {
        tokio_stream::wrappers::BroadcastStream::new(self.subscribe())
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a download job is running
    pub fn is_busy(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Terminate the running job's process
    ///
    /// Returns `false` when no job is running. The job itself resolves with
    /// [`Error::Cancelled`] once the process has exited.
    pub fn cancel(&self) -> bool {
        match self.lock_active().as_ref() {
            Some(token) => {
                tracing::info!("Cancelling active download");
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }

    /// Reserve the single job slot for `cancel`
    pub(crate) fn claim_job(&self, cancel: CancellationToken) -> Result<JobSlot> {
        let mut active = self.lock_active();
        if active.is_some() {
            return Err(Error::Busy);
        }
        *active = Some(cancel);
        Ok(JobSlot {
            active_job: self.active_job.clone(),
        })
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        // The slot holds a plain Option, so a poisoned lock still has usable contents
        self.active_job
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the job slot when dropped
pub(crate) struct JobSlot {
    active_job: Arc<Mutex<Option<CancellationToken>>>,
}

impl Drop for JobSlot {
    fn drop(&mut self) {
        let mut active = self
            .active_job
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *active = None;
    }
}
