//! Batch conversion of discovered tasks
//!
//! [`Converter`] runs discovery, then assembles every task with per-task
//! failure isolation: a task that fails is recorded in the [`RunReport`],
//! announced as [`Event::TaskFailed`] and logged, and the run moves on.
//!
//! Each run owns a scratch directory that is created before the first task
//! and removed when the run ends, whatever the outcome.

use futures::StreamExt;
use futures::stream;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::assembly::Assembler;
use crate::config::{Config, TaskOptions};
use crate::discovery::discover;
use crate::error::{Result, TaskFailure};
use crate::remux::{Remuxer, remuxer_from_config};
use crate::types::{DiscoveryResult, Event, RunReport, Task};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Discover tasks under `root` without converting anything
///
/// # Errors
///
/// Returns an error only if `root` itself cannot be listed.
pub async fn list_folder(root: &Path) -> Result<Vec<Task>> {
    Ok(discover(root).await?.tasks)
}

/// Runs conversions over whole download folders
pub struct Converter {
    /// Options applied to every task
    options: Arc<TaskOptions>,
    /// Engine used to write containers
    remuxer: Arc<dyn Remuxer>,
    /// Event channel for progress and outcome notifications
    event_tx: broadcast::Sender<Event>,
}

impl Converter {
    /// Create a converter, locating ffmpeg according to `config.tools`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the options are invalid.
    pub fn new(config: Config) -> Result<Self> {
        let remuxer = remuxer_from_config(&config.tools);
        Self::with_remuxer(config.options, remuxer)
    }

    /// Create a converter with a specific remux engine
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the options are invalid.
    pub fn with_remuxer(options: TaskOptions, remuxer: Arc<dyn Remuxer>) -> Result<Self> {
        options.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            options: Arc::new(options),
            remuxer,
            event_tx,
        })
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Options this converter applies
    pub fn options(&self) -> &TaskOptions {
        &self.options
    }

    /// Discover and convert every task under `root`
    ///
    /// # Errors
    ///
    /// Fails only if `root` cannot be listed or the scratch directory cannot be
    /// created. Task failures are reported in the returned [`RunReport`].
    pub async fn convert_folder(&self, root: &Path) -> Result<RunReport> {
        let discovered = discover(root).await?;
        self.convert_tasks(discovered).await
    }

    /// Convert already discovered tasks
    ///
    /// # Errors
    ///
    /// Fails only if the scratch directory cannot be created.
    pub async fn convert_tasks(&self, discovered: DiscoveryResult) -> Result<RunReport> {
        let scratch = self.create_scratch().await?;
        let assembler = Assembler::new(
            Arc::clone(&self.options),
            Arc::clone(&self.remuxer),
            self.event_tx.clone(),
        );

        let mut report = RunReport::default();
        let mut runnable = Vec::with_capacity(discovered.len());
        for task in discovered {
            if self.options.skip_completed && task.is_completed() {
                info!(task_id = %task.id, "skipping completed task");
                self.emit(Event::TaskSkipped {
                    id: task.id.clone(),
                    reason: "already completed".to_string(),
                });
                report.skipped.push(task.id);
            } else {
                runnable.push(task);
            }
        }

        let scratch_path = scratch.path();
        let mut outcomes = stream::iter(runnable.iter())
            .map(|task| {
                let assembler = &assembler;
                async move { (task, assembler.assemble(task, scratch_path).await) }
            })
            .buffered(self.options.max_concurrent_tasks);

        while let Some((task, outcome)) = outcomes.next().await {
            match outcome {
                Ok(path) => report.succeeded.push((task.id.clone(), path)),
                Err(e) => {
                    warn!(
                        task_id = %task.id,
                        dir = %task.dir.display(),
                        error = %e,
                        "task failed"
                    );
                    self.emit(Event::TaskFailed {
                        id: task.id.clone(),
                        error: e.to_string(),
                    });
                    report.failures.push(TaskFailure::new(task.id.clone(), &e));
                }
            }
        }
        drop(outcomes);

        if let Err(e) = scratch.close() {
            warn!(error = %e, "failed to remove scratch directory");
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failures.len(),
            skipped = report.skipped.len(),
            "run finished"
        );
        self.emit(Event::RunComplete {
            succeeded: report.succeeded.len(),
            failed: report.failures.len(),
            skipped: report.skipped.len(),
        });

        Ok(report)
    }

    async fn create_scratch(&self) -> Result<TempDir> {
        let parent = self
            .options
            .scratch_dir
            .as_deref()
            .unwrap_or(self.options.output_dir.as_path());
        tokio::fs::create_dir_all(parent).await?;
        Ok(tempfile::Builder::new()
            .prefix(".bili-remux-")
            .tempdir_in(parent)?)
    }

    fn emit(&self, event: Event) {
        let _ = self.event_tx.send(event);
    }
}
