//! Assembly of one task into one container file
//!
//! Steps, in order:
//! 1. Reject tasks without fragments
//! 2. Create `<output root>/<group title or id>/`
//! 3. Name the file `<page?><title or id>.mp4`
//! 4. Open every fragment, in discovery order, through the decryptor
//! 5. Hand the ordered streams to the [`Remuxer`]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::TaskOptions;
use crate::decrypt::open_fragment;
use crate::error::{AssemblyError, Result};
use crate::remux::Remuxer;
use crate::types::{Event, Task};
use crate::utils::{MAX_FILENAME_BYTES, sanitize_or, truncate_to_bytes};

/// Extension of the files assembly writes
pub const CONTAINER_EXTENSION: &str = "mp4";

/// Directory a task's output goes into
pub fn output_dir_for(task: &Task, options: &TaskOptions) -> PathBuf {
    let folder = match &task.group_title {
        Some(group) => sanitize_or(group, task.id.as_str()),
        None => task.id.to_string(),
    };
    options.output_dir.join(folder)
}

/// File name of a task's output
///
/// The page prefix is only added when enabled and the sidecar has a page number.
/// The title is shortened so the whole name, prefix and extension included,
/// stays within [`MAX_FILENAME_BYTES`].
pub fn output_filename_for(task: &Task, options: &TaskOptions) -> String {
    let prefix = match (options.page_number, task.page) {
        (true, Some(page)) => page.to_string(),
        _ => String::new(),
    };
    let name = match &task.title {
        Some(title) => sanitize_or(title, task.id.as_str()),
        None => task.id.to_string(),
    };

    // +1 for the dot before the extension
    let budget = MAX_FILENAME_BYTES.saturating_sub(prefix.len() + CONTAINER_EXTENSION.len() + 1);
    let name = truncate_to_bytes(&name, budget).trim_end_matches(['.', ' ']);
    let name = if name.is_empty() { task.id.as_str() } else { name };

    format!("{}{}.{}", prefix, name, CONTAINER_EXTENSION)
}

/// Full output path of a task
pub fn output_path_for(task: &Task, options: &TaskOptions) -> PathBuf {
    output_dir_for(task, options).join(output_filename_for(task, options))
}

/// Turns tasks into container files
pub struct Assembler {
    /// Options shared by every task in the run
    options: Arc<TaskOptions>,
    /// Engine that writes the container
    remuxer: Arc<dyn Remuxer>,
    /// Event channel for progress notifications
    event_tx: broadcast::Sender<Event>,
}

impl Assembler {
    /// Create a new assembler
    pub fn new(
        options: Arc<TaskOptions>,
        remuxer: Arc<dyn Remuxer>,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            options,
            remuxer,
            event_tx,
        }
    }

    /// Assemble one task, returning the path of the written file
    ///
    /// # Arguments
    ///
    /// * `task` - The task to assemble
    /// * `scratch` - Run-scoped scratch directory passed through to the remuxer
    ///
    /// # Errors
    ///
    /// Fails if the task has no fragments, the output directory cannot be
    /// created, a fragment cannot be read, or the remuxer fails. No
    /// completion event is emitted on failure.
    pub async fn assemble(&self, task: &Task, scratch: &Path) -> Result<PathBuf> {
        if task.fragments.is_empty() {
            return Err(AssemblyError::NoFragments {
                task: task.id.clone(),
            }
            .into());
        }

        let output = output_path_for(task, &self.options);
        let output_dir = output.parent().unwrap_or(self.options.output_dir.as_path());
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| AssemblyError::OutputDir {
                path: output_dir.to_path_buf(),
                source,
            })?;

        if !self.options.silence {
            self.emit(Event::TaskStarted {
                id: task.id.clone(),
                name: task.display_name().to_string(),
            });
        }
        info!(
            task_id = %task.id,
            fragments = task.fragments.len(),
            output = %output.display(),
            remuxer = self.remuxer.name(),
            "decrypting and combining"
        );

        let mut inputs = Vec::with_capacity(task.fragments.len());
        for path in task.fragment_paths() {
            debug!(task_id = %task.id, fragment = %path.display(), "opening fragment");
            inputs.push(open_fragment(&path, self.options.buffer_size).await?);
        }

        self.remuxer.remux(inputs, &output, scratch).await?;

        info!(task_id = %task.id, output = %output.display(), "saved");
        if !self.options.silence {
            self.emit(Event::TaskComplete {
                id: task.id.clone(),
                path: output.clone(),
            });
        }

        Ok(output)
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}
