//! Core types for bili-remux

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TaskFailure;

/// Status value the desktop client writes once a download has finished
pub const COMPLETED_STATUS: &str = "completed";

/// Identifier of a task, taken from its directory name
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One downloaded video: its fragment files plus whatever the sidecar told us
///
/// Built once per discovery pass and never mutated afterwards. `fragments`
/// is in listing order, which is also the order assembly concatenates them in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Directory name of the task
    pub id: TaskId,
    /// Title of the collection this video belongs to
    pub group_title: Option<String>,
    /// Title of the video itself
    pub title: Option<String>,
    /// Page (part) number within the collection
    pub page: Option<u32>,
    /// Uploader name
    pub uploader: Option<String>,
    /// Download status as written by the client
    pub status: Option<String>,
    /// Encrypted fragment file names, in assembly order
    pub fragments: Vec<String>,
    /// Caption (danmu) sidecar file names; listed only, never processed
    pub captions: Vec<String>,
    /// Absolute path of the task directory
    pub dir: PathBuf,
}

impl Task {
    /// Title if the sidecar provided one, otherwise the task id
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }

    /// Whether the client marked this download as finished
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(COMPLETED_STATUS)
    }

    /// Full paths of the fragment files, in assembly order
    pub fn fragment_paths(&self) -> Vec<PathBuf> {
        self.fragments.iter().map(|f| self.dir.join(f)).collect()
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)?;
        if let Some(group) = &self.group_title {
            write!(f, " [{}]", group)?;
        }
        if let Some(page) = self.page {
            write!(f, " P{}", page)?;
        }
        write!(f, " {}", self.display_name())?;
        if let Some(uploader) = &self.uploader {
            write!(f, " by {}", uploader)?;
        }
        write!(
            f,
            " ({}, {} fragment(s), {} caption(s))",
            self.status.as_deref().unwrap_or("unknown"),
            self.fragments.len(),
            self.captions.len()
        )
    }
}

/// Outcome of one discovery pass
///
/// Tasks keep discovery order. Candidates that could not be analyzed are not
/// present; only their count is kept for logging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    /// Successfully analyzed tasks
    pub tasks: Vec<Task>,
    /// Number of candidate entries that were dropped
    pub dropped: usize,
}

impl DiscoveryResult {
    /// Number of discovered tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when nothing was discovered
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl IntoIterator for DiscoveryResult {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}

/// Progress and outcome events emitted during a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Decryption and remuxing of a task is about to start
    TaskStarted {
        /// Task ID
        id: TaskId,
        /// Title or id of the task
        name: String,
    },

    /// Output file was written
    TaskComplete {
        /// Task ID
        id: TaskId,
        /// Path of the written file
        path: PathBuf,
    },

    /// Task was not assembled
    TaskSkipped {
        /// Task ID
        id: TaskId,
        /// Why it was skipped
        reason: String,
    },

    /// Task failed; the run continues with the next one
    TaskFailed {
        /// Task ID
        id: TaskId,
        /// Error message
        error: String,
    },

    /// Every discovered task has been processed
    RunComplete {
        /// Number of files written
        succeeded: usize,
        /// Number of failed tasks
        failed: usize,
        /// Number of skipped tasks
        skipped: usize,
    },
}

/// Summary of a finished conversion run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Tasks that produced an output file, with the file path
    pub succeeded: Vec<(TaskId, PathBuf)>,
    /// Tasks skipped by policy
    pub skipped: Vec<TaskId>,
    /// Tasks that failed, with the reason
    pub failures: Vec<TaskFailure>,
}

impl RunReport {
    /// Total number of tasks the run looked at
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failures.len()
    }

    /// True when no task failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
