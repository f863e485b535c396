//! Error types for bili-remux
//!
//! This module provides the error taxonomy used across the crate:
//! - Input-path errors (root or task directory missing, not a directory)
//! - Assembly errors (empty fragment set, fragment I/O, remux engine failure)
//! - Configuration errors with the offending key
//! - A serializable per-task failure record for run reports

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::types::TaskId;

/// Result type alias for bili-remux operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bili-remux
///
/// Every layer below the orchestrator propagates these verbatim; only
/// [`Converter`](crate::Converter) turns them into per-task [`TaskFailure`] records.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "buffer_size")
        key: Option<String>,
    },

    /// A root or task path is missing, unreadable or not a directory
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The path that could not be used
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },

    /// Assembly-related error (fragments, decryption, remux)
    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External tool execution failed (ffmpeg)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary)
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Errors raised while turning one task's fragments into an output file
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The task has nothing to assemble
    #[error("task {task} has no fragment files")]
    NoFragments {
        /// The task that was rejected
        task: TaskId,
    },

    /// A fragment could not be opened or read while decrypting
    #[error("failed to read fragment {path}: {source}")]
    FragmentRead {
        /// The fragment file being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Short machine-readable code for this error, used in run reports and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidPath { .. } => "invalid_path",
            Error::Assembly(AssemblyError::NoFragments { .. }) => "no_fragments",
            Error::Assembly(AssemblyError::FragmentRead { .. }) => "fragment_read",
            Error::Assembly(AssemblyError::OutputDir { .. }) => "output_dir",
            Error::Io(_) => "io_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
        }
    }

    pub(crate) fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Structured record of one task that failed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// The task that failed
    pub task: TaskId,
    /// Machine-readable error code (see [`Error::error_code`])
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl TaskFailure {
    /// Build a failure record from a task id and the error that stopped it
    pub fn new(task: TaskId, error: &Error) -> Self {
        Self {
            task,
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.task, self.message)
    }
}
