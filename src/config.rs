//! Configuration types for bili-remux

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default read-chunk size for fragment decryption (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Per-run options applied uniformly to every task
///
/// Immutable for the duration of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOptions {
    /// Root directory for converted files (default: current directory)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prefix output filenames with the page number when the sidecar has one
    #[serde(default)]
    pub page_number: bool,

    /// Suppress start/complete progress notifications
    #[serde(default)]
    pub silence: bool,

    /// Read-chunk size used while decrypting fragments, in bytes (default: 65536)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Skip tasks whose sidecar status already says `completed`
    ///
    /// Tasks without a sidecar have no status and are always converted.
    #[serde(default)]
    pub skip_completed: bool,

    /// Number of tasks assembled at the same time (default: 1, sequential)
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// Parent directory for the run's scratch space (default: `output_dir`)
    ///
    /// ffmpeg needs seekable inputs, so every decrypted fragment of the task in
    /// progress is written here in full. Expect up to the size of the largest
    /// video times `max_concurrent_tasks`. Avoid RAM-backed locations such as a
    /// tmpfs `/tmp` for large downloads.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            page_number: false,
            silence: false,
            buffer_size: default_buffer_size(),
            skip_completed: false,
            max_concurrent_tasks: default_max_concurrent_tasks(),
            scratch_dir: None,
        }
    }
}

impl TaskOptions {
    /// Check values that would make a run meaningless
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `buffer_size` or `max_concurrent_tasks` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::Config {
                message: "buffer_size must be at least 1 byte".to_string(),
                key: Some("buffer_size".to_string()),
            });
        }
        if self.max_concurrent_tasks == 0 {
            return Err(Error::Config {
                message: "max_concurrent_tasks must be at least 1".to_string(),
                key: Some("max_concurrent_tasks".to_string()),
            });
        }
        Ok(())
    }
}

/// External tool settings (ffmpeg)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for ffmpeg if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for [`Converter`](crate::Converter)
///
/// Sub-configs are flattened, so the serialized form is a single flat object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Options applied to every task
    #[serde(flatten)]
    pub options: TaskOptions,

    /// External tool discovery
    #[serde(flatten)]
    pub tools: ToolsConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_max_concurrent_tasks() -> usize {
    1
}

fn default_true() -> bool {
    true
}
