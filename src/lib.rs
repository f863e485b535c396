//! # bili-remux
//!
//! Turns downloads made by the Bilibili desktop client into playable MP4 files.
//!
//! The client stores every video as a directory of encrypted `.m4s` fragments
//! (usually one video and one audio track) plus an optional `.videoInfo`
//! sidecar. Each fragment starts with 9 junk bytes; dropping them yields plain
//! fragmented MP4 that ffmpeg can mux into one file without re-encoding.
//!
//! ## Pipeline
//!
//! - [`discovery`] finds task directories and builds [`Task`] records
//! - [`decrypt`] strips the junk header while streaming each fragment
//! - [`assembly`] names the output and drives a [`Remuxer`](remux::Remuxer)
//! - [`Converter`] runs every task, isolating failures per task
//!
//! ## Quick Start
//!
//! ```no_run
//! use bili_remux::{Config, Converter, TaskOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         options: TaskOptions {
//!             output_dir: "converted".into(),
//!             page_number: true,
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     };
//!
//!     let converter = Converter::new(config)?;
//!     let report = converter.convert_folder(Path::new("/Movies/bilibili")).await?;
//!
//!     for failure in &report.failures {
//!         eprintln!("{}", failure);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Task assembly (decrypt + remux into one file)
pub mod assembly;
/// Configuration types
pub mod config;
/// Batch conversion and listing
pub mod converter;
/// Fragment decryption
pub mod decrypt;
/// Task discovery
pub mod discovery;
/// Error types
pub mod error;
/// Sidecar metadata reading
pub mod metadata;
/// Remux engines
pub mod remux;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, TaskOptions, ToolsConfig};
pub use converter::{Converter, list_folder};
pub use discovery::discover;
pub use error::{AssemblyError, Error, Result, TaskFailure};
pub use remux::{FfmpegRemuxer, NoOpRemuxer, Remuxer};
pub use types::{DiscoveryResult, Event, RunReport, Task, TaskId};
