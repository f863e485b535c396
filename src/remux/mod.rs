//! Remuxing decrypted fragments into a container
//!
//! The [`Remuxer`] trait is the seam between assembly and whatever engine
//! writes the final file. Implementations provided:
//!
//! - [`FfmpegRemuxer`]: runs an external `ffmpeg` with stream copy (no re-encode)
//! - [`NoOpRemuxer`]: used when no ffmpeg is available; every call fails with
//!   [`Error::NotSupported`](crate::Error::NotSupported)
//!
//! ## Usage
//!
//! ```no_run
//! use bili_remux::config::ToolsConfig;
//! use bili_remux::remux::remuxer_from_config;
//!
//! let remuxer = remuxer_from_config(&ToolsConfig::default());
//! println!("using {}", remuxer.name());
//! ```

mod ffmpeg;
mod noop;
mod traits;

pub use ffmpeg::FfmpegRemuxer;
pub use noop::NoOpRemuxer;
pub use traits::Remuxer;

use crate::config::ToolsConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Pick a remuxer for the given tool settings
///
/// An explicit `ffmpeg_path` wins; otherwise PATH is searched when allowed.
/// Falls back to [`NoOpRemuxer`] so discovery and listing keep working.
pub fn remuxer_from_config(tools: &ToolsConfig) -> Arc<dyn Remuxer> {
    if let Some(path) = &tools.ffmpeg_path {
        info!(ffmpeg = %path.display(), "using configured ffmpeg");
        return Arc::new(FfmpegRemuxer::new(path.clone()));
    }

    if tools.search_path
        && let Some(remuxer) = FfmpegRemuxer::from_path()
    {
        info!(ffmpeg = %remuxer.binary_path().display(), "found ffmpeg in PATH");
        return Arc::new(remuxer);
    }

    warn!("ffmpeg not available, conversions will fail until it is installed or configured");
    Arc::new(NoOpRemuxer)
}
