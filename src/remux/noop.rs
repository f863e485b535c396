//! No-op remuxer for graceful degradation

use super::traits::Remuxer;
use async_trait::async_trait;
use std::path::Path;

use crate::decrypt::FragmentStream;

/// Remuxer used when no ffmpeg binary is available
///
/// Every call returns `Error::NotSupported`, so each task fails with a clear
/// message while discovery and listing keep working.
///
/// # Examples
///
/// ```
/// use bili_remux::remux::{NoOpRemuxer, Remuxer};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() {
/// let result = NoOpRemuxer
///     .remux(vec![], Path::new("out.mp4"), Path::new("/tmp"))
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct NoOpRemuxer;

#[async_trait]
impl Remuxer for NoOpRemuxer {
    async fn remux(
        &self,
        _inputs: Vec<FragmentStream>,
        _output: &Path,
        _scratch: &Path,
    ) -> crate::Result<()> {
        Err(crate::Error::NotSupported(
            "remuxing requires an external ffmpeg binary. \
             Configure ffmpeg_path or ensure ffmpeg is in PATH."
                .into(),
        ))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
