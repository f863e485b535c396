//! Trait for the remux capability

use async_trait::async_trait;
use std::path::Path;

use crate::decrypt::FragmentStream;

/// Writes ordered decrypted streams into one container file
///
/// Implementations must copy audio and video as-is (no re-encoding), keep the
/// input order, and overwrite `output` if it already exists.
///
/// # Examples
///
/// ```no_run
/// use bili_remux::decrypt::open_fragment;
/// use bili_remux::remux::{FfmpegRemuxer, Remuxer};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let remuxer = FfmpegRemuxer::from_path().expect("ffmpeg not found");
/// let inputs = vec![
///     open_fragment(Path::new("61142298/1-30112.m4s"), 64 * 1024).await?,
///     open_fragment(Path::new("61142298/1-30280.m4s"), 64 * 1024).await?,
/// ];
/// let scratch = tempfile::tempdir()?;
/// remuxer.remux(inputs, Path::new("out/61142298.mp4"), scratch.path()).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Combine `inputs`, in order, into `output`
    ///
    /// # Arguments
    ///
    /// * `inputs` - Decrypted fragment streams in assembly order
    /// * `output` - Destination file; its directory already exists
    /// * `scratch` - Run-scoped directory the implementation may use for
    ///   intermediate files; it must clean up what it creates
    ///
    /// # Errors
    ///
    /// Returns an error if an input fails to read, the engine cannot be
    /// started, or the engine reports failure.
    async fn remux(
        &self,
        inputs: Vec<FragmentStream>,
        output: &Path,
        scratch: &Path,
    ) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
