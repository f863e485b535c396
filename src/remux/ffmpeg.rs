//! ffmpeg-based remuxer using an external binary

use super::traits::Remuxer;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::assembly::CONTAINER_EXTENSION;
use crate::decrypt::FragmentStream;
use crate::error::{Error, Result};

/// Remuxer that runs the external `ffmpeg` binary
///
/// Decrypted inputs are spooled into a private subdirectory of the run's
/// scratch space, then handed to ffmpeg as ordered `-i` inputs with audio and
/// video stream copy. The subdirectory is removed when the call returns,
/// successfully or not. The child process is killed if the call is dropped
/// before ffmpeg exits.
///
/// ffmpeg writes to a hidden temporary file next to `output`, which is renamed
/// over `output` only once ffmpeg succeeds. A failed run never leaves a partial
/// file behind or replaces an earlier good one.
///
/// # Examples
///
/// ```no_run
/// use bili_remux::remux::FfmpegRemuxer;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let remuxer = FfmpegRemuxer::new(PathBuf::from("/usr/bin/ffmpeg"));
///
/// // Or auto-discover from PATH
/// let remuxer = FfmpegRemuxer::from_path().expect("ffmpeg not found in PATH");
/// ```
pub struct FfmpegRemuxer {
    binary_path: PathBuf,
}

impl FfmpegRemuxer {
    /// Create a new remuxer with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find ffmpeg in PATH
    ///
    /// Returns `None` if the binary is not found.
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    /// Path of the ffmpeg binary this remuxer runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn build_command(&self, inputs: &[PathBuf], output: &Path) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("-y") // Overwrite output
            .args(["-hide_banner", "-loglevel", "error"]);
        for input in inputs {
            cmd.arg("-i").arg(input);
        }
        cmd.args(["-c:v", "copy", "-c:a", "copy"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Directory `output` will be created in
fn output_parent(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    async fn remux(
        &self,
        inputs: Vec<FragmentStream>,
        output: &Path,
        scratch: &Path,
    ) -> Result<()> {
        if inputs.is_empty() {
            return Err(Error::ExternalTool("ffmpeg needs at least one input".into()));
        }

        let work = tempfile::Builder::new()
            .prefix("remux-")
            .tempdir_in(scratch)?;

        let mut spooled = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let path = work.path().join(format!("{:03}.m4s", index));
            let mut file = tokio::fs::File::create(&path).await?;
            let source = input.path().to_path_buf();
            let bytes = input.write_to(&mut file).await?;
            debug!(
                source = %source.display(),
                spooled = %path.display(),
                bytes,
                "decrypted fragment"
            );
            spooled.push(path);
        }

        let partial = tempfile::Builder::new()
            .prefix(".bili-remux-")
            .suffix(&format!(".{}", CONTAINER_EXTENSION))
            .tempfile_in(output_parent(output))?
            .into_temp_path();

        let result = self
            .build_command(&spooled, &partial)
            .output()
            .await
            .map_err(|e| Error::ExternalTool(format!("Failed to execute ffmpeg: {}", e)))?;

        if let Err(e) = work.close() {
            warn!(error = %e, "failed to remove remux scratch files");
        }

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::ExternalTool(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        partial.persist(output).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
