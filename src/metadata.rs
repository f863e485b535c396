//! Sidecar metadata (`.videoInfo`) reading
//!
//! The desktop client drops a JSON file next to each download describing the
//! video. Only a handful of its fields matter here; everything else is ignored.
//! A missing or broken sidecar is not an error: callers get `None` and fall
//! back to the directory name.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Reserved file name of the sidecar inside a task directory
pub const VIDEO_INFO_FILE: &str = ".videoInfo";

/// Fields of the sidecar that the converter consumes
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    /// Title of the collection the video belongs to
    #[serde(default)]
    pub group_title: Option<String>,
    /// Video title
    #[serde(default)]
    pub title: Option<String>,
    /// Page number within the collection
    #[serde(default, rename = "p")]
    pub page: Option<u32>,
    /// Uploader name
    #[serde(default, rename = "uname")]
    pub uploader: Option<String>,
    /// Download status (`completed` once finished)
    #[serde(default)]
    pub status: Option<String>,
}

impl VideoInfo {
    /// Parse sidecar bytes
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let mut info: VideoInfo = serde_json::from_slice(bytes)?;
        info.group_title = non_empty(info.group_title);
        info.title = non_empty(info.title);
        info.uploader = non_empty(info.uploader);
        Ok(info)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Read and parse the sidecar of a task directory
///
/// Returns `None` when the file is absent, unreadable or malformed.
pub async fn read_video_info(task_dir: &Path) -> Option<VideoInfo> {
    let path = task_dir.join(VIDEO_INFO_FILE);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable sidecar metadata");
            return None;
        }
    };

    match VideoInfo::from_slice(&bytes) {
        Ok(info) => Some(info),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring malformed sidecar metadata");
            None
        }
    }
}
