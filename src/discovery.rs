//! Task discovery
//!
//! Turns a directory tree written by the desktop client into [`Task`] records.
//! Two layouts are accepted:
//!
//! - the root itself holds `.m4s` fragments: it is a single task
//! - otherwise every entry of the root is a candidate task directory
//!
//! Candidates are analyzed concurrently and independently. Anything that is not
//! a readable task directory is dropped without affecting its siblings.

use futures::future::join_all;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::metadata::read_video_info;
use crate::types::{DiscoveryResult, Task, TaskId};

/// Suffix of encrypted fragment files
pub const FRAGMENT_EXTENSION: &str = ".m4s";

#[allow(clippy::expect_used)]
static CAPTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^dm[0-9]+").expect("caption pattern is a valid regex")
});

/// Whether a file name denotes an encrypted fragment
///
/// Dot-prefixed names never count, even with the right suffix.
#[must_use]
pub fn is_fragment_file(name: &str) -> bool {
    !name.starts_with('.') && name.ends_with(FRAGMENT_EXTENSION)
}

/// Whether a file name denotes a caption (danmu) sidecar
#[must_use]
pub fn is_caption_file(name: &str) -> bool {
    CAPTION_PATTERN.is_match(name)
}

/// Discover every task under `root`
///
/// # Errors
///
/// Only a root that cannot be listed is an error. Individual candidates that
/// fail analysis are dropped from the result.
pub async fn discover(root: &Path) -> Result<DiscoveryResult> {
    let root = std::path::absolute(root)
        .map_err(|e| Error::invalid_path(root, format!("cannot resolve path: {}", e)))?;
    let names = list_entry_names(&root).await?;

    if names.iter().any(|name| is_fragment_file(name)) {
        debug!(root = %root.display(), "root contains fragments, treating it as a single task");
        let task = analyze_task(&root).await?;
        return Ok(DiscoveryResult {
            tasks: vec![task],
            dropped: 0,
        });
    }

    let candidates: Vec<PathBuf> = names.iter().map(|name| root.join(name)).collect();
    let outcomes = join_all(candidates.iter().map(|path| analyze_task(path))).await;

    let mut result = DiscoveryResult::default();
    for (path, outcome) in candidates.iter().zip(outcomes) {
        match outcome {
            Ok(task) => result.tasks.push(task),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping candidate");
                result.dropped += 1;
            }
        }
    }

    info!(
        root = %root.display(),
        tasks = result.tasks.len(),
        dropped = result.dropped,
        "discovery finished"
    );
    Ok(result)
}

/// Analyze a single task directory
///
/// A directory qualifies when it holds fragments, captions or a sidecar. A
/// sidecar-only directory yields a task with no fragments; assembly rejects it.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] when `dir` is not a readable directory or has
/// nothing recognizable in it.
pub async fn analyze_task(dir: &Path) -> Result<Task> {
    let meta = tokio::fs::metadata(dir)
        .await
        .map_err(|e| Error::invalid_path(dir, e.to_string()))?;
    if !meta.is_dir() {
        return Err(Error::invalid_path(dir, "not a directory"));
    }

    let id = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::invalid_path(dir, "path has no directory name"))?;

    let names = list_entry_names(dir).await?;
    let fragments: Vec<String> = names
        .iter()
        .filter(|n| is_fragment_file(n))
        .cloned()
        .collect();
    let captions: Vec<String> = names
        .iter()
        .filter(|n| is_caption_file(n))
        .cloned()
        .collect();

    let info = read_video_info(dir).await;
    if fragments.is_empty() && captions.is_empty() && info.is_none() {
        return Err(Error::invalid_path(dir, "no fragments, captions or metadata"));
    }

    let task = match info {
        Some(info) => Task {
            id: TaskId::new(id),
            group_title: info.group_title,
            title: info.title,
            page: info.page,
            uploader: info.uploader,
            status: info.status,
            fragments,
            captions,
            dir: dir.to_path_buf(),
        },
        // No sidecar means no status, so the skip policy never applies
        None => Task {
            id: TaskId::new(id),
            group_title: None,
            title: None,
            page: None,
            uploader: None,
            status: None,
            fragments,
            captions,
            dir: dir.to_path_buf(),
        },
    };

    debug!(
        task_id = %task.id,
        fragments = task.fragments.len(),
        captions = task.captions.len(),
        "analyzed task"
    );
    Ok(task)
}

/// List entry names of a directory, sorted
async fn list_entry_names(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::invalid_path(dir, e.to_string()))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::invalid_path(dir, e.to_string()))?
    {
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => debug!(dir = %dir.display(), name = ?raw, "skipping non UTF-8 entry"),
        }
    }
    names.sort();
    Ok(names)
}
