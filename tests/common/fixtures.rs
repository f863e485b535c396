//! Download-folder fixtures mimicking the desktop client's layout

use std::path::{Path, PathBuf};

/// Junk header the client prepends to each fragment
pub const HEADER: &[u8; 9] = b"\xff\xff\xff\xff\xff\xff\xff\xff\xff";

/// Sidecar for a multi-part collection entry
pub const EPISODE_SIDECAR: &str = r#"{
    "type": "ugc",
    "groupTitle": "Rust in Action",
    "title": "Ownership",
    "p": 2,
    "uname": "crab",
    "status": "completed",
    "totalSize": 1048576
}"#;

/// Sidecar of a download that is still in progress
pub const DOWNLOADING_SIDECAR: &str = r#"{"title": "Half done", "status": "downloading"}"#;

/// Sidecar with a title but no fragments next to it
pub const NO_FRAGMENTS_SIDECAR: &str = r#"{"title": "Nothing downloaded yet"}"#;

/// Bytes of a fragment file: junk header followed by `payload`
pub fn encrypted(payload: &[u8]) -> Vec<u8> {
    let mut data = HEADER.to_vec();
    data.extend_from_slice(payload);
    data
}

/// Builder for one task directory
pub struct TaskDir {
    dir: PathBuf,
}

impl TaskDir {
    /// Create `<root>/<id>/`
    pub fn create(root: &Path, id: &str) -> Self {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    /// Use `root` itself as the task directory
    pub fn at(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).unwrap();
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Add an encrypted fragment holding `payload`
    pub fn fragment(self, name: &str, payload: &[u8]) -> Self {
        std::fs::write(self.dir.join(name), encrypted(payload)).unwrap();
        self
    }

    /// Add a caption sidecar
    pub fn caption(self, name: &str) -> Self {
        std::fs::write(self.dir.join(name), b"<i></i>").unwrap();
        self
    }

    /// Add a `.videoInfo` sidecar
    pub fn sidecar(self, json: &str) -> Self {
        std::fs::write(self.dir.join(".videoInfo"), json).unwrap();
        self
    }

    /// Path of the task directory
    pub fn path(&self) -> &Path {
        &self.dir
    }
}
