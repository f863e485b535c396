//! Fake remux engine for tests that must not depend on ffmpeg

use async_trait::async_trait;
use bili_remux::decrypt::FragmentStream;
use bili_remux::{Error, Remuxer, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

/// Writes the decrypted inputs back to back into the output file
///
/// Records the input paths of every call. Outputs whose file name contains
/// `fail_on` are refused with an external tool error.
#[derive(Default)]
pub struct ConcatRemuxer {
    pub calls: Mutex<Vec<Vec<PathBuf>>>,
    pub fail_on: Option<String>,
}

impl ConcatRemuxer {
    pub fn failing_on(pattern: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(pattern.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Remuxer for ConcatRemuxer {
    async fn remux(&self, inputs: Vec<FragmentStream>, output: &Path, _scratch: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(inputs.iter().map(|i| i.path().to_path_buf()).collect());

        if let Some(pattern) = &self.fail_on {
            let name = output.file_name().unwrap().to_string_lossy();
            if name.contains(pattern.as_str()) {
                return Err(Error::ExternalTool(format!("refusing {}", name)));
            }
        }

        // Truncate like `ffmpeg -y` does
        let mut file = tokio::fs::File::create(output).await?;
        for input in inputs {
            input.write_to(&mut file).await?;
        }
        file.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "concat"
    }
}
