//! Persisting retrieved artifacts on the host

use crate::error::RycError;
use crate::utils::filename::{generate_unique_filename, to_safe_filename};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// A finished artifact fetched from the backend
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedFile {
    /// Name announced by the backend, or the fallback name
    pub filename: String,
    /// Response body
    pub bytes: Vec<u8>,
}

impl RetrievedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Where retrieved artifacts end up
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist the artifact and return where it went. The blob is consumed.
    async fn save(&self, file: RetrievedFile) -> Result<PathBuf, RycError>;
}

/// Saves artifacts into a directory without overwriting existing files
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, file: RetrievedFile) -> Result<PathBuf, RycError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let safe_name = to_safe_filename(&file.filename);
        let final_name = generate_unique_filename(&self.dir, &safe_name)?;
        let output_path = self.dir.join(&final_name);
        let tmp_path = self.dir.join(format!(".{}.part", final_name));
        debug!("Saving {} bytes to {:?}", file.bytes.len(), output_path);

        let committed = commit_file(&tmp_path, &output_path, &file.bytes).await;
        drop(file);

        committed?;
        info!("Saved artifact to {:?}", output_path);
        Ok(output_path)
    }
}

/// Write through a temp file and move it into place. The temp file is gone
/// afterwards whether or not this succeeds.
async fn commit_file(tmp_path: &Path, output_path: &Path, bytes: &[u8]) -> Result<(), RycError> {
    let result = match write_file(tmp_path, bytes).await {
        Ok(()) => tokio::fs::rename(tmp_path, output_path)
            .await
            .map_err(RycError::from),
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        warn!("Saving artifact failed: {}, cleaning up temp file", e);
        let _ = tokio::fs::remove_file(tmp_path).await;
    }
    result
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), RycError> {
    let mut out = File::create(path).await?;
    out.write_all(bytes).await?;
    out.flush().await?;
    out.sync_all().await?;
    Ok(())
}
