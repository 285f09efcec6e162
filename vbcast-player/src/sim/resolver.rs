//! Content resolver reading chunk payloads from a local directory

use crate::media::{AudioSource, ContentResolver};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use vbcast_common::AudioContent;

/// Resolves a chunk URL as a file name below `root`
#[derive(Debug, Clone)]
pub struct FileContentResolver {
    root: PathBuf,
}

impl FileContentResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let name = url.strip_prefix("file://").unwrap_or(url);
        self.root.join(name)
    }
}

#[async_trait]
impl ContentResolver for FileContentResolver {
    async fn resolve(&self, content: &AudioContent) -> anyhow::Result<AudioSource> {
        let path = self.path_for(&content.url);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read chunk file {}", path.display()))?;
        debug!("Resolved {} ({} bytes)", content.url, bytes.len());
        Ok(AudioSource::Bytes(bytes))
    }
}
