use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::types::{GalleryItem, MediaKind};

/// Anything that can hand out a batch of gallery items for a page number.
/// The loader only depends on this contract, never on the transport behind it.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_batch(&self, page: u32) -> Result<Vec<GalleryItem>>;
}

/// Local generator that simulates a slow API.
#[derive(Debug, Clone)]
pub struct MockSource {
    latency: Duration,
    batch_size: u32,
    fail_page: Option<u32>,
}

impl MockSource {
    pub fn new(latency: Duration, batch_size: u32) -> Self {
        Self { latency, batch_size: batch_size.max(1), fail_page: None }
    }

    /// Make the fetch for `page` fail after the simulated latency.
    pub fn failing_on(mut self, page: u32) -> Self {
        self.fail_page = Some(page);
        self
    }

    fn kind_at(slot: u32) -> MediaKind {
        // Slots cycle image, image, video, image.
        if slot % 4 == 2 { MediaKind::Video } else { MediaKind::Image }
    }
}

impl Default for MockSource {
    fn default() -> Self { Self::new(Duration::from_millis(800), 4) }
}

#[async_trait]
impl DataSource for MockSource {
    async fn fetch_batch(&self, page: u32) -> Result<Vec<GalleryItem>> {
        tokio::time::sleep(self.latency).await;
        if self.fail_page == Some(page) {
            return Err(anyhow!("mock source unavailable for page {page}"));
        }
        let base = u64::from(page) * u64::from(self.batch_size);
        Ok((0..self.batch_size)
            .map(|slot| GalleryItem { kind: Self::kind_at(slot), id: base + u64::from(slot) + 1 })
            .collect())
    }
}

/// Replays batches from a JSON file shaped as `{"1": [{"kind": "image", "id": 5}, ...]}`.
/// The file is re-read on every fetch so edits show up without restarting.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }
}

#[async_trait]
impl DataSource for JsonFileSource {
    async fn fetch_batch(&self, page: u32) -> Result<Vec<GalleryItem>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading batch file {}", self.path.display()))?;
        let mut pages: HashMap<String, Vec<GalleryItem>> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing batch file {}", self.path.display()))?;
        pages
            .remove(&page.to_string())
            .ok_or_else(|| anyhow!("no batch for page {page} in {}", self.path.display()))
    }
}
