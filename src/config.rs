use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::source::MockSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub max_pages: u32,
    pub loading_label: String,
    pub reveal_delay_ms: u64,
    pub stagger_ms: u64,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub latency_ms: u64,
    pub batch_size: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_pages: 3,
            loading_label: "Loading...".to_string(),
            reveal_delay_ms: 50,
            stagger_ms: 100,
            source: SourceConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self { Self { latency_ms: 800, batch_size: 4 } }
}

impl SourceConfig {
    pub fn mock_source(&self) -> MockSource {
        MockSource::new(Duration::from_millis(self.latency_ms), self.batch_size)
    }
}

impl LoaderConfig {
    /// Load from `path`, or from the platform config dir when `None`. A missing
    /// file means defaults; env overrides apply on top either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };
        let mut cfg = match path {
            Some(p) if p.exists() => Self::from_file(&p)?,
            _ => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Overrides from `GALLERY_*` variables; unparsable values are ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("GALLERY_MAX_PAGES").and_then(|s| s.parse().ok()) { self.max_pages = v; }
        if let Some(v) = var("GALLERY_LATENCY_MS").and_then(|s| s.parse().ok()) { self.source.latency_ms = v; }
        if let Some(v) = var("GALLERY_STAGGER_MS").and_then(|s| s.parse().ok()) { self.stagger_ms = v; }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_pages >= 1, "max_pages must be at least 1");
        ensure!(self.source.batch_size >= 1, "source.batch_size must be at least 1");
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "progressive-gallery").map(|d| d.config_dir().join("gallery.toml"))
}
