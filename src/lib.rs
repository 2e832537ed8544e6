pub mod config;
pub mod loader;
pub mod render;
pub mod source;
pub mod surface;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::config::{LoaderConfig, SourceConfig};
    pub use crate::loader::{Activation, LoaderOptions, LoaderState, Phase, ProgressiveLoader};
    pub use crate::render::{render, RenderedElement, Visibility};
    pub use crate::source::{DataSource, JsonFileSource, MockSource};
    pub use crate::surface::{ActivateHandler, Button, ButtonState, Container, Control, DiagnosticSink, Grid, TracingSink};
    pub use crate::types::{GalleryItem, MediaKind};
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::LoaderConfig;
use crate::loader::{LoaderOptions, ProgressiveLoader};
use crate::source::DataSource;
use crate::surface::{Button, Grid, TracingSink};

/// A loader wired to an in-memory grid and button, ready to be clicked.
pub struct Gallery {
    pub loader: Arc<ProgressiveLoader>,
    pub grid: Arc<Grid>,
    pub button: Arc<Button>,
}

impl Gallery {
    /// Build a gallery from configuration, reporting faults through `tracing`.
    pub fn new(cfg: &LoaderConfig, source: Arc<dyn DataSource>, label: &str) -> Result<Self> {
        let grid = Arc::new(Grid::new());
        let button = Arc::new(Button::new(label));
        let loader = Arc::new(ProgressiveLoader::with_options(
            cfg.max_pages,
            source,
            grid.clone(),
            button.clone(),
            Arc::new(TracingSink),
            LoaderOptions::from(cfg),
        )?);
        loader.attach();
        Ok(Self { loader, grid, button })
    }

    /// Press the button `clicks` times, letting each cycle finish before the
    /// next press.
    pub async fn click_through(&self, clicks: usize) -> ClickReport {
        let mut report = ClickReport::default();
        for _ in 0..clicks {
            let before = self.grid.len();
            match self.button.press() {
                Some(work) => {
                    work.await;
                    report.accepted += 1;
                    // A failed fetch leaves the previous batch as the one still fading in.
                    let inserted = self.grid.len() - before;
                    if inserted > 0 { report.last_batch = inserted; }
                }
                None => tracing::debug!("press swallowed by disabled or hidden button"),
            }
        }
        report
    }

    /// How long to wait for the tiles of the last loaded batch to show.
    pub fn settle_time(&self, report: &ClickReport) -> Duration {
        self.loader.options().settle_time(report.last_batch)
    }
}

/// Outcome of [`Gallery::click_through`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickReport {
    /// Presses the button let through.
    pub accepted: usize,
    /// Tiles inserted by the last press that inserted any.
    pub last_batch: usize,
}
