use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, ensure, Result};
use futures::FutureExt;
use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::render::render;
use crate::source::DataSource;
use crate::surface::{Container, Control, DiagnosticSink};
use crate::types::GalleryItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Exhausted,
}

/// Pagination cursor and in-flight guard of one loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderState {
    pub current_page: u32,
    pub max_page: u32,
    pub busy: bool,
}

impl LoaderState {
    fn new(max_page: u32) -> Self { Self { current_page: 1, max_page, busy: false } }

    pub fn is_exhausted(&self) -> bool { self.current_page >= self.max_page }

    pub fn phase(&self) -> Phase {
        if self.busy { Phase::Loading } else if self.is_exhausted() { Phase::Exhausted } else { Phase::Idle }
    }
}

/// What a call to [`ProgressiveLoader::activate`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Another cycle was in flight or the loader is exhausted; nothing happened.
    Ignored(Phase),
    /// The batch for `page` arrived; `inserted` tiles went into the container
    /// and `skipped` items could not be rendered.
    Loaded { page: u32, inserted: usize, skipped: usize },
    /// The fetch for `page` failed and was reported to the diagnostic sink.
    Failed { page: u32 },
}

/// Timing knobs for the loading affordance and tile entrance.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub loading_label: String,
    pub reveal_delay: Duration,
    pub stagger: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { loading_label: "Loading...".to_string(), reveal_delay: Duration::from_millis(50), stagger: Duration::from_millis(100) }
    }
}

impl LoaderOptions {
    /// When the tile at `index` within a batch becomes visible, counted from
    /// its insertion.
    pub fn reveal_delay_for(&self, index: usize) -> Duration {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.reveal_delay.saturating_add(self.stagger.saturating_mul(index))
    }

    /// How long a batch of `tiles` takes to finish its entrance.
    pub fn settle_time(&self, tiles: usize) -> Duration {
        self.reveal_delay_for(tiles)
    }
}

impl From<&LoaderConfig> for LoaderOptions {
    fn from(cfg: &LoaderConfig) -> Self {
        Self {
            loading_label: cfg.loading_label.clone(),
            reveal_delay: Duration::from_millis(cfg.reveal_delay_ms),
            stagger: Duration::from_millis(cfg.stagger_ms),
        }
    }
}

/// "Load more" driver: fetches the next page from a [`DataSource`], appends
/// rendered tiles to a [`Container`] and hides its [`Control`] once `max_page`
/// is reached. At most one fetch cycle runs at a time.
pub struct ProgressiveLoader {
    state: Mutex<LoaderState>,
    source: Arc<dyn DataSource>,
    container: Arc<dyn Container>,
    control: Arc<dyn Control>,
    sink: Arc<dyn DiagnosticSink>,
    options: LoaderOptions,
}

impl ProgressiveLoader {
    pub fn new(
        max_page: u32,
        source: Arc<dyn DataSource>,
        container: Arc<dyn Container>,
        control: Arc<dyn Control>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        Self::with_options(max_page, source, container, control, sink, LoaderOptions::default())
    }

    pub fn with_options(
        max_page: u32,
        source: Arc<dyn DataSource>,
        container: Arc<dyn Container>,
        control: Arc<dyn Control>,
        sink: Arc<dyn DiagnosticSink>,
        options: LoaderOptions,
    ) -> Result<Self> {
        ensure!(max_page >= 1, "max_page must be at least 1, got {max_page}");
        let state = LoaderState::new(max_page);
        // A single-page gallery has nothing more to load.
        if state.is_exhausted() {
            control.set_hidden(true);
        }
        Ok(Self { state: Mutex::new(state), source, container, control, sink, options })
    }

    pub fn state(&self) -> LoaderState { *self.lock() }
    pub fn phase(&self) -> Phase { self.lock().phase() }

    pub fn options(&self) -> &LoaderOptions { &self.options }

    /// Register `activate` as the control's handler. The returned future must
    /// be driven by the caller; reveal timers use the ambient tokio runtime
    /// when there is one.
    pub fn attach(self: &Arc<Self>) {
        let loader = Arc::clone(self);
        self.control.on_activate(Arc::new(move || {
            let loader = Arc::clone(&loader);
            async move {
                loader.activate().await;
            }
            .boxed()
        }));
    }

    /// Run one fetch, render and advance cycle. Never fails: fetch and render
    /// faults go to the diagnostic sink and the control is always restored,
    /// also when the future is dropped mid-fetch or the cycle panics.
    pub async fn activate(&self) -> Activation {
        let cycle = {
            let mut st = self.lock();
            if st.busy || st.is_exhausted() {
                debug!(phase = ?st.phase(), "activation ignored");
                return Activation::Ignored(st.phase());
            }
            st.busy = true;
            Cycle { loader: self, page: st.current_page, original_label: self.control.label() }
        };
        let page = cycle.page;

        self.control.set_label(&self.options.loading_label);
        self.control.set_disabled(true);

        let outcome = match self.source.fetch_batch(page).await {
            Ok(items) => {
                let total = items.len();
                let inserted = self.insert_batch(items);
                info!(page, inserted, skipped = total - inserted, "batch loaded");
                Activation::Loaded { page, inserted, skipped: total - inserted }
            }
            Err(e) => {
                self.sink.log_error("fetch", &e);
                Activation::Failed { page }
            }
        };

        drop(cycle);
        outcome
    }

    /// Advance-or-stop and restore the control. Runs exactly once per cycle.
    fn finish(&self, page: u32, original_label: &str) {
        let exhausted = {
            let mut st = self.lock();
            st.current_page += 1;
            st.busy = false;
            st.is_exhausted()
        };

        self.control.set_label(original_label);
        if exhausted {
            info!(page, "gallery exhausted");
            self.control.set_hidden(true);
        } else {
            self.control.set_disabled(false);
        }
    }

    /// Insert tiles in source order and schedule their staggered reveal.
    /// Without a tokio runtime there is nothing to run timers on, so tiles
    /// show up at once. Returns how many were inserted.
    fn insert_batch(&self, items: Vec<GalleryItem>) -> usize {
        let runtime = tokio::runtime::Handle::try_current();
        if let Err(e) = &runtime {
            self.sink.log_error("reveal", &anyhow!("no tokio runtime for reveal timers, showing tiles at once: {e}"));
        }
        let mut inserted = 0usize;
        for item in &items {
            let element = match render(item) {
                Ok(el) => el,
                Err(e) => {
                    self.sink.log_error("render", &e);
                    continue;
                }
            };
            let visibility = element.visibility();
            self.container.insert(element);
            match &runtime {
                Ok(handle) => {
                    let delay = self.options.reveal_delay_for(inserted);
                    handle.spawn(async move {
                        tokio::time::sleep(delay).await;
                        visibility.reveal();
                    });
                }
                Err(_) => visibility.reveal(),
            }
            inserted += 1;
        }
        inserted
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// In-flight marker of one cycle; finalizes the loader when dropped, however
/// the cycle ended.
struct Cycle<'a> {
    loader: &'a ProgressiveLoader,
    page: u32,
    original_label: String,
}

impl Drop for Cycle<'_> {
    fn drop(&mut self) {
        self.loader.finish(self.page, &self.original_label);
    }
}
