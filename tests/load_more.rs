use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use progressive_gallery::prelude::*;
use progressive_gallery::{ClickReport, Gallery};

/// Mock-backed source that counts fetches and remembers the pages asked for.
struct Counting {
    inner: MockSource,
    pages: Mutex<Vec<u32>>,
    calls: AtomicU32,
}

impl Counting {
    fn new(inner: MockSource) -> Arc<Self> {
        Arc::new(Self { inner, pages: Mutex::new(Vec::new()), calls: AtomicU32::new(0) })
    }
}

#[async_trait]
impl DataSource for Counting {
    async fn fetch_batch(&self, page: u32) -> Result<Vec<GalleryItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.lock().unwrap().push(page);
        self.inner.fetch_batch(page).await
    }
}

struct Broken;

#[async_trait]
impl DataSource for Broken {
    async fn fetch_batch(&self, page: u32) -> Result<Vec<GalleryItem>> {
        bail!("backend down for page {page}")
    }
}

#[derive(Default)]
struct Collected(Mutex<Vec<(String, String)>>);

impl DiagnosticSink for Collected {
    fn log_error(&self, context: &str, error: &anyhow::Error) {
        self.0.lock().unwrap().push((context.to_string(), error.to_string()));
    }
}

fn wire(max_page: u32, source: Arc<dyn DataSource>) -> (Arc<ProgressiveLoader>, Arc<Grid>, Arc<Button>, Arc<Collected>) {
    let grid = Arc::new(Grid::new());
    let button = Arc::new(Button::new("See More"));
    let sink = Arc::new(Collected::default());
    let loader = Arc::new(ProgressiveLoader::new(max_page, source, grid.clone(), button.clone(), sink.clone()).unwrap());
    loader.attach();
    (loader, grid, button, sink)
}

#[tokio::test(start_paused = true)]
async fn three_page_gallery_exhausts_after_two_presses() {
    let source = Counting::new(MockSource::default());
    let (loader, grid, button, sink) = wire(3, source.clone());

    button.press().expect("first press accepted").await;
    assert_eq!(grid.item_ids(), vec![5, 6, 7, 8]);
    assert_eq!(loader.state().current_page, 2);
    assert_eq!(loader.phase(), Phase::Idle);
    assert_eq!(button.state(), ButtonState { label: "See More".into(), disabled: false, hidden: false });

    button.press().expect("second press accepted").await;
    assert_eq!(grid.item_ids(), vec![5, 6, 7, 8, 9, 10, 11, 12]);
    assert_eq!(loader.state().current_page, 3);
    assert_eq!(loader.phase(), Phase::Exhausted);
    assert!(button.state().hidden);

    assert!(button.press().is_none());
    assert_eq!(loader.activate().await, Activation::Ignored(Phase::Exhausted));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(*source.pages.lock().unwrap(), vec![1, 2]);
    assert_eq!(grid.len(), 8);
    assert!(sink.0.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_fetch_advances_and_reenables() {
    let (loader, grid, button, sink) = wire(3, Arc::new(Broken));

    button.press().unwrap().await;
    assert!(grid.is_empty());
    assert_eq!(loader.state(), LoaderState { current_page: 2, max_page: 3, busy: false });
    assert_eq!(loader.phase(), Phase::Idle);
    assert_eq!(button.state(), ButtonState { label: "See More".into(), disabled: false, hidden: false });

    let logged = sink.0.lock().unwrap().clone();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].0, "fetch");
    assert!(logged[0].1.contains("backend down for page 1"));
}

#[tokio::test(start_paused = true)]
async fn failure_and_success_finalize_the_same_way() {
    let ok = Counting::new(MockSource::default());
    let (ok_loader, _, ok_button, _) = wire(2, ok);
    let (bad_loader, _, bad_button, _) = wire(2, Arc::new(Broken));

    ok_button.press().unwrap().await;
    bad_button.press().unwrap().await;

    assert_eq!(ok_loader.state(), bad_loader.state());
    assert_eq!(ok_loader.phase(), Phase::Exhausted);
    assert_eq!(ok_button.state(), bad_button.state());
}

#[tokio::test(start_paused = true)]
async fn button_mashing_during_a_fetch_runs_one_cycle() {
    let source = Counting::new(MockSource::default());
    let (loader, grid, button, _) = wire(4, source.clone());

    let first = button.press().unwrap();
    let in_flight = tokio::spawn(first);
    // Let the spawned cycle reach its fetch.
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(loader.phase(), Phase::Loading);
    assert!(button.state().disabled);
    assert_eq!(button.state().label, "Loading...");

    // The disabled button swallows presses; direct activations bounce off the guard.
    for _ in 0..5 {
        assert!(button.press().is_none());
        assert_eq!(loader.activate().await, Activation::Ignored(Phase::Loading));
    }
    in_flight.await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(grid.len(), 4);
    assert_eq!(loader.state().current_page, 2);
}

#[tokio::test(start_paused = true)]
async fn later_failure_does_not_disturb_earlier_tiles() {
    let source = Counting::new(MockSource::default().failing_on(2));
    let (loader, grid, button, sink) = wire(4, source);

    button.press().unwrap().await;
    button.press().unwrap().await;
    button.press().unwrap().await;

    assert_eq!(grid.item_ids(), vec![5, 6, 7, 8, 13, 14, 15, 16]);
    assert_eq!(loader.phase(), Phase::Exhausted);
    assert_eq!(sink.0.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn gallery_helper_reveals_every_tile() {
    let cfg = LoaderConfig { max_pages: 3, ..LoaderConfig::default() };
    let gallery = Gallery::new(&cfg, Arc::new(cfg.source.mock_source()), "See More").unwrap();

    let report = gallery.click_through(3).await;
    assert_eq!(report, ClickReport { accepted: 2, last_batch: 4 });
    tokio::time::sleep(gallery.settle_time(&report)).await;

    assert_eq!(gallery.grid.visible_count(), 8);
    assert!(!gallery.grid.to_html().contains("opacity-0"));
    assert!(gallery.button.to_html().contains("display: none"));
}

#[tokio::test(start_paused = true)]
async fn replayed_oversized_batch_settles_completely() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("batches.json");
    let page: Vec<GalleryItem> = (1..=10).map(GalleryItem::image).collect();
    std::fs::write(&path, serde_json::json!({ "1": page }).to_string()).unwrap();

    let cfg = LoaderConfig { max_pages: 2, ..LoaderConfig::default() };
    assert_eq!(cfg.source.batch_size, 4);
    let gallery = Gallery::new(&cfg, Arc::new(JsonFileSource::new(&path)), "See More").unwrap();

    let report = gallery.click_through(1).await;
    assert_eq!(report.last_batch, 10);
    tokio::time::sleep(gallery.settle_time(&report)).await;
    assert_eq!(gallery.grid.visible_count(), 10);
}

#[tokio::test(start_paused = true)]
async fn failed_last_press_keeps_previous_batch_for_settling() {
    let cfg = LoaderConfig { max_pages: 3, ..LoaderConfig::default() };
    let source = MockSource::default().failing_on(2);
    let gallery = Gallery::new(&cfg, Arc::new(source), "See More").unwrap();

    let report = gallery.click_through(2).await;
    assert_eq!(report, ClickReport { accepted: 2, last_batch: 4 });
}
