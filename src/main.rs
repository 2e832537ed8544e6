mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use progressive_gallery::prelude::*;
use progressive_gallery::Gallery;

const BUTTON_LABEL: &str = "See More";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut cfg = LoaderConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo { max_pages, latency_ms, clicks, fail_page } => {
            if let Some(n) = max_pages { cfg.max_pages = n; }
            if let Some(ms) = latency_ms { cfg.source.latency_ms = ms; }
            cfg.validate()?;
            let mut source = cfg.source.mock_source();
            if let Some(page) = fail_page { source = source.failing_on(page); }
            run(&cfg, Arc::new(source), clicks).await
        }
        Commands::Replay { file, max_pages, clicks } => {
            if let Some(n) = max_pages { cfg.max_pages = n; }
            cfg.validate()?;
            run(&cfg, Arc::new(JsonFileSource::new(file)), clicks).await
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&cfg)?);
            Ok(())
        }
    }
}

async fn run(cfg: &LoaderConfig, source: Arc<dyn DataSource>, clicks: Option<usize>) -> Result<()> {
    let gallery = Gallery::new(cfg, source, BUTTON_LABEL)?;
    // One extra press shows the exhausted button swallowing input.
    let clicks = clicks.unwrap_or(cfg.max_pages as usize);
    let report = gallery.click_through(clicks).await;

    // Let the last batch finish its entrance.
    tokio::time::sleep(gallery.settle_time(&report)).await;

    println!("{}", gallery.grid.to_html());
    println!("{}", gallery.button.to_html());
    let state = gallery.loader.state();
    println!(
        "presses accepted: {}/{clicks}, page {}/{}, phase {:?}",
        report.accepted,
        state.current_page, state.max_page, gallery.loader.phase()
    );
    Ok(())
}
