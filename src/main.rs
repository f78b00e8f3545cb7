mod config;
mod dedup;
mod diagnostics;
mod driver;
mod engine;
mod extract;
mod paginate;
mod record;
mod store;
#[cfg(test)]
mod testpages;

use anyhow::Result;
use dotenv::dotenv;
use tracing::{error, info};

use crate::config::ScrapeConfig;
use crate::driver::ChromeDriver;
use crate::engine::ScrapeEngine;
use crate::store::BidStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        error!("run terminated with failure: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = ScrapeConfig::from_env();
    let store = BidStore::new(&cfg.csv_path);
    let seen = store.load_seen_ids()?;
    info!(existing = seen.len(), store = %store.path().display(), "loaded existing bids from store");

    let driver = ChromeDriver::launch(&cfg)?;
    let mut engine = ScrapeEngine::new(&driver, &store, &cfg, seen);
    let summary = engine.run().await?;

    info!(
        pages = summary.pages,
        appended = summary.appended,
        outcome = ?summary.outcome,
        output = %cfg.csv_path,
        "finished"
    );
    Ok(())
}
