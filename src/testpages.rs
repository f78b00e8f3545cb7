//! Shared test fixtures: synthetic listing pages in the live site's card
//! structure, plus a config with millisecond timeouts.

use std::time::Duration;

use crate::config::ScrapeConfig;

pub fn card(bid_no: &str) -> String {
    format!(
        r#"<div class="card">
            <a class="bid_no_hover">{bid_no}</a>
            <div><strong>Items:</strong> <a data-content="Test item for {bid_no}">View</a></div>
            <div><strong>Quantity:</strong> 10</div>
            <div class="col-md-5">
                <div class="row">header</div>
                <div class="row">Dept
Pin 1</div>
            </div>
            <span class="start_date">01-09-2026</span>
            <span class="end_date">15-09-2026</span>
        </div>"#
    )
}

pub fn listing_page(bid_nos: &[&str], has_next: bool) -> String {
    let cards: Vec<String> = bid_nos.iter().map(|id| card(id)).collect();
    let pagination = if has_next {
        r#"<div id="light-pagination"><a class="next">»</a></div>"#
    } else {
        r#"<div id="light-pagination"><a class="next current">»</a></div>"#
    };
    format!(
        "<html><body>{}\n{}</body></html>",
        cards.join("\n"),
        pagination
    )
}

pub fn empty_page() -> String {
    "<html><body><div id=\"light-pagination\"></div></body></html>".to_string()
}

pub fn test_config(tag: &str) -> ScrapeConfig {
    let scratch = std::env::temp_dir().join(format!(
        "gem_test_{tag}_{}_{}",
        std::process::id(),
        rand::random::<u64>()
    ));
    std::fs::create_dir_all(&scratch).unwrap();
    ScrapeConfig {
        start_url: "http://listing.test/all-bids".to_string(),
        csv_path: scratch.join("store.csv").to_string_lossy().into_owned(),
        keyword: None,
        page_delay: Duration::from_millis(1),
        save_every_pages: 1,
        max_next_misses: 2,
        next_miss_backoff: Duration::from_millis(1),
        verify_timeout: Duration::from_millis(20),
        poll_interval: Duration::from_millis(2),
        nav_timeout: Duration::from_millis(100),
        selector_timeout: Duration::from_millis(100),
        headless: true,
        debug_dir: scratch.join("debug").to_string_lossy().into_owned(),
    }
}
