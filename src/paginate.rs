//! Pagination controller.
//!
//! The "next" control on the listing is a stateful UI action, not an
//! addressable resource, and its effect is untrusted: a click may not fire,
//! may land on stale content, or may silently re-render the same page. A
//! page change therefore only counts once the first visible bid number
//! actually differs from the fingerprint taken before the click.

use std::time::Instant;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::diagnostics;
use crate::driver::RenderDriver;
use crate::extract;

/// Click target for the live next control (the `current`-classed copy is the
/// spent one).
pub const NEXT_CONTROL: &str = "#light-pagination .next:not(.current)";

/// Outcome of one pagination cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Content changed; `page_index` advanced.
    Advanced,
    /// Transient condition (tentative next-miss or a stall that survived one
    /// retry). The engine re-runs the cycle on the same page.
    RetrySamePage,
    /// The next control stayed absent across the miss threshold. Terminal.
    Exhausted,
}

pub struct Paginator {
    /// 1-based, incremented only on a confirmed page change.
    pub page_index: u32,
    next_misses: u32,
}

impl Paginator {
    pub fn new() -> Self {
        Self {
            page_index: 1,
            next_misses: 0,
        }
    }

    /// Runs one pagination cycle against the currently rendered page.
    pub async fn advance(
        &mut self,
        driver: &dyn RenderDriver,
        cfg: &ScrapeConfig,
    ) -> Result<CycleOutcome> {
        let html = driver.content()?;

        if !extract::has_next_control(&html) {
            self.next_misses += 1;
            warn!(
                misses = self.next_misses,
                max = cfg.max_next_misses,
                "next control missing"
            );
            if self.next_misses >= cfg.max_next_misses {
                info!("next control gone consistently; listing exhausted");
                return Ok(CycleOutcome::Exhausted);
            }
            // Content may still be settling; re-check the same page shortly.
            sleep(cfg.next_miss_backoff).await;
            return Ok(CycleOutcome::RetrySamePage);
        }
        self.next_misses = 0;

        let prev_first_id = extract::first_bid_id(&html);
        debug!(page = self.page_index, prev = ?prev_first_id, "triggering next page");

        driver.click(NEXT_CONTROL)?;
        sleep(cfg.page_delay).await;
        if self.verify_changed(driver, cfg, prev_first_id.as_deref()).await? {
            self.page_index += 1;
            return Ok(CycleOutcome::Advanced);
        }

        warn!(page = self.page_index, "pagination stalled; retrying click");
        diagnostics::capture(driver, &cfg.debug_dir, self.page_index, "stall");

        driver.click(NEXT_CONTROL)?;
        sleep(cfg.page_delay).await;
        if self.verify_changed(driver, cfg, prev_first_id.as_deref()).await? {
            self.page_index += 1;
            return Ok(CycleOutcome::Advanced);
        }

        // Transient for this cycle; the engine revisits pagination state from
        // scratch without advancing the page index.
        warn!(page = self.page_index, "pagination still stalled after retry");
        Ok(CycleOutcome::RetrySamePage)
    }

    /// Bounded poll until the first visible bid number differs from the
    /// pre-click fingerprint. Returns false on timeout.
    async fn verify_changed(
        &self,
        driver: &dyn RenderDriver,
        cfg: &ScrapeConfig,
        prev_first_id: Option<&str>,
    ) -> Result<bool> {
        let deadline = Instant::now() + cfg.verify_timeout;
        loop {
            let html = driver.content()?;
            if let Some(current) = extract::first_bid_id(&html) {
                if prev_first_id != Some(current.as_str()) {
                    return Ok(true);
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(cfg.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrapeConfig;
    use crate::driver::mock::MockDriver;
    use crate::testpages::{listing_page, test_config};

    #[tokio::test]
    async fn advances_when_first_id_changes() {
        let driver = MockDriver::new(vec![
            listing_page(&["GEM/2026/B/1"], true),
            listing_page(&["GEM/2026/B/2"], true),
        ]);
        let cfg: ScrapeConfig = test_config("paginate_advance");
        let mut pager = Paginator::new();

        let outcome = pager.advance(&driver, &cfg).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Advanced);
        assert_eq!(pager.page_index, 2);
        assert_eq!(driver.clicks(), 1);
    }

    #[tokio::test]
    async fn stall_retries_click_without_advancing() {
        // Clicks never change content: both the initial click and the
        // in-cycle retry time out, but the cycle stays non-terminal.
        let driver = MockDriver::new(vec![listing_page(&["GEM/2026/B/1"], true)])
            .stall_clicks(u32::MAX);
        let cfg = test_config("paginate_stall");
        let mut pager = Paginator::new();

        let outcome = pager.advance(&driver, &cfg).await.unwrap();
        assert_eq!(outcome, CycleOutcome::RetrySamePage);
        assert_eq!(pager.page_index, 1);
        assert!(driver.clicks() >= 2);
        assert_eq!(driver.screenshots(), 1);
    }

    #[tokio::test]
    async fn stall_then_recovery_advances_on_retry() {
        let driver = MockDriver::new(vec![
            listing_page(&["GEM/2026/B/1"], true),
            listing_page(&["GEM/2026/B/2"], true),
        ])
        .stall_clicks(1);
        let cfg = test_config("paginate_recover");
        let mut pager = Paginator::new();

        let outcome = pager.advance(&driver, &cfg).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Advanced);
        assert_eq!(pager.page_index, 2);
        assert_eq!(driver.clicks(), 2);
    }

    #[tokio::test]
    async fn exhaustion_after_consecutive_misses() {
        let driver = MockDriver::new(vec![listing_page(&["GEM/2026/B/1"], false)]);
        let cfg = test_config("paginate_exhaust");
        let mut pager = Paginator::new();

        assert_eq!(
            pager.advance(&driver, &cfg).await.unwrap(),
            CycleOutcome::RetrySamePage
        );
        assert_eq!(
            pager.advance(&driver, &cfg).await.unwrap(),
            CycleOutcome::Exhausted
        );
        assert_eq!(pager.page_index, 1);
        assert_eq!(driver.clicks(), 0);
    }

    #[tokio::test]
    async fn next_sighting_resets_miss_counter() {
        // Miss once, then the control reappears; a later single miss must not
        // terminate the run.
        let driver = MockDriver::new(vec![listing_page(&["GEM/2026/B/1"], false)]);
        let cfg = test_config("paginate_reset");
        let mut pager = Paginator::new();
        assert_eq!(
            pager.advance(&driver, &cfg).await.unwrap(),
            CycleOutcome::RetrySamePage
        );

        let driver = MockDriver::new(vec![
            listing_page(&["GEM/2026/B/1"], true),
            listing_page(&["GEM/2026/B/2"], false),
        ]);
        assert_eq!(
            pager.advance(&driver, &cfg).await.unwrap(),
            CycleOutcome::Advanced
        );
        // Counter was reset by the sighting: one fresh miss is tentative.
        assert_eq!(
            pager.advance(&driver, &cfg).await.unwrap(),
            CycleOutcome::RetrySamePage
        );
    }
}
