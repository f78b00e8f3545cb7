//! Scrape engine: drives the per-page cycle and owns the dedup buffer.
//!
//! Cycle: snapshot rendered DOM -> page extraction -> dedup/accept ->
//! cadence commit -> pagination cycle -> repeat until confirmed exhaustion
//! or a zero-card page. Any fatal error inside the loop still flushes the
//! pending buffer before surfacing.

use std::collections::HashSet;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::ScrapeConfig;
use crate::dedup::DedupBuffer;
use crate::diagnostics;
use crate::driver::RenderDriver;
use crate::extract;
use crate::paginate::{CycleOutcome, Paginator};
use crate::store::BidStore;

/// Listing-entry container; also the render-readiness probe.
pub const CARD_SELECTOR: &str = "div.card";
/// Search box of the all-bids listing, used for the optional keyword filter.
const SEARCH_BOX_SELECTOR: &str = "#searchBid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Next control stayed absent across the miss threshold.
    Exhausted,
    /// A freshly rendered page held zero cards.
    EmptyPage,
}

#[derive(Debug)]
pub struct RunSummary {
    pub pages: u32,
    pub appended: usize,
    pub outcome: RunOutcome,
}

pub struct ScrapeEngine<'a> {
    driver: &'a dyn RenderDriver,
    store: &'a BidStore,
    cfg: &'a ScrapeConfig,
    dedup: DedupBuffer,
    paginator: Paginator,
    appended: usize,
}

impl<'a> ScrapeEngine<'a> {
    pub fn new(
        driver: &'a dyn RenderDriver,
        store: &'a BidStore,
        cfg: &'a ScrapeConfig,
        seen: HashSet<String>,
    ) -> Self {
        Self {
            driver,
            store,
            cfg,
            dedup: DedupBuffer::new(seen),
            paginator: Paginator::new(),
            appended: 0,
        }
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        if let Err(e) = self.open_listing().await {
            // Nothing buffered yet; snapshot and surface as fatal.
            diagnostics::capture(self.driver, &self.cfg.debug_dir, 0, "init_failure");
            return Err(e);
        }

        let result = self.run_loop().await;

        // Every exit path lands here; losing buffered records is never an
        // acceptable trade for a cleaner error.
        let flush_result = self.commit();

        match result {
            Ok(outcome) => {
                flush_result?;
                Ok(RunSummary {
                    pages: self.paginator.page_index,
                    appended: self.appended,
                    outcome,
                })
            }
            Err(e) => {
                error!(error = %e, "scrape loop failed");
                diagnostics::capture(
                    self.driver,
                    &self.cfg.debug_dir,
                    self.paginator.page_index,
                    "fatal",
                );
                if let Err(flush_err) = flush_result {
                    warn!(error = %flush_err, "final flush failed after loop error");
                }
                Err(e)
            }
        }
    }

    /// Initial render, plus the one-shot keyword filter. Failures here are
    /// fatal: the listing never became scrapeable.
    async fn open_listing(&self) -> Result<()> {
        info!(url = %self.cfg.start_url, "opening all-bids listing");
        self.driver.goto(&self.cfg.start_url)?;
        self.driver
            .wait_for(CARD_SELECTOR, self.cfg.selector_timeout)
            .context("listing never rendered any cards")?;

        if let Some(keyword) = &self.cfg.keyword {
            info!(keyword = %keyword, "applying keyword filter");
            self.driver
                .wait_for(SEARCH_BOX_SELECTOR, self.cfg.selector_timeout)?;
            self.driver.evaluate(&format!(
                r#"(() => {{
                    const box = document.querySelector('{SEARCH_BOX_SELECTOR}');
                    if (box) {{ box.click(); box.focus(); box.value = ''; }}
                }})();"#
            ))?;
            self.driver.type_text(keyword)?;
            self.driver.press_enter()?;
            sleep(self.cfg.page_delay).await;
            self.driver
                .wait_for(CARD_SELECTOR, self.cfg.selector_timeout)
                .context("filtered listing never rendered any cards")?;
        }
        Ok(())
    }

    async fn run_loop(&mut self) -> Result<RunOutcome> {
        loop {
            let page = self.paginator.page_index;
            info!(page, "parsing page");

            let html = self.driver.content()?;
            if extract::card_count(&html) == 0 {
                warn!(page, "zero cards rendered; treating as exhaustion");
                diagnostics::capture(self.driver, &self.cfg.debug_dir, page, "empty_page");
                return Ok(RunOutcome::EmptyPage);
            }

            let mut added = 0;
            for record in extract::extract_page(&html) {
                if self.dedup.accept(record) {
                    added += 1;
                }
            }
            info!(
                page,
                added,
                buffered = self.dedup.pending_len(),
                seen = self.dedup.seen_len(),
                "page processed"
            );

            if page % self.cfg.save_every_pages == 0 {
                self.commit()?;
            }

            match self.paginator.advance(self.driver, self.cfg).await? {
                CycleOutcome::Advanced | CycleOutcome::RetrySamePage => {}
                CycleOutcome::Exhausted => return Ok(RunOutcome::Exhausted),
            }
        }
    }

    /// Flushes the pending buffer into the store. No-op when empty.
    fn commit(&mut self) -> Result<()> {
        let pending = self.dedup.flush();
        if pending.is_empty() {
            return Ok(());
        }
        let written = self.store.append(&pending)?;
        self.appended += written;
        info!(rows = written, total = self.appended, "saved rows to store");
        Ok(())
    }
}
