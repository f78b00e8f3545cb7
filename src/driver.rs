//! Render Driver: the capability surface the engine needs from the browser.
//!
//! The engine and pagination controller only ever talk to [`RenderDriver`];
//! the Headless Chrome binding lives behind it so the whole loop can run
//! against a scripted driver in tests.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use tracing::info;

use crate::config::ScrapeConfig;

static USER_AGENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/123.0.0.0 Safari/537.36",
    ]
});

pub trait RenderDriver {
    fn goto(&self, url: &str) -> Result<()>;
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;
    /// Serialized DOM of the currently rendered page.
    fn content(&self) -> Result<String>;
    fn click(&self, selector: &str) -> Result<()>;
    fn type_text(&self, text: &str) -> Result<()>;
    fn press_enter(&self) -> Result<()>;
    fn evaluate(&self, js: &str) -> Result<()>;
    /// Full-page PNG screenshot written to `path`.
    fn screenshot(&self, path: &Path) -> Result<()>;
}

pub struct ChromeDriver {
    // The browser must outlive the tab handle.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(cfg: &ScrapeConfig) -> Result<Self> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .unwrap_or(&USER_AGENTS[0]);
        let ua_arg = format!("--user-agent={}", user_agent);

        let args = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-infobars"),
            OsStr::new("--ignore-certificate-errors"),
            OsStr::new(&ua_arg),
        ];

        let browser = Browser::new(LaunchOptions {
            headless: cfg.headless,
            window_size: Some((1400, 900)),
            args,
            ..Default::default()
        })
        .context("failed to launch Chrome")?;

        let tab = browser.new_tab()?;
        tab.set_default_timeout(cfg.nav_timeout);
        info!(headless = cfg.headless, "browser launched");

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl RenderDriver for ChromeDriver {
    fn goto(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .with_context(|| format!("navigation to {url} failed"))?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .with_context(|| format!("selector {selector} did not render in time"))?;
        Ok(())
    }

    fn content(&self) -> Result<String> {
        self.tab.get_content().context("failed to read page content")
    }

    fn click(&self, selector: &str) -> Result<()> {
        self.tab
            .wait_for_element(selector)
            .with_context(|| format!("click target {selector} not found"))?
            .click()?;
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        self.tab.type_str(text)?;
        Ok(())
    }

    fn press_enter(&self) -> Result<()> {
        self.tab.press_key("Enter")?;
        Ok(())
    }

    fn evaluate(&self, js: &str) -> Result<()> {
        self.tab.evaluate(js, false)?;
        Ok(())
    }

    fn screenshot(&self, path: &Path) -> Result<()> {
        let png = self.tab.capture_screenshot(
            CaptureScreenshotFormatOption::Png,
            None,
            None,
            true,
        )?;
        std::fs::write(path, png)
            .with_context(|| format!("failed to write screenshot {}", path.display()))?;
        Ok(())
    }
}
