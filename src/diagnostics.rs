//! Stall/failure snapshot sink: a full-page screenshot plus the serialized
//! DOM, tagged with the page index and reason. Side-effect only; the engine
//! never reads these back, and a failing snapshot must never fail the run.

use std::path::Path;

use tracing::{info, warn};

use crate::driver::RenderDriver;

pub fn capture(driver: &dyn RenderDriver, debug_dir: &str, page_index: u32, reason: &str) {
    if let Err(e) = std::fs::create_dir_all(debug_dir) {
        warn!(debug_dir, error = %e, "could not create debug directory");
        return;
    }

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let base = format!("{debug_dir}/{reason}_page_{page_index}_{stamp}");

    if let Err(e) = driver.screenshot(Path::new(&format!("{base}.png"))) {
        warn!(error = %e, "screenshot capture failed");
    }
    match driver.content() {
        Ok(html) => {
            if let Err(e) = std::fs::write(format!("{base}.html"), html) {
                warn!(error = %e, "dom snapshot write failed");
            }
        }
        Err(e) => warn!(error = %e, "dom snapshot capture failed"),
    }

    info!(page = page_index, reason, "diagnostic snapshot written");
}
