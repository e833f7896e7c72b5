use chromiumoxide::browser::BrowserConfig;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::BrowserError;
use crate::config::Config;

const LAUNCH_ARGS: &[&str] = &[
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-blink-features=AutomationControlled",
    "--lang=de-DE",
];

/// Removes the browser profile left behind by a previous session so every
/// crawl starts without cookies or cached consent state.
pub fn clear_cache(cache_dir: &Path) {
    if !cache_dir.exists() {
        info!(
            "Cache directory {} does not exist, nothing to clear",
            cache_dir.display()
        );
        return;
    }

    match std::fs::remove_dir_all(cache_dir) {
        Ok(()) => info!("Cleared cache directory {}", cache_dir.display()),
        Err(e) => warn!("Could not clear cache directory {}: {}", cache_dir.display(), e),
    }
}

pub fn browser_config(config: &Config) -> Result<BrowserConfig, BrowserError> {
    let mut builder = BrowserConfig::builder()
        .user_data_dir(&config.browser.user_data_dir)
        .request_timeout(Duration::from_secs(config.browser.request_timeout_secs))
        .arg(format!("--user-agent={}", config.user_agent));

    for arg in LAUNCH_ARGS {
        builder = builder.arg(*arg);
    }

    if !config.browser.headless {
        builder = builder.with_head();
    }

    builder.build().map_err(BrowserError::Launch)
}
