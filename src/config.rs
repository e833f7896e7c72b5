use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default category listing: men's fragrances.
pub const DEFAULT_LISTING_URL: &str = "https://www.mueller.de/parfuemerie/duefte-fuer-ihn/duefte/";

const CONFIG_FILE: &str = "review_crawler";
const ENV_PREFIX: &str = "CRAWLER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listing_url: String,
    pub user_agent: String,
    pub accept_invalid_certs: bool,
    pub output_dir: PathBuf,
    pub database_path: PathBuf,
    pub analysis_dir: PathBuf,
    pub export_dir: PathBuf,
    pub browser: BrowserSettings,
    pub pacing: PacingConfig,
    pub limits: LimitsConfig,
    pub nlp: NlpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    pub headless: bool,
    pub user_data_dir: PathBuf,
    pub request_timeout_secs: u64,
}

/// Inclusive random delay window in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn millis(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn secs(min: u64, max: u64) -> Self {
        Self::millis(min * 1000, max * 1000)
    }

    pub const fn none() -> Self {
        Self::millis(0, 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause after the landing page is opened and cookies are handled.
    pub initial_load: DelayRange,
    /// Pause between listing pages.
    pub listing_page: DelayRange,
    /// Pause around scrolling and reloads on a product page.
    pub product_settle: DelayRange,
    /// Pause after reloading a page whose review container is missing.
    pub review_reload: DelayRange,
    /// Pause after a review page finished loading.
    pub review_settle: DelayRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_reviews: usize,
    pub first_page_min_reviews: usize,
    pub rating_button_attempts: u32,
    pub review_container_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            initial_load: DelayRange::secs(5, 5),
            listing_page: DelayRange::secs(3, 5),
            product_settle: DelayRange::secs(1, 2),
            review_reload: DelayRange::secs(1, 6),
            review_settle: DelayRange::secs(2, 2),
        }
    }
}

impl PacingConfig {
    /// No pauses at all; used by tests and dry runs against local fixtures.
    pub fn instant() -> Self {
        Self {
            initial_load: DelayRange::none(),
            listing_page: DelayRange::none(),
            product_settle: DelayRange::none(),
            review_reload: DelayRange::none(),
            review_settle: DelayRange::none(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_reviews: 300,
            first_page_min_reviews: 8,
            rating_button_attempts: 3,
            review_container_attempts: 5,
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            user_data_dir: std::env::temp_dir().join("chrome-user-data"),
            request_timeout_secs: 30,
        }
    }
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/parse".to_string(),
            model: "de_core_news_sm".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
            accept_invalid_certs: false,
            output_dir: PathBuf::from("Output"),
            database_path: PathBuf::from("DB/review_crawler.db"),
            analysis_dir: PathBuf::from("Analyse/Data"),
            export_dir: PathBuf::from("Analyse/Data"),
            browser: BrowserSettings::default(),
            pacing: PacingConfig::default(),
            limits: LimitsConfig::default(),
            nlp: NlpConfig::default(),
        }
    }
}

impl Config {
    /// Built-in defaults, then `review_crawler.toml` (optional), then
    /// `CRAWLER__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .context("Failed to seed configuration defaults")?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn nlp_timeout(&self) -> Duration {
        Duration::from_secs(self.nlp.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_observed_crawl_limits() {
        let config = Config::default();
        assert_eq!(config.limits.max_reviews, 300);
        assert_eq!(config.limits.first_page_min_reviews, 8);
        assert_eq!(config.limits.rating_button_attempts, 3);
        assert_eq!(config.limits.review_container_attempts, 5);
        assert_eq!(config.pacing.listing_page, DelayRange::secs(3, 5));
    }

    #[test]
    fn load_without_file_yields_defaults() {
        let config = Config::load().unwrap();
        assert_eq!(config.listing_url, DEFAULT_LISTING_URL);
        assert_eq!(config.nlp.model, "de_core_news_sm");
    }
}
