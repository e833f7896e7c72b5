use std::time::Duration;
use tracing::{info, warn};

use crate::browser::{BrowserError, ElementSnapshot, Locator, PageDriver, Scroll};
use crate::context::CrawlContext;
use crate::error::{CrawlError, Outcome};
use crate::models::{RawProduct, RawValue};
use crate::parsers::{clean_text, parse_product_page, review_count_text};

/// The aggregate rating widget has no stable class names, only its position.
pub const RATING_BUTTON: Locator =
    Locator::XPath(r#"//*[@id="page"]/main/div[1]/div/div[1]/div[2]/div[1]/div[3]/div/button"#);
pub const RATING_VALUE: Locator = Locator::XPath(
    r#"//*[@id="page"]/main/div[1]/div/div[1]/div[2]/div[1]/div[3]/div/button/div[2]"#,
);
pub const REVIEW_TOTAL: Locator = Locator::XPath(
    r#"//*[@id="page"]/main/div[1]/div/div[1]/div[2]/div[1]/div[3]/div/button/div[3]/div"#,
);

const READY_TIMEOUT: Duration = Duration::from_secs(10);
const RATING_BUTTON_TIMEOUT: Duration = Duration::from_secs(10);
const RATING_PART_TIMEOUT: Duration = Duration::from_secs(5);

/// Rating and count used when the rating widget never shows up.
const NO_RATING: &str = "0";

pub struct ProductExtractor<'a> {
    ctx: &'a CrawlContext,
}

impl<'a> ProductExtractor<'a> {
    pub fn new(ctx: &'a CrawlContext) -> Self {
        Self { ctx }
    }

    pub async fn extract<D>(&self, driver: &mut D, url: &str) -> Result<RawProduct, CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        let settle = self.ctx.config.pacing.product_settle;

        info!("Opening product page {}", url);
        driver.goto(url).await?;

        // Lazy sections only render once they have been scrolled past.
        driver.scroll(Scroll::Bottom).await?;
        settle.pause().await;
        driver.scroll(Scroll::Top).await?;
        settle.pause().await;

        if !driver.wait_until_ready(READY_TIMEOUT).await? {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "document did not finish loading".to_string(),
            }
            .into());
        }

        let html = driver.content().await?;
        let mut product = parse_product_page(&html);
        product.product_url = Some(url.to_string());

        let (rating, total) = self.aggregate_rating(driver).await?;
        product.rating = Some(RawValue::Text(rating));
        product.review_count = Some(RawValue::Text(total));

        info!(
            article_number = ?product.article_number,
            name = ?product.name,
            price = ?product.price,
            promo_price = ?product.promo_price,
            currency = ?product.currency,
            on_promo = product.on_promo,
            brand = ?product.brand,
            rating = ?product.rating,
            reviews = ?product.review_count,
            "Product details extracted"
        );
        Ok(product)
    }

    async fn find_rating_button<D>(&self, driver: &mut D) -> Outcome<ElementSnapshot>
    where
        D: PageDriver + ?Sized,
    {
        driver.wait_for(RATING_BUTTON, RATING_BUTTON_TIMEOUT).await.into()
    }

    /// The rating widget renders late and sometimes not at all; a reload
    /// usually brings it back. Gives up with zero rating after the
    /// configured number of attempts.
    async fn aggregate_rating<D>(&self, driver: &mut D) -> Result<(String, String), CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        let attempts = self.ctx.config.limits.rating_button_attempts;
        let mut found = false;

        for attempt in 1..=attempts {
            match self.find_rating_button(driver).await {
                Outcome::Ready(_) => {
                    found = true;
                    break;
                }
                Outcome::Retryable(reason) => {
                    warn!(
                        "Rating button not found ({}, attempt {}), reloading page...",
                        reason, attempt
                    );
                    driver.reload().await?;
                    self.ctx.config.pacing.product_settle.pause().await;
                    info!("Page reloaded");
                }
                Outcome::Fatal(e) => return Err(e),
            }
        }

        if !found {
            warn!(
                "Rating button still missing after {} attempts, continuing without rating",
                attempts
            );
            return Ok((NO_RATING.to_string(), NO_RATING.to_string()));
        }

        let rating = driver
            .wait_for(RATING_VALUE, RATING_PART_TIMEOUT)
            .await?
            .map(|el| clean_text(&el.text))
            .unwrap_or_else(|| NO_RATING.to_string());
        let total = driver
            .wait_for(REVIEW_TOTAL, RATING_PART_TIMEOUT)
            .await?
            .map(|el| review_count_text(&el.text))
            .unwrap_or_else(|| NO_RATING.to_string());

        info!("Aggregate rating {}, {} reviews", rating, total);
        Ok((rating, total))
    }
}
