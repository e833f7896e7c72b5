//! Review pagination.
//!
//! The review widget is rendered by a third-party script after the product
//! page itself. Its container may be missing on first load, its "next"
//! control is only reachable through script clicks, and the last page is
//! marked by a disabled class rather than by a missing control.
//!
//! ```text
//! AwaitingContainer --found--> ExtractingPage --+--> HasNext --clicked--> ExtractingPage
//!        |                          |           |        |
//!        +--exhausted--> Done <-----+ first     +--------+--disabled/cap/error--> Done
//!                                     page short
//! ```

use std::time::Duration;
use tracing::{info, warn, Instrument};

use crate::browser::{ElementSnapshot, Locator, PageDriver, Scroll};
use crate::context::CrawlContext;
use crate::error::{CrawlError, Outcome};
use crate::models::RawReview;
use crate::parsers::parse_review_page;

pub const REVIEW_CONTAINER: Locator = Locator::Css("#BVRRContainer");
pub const NEXT_BUTTON: Locator =
    Locator::XPath(r#"//*[@id="BVRRContainer"]/div/div/div/div/div[3]/div/ul/li[2]/a"#);
pub const NEXT_DISABLED_CLASS: &str = "bv-content-pagination-buttons-item-disabled";

const CONTAINER_TIMEOUT: Duration = Duration::from_secs(15);
const SCROLL_READY_TIMEOUT: Duration = Duration::from_secs(1);
const PAGE_READY_TIMEOUT: Duration = Duration::from_secs(20);
const NEXT_BUTTON_TIMEOUT: Duration = Duration::from_secs(20);
const AFTER_CLICK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorState {
    AwaitingContainer { attempt: u32 },
    ExtractingPage { page: u32 },
    HasNext { page: u32 },
    Done,
}

pub struct ReviewPaginator<'a> {
    ctx: &'a CrawlContext,
}

impl<'a> ReviewPaginator<'a> {
    pub fn new(ctx: &'a CrawlContext) -> Self {
        Self { ctx }
    }

    /// Opens `product_url` and collects accepted reviews until the widget
    /// reports no further page, the cap is reached, or the first page is
    /// short. A missing review container yields an empty list, not an error.
    pub async fn collect<D>(
        &self,
        driver: &mut D,
        product_url: &str,
    ) -> Result<Vec<RawReview>, CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        self.run(driver, product_url)
            .instrument(self.ctx.span.clone())
            .await
    }

    async fn run<D>(&self, driver: &mut D, product_url: &str) -> Result<Vec<RawReview>, CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        driver.goto(product_url).await?;
        info!("Extracting reviews from {}", product_url);

        let mut reviews = Vec::new();
        let mut state = PaginatorState::AwaitingContainer { attempt: 1 };

        loop {
            state = match state {
                PaginatorState::AwaitingContainer { attempt } => {
                    self.await_container(driver, attempt).await?
                }
                PaginatorState::ExtractingPage { page: 1 } => {
                    self.extract_page(driver, 1, &mut reviews).await?
                }
                PaginatorState::ExtractingPage { page } => {
                    match self.extract_page(driver, page, &mut reviews).await {
                        Ok(next) => next,
                        Err(e) => {
                            warn!("Review page {} could not be read: {}", page, e);
                            PaginatorState::Done
                        }
                    }
                }
                PaginatorState::HasNext { page } => self.advance(driver, page, reviews.len()).await,
                PaginatorState::Done => break,
            };
        }

        info!("Extracted {} reviews in total", reviews.len());
        Ok(reviews)
    }

    async fn await_container<D>(
        &self,
        driver: &mut D,
        attempt: u32,
    ) -> Result<PaginatorState, CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        let max_attempts = self.ctx.config.limits.review_container_attempts;
        let outcome: Outcome<ElementSnapshot> = driver
            .wait_for(REVIEW_CONTAINER, CONTAINER_TIMEOUT)
            .await
            .into();

        match outcome {
            Outcome::Ready(_) => {
                info!("Review container found, extraction can start");
                self.prepare_page(driver).await?;
                Ok(PaginatorState::ExtractingPage { page: 1 })
            }
            Outcome::Retryable(reason) => {
                warn!("Attempt {} - review container missing ({}), reloading page", attempt, reason);
                driver.reload().await?;
                self.ctx.config.pacing.review_reload.pause().await;
                if attempt >= max_attempts {
                    info!("No reviews after {} reloads, giving up", max_attempts);
                    Ok(PaginatorState::Done)
                } else {
                    Ok(PaginatorState::AwaitingContainer {
                        attempt: attempt + 1,
                    })
                }
            }
            Outcome::Fatal(e) => Err(e),
        }
    }

    /// Scrolls through the page so the widget loads its first page.
    async fn prepare_page<D>(&self, driver: &mut D) -> Result<(), CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        for _ in 0..2 {
            driver.scroll(Scroll::Bottom).await?;
            driver.wait_until_ready(SCROLL_READY_TIMEOUT).await?;
            driver.scroll(Scroll::Top).await?;
            driver.wait_until_ready(SCROLL_READY_TIMEOUT).await?;
        }

        if !driver.wait_until_ready(PAGE_READY_TIMEOUT).await? {
            warn!("Page still loading after {:?}, extracting anyway", PAGE_READY_TIMEOUT);
        }
        self.ctx.config.pacing.review_settle.pause().await;
        Ok(())
    }

    async fn extract_page<D>(
        &self,
        driver: &mut D,
        page: u32,
        reviews: &mut Vec<RawReview>,
    ) -> Result<PaginatorState, CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        let html = driver.content().await?;
        let extracted = parse_review_page(&html);
        let count = extracted.len();
        reviews.extend(extracted);
        info!("{} new reviews extracted, {} in total", count, reviews.len());

        let threshold = self.ctx.config.limits.first_page_min_reviews;
        if page == 1 && count < threshold {
            info!("Fewer than {} reviews on the first page, stopping", threshold);
            return Ok(PaginatorState::Done);
        }
        Ok(PaginatorState::HasNext { page })
    }

    /// Never fails: any trouble with the "next" control ends pagination.
    async fn advance<D>(&self, driver: &mut D, page: u32, collected: usize) -> PaginatorState
    where
        D: PageDriver + ?Sized,
    {
        match self.click_next(driver, collected).await {
            Ok(true) => PaginatorState::ExtractingPage { page: page + 1 },
            Ok(false) => PaginatorState::Done,
            Err(e) => {
                info!("No usable 'next' button ({}), stopping", e);
                PaginatorState::Done
            }
        }
    }

    async fn click_next<D>(&self, driver: &mut D, collected: usize) -> Result<bool, CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        let cap = self.ctx.config.limits.max_reviews;
        if collected >= cap {
            info!("Review cap of {} reached, stopping", cap);
            return Ok(false);
        }

        let Some(next) = driver.wait_for(NEXT_BUTTON, NEXT_BUTTON_TIMEOUT).await? else {
            info!("No 'next' button found, stopping");
            return Ok(false);
        };
        if next.has_class_fragment(NEXT_DISABLED_CLASS) {
            info!("'Next' button is disabled, stopping");
            return Ok(false);
        }

        driver.click(NEXT_BUTTON).await?;
        if !driver.wait_until_ready(AFTER_CLICK_TIMEOUT).await? {
            info!("Next review page did not finish loading, stopping");
            return Ok(false);
        }
        self.ctx.config.pacing.review_settle.pause().await;
        Ok(true)
    }
}
