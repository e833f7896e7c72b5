use tracing::{info, Instrument};

use crate::browser::PageDriver;
use crate::context::CrawlContext;
use crate::error::CrawlError;
use crate::parsers::{listing_page_url, parse_listing_page};

/// Walks the category listing page by page and collects product URLs.
pub struct LinkCollector<'a> {
    ctx: &'a CrawlContext,
}

impl<'a> LinkCollector<'a> {
    pub fn new(ctx: &'a CrawlContext) -> Self {
        Self { ctx }
    }

    /// Starts from the page the driver currently shows (the first listing
    /// page) and follows the pagination until the "next" button is missing
    /// or disabled. Links are returned in page order, duplicates included.
    pub async fn collect<D>(&self, driver: &mut D) -> Result<Vec<String>, CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        self.collect_pages(driver)
            .instrument(self.ctx.span.clone())
            .await
    }

    async fn collect_pages<D>(&self, driver: &mut D) -> Result<Vec<String>, CrawlError>
    where
        D: PageDriver + ?Sized,
    {
        let mut links = Vec::new();
        let mut page = 1u32;

        loop {
            info!("Extracting links from page {}...", page);
            let html = driver.content().await?;
            let listing = parse_listing_page(&html, &self.ctx.listing_url);
            links.extend(listing.product_links);

            if !listing.has_next {
                info!("No further pages");
                break;
            }

            page += 1;
            let next_url = listing_page_url(&self.ctx.listing_url, page);
            info!("Moving on to page {}: {}", page, next_url);
            driver.goto(next_url.as_str()).await?;
            self.ctx.config.pacing.listing_page.pause().await;
        }

        info!("Extracted {} product links", links.len());
        Ok(links)
    }
}
