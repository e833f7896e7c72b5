//! One crawl session end to end: product pass, review pass, intermediate
//! files, database load.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Instrument};

use crate::browser::{ChromeSession, PageDriver};
use crate::cleaning::{clean_product, clean_review, has_promo_mismatch};
use crate::config::Config;
use crate::context::CrawlContext;
use crate::models::{ProductRecord, ReviewRecord, SessionStamp};
use crate::scrapers::{LinkCollector, ProductExtractor, ReviewPaginator};
use crate::storage::{ingest_output_dir, IngestReport, SqliteStorage};
use crate::utils::http::{check_url_connection, create_client};
use crate::utils::output::{save_clean_json, SessionPaths};

const CONSENT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlOptions {
    /// Visit only the first `limit` product links.
    pub limit: Option<usize>,
    pub skip_ingest: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub products: usize,
    pub reviews: usize,
    pub ingest: Option<IngestReport>,
}

/// Visits product links in listing order. Failed or uncleanable products are
/// logged and skipped; `Produkt_ID`s are handed out consecutively from 1 to
/// the products that made it.
pub async fn collect_products<D>(
    ctx: &CrawlContext,
    driver: &mut D,
    limit: Option<usize>,
) -> Result<Vec<ProductRecord>>
where
    D: PageDriver + ?Sized,
{
    let links = LinkCollector::new(ctx)
        .collect(driver)
        .await
        .context("Collecting product links failed")?;

    let to_visit = limit.unwrap_or(links.len()).min(links.len());
    if to_visit < links.len() {
        info!("Test mode: visiting {} of {} products", to_visit, links.len());
    }

    let extractor = ProductExtractor::new(ctx);
    let mut products = Vec::new();
    let mut product_id = 1;

    for link in &links[..to_visit] {
        info!("Processing product id {}", product_id);
        let mut raw = match extractor.extract(driver, link).instrument(ctx.span.clone()).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to process link {}: {}", link, e);
                continue;
            }
        };
        raw.product_id = Some(product_id);

        match clean_product(&raw) {
            Ok(record) => {
                if has_promo_mismatch(&record) {
                    warn!(
                        "Product {} has a promo price but is not flagged as on promo",
                        link
                    );
                }
                products.push(record);
                product_id += 1;
            }
            Err(e) => error!("Failed to clean product {}: {}", link, e),
        }
    }

    info!("{} products extracted", products.len());
    Ok(products)
}

/// Collects reviews for every product with a positive aggregate rating.
/// `Review_ID`s run from 1 across the whole session.
pub async fn collect_reviews<D>(
    ctx: &CrawlContext,
    driver: &mut D,
    products: &[ProductRecord],
) -> Vec<ReviewRecord>
where
    D: PageDriver + ?Sized,
{
    let paginator = ReviewPaginator::new(ctx);
    let mut reviews = Vec::new();
    let mut review_id = 1;

    for product in products.iter().filter(|p| p.has_reviews()) {
        let Some(url) = product.product_url.as_deref() else {
            warn!("Product id {} has no URL, skipping its reviews", product.product_id);
            continue;
        };
        info!("Extracting reviews for product id {}", product.product_id);

        let raw_reviews = match paginator.collect(driver, url).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to extract reviews for product {}: {}", url, e);
                continue;
            }
        };

        for mut raw in raw_reviews {
            raw.review_id = Some(review_id);
            raw.product_id = Some(product.product_id);
            match clean_review(&raw) {
                Ok(record) => {
                    reviews.push(record);
                    review_id += 1;
                }
                Err(e) => error!("Dropping review of product {}: {}", url, e),
            }
        }
    }

    reviews
}

async fn open_browser(ctx: &CrawlContext) -> Result<ChromeSession> {
    let mut session = ChromeSession::launch(&ctx.config, ctx.listing_url.as_str())
        .await
        .context("Failed to launch browser")?;

    match session.accept_cookies(CONSENT_TIMEOUT).await {
        Ok(true) => info!("Cookie banner accepted"),
        Ok(false) => info!("No cookie banner shown"),
        Err(e) => warn!("Cookie banner could not be handled: {}", e),
    }
    ctx.config.pacing.initial_load.pause().await;
    Ok(session)
}

/// Runs a full crawl session. The session directory (and with it the log
/// file) is expected to exist already; see [`SessionPaths::create`].
pub async fn run_crawl(
    config: Arc<Config>,
    session: SessionStamp,
    paths: &SessionPaths,
    options: CrawlOptions,
) -> Result<CrawlSummary> {
    let ctx = CrawlContext::new(config.clone(), session)?;
    info!("Crawl session {} started for {}", session, ctx.listing_url);

    let client = create_client(&config).context("Failed to build HTTP client")?;
    check_url_connection(&client, ctx.listing_url.as_str())
        .await
        .context("Listing page is not reachable")?;

    let mut browser = open_browser(&ctx).await?;
    let products = collect_products(&ctx, &mut browser, options.limit).await;
    browser.close().await;
    let products = products?;

    save_clean_json(&paths.products_json, &products)?;
    info!("Product data saved to {}", paths.products_json.display());

    let mut browser = open_browser(&ctx).await?;
    let reviews = collect_reviews(&ctx, &mut browser, &products).await;
    browser.close().await;

    save_clean_json(&paths.reviews_json, &reviews)?;
    info!("Review data saved to {}", paths.reviews_json.display());

    let ingest = if options.skip_ingest {
        None
    } else {
        Some(ingest(&config, &session).await?)
    };

    Ok(CrawlSummary {
        products: products.len(),
        reviews: reviews.len(),
        ingest,
    })
}

/// Loads every session below the output root into the configured database.
pub async fn ingest(config: &Config, session: &SessionStamp) -> Result<IngestReport> {
    info!("Opening database {}", config.database_path.display());
    let storage = SqliteStorage::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    let report = ingest_output_dir(&storage, &config.output_dir, session).await;
    drop(storage);
    info!("Database session closed");

    Ok(report?)
}
