use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use super::Storage;
use crate::cleaning::{clean_product, clean_review};
use crate::error::CrawlError;
use crate::models::{RawProduct, RawReview, SessionStamp};
use crate::utils::output::find_session_files;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub products: usize,
    pub reviews: usize,
    /// Files whose load was aborted partway through.
    pub failed_files: usize,
}

/// Loads every intermediate JSON file below `output_root` into `storage`.
///
/// Products of a session directory are inserted before its reviews so that
/// review `Produkt_ID`s can be resolved to product row ids. A failing row
/// aborts the rest of its file; rows already inserted stay committed.
pub async fn ingest_output_dir(
    storage: &dyn Storage,
    output_root: &Path,
    session: &SessionStamp,
) -> Result<IngestReport, CrawlError> {
    storage.migrate().await?;

    let mut report = IngestReport::default();
    for files in find_session_files(output_root)? {
        info!("Ingesting session directory {}", files.dir.display());
        let mut row_ids: HashMap<i64, i64> = HashMap::new();

        for path in &files.products {
            match ingest_products(storage, path, session, &mut row_ids).await {
                Ok(count) => {
                    info!("{} products from {} written to database", count, path.display());
                    report.products += count;
                }
                Err((count, e)) => {
                    error!("Loading {} aborted after {} products: {}", path.display(), count, e);
                    report.products += count;
                    report.failed_files += 1;
                }
            }
        }

        if files.products.is_empty() && !files.reviews.is_empty() {
            warn!(
                "No product file in {}, review product ids are used as stored",
                files.dir.display()
            );
        }

        for path in &files.reviews {
            match ingest_reviews(storage, path, session, &row_ids).await {
                Ok(count) => {
                    info!("{} reviews from {} written to database", count, path.display());
                    report.reviews += count;
                }
                Err((count, e)) => {
                    error!("Loading {} aborted after {} reviews: {}", path.display(), count, e);
                    report.reviews += count;
                    report.failed_files += 1;
                }
            }
        }
    }

    info!(
        products = report.products,
        reviews = report.reviews,
        failed_files = report.failed_files,
        "Ingestion finished"
    );
    Ok(report)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, CrawlError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

async fn ingest_products(
    storage: &dyn Storage,
    path: &Path,
    session: &SessionStamp,
    row_ids: &mut HashMap<i64, i64>,
) -> Result<usize, (usize, CrawlError)> {
    let raw: Vec<RawProduct> = read_json(path).map_err(|e| (0, e))?;

    let mut inserted = 0;
    for product in &raw {
        let record = clean_product(product).map_err(|e| (inserted, CrawlError::from(e)))?;
        let stored = storage
            .insert_product(&record, session)
            .await
            .map_err(|e| (inserted, e))?;
        row_ids.insert(record.product_id, stored.id);
        inserted += 1;
    }
    Ok(inserted)
}

async fn ingest_reviews(
    storage: &dyn Storage,
    path: &Path,
    session: &SessionStamp,
    row_ids: &HashMap<i64, i64>,
) -> Result<usize, (usize, CrawlError)> {
    let raw: Vec<RawReview> = read_json(path).map_err(|e| (0, e))?;

    let mut inserted = 0;
    for review in &raw {
        let record = clean_review(review).map_err(|e| (inserted, CrawlError::from(e)))?;
        let product_row_id = row_ids
            .get(&record.product_id)
            .copied()
            .unwrap_or(record.product_id);
        storage
            .insert_review(&record, product_row_id, session)
            .await
            .map_err(|e| (inserted, e))?;
        inserted += 1;
    }
    Ok(inserted)
}
