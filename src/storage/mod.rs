use async_trait::async_trait;

use crate::error::CrawlError;
use crate::models::{ProductRecord, ReviewRecord, SessionStamp, StoredProduct, StoredReview};

mod ingest;
mod sqlite;

pub use ingest::{ingest_output_dir, IngestReport};
pub use sqlite::SqliteStorage;

/// Review text with the product it belongs to, as needed by the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewWithProduct {
    pub body: String,
    pub rating: i64,
    pub product_name: Option<String>,
    pub brand: Option<String>,
}

/// A whole table as text, for CSV export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDump {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Products,
    Reviews,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Reviews => "reviews",
        }
    }
}

/// Every insert is committed on its own; there is no update or delete.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn migrate(&self) -> Result<(), CrawlError>;

    async fn insert_product(
        &self,
        product: &ProductRecord,
        session: &SessionStamp,
    ) -> Result<StoredProduct, CrawlError>;

    /// `product_row_id` is the primary key of the owning product row.
    async fn insert_review(
        &self,
        review: &ReviewRecord,
        product_row_id: i64,
        session: &SessionStamp,
    ) -> Result<StoredReview, CrawlError>;

    async fn reviews_with_rating(
        &self,
        ratings: &[i64],
    ) -> Result<Vec<ReviewWithProduct>, CrawlError>;

    async fn dump_table(&self, table: Table) -> Result<TableDump, CrawlError>;
}
