use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::{ReviewWithProduct, Storage, Table, TableDump};
use crate::error::CrawlError;
use crate::models::{ProductRecord, ReviewRecord, SessionStamp, StoredProduct, StoredReview};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        product_url TEXT,
        artikelnummer TEXT,
        produktname TEXT,
        preis REAL,
        promo_preis REAL,
        on_promo BOOLEAN NOT NULL DEFAULT 0,
        waehrung TEXT,
        marke TEXT,
        artikelbeschreibung TEXT,
        inhaltsstoffe TEXT,
        gesamtrating REAL,
        gesamtanzahl_reviews INTEGER,
        produkt_id INTEGER NOT NULL,
        session_date DATE NOT NULL,
        session_time TIME NOT NULL
    );

    CREATE TABLE IF NOT EXISTS reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        reviewer TEXT NOT NULL,
        review TEXT NOT NULL,
        rating INTEGER NOT NULL,
        date TEXT NOT NULL,
        author_location TEXT,
        review_count INTEGER,
        review_votes INTEGER,
        gender TEXT,
        age TEXT,
        review_id INTEGER NOT NULL,
        produkt_id INTEGER NOT NULL REFERENCES products(id),
        session_date DATE NOT NULL,
        session_time TIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_reviews_produkt_id ON reviews(produkt_id);
    CREATE INDEX IF NOT EXISTS idx_reviews_rating ON reviews(rating);
";

pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn open(db_path: &Path) -> Result<Self, CrawlError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, CrawlError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CrawlError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(v) | ValueRef::Blob(v) => String::from_utf8_lossy(v).into_owned(),
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn migrate(&self) -> Result<(), CrawlError> {
        let conn = self.conn.lock().await;
        conn.execute_batch(SCHEMA)?;
        info!("Database tables created");
        Ok(())
    }

    async fn insert_product(
        &self,
        product: &ProductRecord,
        session: &SessionStamp,
    ) -> Result<StoredProduct, CrawlError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO products (
                product_url, artikelnummer, produktname, preis, promo_preis, on_promo,
                waehrung, marke, artikelbeschreibung, inhaltsstoffe, gesamtrating,
                gesamtanzahl_reviews, produkt_id, session_date, session_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                product.product_url,
                product.article_number,
                product.name,
                product.price,
                product.promo_price,
                product.on_promo,
                product.currency,
                product.brand,
                product.description,
                product.ingredients,
                product.rating,
                product.review_count,
                product.product_id,
                session.db_date(),
                session.db_time(),
            ],
        )?;

        Ok(StoredProduct {
            id: conn.last_insert_rowid(),
            record: product.clone(),
            session: *session,
        })
    }

    async fn insert_review(
        &self,
        review: &ReviewRecord,
        product_row_id: i64,
        session: &SessionStamp,
    ) -> Result<StoredReview, CrawlError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO reviews (
                reviewer, review, rating, date, author_location, review_count,
                review_votes, gender, age, review_id, produkt_id, session_date, session_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                review.reviewer,
                review.body,
                review.rating,
                review.date,
                review.author_location,
                review.review_count,
                review.review_votes,
                review.gender,
                review.age,
                review.review_id,
                product_row_id,
                session.db_date(),
                session.db_time(),
            ],
        )?;

        Ok(StoredReview {
            id: conn.last_insert_rowid(),
            product_row_id,
            record: review.clone(),
            session: *session,
        })
    }

    async fn reviews_with_rating(
        &self,
        ratings: &[i64],
    ) -> Result<Vec<ReviewWithProduct>, CrawlError> {
        if ratings.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ratings.len()].join(", ");
        let sql = format!(
            "SELECT r.review, r.rating, p.produktname, p.marke
             FROM reviews r
             JOIN products p ON r.produkt_id = p.id
             WHERE r.rating IN ({})
             ORDER BY r.id",
            placeholders
        );

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ratings.iter()), |row| {
            Ok(ReviewWithProduct {
                body: row.get(0)?,
                rating: row.get(1)?,
                product_name: row.get(2)?,
                brand: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn dump_table(&self, table: Table) -> Result<TableDump, CrawlError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {} ORDER BY id", table.name()))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt.query_map([], |row| {
            (0..width)
                .map(|i| row.get_ref(i).map(cell_text))
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(TableDump {
            columns,
            rows: rows.collect::<Result<Vec<_>, _>>()?,
        })
    }
}
