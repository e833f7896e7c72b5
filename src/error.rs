use thiserror::Error;

use crate::browser::BrowserError;

/// Errors that abort a crawl step. Whether they abort the whole session is
/// up to the caller: per-product failures are logged and skipped, failures
/// while establishing the session are fatal.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("connection to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("client error for {url}, status {status}")]
    ClientStatus { url: String, status: u16 },

    #[error("server error for {url}, status {status}")]
    ServerStatus { url: String, status: u16 },

    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Clean(#[from] CleanError),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("language model error: {0}")]
    LanguageModel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Numeric coercion failures during cleaning. These are never swallowed by
/// the cleaning functions themselves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CleanError {
    #[error("field {field} is not numeric: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("field {field} is not an integer: {value:?}")]
    NotInteger { field: &'static str, value: String },
}

/// Result of a page check that may be retried (e.g. waiting for an element that
/// is rendered lazily). `Retryable` means "try again, or give up with
/// defaults"; `Fatal` means "stop this unit of work".
#[derive(Debug)]
pub enum Outcome<T> {
    Ready(T),
    Retryable(String),
    Fatal(CrawlError),
}

impl<T> From<Result<Option<T>, BrowserError>> for Outcome<T> {
    fn from(result: Result<Option<T>, BrowserError>) -> Self {
        match result {
            Ok(Some(value)) => Outcome::Ready(value),
            Ok(None) => Outcome::Retryable("element not present".to_string()),
            Err(e) => Outcome::Fatal(e.into()),
        }
    }
}
