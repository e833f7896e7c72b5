use std::sync::Arc;
use tracing::Span;
use url::Url;

use crate::config::Config;
use crate::error::CrawlError;
use crate::models::SessionStamp;

/// Everything a scraper needs to know about the running session. Passed
/// explicitly instead of living in globals.
#[derive(Debug, Clone)]
pub struct CrawlContext {
    pub config: Arc<Config>,
    pub listing_url: Url,
    pub session: SessionStamp,
    pub span: Span,
}

impl CrawlContext {
    pub fn new(config: Arc<Config>, session: SessionStamp) -> Result<Self, CrawlError> {
        let listing_url =
            Url::parse(&config.listing_url).map_err(|source| CrawlError::InvalidUrl {
                url: config.listing_url.clone(),
                source,
            })?;
        let span = tracing::info_span!("crawl", session = %session.file_suffix());

        Ok(Self {
            config,
            listing_url,
            session,
            span,
        })
    }
}
