use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{error, info};

use crate::config::Config;
use crate::error::CrawlError;

pub fn create_client(config: &Config) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("de-DE,de;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://google.com"));

    ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .timeout(Duration::from_secs(25))
        .build()
}

/// Plain HTTP check of the start URL before a browser is launched. A
/// transport error or a 4xx/5xx status aborts the session.
pub async fn check_url_connection(client: &Client, url: &str) -> Result<(), CrawlError> {
    let response = client.get(url).send().await.map_err(|source| {
        error!("Connection to {} failed: {}", url, source);
        CrawlError::Connection {
            url: url.to_string(),
            source,
        }
    })?;

    let status = response.status();
    if status.is_client_error() {
        error!("Client error connecting to {}, status {}", url, status);
        return Err(CrawlError::ClientStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    if status.is_server_error() {
        error!("Server error connecting to {}, status {}", url, status);
        return Err(CrawlError::ServerStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    info!("Connection to {} succeeded, status {}", url, status);
    Ok(())
}
