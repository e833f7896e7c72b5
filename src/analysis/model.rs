use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::Config;
use crate::error::CrawlError;

/// One token of a dependency parse. `head` is the index of the governing
/// token in the same parse; a root token points at itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: String,
    pub head: usize,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn parse(&self, text: &str) -> Result<Vec<Token>, CrawlError>;
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct ParseResponse {
    tokens: Vec<Token>,
}

/// Client for a spaCy-compatible parse service.
pub struct HttpLanguageModel {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpLanguageModel {
    pub fn new(config: &Config) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(config.nlp_timeout())
            .build()
            .map_err(|e| CrawlError::LanguageModel(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.nlp.endpoint.clone(),
            model: config.nlp.model.clone(),
        })
    }
}

#[async_trait]
impl LanguageModel for HttpLanguageModel {
    async fn parse(&self, text: &str) -> Result<Vec<Token>, CrawlError> {
        let request = ParseRequest {
            text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Parse service at {} unreachable: {}", self.endpoint, e);
                CrawlError::LanguageModel(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::LanguageModel(format!(
                "parse service answered with status {}",
                status
            )));
        }

        let parsed: ParseResponse = response
            .json()
            .await
            .map_err(|e| CrawlError::LanguageModel(format!("malformed parse response: {}", e)))?;

        let len = parsed.tokens.len();
        if let Some(bad) = parsed.tokens.iter().find(|t| t.head >= len) {
            return Err(CrawlError::LanguageModel(format!(
                "token {:?} points at head {} outside the parse",
                bad.text, bad.head
            )));
        }

        debug!("Parsed {} characters into {} tokens", text.len(), len);
        Ok(parsed.tokens)
    }
}
