//! Plain HTTP content fetcher

use crate::config::FetchConfig;
use crate::fetch::{ContentExtractor, RecordProcessor};
use crate::model::{Payload, RecordFailure, UrlRecord};
use crate::state::ErrorKind;
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client used for content fetches
///
/// # Arguments
///
/// * `config` - The fetch configuration (user agent, timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches records with a GET request and extracts their content
pub struct HttpProcessor {
    client: Client,
    extractor: ContentExtractor,
}

impl HttpProcessor {
    pub fn new(client: Client, extractor: ContentExtractor) -> Self {
        Self { client, extractor }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, RecordFailure> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("timed out: {}", e)
            } else {
                e.to_string()
            };
            RecordFailure::new(ErrorKind::Navigation, message)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecordFailure::new(
                ErrorKind::Navigation,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| RecordFailure::new(ErrorKind::Navigation, e.to_string()))
    }
}

impl RecordProcessor for HttpProcessor {
    async fn process(&mut self, url: &str, record: &UrlRecord) -> Result<Payload, RecordFailure> {
        tracing::debug!("GET {} ({})", url, record.name);
        let html = self.fetch_html(url).await?;
        let extraction = self.extractor.extract(&html)?;

        if !extraction.element_found {
            return Err(RecordFailure::new(
                ErrorKind::ExtractionMiss,
                format!("'{}' not found", self.extractor.selector()),
            ));
        }

        Ok(Payload {
            title: extraction.title.or_else(|| record.page_title.clone()),
            content: extraction.content,
            element_found: true,
        })
    }
}
