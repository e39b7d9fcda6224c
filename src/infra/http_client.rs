use crate::app::ports::PageFetcher;
use crate::config::CrawlerConfig;
use crate::error::{FetchError, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

/// Plain HTTP client: one GET per call, no session state.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, anchor: Option<&str>) -> std::result::Result<String, FetchError> {
        debug!("HTTP GET request to: {}", url);
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        debug!("HTTP response: status={}, size={} bytes", status.as_u16(), body.len());
        ensure_anchor(&body, anchor)?;
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Fail with `MissingAnchor` unless `markup` contains an element matching `anchor`.
pub fn ensure_anchor(markup: &str, anchor: Option<&str>) -> std::result::Result<(), FetchError> {
    let Some(anchor) = anchor else {
        return Ok(());
    };
    let selector =
        Selector::parse(anchor).map_err(|_| FetchError::MissingAnchor(anchor.to_string()))?;
    let document = Html::parse_document(markup);
    if document.select(&selector).next().is_some() {
        Ok(())
    } else {
        Err(FetchError::MissingAnchor(anchor.to_string()))
    }
}
