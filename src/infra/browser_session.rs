use crate::app::ports::PageFetcher;
use crate::config::CrawlerConfig;
use crate::error::{FetchError, Result};
use crate::infra::http_client::ensure_anchor;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use std::sync::Mutex;
use tracing::debug;

/// Browser-like client: shared cookie jar, desktop headers, and a referer chain
/// across calls, the way a scripted browser tab navigates the site.
pub struct BrowserSessionFetcher {
    client: reqwest::Client,
    last_url: Mutex<Option<String>>,
}

impl BrowserSessionFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        let language = format!("{},ko;q=0.9,en;q=0.5", config.locale);
        if let Ok(value) = HeaderValue::from_str(&language) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            last_url: Mutex::new(None),
        })
    }

    fn referer(&self) -> Option<String> {
        self.last_url.lock().ok().and_then(|guard| guard.clone())
    }

    fn navigated(&self, url: &str) {
        if let Ok(mut guard) = self.last_url.lock() {
            *guard = Some(url.to_string());
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserSessionFetcher {
    async fn fetch(&self, url: &str, anchor: Option<&str>) -> std::result::Result<String, FetchError> {
        let mut request = self.client.get(url);
        if let Some(referer) = self.referer() {
            request = request.header(REFERER, referer);
        }
        debug!("Navigating to {}", url);
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        self.navigated(url);
        ensure_anchor(&body, anchor)?;
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
