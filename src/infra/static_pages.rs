use crate::app::ports::PageFetcher;
use crate::error::FetchError;
use crate::infra::http_client::ensure_anchor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory fetcher for offline runs and tests: serves registered markup by
/// exact URL and records every requested URL in order.
#[derive(Default)]
pub struct StaticPageFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), markup.into());
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, markup: impl Into<String>) {
        self.pages.insert(url.into(), markup.into());
    }

    /// URLs requested so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch(&self, url: &str, anchor: Option<&str>) -> Result<String, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        let markup = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))?;
        ensure_anchor(&markup, anchor)?;
        Ok(markup)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
