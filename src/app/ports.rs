use crate::error::{FetchError, Result};
use crate::types::CrawlDataset;
use async_trait::async_trait;

/// Fetches one page of markup.
///
/// `anchor` is a CSS selector the loaded page must contain; when it is absent
/// the fetch fails with [`FetchError::MissingAnchor`]. Implementations never
/// retry and never panic on network trouble.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, anchor: Option<&str>) -> std::result::Result<String, FetchError>;

    /// Short label for logs
    fn name(&self) -> &'static str;
}

/// Destination for a finished crawl. Failures here abort the run.
#[async_trait]
pub trait DatasetSink: Send + Sync {
    async fn persist(&self, dataset: &CrawlDataset) -> Result<()>;

    fn describe(&self) -> String;
}
