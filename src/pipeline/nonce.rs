use crate::app::ports::PageFetcher;
use crate::constants::{detail_url, DETAIL_ANCHOR};
use crate::infra::throttle::Throttle;
use crate::parser::extract_nonce;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fetches a venue's detail page and pulls the calendar authorization token.
///
/// The token is scoped to the venue whose page produced it.
pub struct NonceResolver {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    throttle: Throttle,
}

impl NonceResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>, throttle: Throttle) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            throttle,
        }
    }

    /// `None` when the page cannot be fetched or carries no token
    pub async fn resolve(&self, facility_number: &str) -> Option<String> {
        let url = detail_url(&self.base_url, facility_number);
        let fetched = self.fetcher.fetch(&url, Some(DETAIL_ANCHOR)).await;
        self.throttle.pause().await;

        let markup = match fetched {
            Ok(markup) => markup,
            Err(e) => {
                warn!("Failed to fetch detail page for {}: {}", facility_number, e);
                return None;
            }
        };

        let nonce = extract_nonce(&markup);
        match &nonce {
            Some(token) => debug!("Resolved nonce for {}: {}", facility_number, token),
            None => debug!("No nonce on detail page for {}", facility_number),
        }
        nonce
    }
}
