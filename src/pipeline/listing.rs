use crate::app::ports::PageFetcher;
use crate::config::CrawlerConfig;
use crate::constants::{listing_url, LISTING_ANCHOR};
use crate::infra::throttle::Throttle;
use crate::metrics::ListingMetrics;
use crate::parser::parse_listing;
use crate::types::VenueRecord;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of walking the listing pages
#[derive(Debug, Default, Serialize)]
pub struct ListingOutcome {
    pub venues: Vec<VenueRecord>,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub pages_empty: u32,
    pub duplicates_skipped: usize,
}

/// Walks listing pages 1..=max_pages and keeps the first record per facility_number.
pub struct ListingAggregator {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    max_pages: u32,
    throttle: Throttle,
}

impl ListingAggregator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>, max_pages: u32, throttle: Throttle) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            max_pages,
            throttle,
        }
    }

    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &CrawlerConfig) -> Self {
        Self::new(
            fetcher,
            config.base_url.clone(),
            config.max_pages,
            Throttle::new(config.page_delay()),
        )
    }

    #[instrument(skip(self), fields(fetcher = self.fetcher.name(), max_pages = self.max_pages))]
    pub async fn collect(&self) -> ListingOutcome {
        let mut outcome = ListingOutcome::default();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 1..=self.max_pages {
            let url = listing_url(&self.base_url, page);
            info!("Crawling listing page {} ({})", page, url);

            // Pause after every page, the last one included, so the first
            // detail request that follows is spaced too.
            let fetched = self.fetcher.fetch(&url, Some(LISTING_ANCHOR)).await;
            self.throttle.pause().await;

            let markup = match fetched {
                Ok(markup) => markup,
                Err(e) => {
                    warn!("Failed to fetch listing page {}: {}", page, e);
                    outcome.pages_failed += 1;
                    ListingMetrics::record_page_failed();
                    continue;
                }
            };
            outcome.pages_fetched += 1;
            ListingMetrics::record_page_fetched();

            let venues = parse_listing(&markup, &self.base_url);
            if venues.is_empty() {
                info!("No venues on listing page {}", page);
                outcome.pages_empty += 1;
                ListingMetrics::record_page_empty();
                continue;
            }

            let (new, duplicates) = merge_unique(&mut outcome.venues, &mut seen, venues);
            outcome.duplicates_skipped += duplicates;
            ListingMetrics::record_venues(new, duplicates);
            info!("Listing page {}: {} new venues", page, new);
        }

        info!("Found {} venues in total", outcome.venues.len());
        outcome
    }
}

/// Append records whose facility_number is unseen; returns (added, skipped).
fn merge_unique(
    into: &mut Vec<VenueRecord>,
    seen: &mut HashSet<String>,
    venues: Vec<VenueRecord>,
) -> (usize, usize) {
    let mut added = 0;
    let mut skipped = 0;
    for venue in venues {
        if seen.insert(venue.facility_number.clone()) {
            into.push(venue);
            added += 1;
        } else {
            skipped += 1;
        }
    }
    (added, skipped)
}
