use crate::app::ports::{DatasetSink, PageFetcher};
use crate::config::CrawlerConfig;
use crate::error::Result;
use crate::pipeline::listing::ListingAggregator;
use crate::pipeline::reservations::ReservationAggregator;
use crate::types::CrawlDataset;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Counts reported at the end of a run
#[derive(Debug, Default, Clone, Serialize)]
pub struct CrawlSummary {
    pub year: i32,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub venues: usize,
    pub venues_skipped: usize,
    pub months_fetched: u32,
    pub months_failed: u32,
    pub reservations: usize,
    pub orphan_reservations: usize,
    pub persisted: bool,
}

pub struct CrawlOutcome {
    pub dataset: CrawlDataset,
    pub summary: CrawlSummary,
}

/// One full crawl: listing discovery, then the reservation sweep.
pub struct Crawler {
    listing: ListingAggregator,
    reservations: ReservationAggregator,
    year: i32,
}

impl Crawler {
    pub fn new(listing: ListingAggregator, reservations: ReservationAggregator, year: i32) -> Self {
        Self {
            listing,
            reservations,
            year,
        }
    }

    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &CrawlerConfig) -> Self {
        Self::new(
            ListingAggregator::from_config(fetcher.clone(), config),
            ReservationAggregator::from_config(fetcher, config),
            config.year(),
        )
    }

    pub fn listing(&self) -> &ListingAggregator {
        &self.listing
    }

    pub fn reservations(&self) -> &ReservationAggregator {
        &self.reservations
    }

    #[instrument(skip(self), fields(year = self.year))]
    pub async fn run(&self) -> CrawlOutcome {
        info!("Starting venue listing crawl");
        let listing = self.listing.collect().await;

        let mut summary = CrawlSummary {
            year: self.year,
            pages_fetched: listing.pages_fetched,
            pages_failed: listing.pages_failed,
            venues: listing.venues.len(),
            ..CrawlSummary::default()
        };

        if listing.venues.is_empty() {
            warn!("No venues parsed; skipping reservation crawl");
            return CrawlOutcome {
                dataset: CrawlDataset::new(Vec::new(), Vec::new()),
                summary,
            };
        }

        let reservations = self.reservations.collect(&listing.venues, self.year).await;
        summary.venues_skipped = reservations.venues_skipped.len();
        summary.months_fetched = reservations.months_fetched;
        summary.months_failed = reservations.months_failed;
        summary.reservations = reservations.reservations.len();

        let dataset = CrawlDataset::new(listing.venues, reservations.reservations);
        summary.orphan_reservations = dataset.orphan_reservations().len();
        if summary.orphan_reservations > 0 {
            warn!(
                "{} reservations reference facilities missing from the listing",
                summary.orphan_reservations
            );
        }

        CrawlOutcome { dataset, summary }
    }

    /// Run the crawl and hand the dataset to every sink in order.
    ///
    /// A run that found no venues leaves existing output untouched. Any sink
    /// failure aborts and is returned.
    pub async fn run_and_persist(&self, sinks: &[Box<dyn DatasetSink>]) -> Result<CrawlOutcome> {
        let mut outcome = self.run().await;
        if outcome.dataset.facilities.is_empty() {
            warn!("Nothing to persist");
            return Ok(outcome);
        }
        for sink in sinks {
            if let Err(e) = sink.persist(&outcome.dataset).await {
                error!("Failed to persist dataset to {}: {}", sink.describe(), e);
                return Err(e);
            }
            info!(
                "Saved {} venues and {} reservations to {}",
                outcome.dataset.facilities.len(),
                outcome.dataset.reservations.len(),
                sink.describe()
            );
        }
        outcome.summary.persisted = !sinks.is_empty();
        Ok(outcome)
    }
}
