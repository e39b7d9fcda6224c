use crate::app::ports::PageFetcher;
use crate::config::CrawlerConfig;
use crate::constants::{calendar_url, CALENDAR_ANCHOR, MONTHS_PER_YEAR};
use crate::error::{Result, ScraperError};
use crate::infra::throttle::Throttle;
use crate::metrics::CalendarMetrics;
use crate::parser::parse_calendar;
use crate::pipeline::nonce::NonceResolver;
use crate::types::{ReservationRecord, VenueRecord};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default, Serialize)]
pub struct ReservationOutcome {
    pub reservations: Vec<ReservationRecord>,
    /// Venues dropped because no nonce could be resolved
    pub venues_skipped: Vec<String>,
    pub months_fetched: u32,
    pub months_failed: u32,
}

/// Per-venue result of a 12-month sweep
#[derive(Debug, Default)]
pub struct VenueCalendar {
    pub reservations: Vec<ReservationRecord>,
    pub months_fetched: u32,
    pub months_failed: u32,
}

/// Resolves one nonce per venue, then sweeps the venue's calendar month by month.
pub struct ReservationAggregator {
    fetcher: Arc<dyn PageFetcher>,
    nonces: NonceResolver,
    base_url: String,
    throttle: Throttle,
}

impl ReservationAggregator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>, throttle: Throttle) -> Self {
        let base_url = base_url.into();
        Self {
            nonces: NonceResolver::new(fetcher.clone(), base_url.clone(), throttle),
            fetcher,
            base_url,
            throttle,
        }
    }

    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &CrawlerConfig) -> Self {
        Self::new(fetcher, config.base_url.clone(), Throttle::new(config.calendar_delay()))
    }

    pub fn nonce_resolver(&self) -> &NonceResolver {
        &self.nonces
    }

    #[instrument(skip(self, venues), fields(venues = venues.len()))]
    pub async fn collect(&self, venues: &[VenueRecord], year: i32) -> ReservationOutcome {
        info!("Starting reservation crawl: {} venues, year {}", venues.len(), year);
        let mut outcome = ReservationOutcome::default();

        for venue in venues {
            match self.crawl_venue(&venue.facility_number, year).await {
                Some(calendar) => {
                    outcome.months_fetched += calendar.months_fetched;
                    outcome.months_failed += calendar.months_failed;
                    outcome.reservations.extend(calendar.reservations);
                }
                None => outcome.venues_skipped.push(venue.facility_number.clone()),
            }
        }

        info!(
            "Reservation crawl finished: {} records, {} venues skipped",
            outcome.reservations.len(),
            outcome.venues_skipped.len()
        );
        outcome
    }

    /// All twelve months for one venue; `None` when its nonce is unresolved.
    pub async fn crawl_venue(&self, facility_number: &str, year: i32) -> Option<VenueCalendar> {
        info!("Crawling venue {}", facility_number);
        let Some(nonce) = self.nonces.resolve(facility_number).await else {
            warn!("Venue {}: could not resolve nonce, skipping", facility_number);
            CalendarMetrics::record_nonce_unresolved();
            return None;
        };

        let mut calendar = VenueCalendar::default();
        for month in 1..=MONTHS_PER_YEAR {
            match self.crawl_month(facility_number, year, month, &nonce).await {
                Ok(records) => {
                    debug!("  {}-{}: {} records", year, month, records.len());
                    calendar.months_fetched += 1;
                    CalendarMetrics::record_month_fetched(records.len());
                    calendar.reservations.extend(records);
                }
                Err(e) => {
                    warn!("Venue {} {}-{} failed: {}", facility_number, year, month, e);
                    calendar.months_failed += 1;
                    CalendarMetrics::record_month_failed();
                }
            }
        }
        Some(calendar)
    }

    /// One venue-month. `nonce` must come from this venue's own detail page.
    pub async fn crawl_month(
        &self,
        facility_number: &str,
        year: i32,
        month: u32,
        nonce: &str,
    ) -> Result<Vec<ReservationRecord>> {
        if !(1..=MONTHS_PER_YEAR).contains(&month) {
            return Err(ScraperError::InvalidDate(format!("month {} out of range", month)));
        }
        let url = calendar_url(&self.base_url, facility_number, year, month, nonce);
        let fetched = self.fetcher.fetch(&url, Some(CALENDAR_ANCHOR)).await;
        self.throttle.pause().await;
        let markup = fetched?;
        Ok(parse_calendar(&markup, facility_number, year, month))
    }
}
