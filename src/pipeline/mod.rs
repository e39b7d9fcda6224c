// Crawl pipeline: listing discovery, nonce resolution, calendar sweep

pub mod crawl;
pub mod listing;
pub mod nonce;
pub mod reservations;

pub use crawl::{CrawlOutcome, CrawlSummary, Crawler};
pub use listing::{ListingAggregator, ListingOutcome};
pub use nonce::NonceResolver;
pub use reservations::{ReservationAggregator, ReservationOutcome, VenueCalendar};
