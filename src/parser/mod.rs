//! Markup parsers for the booking site.
//!
//! All parsers are synchronous and infallible: missing structure yields fewer
//! (or zero) records, never an error.

pub mod calendar;
pub mod listing;
pub mod nonce;

pub use calendar::parse_calendar;
pub use listing::parse_listing;
pub use nonce::extract_nonce;

use scraper::{ElementRef, Selector};

/// Text of an element with each text node trimmed and joined without separators
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector '{}': {:?}", css, e))
}
