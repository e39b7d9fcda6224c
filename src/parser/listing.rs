use crate::constants::{
    FACILITY_HREF_PATTERN, LISTING_CONTAINER_SELECTOR, LISTING_DISTRICT_SELECTOR,
    LISTING_INFO_SELECTOR, LISTING_NAME_SELECTOR,
};
use crate::parser::{selector, stripped_text};
use crate::types::VenueRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

static CONTAINER: Lazy<Selector> = Lazy::new(|| selector(LISTING_CONTAINER_SELECTOR));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static DISTRICT: Lazy<Selector> = Lazy::new(|| selector(LISTING_DISTRICT_SELECTOR));
static NAME: Lazy<Selector> = Lazy::new(|| selector(LISTING_NAME_SELECTOR));
static INFO: Lazy<Selector> = Lazy::new(|| selector(LISTING_INFO_SELECTOR));
static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static FACILITY_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(FACILITY_HREF_PATTERN).expect("facility href pattern"));

/// Extract venue summary cards from one listing page, in document order.
///
/// A page without the listing container yields an empty list; that means
/// "no data on this page", not a failure.
pub fn parse_listing(markup: &str, base_url: &str) -> Vec<VenueRecord> {
    let document = Html::parse_document(markup);

    let Some(container) = document.select(&CONTAINER).next() else {
        let title = document
            .select(&TITLE)
            .next()
            .map(stripped_text)
            .unwrap_or_else(|| "N/A".to_string());
        warn!("Listing container not found (page title: {})", title);
        return Vec::new();
    };

    let mut venues = Vec::new();
    for link in container.select(&LINK) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(captures) = FACILITY_HREF.captures(href) else {
            continue;
        };
        let facility_number = captures[1].to_string();
        let venue = parse_card(link, facility_number, resolve_url(base_url, href));
        debug!(
            "Found: {} {} (ID: {})",
            venue.district, venue.name, venue.facility_number
        );
        venues.push(venue);
    }
    venues
}

fn parse_card(link: ElementRef<'_>, facility_number: String, url: String) -> VenueRecord {
    let first_text = |sel: &Selector| link.select(sel).next().map(stripped_text).unwrap_or_default();

    let info: Vec<String> = link
        .select(&INFO)
        .next()
        .map(|div| div.select(&SPAN).take(3).map(stripped_text).collect())
        .unwrap_or_default();
    let mut info = info.into_iter();

    VenueRecord {
        facility_number,
        district: first_text(&DISTRICT),
        name: first_text(&NAME),
        location_type: info.next().unwrap_or_default(),
        capacity: info.next().unwrap_or_default(),
        price: info.next().unwrap_or_default(),
        url,
    }
}

fn resolve_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("{}{}", base_url.trim_end_matches('/'), href))
}
