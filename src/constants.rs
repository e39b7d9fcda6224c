//! Site and markup constants for the Seoul public wedding-hall booking site.

pub const DEFAULT_BASE_URL: &str = "https://wedding.seoulwomen.or.kr";
pub const FACILITIES_PATH: &str = "/facilities";

/// Listing pagination stops after this page
pub const MAX_LISTING_PAGES: u32 = 10;
pub const MONTHS_PER_YEAR: u32 = 12;

pub const DEFAULT_PAGE_DELAY_MS: u64 = 1000;
pub const DEFAULT_CALENDAR_DELAY_MS: u64 = 500;
/// Lowest pause between requests to the origin a validated config may set
pub const MIN_REQUEST_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_OUTPUT_PATH: &str = "frontend/public/data.json";
pub const DEFAULT_LOCALE: &str = "ko-KR";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Listing page
pub const LISTING_CONTAINER_SELECTOR: &str = "ul.archive_list-container.facilities";
pub const LISTING_DISTRICT_SELECTOR: &str = r"span.inline-block.lg\:h8";
pub const LISTING_NAME_SELECTOR: &str = r"p.mb-2.lg\:h5";
pub const LISTING_INFO_SELECTOR: &str = "div.mb-4.Mh8";
pub const FACILITY_HREF_PATTERN: &str = r"/facilities/(\d+)";

// Calendar view
pub const CALENDAR_BODY_SELECTOR: &str = "tbody";
pub const CALENDAR_DAY_SELECTOR: &str = "span.text-grey600";
pub const CALENDAR_STATUS_CONTAINER_SELECTOR: &str = "span.flex.flex-col";
pub const CALENDAR_STATUS_BLOCK_SELECTOR: &str = "div.inline-block.text-center";

pub const AM_TOKEN: &str = "오전";
pub const PM_TOKEN: &str = "오후";
pub const CONFIRMED_TOKEN: &str = "예약확정";

pub const NONCE_PATTERN: &str = r"_wpnonce=([A-Za-z0-9]+)";

/// DOM anchors a fetcher waits for before treating a page as loaded
pub const LISTING_ANCHOR: &str = "ul.archive_list-container";
pub const DETAIL_ANCHOR: &str = "table";
pub const CALENDAR_ANCHOR: &str = "tbody";

pub fn listing_url(base_url: &str, page: u32) -> String {
    let base = base_url.trim_end_matches('/');
    if page <= 1 {
        format!("{}{}", base, FACILITIES_PATH)
    } else {
        format!("{}{}/page/{}", base, FACILITIES_PATH, page)
    }
}

pub fn detail_url(base_url: &str, facility_number: &str) -> String {
    format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        FACILITIES_PATH,
        facility_number
    )
}

pub fn calendar_url(base_url: &str, facility_number: &str, year: i32, month: u32, nonce: &str) -> String {
    format!(
        "{}?to={}-{}&_wpnonce={}",
        detail_url(base_url, facility_number),
        year,
        month,
        nonce
    )
}
