pub mod browser_session;
pub mod http_client;
pub mod static_pages;
pub mod throttle;

pub use browser_session::BrowserSessionFetcher;
pub use http_client::HttpFetcher;
pub use static_pages::StaticPageFetcher;
pub use throttle::Throttle;
