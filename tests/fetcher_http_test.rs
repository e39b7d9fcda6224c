use std::sync::Arc;

use httpmock::prelude::*;
use wedding_crawler::app::ports::PageFetcher;
use wedding_crawler::config::CrawlerConfig;
use wedding_crawler::error::FetchError;
use wedding_crawler::infra::{BrowserSessionFetcher, HttpFetcher};
use wedding_crawler::pipeline::ReservationAggregator;

fn config(base_url: String) -> CrawlerConfig {
    CrawlerConfig {
        base_url,
        year: Some(2026),
        page_delay_ms: 0,
        calendar_delay_ms: 0,
        timeout_secs: 5,
        ..CrawlerConfig::default()
    }
}

#[tokio::test]
async fn http_fetcher_returns_markup() {
    let server = MockServer::start_async().await;
    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/facilities");
            then.status(200)
                .header("Content-Type", "text/html; charset=utf-8")
                .body(r#"<ul class="archive_list-container facilities"></ul>"#);
        })
        .await;

    let fetcher = HttpFetcher::new(&config(server.base_url())).unwrap();
    let markup = fetcher
        .fetch(&server.url("/facilities"), Some("ul.archive_list-container"))
        .await
        .unwrap();

    assert!(markup.contains("archive_list-container"));
    page.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_a_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/facilities/page/3");
            then.status(503);
        })
        .await;

    let fetcher = HttpFetcher::new(&config(server.base_url())).unwrap();
    let err = fetcher.fetch(&server.url("/facilities/page/3"), None).await.unwrap_err();
    assert!(matches!(err, FetchError::Status(503)));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/facilities/4187");
            then.status(200)
                .delay(std::time::Duration::from_secs(3))
                .body("<table></table>");
        })
        .await;

    let config = CrawlerConfig {
        timeout_secs: 1,
        ..config(server.base_url())
    };
    let err = HttpFetcher::new(&config)
        .unwrap()
        .fetch(&server.url("/facilities/4187"), Some("table"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)), "got {:?}", err);

    let err = BrowserSessionFetcher::new(&config)
        .unwrap()
        .fetch(&server.url("/facilities/4187"), Some("table"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn browser_fetcher_requires_anchor_and_sends_locale() {
    let server = MockServer::start_async().await;
    let detail = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/facilities/4187")
                .header("accept-language", "ko-KR,ko;q=0.9,en;q=0.5");
            then.status(200).body("<html><body><p>점검 중</p></body></html>");
        })
        .await;

    let fetcher = BrowserSessionFetcher::new(&config(server.base_url())).unwrap();
    let err = fetcher
        .fetch(&server.url("/facilities/4187"), Some("table"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::MissingAnchor(ref anchor) if anchor == "table"));
    detail.assert_async().await;
}

#[tokio::test]
async fn browser_session_sends_referer_from_previous_page() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/facilities");
            then.status(200).body("<html></html>");
        })
        .await;
    let detail = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/facilities/4187")
                .header("referer", server.url("/facilities"));
            then.status(200).body("<html></html>");
        })
        .await;

    let fetcher = BrowserSessionFetcher::new(&config(server.base_url())).unwrap();
    fetcher.fetch(&server.url("/facilities"), None).await.unwrap();
    fetcher.fetch(&server.url("/facilities/4187"), None).await.unwrap();

    detail.assert_async().await;
}

#[tokio::test]
async fn nonce_resolves_from_detail_page() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/facilities/4188");
            then.status(200).body(
                r#"<html><body><a href="?to=2026-5&amp;_wpnonce=5767884a9b">next</a><table></table></body></html>"#,
            );
        })
        .await;

    let fetcher = Arc::new(HttpFetcher::new(&config(server.base_url())).unwrap());
    let aggregator = ReservationAggregator::from_config(fetcher, &config(server.base_url()));

    let nonce = aggregator.nonce_resolver().resolve("4188").await;
    assert_eq!(nonce.as_deref(), Some("5767884a9b"));
    // No page at all: unresolved, not an error
    assert_eq!(aggregator.nonce_resolver().resolve("9999").await, None);
}

#[tokio::test]
async fn calendar_request_carries_month_and_nonce() {
    let server = MockServer::start_async().await;
    let april = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/facilities/4187")
                .query_param("to", "2026-4")
                .query_param("_wpnonce", "5767884a9b");
            then.status(200).body(
                r#"<table><tbody><tr><td><span class="text-grey600">15</span><span class="flex flex-col"><div class="inline-block text-center">오후</div></span></td></tr></tbody></table>"#,
            );
        })
        .await;

    let fetcher = Arc::new(HttpFetcher::new(&config(server.base_url())).unwrap());
    let aggregator = ReservationAggregator::from_config(fetcher, &config(server.base_url()));

    let records = aggregator.crawl_month("4187", 2026, 4, "5767884a9b").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].time_slot.to_string(), "D");
    assert_eq!(records[0].status.as_str(), "available");
    april.assert_async().await;
}
