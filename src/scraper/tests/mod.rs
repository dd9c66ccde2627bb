use super::*;
use crate::error::{Error, FeedError};
use crate::types::FeedItem;
use chrono::{TimeZone, Utc};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:dc="http://purl.org/dc/elements/1.1/">
    <channel>
        <title>Remote Jobs</title>
        <link>https://example.com</link>
        <description>Test RSS Feed</description>
        <item>
            <title>Senior Rust Engineer</title>
            <link>https://example.com/jobs/1</link>
            <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
            <description>Short summary</description>
            <content:encoded><![CDATA[<p>Full posting body</p>]]></content:encoded>
        </item>
        <item>
            <title>Backend Developer</title>
            <link>https://example.com/jobs/2</link>
            <dc:date>2024-01-02T14:30:00Z</dc:date>
            <description>Only a summary</description>
        </item>
        <item>
            <title>Undated Role</title>
            <link>https://example.com/jobs/3</link>
        </item>
    </channel>
</rss>"#;

const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom Jobs</title>
    <id>https://example.com/atom</id>
    <updated>2024-01-01T12:00:00Z</updated>
    <entry>
        <title>Platform Engineer</title>
        <id>entry-1</id>
        <updated>2024-01-01T12:00:00Z</updated>
        <published>2024-01-01T10:00:00Z</published>
        <summary>A summary</summary>
        <content type="html">Full body</content>
        <link href="https://example.com/jobs/a" rel="alternate"/>
    </entry>
    <entry>
        <title>SRE</title>
        <id>entry-2</id>
        <updated>2024-01-02T14:30:00Z</updated>
        <link href="https://example.com/apply/b" rel="related"/>
        <link href="https://example.com/jobs/b" rel="alternate"/>
    </entry>
</feed>"#;

async fn serve(body: &str, status: u16) -> (MockServer, String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    let url = format!("{}/feed", server.uri());
    (server, url)
}

fn scraper() -> FeedScraper {
    FeedScraper::new(Duration::from_secs(5), "job-scraper tests").unwrap()
}

#[test]
fn test_parse_rss_feed() {
    let feed = feed::parse_feed(RSS_FEED).expect("Failed to parse RSS");

    assert_eq!(feed.title, "Remote Jobs");
    assert_eq!(feed.items.len(), 3, "Should parse 3 items");

    let first = &feed.items[0];
    assert_eq!(first.title, "Senior Rust Engineer");
    assert_eq!(first.link, "https://example.com/jobs/1");
    assert_eq!(first.content.as_deref(), Some("<p>Full posting body</p>"));
    assert_eq!(first.description.as_deref(), Some("Short summary"));
    assert_eq!(
        first.published,
        Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    );
    assert_eq!(first.updated, None);

    // dc:date becomes the updated timestamp
    let second = &feed.items[1];
    assert_eq!(second.published, None);
    assert_eq!(
        second.updated,
        Some(Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap())
    );
    assert_eq!(second.content, None);

    let third = &feed.items[2];
    assert_eq!(third.published, None);
    assert_eq!(third.updated, None);
    assert_eq!(third.description, None);
}

#[test]
fn test_parse_atom_feed() {
    let feed = feed::parse_feed(ATOM_FEED).expect("Failed to parse Atom");

    assert_eq!(feed.title, "Atom Jobs");
    assert_eq!(feed.items.len(), 2);

    let first = &feed.items[0];
    assert_eq!(first.title, "Platform Engineer");
    assert_eq!(first.link, "https://example.com/jobs/a");
    assert_eq!(first.content.as_deref(), Some("Full body"));
    assert_eq!(first.description.as_deref(), Some("A summary"));
    assert_eq!(
        first.published,
        Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
    );
    assert_eq!(
        first.updated,
        Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    );

    // Alternate link wins over an earlier non-alternate one
    assert_eq!(feed.items[1].link, "https://example.com/jobs/b");
    assert_eq!(feed.items[1].published, None);
}

#[test]
fn test_parse_garbage_reports_both_parsers() {
    let err = feed::parse_feed("definitely not xml").unwrap_err();
    match err {
        Error::Feed(FeedError::Parse { rss, atom }) => {
            assert!(rss.contains("RSS parse error"));
            assert!(atom.contains("Atom parse error"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_feed_scraper_fetches_over_http() {
    let (_server, url) = serve(RSS_FEED, 200).await;

    let feed = scraper()
        .scrape(&CancellationToken::new(), &url)
        .await
        .unwrap();

    assert_eq!(feed.items.len(), 3);
    assert_eq!(feed.items[0].link, "https://example.com/jobs/1");
}

#[tokio::test]
async fn test_feed_scraper_rejects_error_status() {
    let (_server, url) = serve("gone", 404).await;

    let err = scraper()
        .scrape(&CancellationToken::new(), &url)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Feed(FeedError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_feed_scraper_observes_cancellation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(RSS_FEED)
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = scraper()
        .scrape(&cancel, &format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_cancelled(), "expected cancellation, got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_mock_scraper_overrides_and_records_calls() {
    let feed = Feed {
        title: "Mock".into(),
        items: vec![FeedItem {
            title: "Job".into(),
            link: "https://example.com/1".into(),
            ..Default::default()
        }],
    };
    let scraper = MockScraper::new()
        .with_feed(feed.clone())
        .with_error_for("https://broken.example.com", "network failed to fetch feed");
    let cancel = CancellationToken::new();

    assert_eq!(scraper.scrape(&cancel, "https://a.example.com").await.unwrap(), feed);
    let err = scraper
        .scrape(&cancel, "https://broken.example.com")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "network failed to fetch feed");

    assert_eq!(scraper.calls(), 2);
    assert_eq!(
        scraper.requested_urls(),
        vec!["https://a.example.com", "https://broken.example.com"]
    );
}

#[tokio::test]
async fn test_mock_scraper_hang_ends_on_cancel() {
    let scraper = MockScraper::new().hang_until_cancelled();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = scraper
        .scrape(&cancel, "https://example.com")
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_mock_scraper_records_calls_after_lock_poisoned() {
    let scraper = MockScraper::new();
    scraper.poison();

    let cancel = CancellationToken::new();
    scraper
        .scrape(&cancel, "https://a.example.com/rss")
        .await
        .unwrap();

    assert_eq!(scraper.calls(), 1);
    assert_eq!(scraper.requested_urls(), vec!["https://a.example.com/rss"]);
}
