//! Feed fixtures and test content generators

use job_scraper::{Feed, FeedItem, FeedRegistry, HuntConfig};

/// Feed whose items link to `https://example.com/<prefix>/<i>` for `i` in `0..count`
pub fn numbered_feed(prefix: &str, count: usize) -> Feed {
    Feed {
        title: format!("{prefix} jobs"),
        items: (0..count)
            .map(|i| FeedItem {
                title: format!("Test Job {i}"),
                link: numbered_link(prefix, i),
                description: Some("Test Description".to_string()),
                ..FeedItem::default()
            })
            .collect(),
    }
}

/// Link of item `i` in [`numbered_feed`]
pub fn numbered_link(prefix: &str, i: usize) -> String {
    format!("https://example.com/{prefix}/{i}")
}

/// Registry of `count` feeds named `Source0..` on distinct hosts
pub fn registry(count: usize) -> FeedRegistry {
    FeedRegistry::new((0..count).map(|i| {
        (
            format!("Source{i}"),
            format!("https://feed{i}.example.com/rss"),
        )
    }))
}

/// Default hunt settings scraping `feeds`
pub fn hunt_config(feeds: FeedRegistry) -> HuntConfig {
    HuntConfig {
        feeds,
        ..HuntConfig::default()
    }
}

/// RSS 2.0 document listing `(title, link)` items, all published on the same date
pub fn rss_document(items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link)| {
            format!(
                r#"
    <item>
      <title>{title}</title>
      <link>{link}</link>
      <description>About {title}</description>
      <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
    </item>"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Board</title>
    <link>https://board.example.com</link>
    <description>Test job board</description>{items}
  </channel>
</rss>"#
    )
}

/// Atom document listing `(title, link)` entries without publish dates
pub fn atom_document(entries: &[(&str, &str)]) -> String {
    let entries: String = entries
        .iter()
        .map(|(title, link)| {
            format!(
                r#"
  <entry>
    <title>{title}</title>
    <id>{link}</id>
    <link rel="alternate" href="{link}"/>
    <updated>2024-01-02T08:30:00Z</updated>
    <summary>About {title}</summary>
  </entry>"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Board</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2024-01-02T08:30:00Z</updated>{entries}
</feed>"#
    )
}
