//! Feed parsing and fact mapping.

use anyhow::Result;
use feed_rs::model::Entry;
use std::collections::HashSet;
use std::io::Cursor;

use super::types::FactRecord;

/// Parse a feed body (RSS or Atom) into fact records, preserving the feed's
/// original order. Entries without a usable title are skipped.
pub fn parse_feed(body: &str) -> Result<Vec<FactRecord>> {
    let feed = feed_rs::parser::parse(Cursor::new(body))?;
    Ok(feed.entries.into_iter().filter_map(map_entry).collect())
}

fn map_entry(entry: Entry) -> Option<FactRecord> {
    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())?;

    let date = entry
        .published
        .or(entry.updated)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    // Prefer the entry's link; fall back to its id when that is itself a URL.
    let link = entry
        .links
        .into_iter()
        .next()
        .map(|link| link.href)
        .filter(|href| !href.trim().is_empty())
        .or_else(|| is_valid_url(&entry.id).then(|| entry.id.clone()))
        .unwrap_or_default();

    Some(FactRecord { title, date, link })
}

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = url::Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

/// Truncate to the first `max_articles` records, then drop later records
/// whose title already appeared, preserving order. Capping happens before
/// deduplication to bound work, so duplicate titles can leave the final list
/// below the cap.
pub fn cap_and_dedupe(records: Vec<FactRecord>, max_articles: usize) -> Vec<FactRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .take(max_articles)
        .filter(|record| seen.insert(record.title.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(title: &str, date: &str, link: &str) -> FactRecord {
        FactRecord {
            title: title.to_string(),
            date: date.to_string(),
            link: link.to_string(),
        }
    }

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>search results</title>
    <item>
      <title>選挙戦が最終盤に</title>
      <link>https://example.com/a</link>
      <pubDate>Mon, 18 Aug 2025 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title>投票率の行方</title>
      <link>https://example.com/b</link>
      <pubDate>Sun, 17 Aug 2025 21:00:00 GMT</pubDate>
    </item>
    <item>
      <title>候補者の討論会</title>
      <link>https://example.com/c</link>
    </item>
    <item>
      <title>選挙戦が最終盤に</title>
      <link>https://example.com/a-dup</link>
      <pubDate>Sun, 17 Aug 2025 12:00:00 GMT</pubDate>
    </item>
    <item>
      <title>開票速報の準備進む</title>
      <link>https://example.com/d</link>
      <pubDate>Sat, 16 Aug 2025 08:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed_preserves_order_and_formats_dates() {
        let records = parse_feed(SAMPLE_RSS).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].title, "選挙戦が最終盤に");
        assert_eq!(records[0].date, "2025-08-18");
        assert_eq!(records[0].link, "https://example.com/a");
        // Missing pubDate maps to an empty date, not an error.
        assert_eq!(records[2].title, "候補者の討論会");
        assert_eq!(records[2].date, "");
    }

    #[test]
    fn test_cap_then_dedupe() {
        let records = parse_feed(SAMPLE_RSS).unwrap();

        // The duplicate title sits outside the cap window: 3 unique facts.
        let facts = cap_and_dedupe(records.clone(), 3);
        assert_eq!(facts.len(), 3);
        assert_eq!(facts[0].title, "選挙戦が最終盤に");
        assert_eq!(facts[0].link, "https://example.com/a");
        assert_eq!(facts[1].title, "投票率の行方");
        assert_eq!(facts[2].title, "候補者の討論会");

        // Widening the window to include the duplicate drops it again, so
        // the result can land below the cap.
        let facts = cap_and_dedupe(records, 4);
        assert_eq!(facts.len(), 3);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let records = vec![
            fact("same", "2025-08-18", "https://example.com/first"),
            fact("other", "2025-08-17", "https://example.com/other"),
            fact("same", "2025-08-16", "https://example.com/second"),
        ];
        let facts = cap_and_dedupe(records, 10);
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].link, "https://example.com/first");
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/a"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("tag:example.com,2025:entry-1"));
        assert!(!is_valid_url("not a url"));
    }
}
