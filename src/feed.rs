use std::time::Duration;

use regex::Regex;
use rss::Channel;
use thiserror::Error;

use crate::domain::{FeedEntry, PageLink, PageNumber};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed feed: {0}")]
    Parse(#[from] rss::Error),
    #[error("Feed has no entries")]
    Empty,
}

pub trait FeedSource {
    fn latest_entry(
        &self,
    ) -> impl std::future::Future<Output = Result<FeedEntry, FeedError>> + Send;
}

pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl FeedSource for HttpFeedSource {
    async fn latest_entry(&self) -> Result<FeedEntry, FeedError> {
        log::debug!("Fetching {}", self.url);
        let bytes = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        latest_entry_from(&bytes[..])
    }
}

pub fn latest_entry_from(body: &[u8]) -> Result<FeedEntry, FeedError> {
    let channel = Channel::read_from(body)?;
    channel
        .items()
        .first()
        .and_then(|item| item.link())
        .map(|link| FeedEntry {
            link: link.to_string(),
        })
        .ok_or(FeedError::Empty)
}

#[derive(Clone)]
pub struct PageLinkPattern {
    regex: Regex,
}

impl PageLinkPattern {
    pub fn new() -> Self {
        Self {
            regex: Regex::new(r"/\?s=([0-9]+)&p=([0-9]+)").expect("page link pattern is valid"),
        }
    }

    pub fn parse(&self, link: &str) -> Option<PageLink> {
        let captures = self.regex.captures(link)?;
        let story = captures[1].parse().ok()?;
        let page: PageNumber = captures[2].parse().ok()?;
        Some(PageLink { story, page })
    }
}

impl Default for PageLinkPattern {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Feed double that always returns the same link, or an empty feed.
    pub struct StaticFeedSource {
        pub link: Option<String>,
    }

    impl StaticFeedSource {
        pub fn with_link(link: &str) -> Self {
            Self {
                link: Some(link.to_string()),
            }
        }
    }

    impl FeedSource for StaticFeedSource {
        async fn latest_entry(&self) -> Result<FeedEntry, FeedError> {
            self.link
                .clone()
                .map(|link| FeedEntry { link })
                .ok_or(FeedError::Empty)
        }
    }

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>MS Paint Adventures</title>
    <link>http://www.mspaintadventures.com/</link>
    <description>Updates</description>
    <item>
      <title>Homestuck page 1902</title>
      <link>http://www.mspaintadventures.com/?s=6&amp;p=001902</link>
    </item>
    <item>
      <title>Homestuck page 1901</title>
      <link>http://www.mspaintadventures.com/?s=6&amp;p=001901</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn latest_entry_is_first_item() {
        let entry = latest_entry_from(FEED.as_bytes()).unwrap();
        assert_eq!(entry.link, "http://www.mspaintadventures.com/?s=6&p=001902");
    }

    #[test]
    fn channel_without_items_is_empty() {
        let feed = r#"<rss version="2.0"><channel>
            <title>t</title><link>l</link><description>d</description>
        </channel></rss>"#;
        assert!(matches!(
            latest_entry_from(feed.as_bytes()),
            Err(FeedError::Empty)
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            latest_entry_from(b"<html>nope"),
            Err(FeedError::Parse(_))
        ));
    }

    #[test]
    fn pattern_extracts_story_and_page() {
        let pattern = PageLinkPattern::new();
        assert_eq!(
            pattern.parse("http://www.mspaintadventures.com/?s=6&p=001902"),
            Some(PageLink {
                story: 6,
                page: PageNumber::new(1902)
            })
        );
    }

    #[test]
    fn pattern_rejects_other_links() {
        let pattern = PageLinkPattern::new();
        assert_eq!(pattern.parse("http://www.mspaintadventures.com/news"), None);
        assert_eq!(pattern.parse("http://example.com/?p=12&s=6"), None);
    }
}
