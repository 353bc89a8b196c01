use scrapeway_common::truncate_chars;
use serde::{Deserialize, Serialize};

/// One organic hit read off a result page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
}

/// A search hit together with the article text behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedItem {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl ScrapedItem {
    /// Build the item, keeping at most `max_chars` characters of `content`.
    pub fn new(result: SearchResult, content: &str, max_chars: usize) -> Self {
        Self {
            title: result.title,
            url: result.url,
            content: truncate_chars(content, max_chars),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_content_is_capped() {
        let hit = SearchResult {
            title: "Long read".into(),
            url: "https://example.com/long".into(),
        };
        let item = ScrapedItem::new(hit, &"word ".repeat(1000), 2000);
        assert_eq!(item.content.chars().count(), 2000);
        assert_eq!(item.title, "Long read");
    }

    #[test]
    fn item_serializes_flat() {
        let item = ScrapedItem::new(
            SearchResult {
                title: "T".into(),
                url: "https://example.com/".into(),
            },
            "body",
            2000,
        );
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"title": "T", "url": "https://example.com/", "content": "body"})
        );
    }
}
