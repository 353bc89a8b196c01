use crate::extract::{extract_article_text, ExtractOptions};
use anyhow::Result;
use scrapeway_config::ContentConfig;
use scrapeway_drivers::browser::BrowserSession;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Loads a page in the browser and pulls the article text out of it.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    settle_max: Duration,
    settle_poll: Duration,
    options: ExtractOptions,
}

impl ContentExtractor {
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            settle_max: config.settle_max(),
            settle_poll: config.settle_poll(),
            options: ExtractOptions {
                include_comments: config.include_comments,
                include_tables: config.include_tables,
                min_text_len: config.min_text_len,
            },
        }
    }

    /// Article text of `url`, or an empty string.
    ///
    /// Never fails; navigation or extraction problems are logged and yield
    /// `""` so one bad site does not sink the batch.
    pub async fn fetch_content(&self, session: &dyn BrowserSession, url: &str) -> String {
        info!(target: "scrape.content", %url, "fetching page content");
        match self.try_fetch_content(session, url).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(target: "scrape.content", %url, "no article text found");
                String::new()
            }
            Err(e) => {
                warn!(target: "scrape.content", %url, error = %e, "could not scrape content");
                String::new()
            }
        }
    }

    async fn try_fetch_content(
        &self,
        session: &dyn BrowserSession,
        url: &str,
    ) -> Result<Option<String>> {
        session.goto(url).await?;
        let html = self.settled_source(session).await?;
        Ok(extract_article_text(&html, &self.options))
    }

    /// Poll until the document reports `complete` and its source stops
    /// changing size, or until `settle_max` has passed.
    async fn settled_source(&self, session: &dyn BrowserSession) -> Result<String> {
        let started = Instant::now();
        let mut last_len = None;
        loop {
            sleep(self.settle_poll).await;
            // scripts may be blocked on the page; fall back to size stability alone
            let complete = session
                .ready_state()
                .await
                .map(|state| state == "complete")
                .unwrap_or(true);
            let html = session.source().await?;
            if complete && last_len == Some(html.len()) {
                return Ok(html);
            }
            if started.elapsed() >= self.settle_max {
                debug!(
                    target: "scrape.content",
                    waited_ms = started.elapsed().as_millis() as u64,
                    "page still changing; using current source"
                );
                return Ok(html);
            }
            last_len = Some(html.len());
        }
    }
}
