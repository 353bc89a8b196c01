use crate::engine::SearchEngine;
use crate::types::SearchResult;
use anyhow::{anyhow, Result};
use scrapeway_config::SearchConfig;
use scrapeway_drivers::browser::BrowserSession;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reads organic results off a search engine's result page.
#[derive(Clone)]
pub struct ResultPageExtractor {
    engine: Arc<dyn SearchEngine>,
    consent_timeout: Duration,
    results_timeout: Duration,
    max_blocks: usize,
}

impl ResultPageExtractor {
    pub fn new(engine: Arc<dyn SearchEngine>, config: &SearchConfig) -> Self {
        Self {
            engine,
            consent_timeout: config.consent_timeout(),
            results_timeout: config.results_timeout(),
            max_blocks: config.max_result_blocks,
        }
    }

    pub fn engine(&self) -> &dyn SearchEngine {
        self.engine.as_ref()
    }

    /// Up to `max_results` results in page order.
    ///
    /// Never fails: a blocked page, a layout change, or a browser error all
    /// come back as an empty list, with the cause in the logs.
    pub async fn fetch_results(
        &self,
        session: &dyn BrowserSession,
        query: &str,
        max_results: usize,
    ) -> Vec<SearchResult> {
        match self.try_fetch_results(session, query, max_results).await {
            Ok(results) => results,
            Err(e) => {
                warn!(
                    target: "scrape.serp",
                    engine = self.engine.name(),
                    error = %e,
                    "result page scrape failed"
                );
                Vec::new()
            }
        }
    }

    async fn try_fetch_results(
        &self,
        session: &dyn BrowserSession,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let url = self.engine.search_url(query, max_results)?;
        info!(
            target: "scrape.serp",
            engine = self.engine.name(),
            %query,
            "fetching result page"
        );
        session.goto(url.as_str()).await?;

        if let Some(button) = self.engine.consent_button() {
            match session.click_when_present(button, self.consent_timeout).await {
                Ok(true) => info!(target: "scrape.serp", "accepted consent dialog"),
                Ok(false) => debug!(target: "scrape.serp", "no consent dialog"),
                Err(e) => debug!(target: "scrape.serp", error = %e, "consent dialog not dismissed"),
            }
        }

        if !session
            .wait_for(self.engine.results_marker(), self.results_timeout)
            .await?
        {
            // a CAPTCHA or block page usually has a telling title
            let title = session.title().await.unwrap_or_default();
            warn!(
                target: "scrape.serp",
                engine = self.engine.name(),
                page_title = %title,
                "results did not appear in time"
            );
            return Ok(Vec::new());
        }

        let html = session.source().await?;
        let results = parse_results(self.engine.as_ref(), &html, max_results, self.max_blocks)?;
        info!(
            target: "scrape.serp",
            engine = self.engine.name(),
            count = results.len(),
            "result page parsed"
        );
        Ok(results)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css}: {e}"))
}

/// Read up to `max_results` results from the first `max_blocks` result
/// blocks of `html`. Blocks without a usable anchor or heading are skipped.
pub fn parse_results(
    engine: &dyn SearchEngine,
    html: &str,
    max_results: usize,
    max_blocks: usize,
) -> Result<Vec<SearchResult>> {
    let block_sel = selector(engine.result_block())?;
    let anchor_sel = selector(engine.anchor())?;
    let heading_sel = selector(engine.heading())?;

    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for (idx, block) in document.select(&block_sel).take(max_blocks).enumerate() {
        if results.len() >= max_results {
            break;
        }
        if engine.skip_block(&block) {
            debug!(target: "scrape.serp", block = idx, "skipping non-organic block");
            continue;
        }
        let Some(anchor) = block.select(&anchor_sel).next() else {
            debug!(target: "scrape.serp", block = idx, "block has no link");
            continue;
        };
        let Some(heading) = block.select(&heading_sel).next() else {
            debug!(target: "scrape.serp", block = idx, "block has no heading");
            continue;
        };
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| engine.resolve_link(href))
        else {
            debug!(target: "scrape.serp", block = idx, "block link is not a web URL");
            continue;
        };
        let title = heading
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if title.is_empty() {
            continue;
        }
        results.push(SearchResult { title, url });
    }

    Ok(results)
}
