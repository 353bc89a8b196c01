//! One scrape request end to end: open a browser session, read the result
//! page, visit each hit, and close the session again.
use crate::content::ContentExtractor;
use crate::engine::engine_for;
use crate::serp::ResultPageExtractor;
use crate::types::ScrapedItem;
use futures::FutureExt;
use scrapeway_common::{Result, ScrapewayError};
use scrapeway_config::ScrapewayConfig;
use scrapeway_drivers::browser::{BrowserSession, SessionLauncher};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct Orchestrator {
    launcher: Arc<dyn SessionLauncher>,
    results: ResultPageExtractor,
    content: ContentExtractor,
    max_chars: usize,
}

impl Orchestrator {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        results: ResultPageExtractor,
        content: ContentExtractor,
        max_chars: usize,
    ) -> Self {
        Self {
            launcher,
            results,
            content,
            max_chars,
        }
    }

    pub fn from_config(launcher: Arc<dyn SessionLauncher>, cfg: &ScrapewayConfig) -> Self {
        Self::new(
            launcher,
            ResultPageExtractor::new(engine_for(cfg.search.engine), &cfg.search),
            ContentExtractor::new(&cfg.content),
            cfg.content.max_chars,
        )
    }

    /// Search for `query` and return up to `num_results` items with their
    /// article text.
    ///
    /// Every request gets its own browser session, and that session is
    /// closed exactly once however the scrape ends. Only a failure to open
    /// the session or a panic inside the pipeline surfaces as an error;
    /// individual pages that fail contribute empty content instead.
    pub async fn run(&self, query: &str, num_results: usize) -> Result<Vec<ScrapedItem>> {
        let scrape_id = Uuid::new_v4();
        let span = info_span!(
            target: "scrape.run",
            "scrape",
            %scrape_id,
            engine = self.results.engine().name()
        );
        self.run_in_session(query, num_results).instrument(span).await
    }

    async fn run_in_session(&self, query: &str, num_results: usize) -> Result<Vec<ScrapedItem>> {
        info!(target: "scrape.run", %query, num_results, "scrape started");
        let session = self.launcher.launch().await?;

        let outcome = AssertUnwindSafe(self.collect(session.as_ref(), query, num_results))
            .catch_unwind()
            .await;

        if let Err(e) = session.close().await {
            warn!(target: "browser.session", error = %e, "failed to close browser session");
        }

        match outcome {
            Ok(items) => {
                info!(target: "scrape.run", count = items.len(), "scrape finished");
                Ok(items)
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(target: "scrape.run", %reason, "scrape panicked");
                Err(ScrapewayError::Aborted(reason))
            }
        }
    }

    async fn collect(
        &self,
        session: &dyn BrowserSession,
        query: &str,
        num_results: usize,
    ) -> Vec<ScrapedItem> {
        let hits = self
            .results
            .fetch_results(session, query, num_results)
            .await;
        if hits.is_empty() {
            warn!(target: "scrape.run", %query, "no search results found");
            return Vec::new();
        }

        let mut items = Vec::with_capacity(hits.len());
        for hit in hits {
            let content = self.content.fetch_content(session, &hit.url).await;
            items.push(ScrapedItem::new(hit, &content, self.max_chars));
        }
        items
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
