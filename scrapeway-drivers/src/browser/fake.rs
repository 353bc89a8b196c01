//! Scripted in-memory browser for tests.
//!
//! Pages are keyed by exact URL. Selector waits are answered by parsing the
//! page HTML, so a test page behaves like the DOM a real browser would show.
use crate::browser::session::{BrowserSession, SessionLauncher, Target};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted page.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub html: String,
    pub title: String,
    /// `Target` strings (see its `Display`) that can be clicked on this page.
    pub clickable: Vec<String>,
    /// `document.readyState` reports "loading" for this many polls.
    pub loading_polls: usize,
    pub fail_source: bool,
    pub panic_on_source: bool,
}

impl FakePage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_clickable(mut self, target: Target<'_>) -> Self {
        self.clickable.push(target.to_string());
        self
    }
}

/// Counters shared between a launcher and every session it opened.
#[derive(Debug, Default)]
pub struct FakeStats {
    launches: AtomicUsize,
    closes: AtomicUsize,
    visited: Mutex<Vec<String>>,
    clicks: Mutex<Vec<String>>,
}

impl FakeStats {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeLauncher {
    pages: Arc<HashMap<String, FakePage>>,
    stats: Arc<FakeStats>,
    fail_launch: bool,
    fail_close: bool,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` for navigations to exactly `url`.
    pub fn page(mut self, url: impl Into<String>, page: FakePage) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.into(), page);
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn stats(&self) -> Arc<FakeStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        if self.fail_launch {
            return Err(anyhow!("chromedriver refused the session"));
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            pages: self.pages.clone(),
            stats: self.stats.clone(),
            current: Mutex::new(None),
            polls: AtomicUsize::new(0),
            fail_close: self.fail_close,
        }))
    }
}

pub struct FakeSession {
    pages: Arc<HashMap<String, FakePage>>,
    stats: Arc<FakeStats>,
    current: Mutex<Option<String>>,
    polls: AtomicUsize,
    fail_close: bool,
}

impl FakeSession {
    fn current_page(&self) -> Result<FakePage> {
        let url = self
            .current
            .lock()
            .map_err(|_| anyhow!("fake session poisoned"))?
            .clone()
            .ok_or_else(|| anyhow!("no page loaded"))?;
        self.pages
            .get(&url)
            .cloned()
            .ok_or_else(|| anyhow!("no page scripted for {url}"))
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        if let Ok(mut visited) = self.stats.visited.lock() {
            visited.push(url.to_string());
        }
        if !self.pages.contains_key(url) {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"));
        }
        if let Ok(mut current) = self.current.lock() {
            *current = Some(url.to_string());
        }
        self.polls.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<bool> {
        let page = self.current_page()?;
        let found = {
            let selector =
                Selector::parse(css).map_err(|e| anyhow!("invalid selector {css}: {e}"))?;
            Html::parse_document(&page.html)
                .select(&selector)
                .next()
                .is_some()
        };
        if !found {
            tokio::time::sleep(timeout).await;
        }
        Ok(found)
    }

    async fn click_when_present(&self, target: Target<'_>, timeout: Duration) -> Result<bool> {
        let page = self.current_page()?;
        let key = target.to_string();
        if page.clickable.contains(&key) {
            if let Ok(mut clicks) = self.stats.clicks.lock() {
                clicks.push(key);
            }
            return Ok(true);
        }
        tokio::time::sleep(timeout).await;
        Ok(false)
    }

    async fn source(&self) -> Result<String> {
        let page = self.current_page()?;
        if page.panic_on_source {
            panic!("renderer crashed while reading page source");
        }
        if page.fail_source {
            return Err(anyhow!("invalid session id"));
        }
        Ok(page.html)
    }

    async fn title(&self) -> Result<String> {
        Ok(self.current_page()?.title)
    }

    async fn ready_state(&self) -> Result<String> {
        let page = self.current_page()?;
        let polls = self.polls.fetch_add(1, Ordering::SeqCst);
        if polls < page.loading_polls {
            Ok("loading".to_string())
        } else {
            Ok("complete".to_string())
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(anyhow!("chromedriver went away"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_page_answers_waits_and_counts_closes() {
        let launcher = FakeLauncher::new().page(
            "https://example.test/",
            FakePage::new("<html><body><div class='hit'>x</div></body></html>").titled("Example"),
        );
        let stats = launcher.stats();

        let session = launcher.launch().await.unwrap();
        session.goto("https://example.test/").await.unwrap();
        assert!(session
            .wait_for("div.hit", Duration::from_millis(1))
            .await
            .unwrap());
        assert!(!session
            .wait_for("div.miss", Duration::from_millis(1))
            .await
            .unwrap());
        assert_eq!(session.title().await.unwrap(), "Example");
        session.close().await.unwrap();

        assert_eq!(stats.launches(), 1);
        assert_eq!(stats.closes(), 1);
        assert_eq!(stats.visited(), vec!["https://example.test/".to_string()]);
    }

    #[tokio::test]
    async fn unknown_url_fails_navigation() {
        let launcher = FakeLauncher::new();
        let session = launcher.launch().await.unwrap();
        assert!(session.goto("https://unscripted.test/").await.is_err());
    }

    #[tokio::test]
    async fn ready_state_flips_after_loading_polls() {
        let page = FakePage {
            loading_polls: 2,
            ..FakePage::new("<p>hi</p>")
        };
        let launcher = FakeLauncher::new().page("https://slow.test/", page);
        let session = launcher.launch().await.unwrap();
        session.goto("https://slow.test/").await.unwrap();
        assert_eq!(session.ready_state().await.unwrap(), "loading");
        assert_eq!(session.ready_state().await.unwrap(), "loading");
        assert_eq!(session.ready_state().await.unwrap(), "complete");
    }
}
