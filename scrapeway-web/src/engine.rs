//! Result-page layouts.
//!
//! Each engine describes where its organic results live in the DOM and how
//! its links resolve to target URLs. Markup changes on the engine side are
//! absorbed here; nothing else in the crate knows about selectors.
use anyhow::Result;
use scrapeway_config::EngineKind;
use scrapeway_drivers::browser::Target;
use scraper::ElementRef;
use std::sync::Arc;
use url::Url;

pub trait SearchEngine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Result-page URL for `query`. The query is URL-encoded.
    fn search_url(&self, query: &str, max_results: usize) -> Result<Url>;

    /// Consent/cookie button to dismiss before reading results, if the
    /// engine shows one.
    fn consent_button(&self) -> Option<Target<'static>> {
        None
    }

    /// CSS marker whose presence means results have rendered.
    fn results_marker(&self) -> &'static str;

    /// CSS selector of one organic result block.
    fn result_block(&self) -> &'static str;

    /// Anchor inside a block carrying the target link.
    fn anchor(&self) -> &'static str;

    /// Heading inside a block carrying the title.
    fn heading(&self) -> &'static str;

    /// Blocks to drop even when well-formed (ads, widgets).
    fn skip_block(&self, _block: &ElementRef<'_>) -> bool {
        false
    }

    /// Turn a raw `href` into the absolute target URL.
    fn resolve_link(&self, href: &str) -> Option<String>;
}

/// Engine implementation for the configured kind.
pub fn engine_for(kind: EngineKind) -> Arc<dyn SearchEngine> {
    match kind {
        EngineKind::Google => Arc::new(Google),
        EngineKind::DuckduckgoHtml => Arc::new(DuckDuckGoHtml),
        EngineKind::Duckduckgo => Arc::new(DuckDuckGo),
    }
}

fn resolve_against(base: &str, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    Url::parse(base).ok()?.join(href).ok()
}

fn http_only(url: Url) -> Option<String> {
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Follow a redirect wrapper if `url` is one, otherwise keep it.
fn unwrap_redirect(url: Url, host_suffix: &str, path: &str, param: &str) -> Option<String> {
    let is_redirect = url
        .host_str()
        .is_some_and(|h| h.ends_with(host_suffix))
        && url.path() == path;
    if is_redirect {
        let target = query_param(&url, param)?;
        return Url::parse(&target).ok().and_then(http_only);
    }
    http_only(url)
}

/// Google web results (`div.g` blocks).
#[derive(Debug, Clone, Copy, Default)]
pub struct Google;

impl SearchEngine for Google {
    fn name(&self) -> &'static str {
        "google"
    }

    fn search_url(&self, query: &str, max_results: usize) -> Result<Url> {
        let num = max_results.to_string();
        Ok(Url::parse_with_params(
            "https://www.google.com/search",
            &[("q", query), ("num", num.as_str())],
        )?)
    }

    fn consent_button(&self) -> Option<Target<'static>> {
        Some(Target::XPath(
            "//button[.//div[contains(text(), 'Accept all')]]",
        ))
    }

    fn results_marker(&self) -> &'static str {
        "div.g"
    }

    fn result_block(&self) -> &'static str {
        "div.g"
    }

    fn anchor(&self) -> &'static str {
        "a[href]"
    }

    fn heading(&self) -> &'static str {
        "h3"
    }

    fn resolve_link(&self, href: &str) -> Option<String> {
        let url = resolve_against("https://www.google.com/", href)?;
        let target = unwrap_redirect(url, "google.com", "/url", "q")?;
        // links back into google itself are navigation, not results
        let host = Url::parse(&target).ok()?.host_str()?.to_string();
        (!host.ends_with("google.com")).then_some(target)
    }
}

/// DuckDuckGo's script-free endpoint (`html.duckduckgo.com`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDuckGoHtml;

impl SearchEngine for DuckDuckGoHtml {
    fn name(&self) -> &'static str {
        "duckduckgo-html"
    }

    fn search_url(&self, query: &str, _max_results: usize) -> Result<Url> {
        Ok(Url::parse_with_params(
            "https://html.duckduckgo.com/html/",
            &[("q", query)],
        )?)
    }

    fn results_marker(&self) -> &'static str {
        "div.result"
    }

    fn result_block(&self) -> &'static str {
        "div.result"
    }

    fn anchor(&self) -> &'static str {
        "a.result__a"
    }

    fn heading(&self) -> &'static str {
        "h2.result__title"
    }

    fn skip_block(&self, block: &ElementRef<'_>) -> bool {
        block.value().classes().any(|c| c == "result--ad")
    }

    fn resolve_link(&self, href: &str) -> Option<String> {
        let url = resolve_against("https://duckduckgo.com/", href)?;
        unwrap_redirect(url, "duckduckgo.com", "/l/", "uddg")
    }
}

/// DuckDuckGo's script-rendered results page.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDuckGo;

impl SearchEngine for DuckDuckGo {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    fn search_url(&self, query: &str, _max_results: usize) -> Result<Url> {
        Ok(Url::parse_with_params(
            "https://duckduckgo.com/",
            &[("q", query), ("ia", "web")],
        )?)
    }

    fn results_marker(&self) -> &'static str {
        r#"article[data-testid="result"]"#
    }

    fn result_block(&self) -> &'static str {
        r#"article[data-testid="result"]"#
    }

    fn anchor(&self) -> &'static str {
        r#"a[data-testid="result-title-a"]"#
    }

    fn heading(&self) -> &'static str {
        "h2"
    }

    fn resolve_link(&self, href: &str) -> Option<String> {
        let url = resolve_against("https://duckduckgo.com/", href)?;
        unwrap_redirect(url, "duckduckgo.com", "/l/", "uddg")
    }
}
