//! Readability-style article text extraction.
//!
//! Paragraph-like blocks are scored and their scores bubble up to parents
//! and grandparents. The best container (discounted by link density) is taken
//! as the article, together with any sibling that scores close to it or is a
//! plain prose paragraph, and their blocks are emitted one per line.
//! Navigation, ads, and other page chrome are pruned before scoring.
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Blocks shorter than this carry no score.
const MIN_PARAGRAPH_LEN: usize = 25;

/// Siblings of the winning container need at least this score to be merged.
const MIN_SIBLING_SCORE: f64 = 10.0;

/// Share of the winner's score a sibling needs to be merged.
const SIBLING_SCORE_RATIO: f64 = 0.2;

/// Scores closer than this are ties.
const SCORE_EPSILON: f64 = 1e-6;

/// Elements never holding article text.
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "form", "button", "nav",
    "header", "footer", "aside", "menu", "select", "object", "embed",
];

const TABLE_TAGS: &[&str] = &["table", "thead", "tbody", "tfoot", "tr", "td", "th"];

/// Containers that are never pruned by class/id heuristics.
const STRUCTURAL_TAGS: &[&str] = &["html", "body", "article", "main"];

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub include_comments: bool,
    pub include_tables: bool,
    /// Results shorter than this (in characters) are discarded.
    pub min_text_len: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_comments: false,
            include_tables: false,
            min_text_len: 100,
        }
    }
}

fn boilerplate_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:^|[\s_-])(?:nav|navbar|navigation|menu|sidebar|footer|header|masthead|banner|ads?|advert|advertisement|sponsor(?:ed)?|promo|share|sharing|social|cookies?|consent|related|recommended|newsletter|subscribe|breadcrumbs?|popup|modal|widget|skip)(?:$|[\s_-])",
        )
        .expect("boilerplate pattern is valid")
    })
}

fn content_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"article|content|entry|main|post|story|body|text")
            .expect("content pattern is valid")
    })
}

fn comment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:^|[\s_-])(?:comments?|disqus|respond|reply|replies|discussion)(?:$|[\s_-])",
        )
        .expect("comment pattern is valid")
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Lower-cased `class` and `id` attributes, space separated.
fn class_and_id(el: ElementRef<'_>) -> String {
    let v = el.value();
    format!(
        "{} {}",
        v.attr("class").unwrap_or_default(),
        v.attr("id").unwrap_or_default()
    )
    .to_lowercase()
}

/// Whether this element (and everything under it) is page chrome.
fn is_ignored(el: ElementRef<'_>, opts: &ExtractOptions) -> bool {
    let tag = el.value().name();
    if NON_CONTENT_TAGS.contains(&tag) {
        return true;
    }
    if !opts.include_tables && TABLE_TAGS.contains(&tag) {
        return true;
    }
    if STRUCTURAL_TAGS.contains(&tag) {
        return false;
    }
    let names = class_and_id(el);
    if names.trim().is_empty() {
        return false;
    }
    if content_pattern().is_match(&names) {
        return false;
    }
    (!opts.include_comments && comment_pattern().is_match(&names))
        || boilerplate_pattern().is_match(&names)
}

/// Whether `el` or any ancestor below `stop_at` (exclusive) is ignored.
fn in_ignored_subtree(
    el: ElementRef<'_>,
    stop_at: Option<ElementRef<'_>>,
    opts: &ExtractOptions,
) -> bool {
    if is_ignored(el, opts) {
        return true;
    }
    for ancestor in el.ancestors().filter_map(ElementRef::wrap) {
        if stop_at.is_some_and(|s| s.id() == ancestor.id()) {
            break;
        }
        if is_ignored(ancestor, opts) {
            return true;
        }
    }
    false
}

/// Share of `el`'s text that sits inside links.
fn link_density(el: ElementRef<'_>, anchors: &Selector) -> f64 {
    let total = element_text(el).chars().count();
    if total == 0 {
        return 1.0;
    }
    let linked: usize = el
        .select(anchors)
        .map(|a| element_text(a).chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

fn paragraph_score(text: &str) -> f64 {
    let len = text.chars().count();
    let commas = text.matches(',').count();
    1.0 + commas as f64 + (len / 100).min(3) as f64
}

struct Candidate<'a> {
    el: ElementRef<'a>,
    score: f64,
    depth: usize,
}

/// Scored containers in the order they were first reached.
#[derive(Default)]
struct Candidates<'a> {
    order: Vec<Candidate<'a>>,
}

impl<'a> Candidates<'a> {
    fn add(&mut self, el: ElementRef<'a>, score: f64) {
        match self.order.iter_mut().find(|c| c.el.id() == el.id()) {
            Some(c) => c.score += score,
            None => self.order.push(Candidate {
                el,
                score,
                depth: el.ancestors().count(),
            }),
        }
    }

    fn score_of(&self, el: ElementRef<'_>) -> f64 {
        self.order
            .iter()
            .find(|c| c.el.id() == el.id())
            .map_or(0.0, |c| c.score)
    }

    /// Highest score wins; on a tie the outermost container does, so an
    /// article split into equal sections is taken whole.
    fn top(&self) -> Option<&Candidate<'a>> {
        self.order
            .iter()
            .filter(|c| c.score > 0.0)
            .fold(None, |best: Option<&Candidate<'a>>, c| match best {
                Some(b) if c.score > b.score + SCORE_EPSILON => Some(c),
                Some(b) if (c.score - b.score).abs() <= SCORE_EPSILON && c.depth < b.depth => {
                    Some(c)
                }
                None => Some(c),
                keep => keep,
            })
    }
}

/// A `<p>` that reads as prose: long with few links, or short, link-free
/// and sentence-terminated.
fn is_prose_paragraph(el: ElementRef<'_>, anchors: &Selector) -> bool {
    if el.value().name() != "p" {
        return false;
    }
    let text = element_text(el);
    let len = text.chars().count();
    let density = link_density(el, anchors);
    if len >= 80 {
        density < 0.25
    } else {
        len > 0 && density == 0.0 && (text.ends_with('.') || text.contains(". "))
    }
}

/// Extract the primary article text of `html`.
///
/// Returns `None` when nothing article-like is found, e.g. a page made of
/// navigation and ads only.
pub fn extract_article_text(html: &str, opts: &ExtractOptions) -> Option<String> {
    let document = Html::parse_document(html);

    let scoring = if opts.include_tables {
        "p, pre, blockquote, td"
    } else {
        "p, pre, blockquote"
    };
    let scoring = Selector::parse(scoring).ok()?;
    let anchors = Selector::parse("a").ok()?;

    let mut candidates = Candidates::default();
    for block in document.select(&scoring) {
        if in_ignored_subtree(block, None, opts) {
            continue;
        }
        let text = element_text(block);
        if text.chars().count() < MIN_PARAGRAPH_LEN {
            continue;
        }
        let score = paragraph_score(&text);

        if let Some(parent) = block.parent().and_then(ElementRef::wrap) {
            candidates.add(parent, score);
            if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
                candidates.add(grandparent, score / 2.0);
            }
        }
    }
    for c in &mut candidates.order {
        c.score *= 1.0 - link_density(c.el, &anchors);
    }

    let top = candidates.top()?;
    let parts = article_parts(top, &candidates, &anchors, opts);

    let mut lines = Vec::new();
    for part in parts {
        collect_blocks(part, opts, &mut lines)?;
    }
    let text = lines.join("\n");
    (text.chars().count() >= opts.min_text_len).then_some(text)
}

/// The winning container plus the siblings that continue it, in document
/// order.
fn article_parts<'a>(
    top: &Candidate<'a>,
    candidates: &Candidates<'a>,
    anchors: &Selector,
    opts: &ExtractOptions,
) -> Vec<ElementRef<'a>> {
    let Some(parent) = top.el.parent().and_then(ElementRef::wrap) else {
        return vec![top.el];
    };
    let threshold = (top.score * SIBLING_SCORE_RATIO).max(MIN_SIBLING_SCORE);

    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|sibling| {
            if sibling.id() == top.el.id() {
                return true;
            }
            if in_ignored_subtree(*sibling, None, opts) {
                return false;
            }
            candidates.score_of(*sibling) >= threshold
                || is_prose_paragraph(*sibling, anchors)
        })
        .collect()
}

/// Append the text of the content blocks in `part`, one per line, in
/// document order.
fn collect_blocks(
    part: ElementRef<'_>,
    opts: &ExtractOptions,
    lines: &mut Vec<String>,
) -> Option<()> {
    let block_tags: &[&str] = if opts.include_tables {
        &["p", "pre", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "li", "td"]
    } else {
        &["p", "pre", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "li"]
    };

    if block_tags.contains(&part.value().name()) {
        let text = element_text(part);
        if !text.is_empty() {
            lines.push(text);
        }
        return Some(());
    }

    let selector = Selector::parse(&block_tags.join(", ")).ok()?;
    for block in part.select(&selector) {
        if in_ignored_subtree(block, Some(part), opts) {
            continue;
        }
        // nested blocks (li > p, blockquote > p) are emitted by their outer block
        let nested = block
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|a| a.id() != part.id())
            .any(|a| block_tags.contains(&a.value().name()));
        if nested {
            continue;
        }
        let text = element_text(block);
        if !text.is_empty() {
            lines.push(text);
        }
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Ownership</title><script>var tracking = "should never appear";</script></head>
        <body>
            <nav><ul><li><a href="/">Home</a></li><li><a href="/docs">Docs</a></li></ul></nav>
            <div class="ad-banner"><p>Buy the premium plan today, limited offer, act now!</p></div>
            <div id="main-content">
                <article>
                    <h1>Understanding Ownership</h1>
                    <p>Ownership is Rust's most unique feature, and it enables memory safety guarantees without needing a garbage collector.</p>
                    <p>Each value in Rust has a variable that is called its owner, and there can only be one owner at a time.</p>
                    <p>When the owner goes out of scope, the value will be dropped, which frees the memory it was using.</p>
                    <ul><li><p>Borrowing lets code use a value without taking ownership of it.</p></li></ul>
                    <table><tr><td>Rule table cell that only shows up when tables are included in the output.</td></tr></table>
                </article>
                <section class="comments">
                    <p>Great article, thanks so much for writing this, it really helped me out a lot!</p>
                </section>
            </div>
            <footer><p>Copyright 2024, Example Corp. All rights reserved, forever and ever.</p></footer>
        </body>
        </html>
    "#;

    const BOILERPLATE_ONLY: &str = r#"
        <html><body>
            <header class="site-header"><a href="/">Logo</a></header>
            <nav class="menu">
                <a href="/a">Products and services for everyone</a>
                <a href="/b">Pricing, plans, and more details</a>
            </nav>
            <div class="sidebar"><p>Subscribe to our newsletter for weekly updates and news.</p></div>
            <div class="advert"><p>Sponsored: the best deals on laptops, phones, and tablets.</p></div>
            <footer><p>Terms, privacy, cookies, and other legal information live here.</p></footer>
        </body></html>
    "#;

    #[test]
    fn extracts_article_paragraphs_in_order() {
        let text = extract_article_text(ARTICLE, &ExtractOptions::default()).expect("article");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Understanding Ownership");
        assert!(lines[1].starts_with("Ownership is Rust's most unique feature"));
        assert!(text.contains("Borrowing lets code use a value"));
        assert_eq!(text.matches("Borrowing lets code").count(), 1);
    }

    #[test]
    fn drops_chrome_comments_and_tables() {
        let text = extract_article_text(ARTICLE, &ExtractOptions::default()).unwrap();
        assert!(!text.contains("Home"));
        assert!(!text.contains("premium plan"));
        assert!(!text.contains("Great article"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("Rule table cell"));
        assert!(!text.contains("tracking"));
    }

    #[test]
    fn tables_can_be_included() {
        let opts = ExtractOptions {
            include_tables: true,
            ..ExtractOptions::default()
        };
        let text = extract_article_text(ARTICLE, &opts).unwrap();
        assert!(text.contains("Rule table cell"));
    }

    #[test]
    fn boilerplate_only_page_yields_nothing() {
        assert_eq!(
            extract_article_text(BOILERPLATE_ONLY, &ExtractOptions::default()),
            None
        );
    }

    #[test]
    fn short_pages_fall_below_minimum() {
        let html = "<html><body><div><p>Just one modest paragraph of text here.</p></div></body></html>";
        assert_eq!(extract_article_text(html, &ExtractOptions::default()), None);

        let lenient = ExtractOptions {
            min_text_len: 10,
            ..ExtractOptions::default()
        };
        assert_eq!(
            extract_article_text(html, &lenient).as_deref(),
            Some("Just one modest paragraph of text here.")
        );
    }

    #[test]
    fn link_farms_lose_to_prose() {
        let html = r#"<html><body>
            <div class="links">
                <p><a href="/1">A very long link title that goes on and on, and on</a></p>
                <p><a href="/2">Another very long link title, with commas, and more</a></p>
            </div>
            <div class="story">
                <p>The committee met on Tuesday to discuss the budget, the schedule, and the venue for next year.</p>
                <p>After a long debate, members agreed to postpone the final vote until the next session in March.</p>
            </div>
        </body></html>"#;
        let text = extract_article_text(html, &ExtractOptions::default()).unwrap();
        assert!(text.starts_with("The committee met"));
        assert!(!text.contains("link title"));
    }

    const LIST_PARAGRAPH: &str = "Alpha, beta, gamma, delta, epsilon, zeta, eta, theta, iota, and kappa walked into the long meeting room together.";

    #[test]
    fn equal_sections_are_taken_as_one_article() {
        let para = "Memory safety without garbage collection is achieved through ownership, borrowing, and lifetimes checked at compile time.";
        let html = format!(
            r#"<html><body><article>
                <section><p>FIRST {para}</p><p>{para}</p></section>
                <section><p>SECOND {para}</p><p>{para}</p></section>
            </article></body></html>"#
        );
        for _ in 0..8 {
            let text = extract_article_text(&html, &ExtractOptions::default()).unwrap();
            assert!(text.starts_with("FIRST"));
            assert!(text.contains("SECOND"));
            assert_eq!(text.lines().count(), 4);
        }
    }

    #[test]
    fn strong_siblings_and_prose_paragraphs_are_merged() {
        let closing = "The meeting ended late in the evening and everyone agreed to return again next week to continue.";
        let html = format!(
            r#"<html><body>
                <div id="part-one"><p>ONE {p}</p><p>{p}</p><p>{p}</p></div>
                <div id="part-two"><p>TWO {p}</p><p>{p}</p></div>
                <div class="links">
                    <p><a href="/a">Read more about our other stories here</a></p>
                    <p><a href="/b">Browse the full archive of past issues</a></p>
                </div>
                <p>{closing}</p>
            </body></html>"#,
            p = LIST_PARAGRAPH
        );
        let text = extract_article_text(&html, &ExtractOptions::default()).unwrap();
        let one = text.find("ONE").unwrap();
        let two = text.find("TWO").unwrap();
        let end = text.find("The meeting ended").unwrap();
        assert!(one < two && two < end);
        assert!(!text.contains("Read more"));
        assert!(!text.contains("archive"));
    }

    #[test]
    fn weak_siblings_are_left_out() {
        let html = format!(
            r#"<html><body>
                <div id="story"><p>{p}</p><p>{p}</p><p>{p}</p></div>
                <div id="aside-note"><p>A short unrelated note about nothing in particular</p></div>
            </body></html>"#,
            p = LIST_PARAGRAPH
        );
        let text = extract_article_text(&html, &ExtractOptions::default()).unwrap();
        assert!(!text.contains("unrelated note"));
    }

    #[test]
    fn content_wrappers_survive_comment_hints() {
        let html = r#"<html><body>
            <div class="post entry comments-open">
                <p>Cargo workspaces let several crates share one lock file, one target directory, and one set of profiles.</p>
                <p>Members can depend on each other by path, and shared versions live in the root manifest for reuse.</p>
            </div>
            <div id="comments"><p>First! This comment section is now open, so say hello, everyone.</p></div>
        </body></html>"#;
        let text = extract_article_text(html, &ExtractOptions::default()).unwrap();
        assert!(text.starts_with("Cargo workspaces"));
        assert!(!text.contains("First!"));
    }

    #[test]
    fn comment_hint_must_be_a_whole_token() {
        let html = r#"<html><body>
            <div class="commentary-piece">
                <p>Editorial commentary is article text, and it should be kept like any other paragraph here.</p>
                <p>Only real comment threads, like the ones under a blog post, are dropped by the extractor.</p>
            </div>
        </body></html>"#;
        let text = extract_article_text(html, &ExtractOptions::default()).unwrap();
        assert!(text.contains("Editorial commentary"));
    }

    #[test]
    fn garbage_input_does_not_panic() {
        assert_eq!(extract_article_text("", &ExtractOptions::default()), None);
        assert_eq!(extract_article_text("<<<>>>", &ExtractOptions::default()), None);
    }
}
