//! Search-result scraping and article extraction.
//!
//! - Result-page layouts per search engine (`engine`)
//! - Result-page extraction over a live browser session (`serp`)
//! - Readability-style boilerplate removal (`extract`)
//! - Rendered-page content fetching (`content`)
//! - The per-request pipeline tying them together (`orchestrator`)

pub mod content;
pub mod engine;
pub mod extract;
pub mod orchestrator;
pub mod serp;
pub mod types;

pub use content::ContentExtractor;
pub use engine::{engine_for, SearchEngine};
pub use extract::{extract_article_text, ExtractOptions};
pub use orchestrator::Orchestrator;
pub use serp::ResultPageExtractor;
pub use types::{ScrapedItem, SearchResult};
