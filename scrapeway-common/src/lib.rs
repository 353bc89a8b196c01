//! Common types and utilities shared across Scrapeway crates.
//!
//! This crate defines the shared error type and the observability helpers
//! used throughout the Scrapeway workspace. It is intentionally lightweight
//! so that every crate can depend on it without pulling in the browser or
//! HTTP stacks.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ScrapewayError`] and [`Result`]: Shared error handling
//! - [`truncate_chars`]: character-safe truncation for response payloads
//!
//! # Examples
//!
//! ```rust
//! use scrapeway_common::{truncate_chars, ScrapewayError};
//!
//! assert_eq!(truncate_chars("héllo world", 5), "héllo");
//! let err = ScrapewayError::Aborted("boom".into());
//! assert_eq!(err.to_string(), "Scrape aborted: boom");
//! ```

pub mod observability;

/// Error types used across the Scrapeway system.
#[derive(thiserror::Error, Debug)]
pub enum ScrapewayError {
    /// A driver (browser, WebDriver endpoint) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// A scrape stopped unexpectedly (e.g. a panic inside an extraction step).
    #[error("Scrape aborted: {0}")]
    Aborted(String),
}

/// Convenient alias for results that use [`ScrapewayError`].
pub type Result<T> = std::result::Result<T, ScrapewayError>;

/// Return at most `max_chars` characters of `text`, never splitting a
/// multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
