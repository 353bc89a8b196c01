use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// How to find an element on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Css(&'a str),
    XPath(&'a str),
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Css(s) => write!(f, "css:{s}"),
            Target::XPath(s) => write!(f, "xpath:{s}"),
        }
    }
}

/// A live browser owned by a single scrape.
///
/// Every operation is bounded: navigation by the driver's page-load timeout,
/// waits by the `timeout` argument. Implementations must be usable from one
/// task at a time; sharing across requests is not supported.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate the session to `url`.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until an element matching `css` exists.
    ///
    /// Returns `Ok(false)` when `timeout` elapses first.
    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<bool>;

    /// Click `target` once it shows up, waiting at most `timeout`.
    ///
    /// Returns `Ok(false)` when nothing matched in time.
    async fn click_when_present(&self, target: Target<'_>, timeout: Duration) -> Result<bool>;

    /// Full HTML of the rendered page.
    async fn source(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// Value of `document.readyState`.
    async fn ready_state(&self) -> Result<String>;

    /// Shut the browser down. Consumes the session.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens a fresh [`BrowserSession`] per call.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}
