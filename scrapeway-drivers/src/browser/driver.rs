use crate::browser::{
    page::WebDriverSession,
    session::{BrowserSession, SessionLauncher},
    stealth::build_launch_arguments,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::ClientBuilder;
use serde_json::json;
use tracing::{debug, info};
use url::Url;
use webdriver::capabilities::Capabilities;

/// Everything needed to start one browser.
#[derive(Clone)]
pub struct LaunchOptions {
    /// WebDriver service the session is created on, e.g. chromedriver.
    pub webdriver_url: String,
    pub headless: bool,
    /// Full proxy URL including credentials, if any.
    pub proxy_url: Option<String>,
    pub user_agent: Option<String>,
    pub window_size: (u32, u32),
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            proxy_url: None,
            user_agent: None,
            window_size: (1920, 1080),
        }
    }
}

impl std::fmt::Debug for LaunchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchOptions")
            .field("webdriver_url", &self.webdriver_url)
            .field("headless", &self.headless)
            .field("proxy", &self.proxy_host())
            .field("user_agent", &self.user_agent)
            .field("window_size", &self.window_size)
            .finish()
    }
}

impl LaunchOptions {
    /// Host part of the proxy URL; the only proxy detail that is safe to log.
    pub fn proxy_host(&self) -> Option<String> {
        let proxy = self.proxy_url.as_deref()?;
        Url::parse(proxy)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        let args = build_launch_arguments(self);
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "excludeSwitches": ["enable-automation"],
            }),
        );
        caps
    }
}

/// Launches Chrome sessions through a running WebDriver service.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    options: LaunchOptions,
}

impl WebDriverLauncher {
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        if let Some(host) = self.options.proxy_host() {
            info!(target: "browser.session", proxy = %host, "configured to use proxy");
        }
        debug!(
            target: "browser.session",
            webdriver = %self.options.webdriver_url,
            headless = self.options.headless,
            "opening browser session"
        );

        let client = ClientBuilder::native()
            .capabilities(self.options.capabilities())
            .connect(&self.options.webdriver_url)
            .await
            .with_context(|| {
                format!(
                    "failed to open WebDriver session at {}",
                    self.options.webdriver_url
                )
            })?;

        Ok(Box::new(WebDriverSession::new(client)))
    }
}
