use crate::browser::{
    session::{BrowserSession, Target},
    stealth::StealthScripts,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{error::CmdError, Client, Locator};
use std::time::Duration;
use tracing::{debug, warn};

/// [`BrowserSession`] backed by a `fantoccini` WebDriver client.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn apply_stealth(&self) {
        // Pages with a strict CSP can refuse the script; the page is still usable.
        if let Err(e) = self
            .client
            .execute(StealthScripts::get_core_evasions(), vec![])
            .await
        {
            debug!(target: "browser.session", error = %e, "stealth script rejected");
        }
    }
}

fn locator<'a>(target: Target<'a>) -> Locator<'a> {
    match target {
        Target::Css(s) => Locator::Css(s),
        Target::XPath(s) => Locator::XPath(s),
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        self.apply_stealth().await;
        Ok(())
    }

    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<bool> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(css))
            .await
        {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(anyhow::Error::from(e).context(format!("waiting for {css}"))),
        }
    }

    async fn click_when_present(&self, target: Target<'_>, timeout: Duration) -> Result<bool> {
        let element = match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(locator(target))
            .await
        {
            Ok(el) => el,
            Err(CmdError::WaitTimeout) => return Ok(false),
            Err(e) => return Err(anyhow::Error::from(e).context(format!("looking up {target}"))),
        };
        element
            .click()
            .await
            .with_context(|| format!("clicking {target}"))?;
        Ok(true)
    }

    async fn source(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    async fn title(&self) -> Result<String> {
        self.client.title().await.map_err(anyhow::Error::from)
    }

    async fn ready_state(&self) -> Result<String> {
        let state = self
            .client
            .execute("return document.readyState;", vec![])
            .await?;
        Ok(state.as_str().unwrap_or_default().to_string())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        if let Err(e) = self.client.close().await {
            warn!(target: "browser.session", error = %e, "browser did not shut down cleanly");
            return Err(e.into());
        }
        debug!(target: "browser.session", "browser session closed");
        Ok(())
    }
}
