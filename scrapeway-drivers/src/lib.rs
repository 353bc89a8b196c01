//! Driver layer for browser automation.
//!
//! This crate exposes the browser session abstraction the scraper runs on and
//! its WebDriver-backed implementation.
//!
//! - [`browser::session::BrowserSession`]: one live browser, owned by one scrape
//! - [`browser::session::SessionLauncher`]: opens sessions on demand
//! - [`browser::driver::WebDriverLauncher`]: launches Chrome through chromedriver
//! - [`browser::page::WebDriverSession`]: `fantoccini`-backed session
//! - [`browser::stealth`]: launch arguments and JS evasions
//! - `browser::fake` (feature `testing`): scripted in-memory sessions
pub mod browser;
