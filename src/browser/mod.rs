//! Page rendering through a remote-controlled browser.
//!
//! Scrapers never talk to the browser directly; they drive a [`PageDriver`],
//! which [`ChromeSession`] implements over the DevTools protocol.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

mod chrome;
pub mod settings;

pub use chrome::ChromeSession;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("devtools protocol error: {0}")]
    Protocol(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("unexpected script result: {0}")]
    Script(String),
}

/// How an element is addressed on the rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Css(&'static str),
    XPath(&'static str),
}

impl Locator {
    pub fn expression(&self) -> &'static str {
        match self {
            Locator::Css(css) => css,
            Locator::XPath(xpath) => xpath,
        }
    }
}

/// What the scrapers need to know about a live element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ElementSnapshot {
    pub text: String,
    #[serde(default)]
    pub class: String,
}

impl ElementSnapshot {
    pub fn has_class_fragment(&self, fragment: &str) -> bool {
        self.class.contains(fragment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    Top,
    Bottom,
}

/// A single browser tab, driven serially.
#[async_trait]
pub trait PageDriver: Send {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    async fn reload(&mut self) -> Result<(), BrowserError>;

    /// Fully rendered HTML of the current document.
    async fn content(&mut self) -> Result<String, BrowserError>;

    async fn scroll(&mut self, to: Scroll) -> Result<(), BrowserError>;

    /// Polls `document.readyState` until it is `complete`. Returns `false`
    /// on timeout.
    async fn wait_until_ready(&mut self, timeout: Duration) -> Result<bool, BrowserError>;

    /// Polls for an element. `Ok(None)` means it did not appear in time.
    async fn wait_for(
        &mut self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<Option<ElementSnapshot>, BrowserError>;

    /// Scrolls the element into view and clicks it from script, which also
    /// works when the element is covered by an overlay.
    async fn click(&mut self, locator: Locator) -> Result<(), BrowserError>;

    /// Accepts the consent banner if one shows up within `timeout`.
    async fn accept_cookies(&mut self, timeout: Duration) -> Result<bool, BrowserError>;
}
