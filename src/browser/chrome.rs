use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::ReloadParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::{settings, BrowserError, ElementSnapshot, Locator, PageDriver, Scroll};
use crate::config::Config;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const CONSENT_SCRIPT: &str = r#"(() => {
    const host = document.querySelector('div#usercentrics-root');
    if (!host || !host.shadowRoot) return 'pending';
    const button = host.shadowRoot.querySelector('button[data-testid="uc-accept-all-button"]');
    if (!button || button.disabled) return 'pending';
    button.click();
    return 'accepted';
})()"#;

/// One Chromium process with a single tab. Opened per crawl phase and torn
/// down explicitly with [`ChromeSession::close`].
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl ChromeSession {
    pub async fn launch(config: &Config, start_url: &str) -> Result<Self, BrowserError> {
        settings::clear_cache(&config.browser.user_data_dir);
        let browser_config = settings::browser_config(config)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser
            .new_page(start_url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: start_url.to_string(),
                reason: e.to_string(),
            })?;

        info!("Browser started and {} loaded", start_url);
        Ok(Self {
            browser,
            handler,
            page,
        })
    }

    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close error: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process wait failed: {}", e);
        }
        self.handler.abort();
        info!("Browser closed, session ended");
    }

    async fn eval_string(&self, script: String) -> Result<String, BrowserError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?
            .into_value::<String>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }
}

fn quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// JS expression evaluating to the first matching node, or `null`.
fn locate(locator: Locator) -> String {
    match locator {
        Locator::Css(css) => format!("document.querySelector({})", quoted(css)),
        Locator::XPath(xpath) => format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            quoted(xpath)
        ),
    }
}

fn snapshot_script(locator: Locator) -> String {
    format!(
        r#"(() => {{
    const el = {};
    if (!el) return '';
    return JSON.stringify({{ text: el.innerText || el.textContent || '', class: el.getAttribute('class') || '' }});
}})()"#,
        locate(locator)
    )
}

fn click_script(locator: Locator) -> String {
    format!(
        r#"(() => {{
    const el = {};
    if (!el) return 'missing';
    el.scrollIntoView(true);
    el.click();
    return 'clicked';
}})()"#,
        locate(locator)
    )
}

#[async_trait]
impl PageDriver for ChromeSession {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), BrowserError> {
        self.page
            .execute(ReloadParams::default())
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))
    }

    async fn scroll(&mut self, to: Scroll) -> Result<(), BrowserError> {
        let script = match to {
            Scroll::Top => "window.scrollTo(0, 0); 'ok'",
            Scroll::Bottom => "window.scrollTo(0, document.body.scrollHeight); 'ok'",
        };
        self.eval_string(script.to_string()).await.map(|_| ())
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> Result<bool, BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval_string("document.readyState".to_string()).await? == "complete" {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for(
        &mut self,
        locator: Locator,
        timeout: Duration,
    ) -> Result<Option<ElementSnapshot>, BrowserError> {
        let script = snapshot_script(locator);
        let deadline = Instant::now() + timeout;
        loop {
            let raw = self.eval_string(script.clone()).await?;
            if !raw.is_empty() {
                let snapshot = serde_json::from_str(&raw)
                    .map_err(|e| BrowserError::Script(e.to_string()))?;
                return Ok(Some(snapshot));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&mut self, locator: Locator) -> Result<(), BrowserError> {
        match self.eval_string(click_script(locator)).await?.as_str() {
            "clicked" => Ok(()),
            _ => Err(BrowserError::ElementNotFound(locator.expression().to_string())),
        }
    }

    async fn accept_cookies(&mut self, timeout: Duration) -> Result<bool, BrowserError> {
        info!("Trying to accept the cookie banner...");
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval_string(CONSENT_SCRIPT.to_string()).await? == "accepted" {
                info!("Cookies accepted");
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
