//! Helpers for integration tests: a scripted page driver and HTML fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use review_crawler::browser::{BrowserError, ElementSnapshot, Locator, PageDriver, Scroll};
use review_crawler::config::{Config, PacingConfig};
use review_crawler::context::CrawlContext;
use review_crawler::models::SessionStamp;

pub const LISTING_URL: &str = "https://shop.example/duefte/";

pub fn session() -> SessionStamp {
    SessionStamp(
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap(),
    )
}

pub fn test_config() -> Config {
    Config {
        listing_url: LISTING_URL.to_string(),
        pacing: PacingConfig::instant(),
        ..Config::default()
    }
}

pub fn context_with(config: Config) -> CrawlContext {
    CrawlContext::new(Arc::new(config), session()).expect("valid listing url")
}

pub fn context() -> CrawlContext {
    context_with(test_config())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    Reload,
    Content,
    Scroll(Scroll),
    Click(&'static str),
}

#[derive(Debug, Clone)]
struct FakeElement {
    snapshot: ElementSnapshot,
    /// Reloads of the page needed before the element shows up.
    after_reloads: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    html: String,
    elements: HashMap<&'static str, FakeElement>,
    never_ready: bool,
    failing_click: bool,
    failing_content: bool,
    failing_wait: bool,
}

impl FakePage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    pub fn with_element(self, locator: Locator, text: &str) -> Self {
        self.with_element_after(locator, text, 0)
    }

    pub fn with_element_after(mut self, locator: Locator, text: &str, reloads: u32) -> Self {
        self.elements.insert(
            locator.expression(),
            FakeElement {
                snapshot: ElementSnapshot {
                    text: text.to_string(),
                    class: String::new(),
                },
                after_reloads: reloads,
            },
        );
        self
    }

    pub fn with_disabled(mut self, locator: Locator, class: &str) -> Self {
        self.elements.insert(
            locator.expression(),
            FakeElement {
                snapshot: ElementSnapshot {
                    text: String::new(),
                    class: class.to_string(),
                },
                after_reloads: 0,
            },
        );
        self
    }

    pub fn never_ready(mut self) -> Self {
        self.never_ready = true;
        self
    }

    /// Clicks on this page fail with a protocol error.
    pub fn failing_click(mut self) -> Self {
        self.failing_click = true;
        self
    }

    /// Reading this page's HTML fails with a protocol error.
    pub fn failing_content(mut self) -> Self {
        self.failing_content = true;
        self
    }

    /// Waiting for any element on this page fails with a protocol error.
    pub fn failing_wait(mut self) -> Self {
        self.failing_wait = true;
        self
    }
}

/// Serves a fixed list of pages. Navigation to a routed URL switches pages;
/// clicking any present element moves on to the next page in the list.
pub struct FakeDriver {
    pages: Vec<FakePage>,
    routes: HashMap<String, usize>,
    current: usize,
    reloads_here: u32,
    pub actions: Vec<Action>,
    pub consent_banner: bool,
}

impl FakeDriver {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            routes: HashMap::new(),
            current: 0,
            reloads_here: 0,
            actions: Vec::new(),
            consent_banner: false,
        }
    }

    pub fn route(mut self, url: &str, page: usize) -> Self {
        self.routes.insert(url.to_string(), page);
        self
    }

    pub fn clicks(&self) -> usize {
        self.count(|a| matches!(a, Action::Click(_)))
    }

    pub fn reloads(&self) -> usize {
        self.count(|a| matches!(a, Action::Reload))
    }

    pub fn contents(&self) -> usize {
        self.count(|a| matches!(a, Action::Content))
    }

    pub fn gotos(&self) -> Vec<String> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Goto(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Action) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }

    fn page(&self) -> &FakePage {
        &self.pages[self.current]
    }

    fn visible(&self, locator: Locator) -> Option<ElementSnapshot> {
        self.page()
            .elements
            .get(locator.expression())
            .filter(|el| self.reloads_here >= el.after_reloads)
            .map(|el| el.snapshot.clone())
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.actions.push(Action::Goto(url.to_string()));
        if let Some(&page) = self.routes.get(url) {
            self.current = page;
        }
        self.reloads_here = 0;
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), BrowserError> {
        self.actions.push(Action::Reload);
        self.reloads_here += 1;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.actions.push(Action::Content);
        if self.page().failing_content {
            return Err(BrowserError::Protocol("page content unavailable".into()));
        }
        Ok(self.page().html.clone())
    }

    async fn scroll(&mut self, to: Scroll) -> Result<(), BrowserError> {
        self.actions.push(Action::Scroll(to));
        Ok(())
    }

    async fn wait_until_ready(&mut self, _timeout: Duration) -> Result<bool, BrowserError> {
        Ok(!self.page().never_ready)
    }

    async fn wait_for(
        &mut self,
        locator: Locator,
        _timeout: Duration,
    ) -> Result<Option<ElementSnapshot>, BrowserError> {
        if self.page().failing_wait {
            return Err(BrowserError::Protocol("target closed".into()));
        }
        Ok(self.visible(locator))
    }

    async fn click(&mut self, locator: Locator) -> Result<(), BrowserError> {
        self.actions.push(Action::Click(locator.expression()));
        if self.page().failing_click {
            return Err(BrowserError::Protocol("click was not dispatched".into()));
        }
        if self.visible(locator).is_none() {
            return Err(BrowserError::ElementNotFound(locator.expression().to_string()));
        }
        if self.current + 1 < self.pages.len() {
            self.current += 1;
            self.reloads_here = 0;
        }
        Ok(())
    }

    async fn accept_cookies(&mut self, _timeout: Duration) -> Result<bool, BrowserError> {
        Ok(self.consent_banner)
    }
}

/// A listing page with `count` product tiles linking to `/p/<page>-<i>/`.
pub fn listing_html(page: u32, count: usize, has_next: bool) -> String {
    let tiles: String = (0..count)
        .map(|i| {
            format!(
                r#"<a class="mu-product-tile mu-product-list__item" href="/p/{}-{}/">Produkt</a>"#,
                page, i
            )
        })
        .collect();
    let next_class = if has_next {
        "mu-pagination__navigation--next"
    } else {
        "mu-pagination__navigation--next mu-pagination__navigation--disabled"
    };
    format!(
        r#"<html><body><div class="mu-product-list">{}</div><button class="{}">Weiter</button></body></html>"#,
        tiles, next_class
    )
}

pub fn product_url(page: u32, index: usize) -> String {
    format!("https://shop.example/p/{}-{}/", page, index)
}

fn review_entry(n: usize, rating: u8) -> String {
    format!(
        r#"<li class="bv-content-item">
             <span class="bv-author">Kunde {n}</span>
             <div class="bv-rating-stars-container"><abbr title="{rating} von 5 Sternen">*</abbr></div>
             <div class="bv-content-datetime"><span class="bv-content-datetime-stamp">vor {n} Tagen</span></div>
             <div class="bv-content-summary-body-text"><p>Bewertung Nummer {n}</p></div>
           </li>"#
    )
}

/// A rendered review widget holding `count` complete entries numbered from
/// `first`.
pub fn reviews_html(first: usize, count: usize) -> String {
    let entries: String = (first..first + count).map(|n| review_entry(n, 5)).collect();
    format!(
        r#"<html><body><div id="BVRRContainer"><ol class="bv-content-list">{}</ol></div></body></html>"#,
        entries
    )
}

pub fn product_html(name: &str, price: &str, brand: &str) -> String {
    format!(
        r#"<html><body>
             <span class="mu-product-details-page__article-number">Art.Nr. 1234</span>
             <h1 class="mu-product-details-page__product-name">{name}</h1>
             <a class="mu-product-details-page__brand" href="/marke/"><img alt="{brand}"></a>
             <div class="mu-product-price__price-container">
               <span class="mu-product-price__price">{price}</span>
             </div>
           </body></html>"#
    )
}
