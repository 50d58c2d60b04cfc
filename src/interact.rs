//! Bounded-timeout element operations.
//!
//! Every operation resolves an [`ElementRef`] afresh: strategies are tried in
//! order on each poll and the first one with a visible match wins. Nothing is
//! cached across calls, so a reference stays valid across navigations.

use crate::config::{TargetSite, Timing};
use crate::driver::{Driver, Locator, Selector};
use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

/// A logical UI element and the ordered ways to find it.
#[derive(Debug, Clone)]
pub struct ElementRef {
    name: &'static str,
    strategies: Vec<Selector>,
}

impl ElementRef {
    pub fn new(name: &'static str, primary: Selector) -> Self {
        Self {
            name,
            strategies: vec![primary],
        }
    }

    /// Add a strategy tried after the existing ones.
    pub fn or(mut self, fallback: Selector) -> Self {
        self.strategies.push(fallback);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn strategies(&self) -> &[Selector] {
        &self.strategies
    }
}

/// Which strategy served an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionResult {
    pub element: &'static str,
    /// Index into the element's strategies.
    pub strategy: usize,
    pub locator: Locator,
}

/// Poll `check` until it yields a value or `limit` passes. `check` runs at
/// least once, and once more at the deadline.
pub async fn poll_until<T, F, Fut>(limit: Duration, interval: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + limit;
    loop {
        if let Some(value) = check().await {
            return Some(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Element operations against one page with one timing profile.
pub struct Interactor<'d, D> {
    driver: &'d D,
    timing: &'d Timing,
    site: &'d TargetSite,
}

impl<D> Clone for Interactor<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Interactor<'_, D> {}

impl<'d, D: Driver> Interactor<'d, D> {
    pub fn new(driver: &'d D, timing: &'d Timing, site: &'d TargetSite) -> Self {
        Self {
            driver,
            timing,
            site,
        }
    }

    pub fn driver(&self) -> &'d D {
        self.driver
    }

    pub fn timing(&self) -> &'d Timing {
        self.timing
    }

    pub fn site(&self) -> &'d TargetSite {
        self.site
    }

    // --- resolution ---

    /// First strategy with a visible match right now.
    async fn probe(&self, el: &ElementRef) -> Option<InteractionResult> {
        for (strategy, selector) in el.strategies.iter().enumerate() {
            let locator = selector.first();
            match self.driver.is_visible(&locator).await {
                Ok(true) => {
                    return Some(InteractionResult {
                        element: el.name,
                        strategy,
                        locator,
                    })
                }
                Ok(false) => {}
                Err(e) => debug!("{}: strategy {} errored: {}", el.name, selector, e),
            }
        }
        None
    }

    /// Wait for any strategy of `el` to show a visible match.
    pub async fn wait_visible(&self, el: &ElementRef, limit: Duration) -> Result<InteractionResult> {
        let found = poll_until(limit, self.timing.poll_interval(), || self.probe(el)).await;
        found.ok_or_else(|| Error::ElementNotInteractable {
            element: el.name.to_string(),
            timeout_ms: limit.as_millis() as u64,
        })
    }

    /// Wait for a specific match of a selector to be visible.
    pub async fn wait_locator(&self, name: &str, locator: &Locator, limit: Duration) -> Result<()> {
        let visible = poll_until(limit, self.timing.poll_interval(), || async {
            matches!(self.driver.is_visible(locator).await, Ok(true)).then_some(())
        })
        .await;
        visible.ok_or_else(|| Error::ElementNotInteractable {
            element: format!("{} ({})", name, locator),
            timeout_ms: limit.as_millis() as u64,
        })
    }

    /// Wait for any strategy of `el` to match at least one attached element.
    pub async fn wait_attached(&self, el: &ElementRef, limit: Duration) -> Result<()> {
        let attached = poll_until(limit, self.timing.poll_interval(), || async {
            for selector in &el.strategies {
                if matches!(self.driver.count(selector).await, Ok(n) if n > 0) {
                    return Some(());
                }
            }
            None
        })
        .await;
        attached.ok_or_else(|| Error::ElementNotInteractable {
            element: el.name.to_string(),
            timeout_ms: limit.as_millis() as u64,
        })
    }

    /// Whether `el` becomes visible within `limit`.
    pub async fn is_visible(&self, el: &ElementRef, limit: Duration) -> bool {
        poll_until(limit, self.timing.poll_interval(), || self.probe(el))
            .await
            .is_some()
    }

    // --- actions ---

    pub async fn click(&self, el: &ElementRef) -> Result<InteractionResult> {
        self.click_within(el, self.timing.action_timeout()).await
    }

    pub async fn click_within(&self, el: &ElementRef, limit: Duration) -> Result<InteractionResult> {
        let hit = self.wait_visible(el, limit).await?;
        self.driver.click(&hit.locator).await?;
        debug!("clicked {} via {}", el.name, hit.locator);
        Ok(hit)
    }

    /// Click a specific match of a list, e.g. the nth product title.
    pub async fn click_at(&self, name: &str, locator: &Locator) -> Result<()> {
        self.wait_locator(name, locator, self.timing.action_timeout())
            .await?;
        self.driver.click(locator).await?;
        debug!("clicked {} via {}", name, locator);
        Ok(())
    }

    /// `el.click()` on the resolved match, for elements a pointer cannot reach.
    pub async fn dispatch_click(&self, el: &ElementRef) -> Result<InteractionResult> {
        let hit = self.wait_visible(el, self.timing.action_timeout()).await?;
        self.driver.dispatch_click(&hit.locator).await?;
        debug!("dispatched click on {} via {}", el.name, hit.locator);
        Ok(hit)
    }

    /// Click if `el` shows up within `limit`. Never fails.
    pub async fn try_click(&self, el: &ElementRef, limit: Duration) -> bool {
        if !self.is_visible(el, limit).await {
            return false;
        }
        match self.click_within(el, Duration::ZERO).await {
            Ok(_) => true,
            Err(e) => {
                debug!("try_click {}: {}", el.name, e);
                false
            }
        }
    }

    /// Clear, then type. Filling twice with the same text leaves the same value.
    pub async fn fill(&self, el: &ElementRef, text: &str) -> Result<InteractionResult> {
        let hit = self.wait_visible(el, self.timing.action_timeout()).await?;
        self.driver.clear(&hit.locator).await?;
        self.driver.type_into(&hit.locator, text).await?;
        debug!("filled {} via {}", el.name, hit.locator);
        Ok(hit)
    }

    pub async fn hover(&self, el: &ElementRef) -> Result<InteractionResult> {
        let hit = self.wait_visible(el, self.timing.wait_timeout()).await?;
        self.driver.hover(&hit.locator).await?;
        Ok(hit)
    }

    pub async fn read(&self, el: &ElementRef) -> Result<String> {
        let hit = self.wait_visible(el, self.timing.wait_timeout()).await?;
        Ok(self.driver.text_of(&hit.locator).await?.trim().to_string())
    }

    pub async fn read_value(&self, el: &ElementRef) -> Result<String> {
        let hit = self.wait_visible(el, self.timing.wait_timeout()).await?;
        self.driver.value_of(&hit.locator).await
    }

    /// Trimmed text of every match of `selector`, in document order.
    pub async fn texts(&self, selector: &Selector) -> Result<Vec<String>> {
        let count = self.driver.count(selector).await?;
        let mut texts = Vec::with_capacity(count);
        for n in 0..count {
            texts.push(self.driver.text_of(&selector.nth(n)).await?.trim().to_string());
        }
        Ok(texts)
    }

    pub async fn count(&self, selector: &Selector) -> Result<usize> {
        self.driver.count(selector).await
    }

    pub async fn press(&self, key: &str) -> Result<()> {
        self.driver.press_key(key).await
    }

    // --- navigation ---

    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to: {}", url);
        let limit = self.timing.navigation_timeout();
        timeout(limit, self.driver.goto(url))
            .await
            .map_err(|_| Error::Timeout(format!("navigation to {} after {:?}", url, limit)))?
    }

    pub async fn current_url(&self) -> Result<String> {
        self.driver.url().await
    }

    /// `NavigationMismatch` carrying the current URL.
    pub async fn mismatch(&self, expected: impl Into<String>) -> Error {
        let actual = match self.driver.url().await {
            Ok(url) => url,
            Err(e) => format!("<url unavailable: {}>", e),
        };
        Error::NavigationMismatch {
            expected: expected.into(),
            actual,
        }
    }

    // --- timing ---

    /// Pause after an action whose completion the page does not signal.
    pub async fn settle(&self, ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }

    /// Pause at least `min_ms`, then poll `done` for up to `limit` more.
    pub async fn settle_until<F, Fut>(&self, min_ms: u64, limit: Duration, mut done: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        self.settle(min_ms).await;
        poll_until(limit, self.timing.poll_interval(), || {
            let check = done();
            async move { check.await.then_some(()) }
        })
        .await
        .is_some()
    }

    // --- probes ---

    /// Close whichever of `closers` are showing, then press Escape.
    /// Returns how many were clicked.
    pub async fn dismiss_overlays(&self, closers: &[Selector]) -> usize {
        let mut closed = 0;
        for selector in closers {
            let locator = selector.first();
            if !matches!(self.driver.is_visible(&locator).await, Ok(true)) {
                continue;
            }
            match self.driver.click(&locator).await {
                Ok(()) => {
                    debug!("dismissed overlay via {}", locator);
                    closed += 1;
                    self.settle(self.timing.settle.dismiss_ms).await;
                }
                Err(e) => debug!("overlay close {} failed: {}", locator, e),
            }
        }
        if let Err(e) = self.driver.press_key("Escape").await {
            warn!("Escape after overlay dismissal failed: {}", e);
        }
        closed
    }
}
