use super::{Header, ItemPage};
use crate::driver::Driver;
use crate::interact::{ElementRef, Interactor};
use crate::resilient::ResilientAction;
use crate::{Error, Result};
use futures::FutureExt;
use shopcheck_match::{best_match, find_exact, score_candidates};
use tracing::{debug, info};

pub(crate) mod sel {
    use crate::driver::Selector;

    pub const TITLE: Selector = Selector::css(".product-title");
}

/// Search results list.
pub struct SearchResultsPage<'d, D> {
    ui: Interactor<'d, D>,
}

impl<'d, D> SearchResultsPage<'d, D> {
    pub(crate) fn new(ui: Interactor<'d, D>) -> Self {
        Self { ui }
    }

    pub fn into_header(self) -> Header<'d, D> {
        Header::new(self.ui)
    }
}

impl<'d, D: Driver> SearchResultsPage<'d, D> {
    /// Title texts by position; empty when no result shows up in time.
    async fn candidates(&self) -> Result<Vec<String>> {
        let ui = self.ui;
        let first = ElementRef::new("product title", sel::TITLE);
        if !ui.is_visible(&first, ui.timing().wait_timeout()).await {
            debug!("No product titles visible");
            return Ok(Vec::new());
        }
        ui.texts(&sel::TITLE).await
    }

    /// Non-empty product titles, in page order.
    pub async fn titles(&self) -> Result<Vec<String>> {
        let mut titles = self.candidates().await?;
        titles.retain(|t| !t.is_empty());
        Ok(titles)
    }

    pub async fn is_displayed(&self, name: &str) -> Result<bool> {
        Ok(find_exact(name, &self.candidates().await?).is_some())
    }

    /// Title that [`open_best_match`](Self::open_best_match) would open.
    pub async fn best_match(&self, query: &str) -> Result<Option<String>> {
        let candidates = self.candidates().await?;
        Ok(best_match(query, &candidates).map(|m| m.text.to_string()))
    }

    pub async fn open_best_match(self, query: &str) -> Result<ItemPage<'d, D>> {
        let candidates = self.candidates().await?;
        for candidate in score_candidates(query, &candidates) {
            debug!("'{}' scores {} for '{}'", candidate.text, candidate.score, query);
        }
        let found = best_match(query, &candidates).ok_or_else(|| Error::ProductNotFound {
            query: query.to_string(),
        })?;
        info!("Best match for '{}': {}", query, found);
        let (index, title) = (found.index, found.text.to_string());
        self.open_at(index, title).await
    }

    /// Open the result whose title equals `title` (trimmed, any case).
    pub async fn open_product(self, title: &str) -> Result<ItemPage<'d, D>> {
        let candidates = self.candidates().await?;
        let index = find_exact(title, &candidates).ok_or_else(|| Error::ProductNotFound {
            query: title.to_string(),
        })?;
        let title = candidates[index].clone();
        self.open_at(index, title).await
    }

    async fn open_at(self, index: usize, title: String) -> Result<ItemPage<'d, D>> {
        let ui = self.ui;
        let locator = sel::TITLE.nth(index);
        let locator = &locator;
        ResilientAction::new(format!("open '{}'", title), "pointer", move || {
            async move { ui.click_at("product title", locator).await }.boxed_local()
        })
        .fallback("dom-click", move || {
            async move { ui.driver().dispatch_click(locator).await }.boxed_local()
        })
        .perform()
        .await?;
        Ok(ItemPage::new(ui, title))
    }
}
