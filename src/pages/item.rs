use super::{Header, OVERLAY_CLOSERS};
use crate::driver::Driver;
use crate::interact::{ElementRef, Interactor};
use crate::resilient;
use crate::Result;
use tracing::{debug, info};

pub(crate) mod sel {
    use crate::driver::Selector;

    pub const ADD_TO_CART: Selector =
        Selector::css("[id*=\"add-to-cart-button\"]:not([onclick*=\"catalog\"])");
    pub const POPUP: Selector = Selector::css("#bar-notification .content");
    pub const POPUP_CLOSE: Selector = Selector::css("span[title=\"Close\"]");
    pub const TITLE: Selector = Selector::css("h1");
    pub const TITLE_NAME: Selector = Selector::css(".product-name");
    pub const TITLE_PRODUCT: Selector = Selector::css(".product-title");
}

/// URL fragments of product pages.
const URL_HINTS: &[&str] = &["product", "item", "/p/"];

/// How the add-to-cart confirmation ended.
///
/// All three count as success: the click went through either way, and the
/// popup is a notification, not a confirmation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddToCartOutcome {
    /// Popup shown and closed with its close button.
    PopupClosed,
    /// Popup shown, close button missing; Escape pressed.
    PopupEscaped,
    /// No popup within the probe window.
    NoPopup,
}

impl AddToCartOutcome {
    /// Whether the site showed its "added" notification.
    pub fn confirmed(self) -> bool {
        !matches!(self, Self::NoPopup)
    }
}

fn add_button() -> ElementRef {
    ElementRef::new("add to cart button", sel::ADD_TO_CART)
}

/// A product detail page, opened for a given result title.
pub struct ItemPage<'d, D> {
    ui: Interactor<'d, D>,
    product: String,
}

impl<'d, D> ItemPage<'d, D> {
    pub(crate) fn new(ui: Interactor<'d, D>, product: String) -> Self {
        Self { ui, product }
    }

    /// Title of the result this page was opened from.
    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn into_header(self) -> Header<'d, D> {
        Header::new(self.ui)
    }
}

impl<'d, D: Driver> ItemPage<'d, D> {
    /// Heuristic: one of the first three words of the product name appears in
    /// the body or title, or the add-to-cart button shows, or the URL looks
    /// like a product URL.
    pub async fn is_loaded(&self) -> Result<bool> {
        let ui = self.ui;
        ui.settle(ui.timing().settle.item_ms).await;

        let keywords: Vec<String> = self
            .product
            .to_lowercase()
            .split_whitespace()
            .take(3)
            .map(str::to_string)
            .collect();
        let body = ui.driver().body_text().await?.to_lowercase();
        let title = ui.driver().title().await?.to_lowercase();
        if keywords
            .iter()
            .any(|k| body.contains(k.as_str()) || title.contains(k.as_str()))
        {
            return Ok(true);
        }

        if self.is_add_to_cart_visible().await {
            return Ok(true);
        }

        let url = ui.current_url().await?.to_lowercase();
        Ok(URL_HINTS.iter().any(|h| url.contains(h)))
    }

    /// Fails with `NavigationMismatch` unless [`is_loaded`](Self::is_loaded).
    pub async fn expect_loaded(&self) -> Result<()> {
        if self.is_loaded().await? {
            Ok(())
        } else {
            Err(self
                .ui
                .mismatch(format!("product page for '{}'", self.product))
                .await)
        }
    }

    pub async fn title(&self) -> Result<String> {
        let title = ElementRef::new("product title", sel::TITLE)
            .or(sel::TITLE_NAME)
            .or(sel::TITLE_PRODUCT);
        self.ui.read(&title).await
    }

    pub async fn is_add_to_cart_visible(&self) -> bool {
        self.ui
            .is_visible(&add_button(), self.ui.timing().probe_timeout())
            .await
    }

    /// Click add-to-cart, then clear the notification popup if it shows.
    pub async fn add_to_cart(&self) -> Result<AddToCartOutcome> {
        let ui = self.ui;
        let button = add_button();
        resilient::click(ui, &button, OVERLAY_CLOSERS)
            .perform()
            .await?;

        let popup = ElementRef::new("cart notification", sel::POPUP);
        let outcome = if ui.is_visible(&popup, ui.timing().popup_timeout()).await {
            let close = ElementRef::new("cart notification close", sel::POPUP_CLOSE);
            if ui.try_click(&close, ui.timing().probe_timeout()).await {
                AddToCartOutcome::PopupClosed
            } else {
                ui.press("Escape").await?;
                AddToCartOutcome::PopupEscaped
            }
        } else {
            debug!("No cart notification for '{}'", self.product);
            AddToCartOutcome::NoPopup
        };

        ui.settle(ui.timing().settle.add_to_cart_ms).await;
        info!("Added '{}' to cart ({:?})", self.product, outcome);
        Ok(outcome)
    }
}
