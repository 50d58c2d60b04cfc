use super::{checkout, CheckoutPage, Header, OVERLAY_CLOSERS};
use crate::driver::{Driver, Selector};
use crate::interact::{ElementRef, Interactor};
use crate::resilient;
use crate::Result;
use tracing::{debug, info};

pub(crate) mod sel {
    use crate::driver::Selector;

    pub const MARKERS: Selector =
        Selector::css(".cart, #shopping-cart-form, .page-shopping-cart, .cart-items");
    pub const GO_TO_CHECKOUT: Selector = Selector::xpath("//button[normalize-space()='Go to cart']");
    pub const QTY_MINUS: Selector = Selector::css(".qty-btn.qty-minus");
    pub const QTY_PLUS: Selector = Selector::css(".qty-btn.qty-plus");
}

/// Decrease button of one cart line.
pub(crate) fn decrease_button(item_id: &str) -> Selector {
    Selector::Css(
        format!(
            "div[id=\"shoppingCartItem_{}\"] button[name=\"decrease\"]",
            item_id
        )
        .into(),
    )
}

/// Clicks per line: every minus button `minus` times, then every plus button
/// `plus` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityPlan {
    pub minus: u32,
    pub plus: u32,
}

impl Default for QuantityPlan {
    fn default() -> Self {
        Self { minus: 3, plus: 1 }
    }
}

pub struct CartPage<'d, D> {
    ui: Interactor<'d, D>,
}

impl<'d, D> CartPage<'d, D> {
    pub(crate) fn new(ui: Interactor<'d, D>) -> Self {
        Self { ui }
    }

    pub fn into_header(self) -> Header<'d, D> {
        Header::new(self.ui)
    }
}

impl<'d, D: Driver> CartPage<'d, D> {
    /// Any cart container present.
    pub async fn has_items(&self) -> Result<bool> {
        Ok(self.ui.count(&sel::MARKERS).await? > 0)
    }

    pub async fn decrease_item(&self, item_id: &str, clicks: u32) -> Result<()> {
        let ui = self.ui;
        let button = ElementRef::new("cart line decrease button", decrease_button(item_id));
        for n in 1..=clicks {
            ui.click(&button).await?;
            ui.settle(ui.timing().settle.quantity_ms).await;
            debug!("Decreased cart line {} ({}/{})", item_id, n, clicks);
        }
        info!("Decreased cart line {} by {}", item_id, clicks);
        Ok(())
    }

    /// Returns the number of clicks made.
    pub async fn adjust_quantities(&self, plan: QuantityPlan) -> Result<usize> {
        adjust_quantities(self.ui, plan).await
    }

    pub async fn proceed_to_checkout(self) -> Result<CheckoutPage<'d, D>> {
        let ui = self.ui;
        let button = ElementRef::new("go to checkout button", sel::GO_TO_CHECKOUT);
        resilient::click(ui, &button, OVERLAY_CLOSERS)
            .perform()
            .await?;

        let reached = ui
            .settle_until(
                ui.timing().settle.checkout_ms,
                ui.timing().page_load_timeout(),
                || checkout::is_checkout(ui),
            )
            .await;
        if !reached {
            return Err(ui.mismatch("checkout page").await);
        }
        info!("Reached checkout");
        Ok(CheckoutPage::new(ui))
    }
}

/// Shared by the cart and checkout pages, which render the same buttons.
pub(crate) async fn adjust_quantities<D: Driver>(
    ui: Interactor<'_, D>,
    plan: QuantityPlan,
) -> Result<usize> {
    let mut clicks = 0;
    for (name, selector, times) in [
        ("quantity minus", sel::QTY_MINUS, plan.minus),
        ("quantity plus", sel::QTY_PLUS, plan.plus),
    ] {
        let lines = ui.count(&selector).await?;
        for line in 0..lines {
            let button = selector.nth(line);
            for _ in 0..times {
                ui.click_at(name, &button).await?;
                ui.settle(ui.timing().settle.quantity_ms).await;
                clicks += 1;
            }
        }
    }
    info!("Adjusted quantities ({} clicks)", clicks);
    Ok(clicks)
}
