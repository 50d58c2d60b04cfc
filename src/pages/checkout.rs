use super::{cart, Header, QuantityPlan, OVERLAY_CLOSERS};
use crate::driver::Driver;
use crate::interact::{ElementRef, Interactor};
use crate::resilient;
use crate::Result;
use tracing::info;

pub(crate) mod sel {
    use crate::driver::Selector;

    pub const MARKERS: Selector = Selector::css(".page-checkout, .checkout-page, #checkout");
    pub const DISCOUNT_INPUT: Selector = Selector::css("#discountcouponcode");
    pub const DISCOUNT_APPLY: Selector = Selector::css("#applydiscountcouponcode");
    pub const GIFT_CARD_INPUT: Selector = Selector::css("#giftcardcouponcode");
    pub const GIFT_CARD_APPLY: Selector = Selector::css("#applygiftcardcouponcode");
    pub const PICKUP: Selector = Selector::xpath("//label[normalize-space()='Pickup']");
    pub const CONFIRM: Selector = Selector::css("#confirm-order-button");
}

/// URL fragments of the checkout screen.
const URL_HINTS: &[&str] = &["checkout", "onepage"];

/// URL looks like checkout, or a checkout container is present.
pub(crate) async fn is_checkout<D: Driver>(ui: Interactor<'_, D>) -> bool {
    if let Ok(url) = ui.current_url().await {
        let url = url.to_lowercase();
        if URL_HINTS.iter().any(|h| url.contains(h)) {
            return true;
        }
    }
    matches!(ui.count(&sel::MARKERS).await, Ok(n) if n > 0)
}

pub struct CheckoutPage<'d, D> {
    ui: Interactor<'d, D>,
}

impl<'d, D> CheckoutPage<'d, D> {
    pub(crate) fn new(ui: Interactor<'d, D>) -> Self {
        Self { ui }
    }

    pub fn into_header(self) -> Header<'d, D> {
        Header::new(self.ui)
    }
}

impl<'d, D: Driver> CheckoutPage<'d, D> {
    pub async fn verify(&self) -> Result<()> {
        if is_checkout(self.ui).await {
            Ok(())
        } else {
            Err(self.ui.mismatch("checkout page").await)
        }
    }

    /// `Ok(false)` when the page has no discount field.
    pub async fn apply_discount(&self, code: &str) -> Result<bool> {
        let input = ElementRef::new("discount code input", sel::DISCOUNT_INPUT);
        let apply = ElementRef::new("apply discount button", sel::DISCOUNT_APPLY);
        self.apply_code("discount", &input, &apply, code).await
    }

    /// `Ok(false)` when the page has no gift card field.
    pub async fn apply_gift_card(&self, code: &str) -> Result<bool> {
        let input = ElementRef::new("gift card input", sel::GIFT_CARD_INPUT);
        let apply = ElementRef::new("apply gift card button", sel::GIFT_CARD_APPLY);
        self.apply_code("gift card", &input, &apply, code).await
    }

    async fn apply_code(
        &self,
        kind: &str,
        input: &ElementRef,
        apply: &ElementRef,
        code: &str,
    ) -> Result<bool> {
        let ui = self.ui;
        if !ui.is_visible(input, ui.timing().action_timeout()).await {
            info!("No {} field on checkout, skipping", kind);
            return Ok(false);
        }
        ui.fill(input, code).await?;
        ui.click(apply).await?;
        ui.settle(ui.timing().settle.coupon_ms).await;
        info!("Applied {} code '{}'", kind, code);
        Ok(true)
    }

    /// `Ok(false)` when there is no pickup option.
    pub async fn select_pickup(&self) -> Result<bool> {
        let ui = self.ui;
        let pickup = ElementRef::new("pickup option", sel::PICKUP);
        if !ui.is_visible(&pickup, ui.timing().action_timeout()).await {
            info!("No pickup option on checkout, skipping");
            return Ok(false);
        }
        ui.click(&pickup).await?;
        ui.settle(ui.timing().settle.pickup_ms).await;
        info!("Selected pickup");
        Ok(true)
    }

    pub async fn adjust_quantities(&self, plan: QuantityPlan) -> Result<usize> {
        cart::adjust_quantities(self.ui, plan).await
    }

    pub async fn confirm_order(self) -> Result<OrderConfirmation<'d, D>> {
        let ui = self.ui;
        let confirm = ElementRef::new("confirm order button", sel::CONFIRM);
        resilient::click(ui, &confirm, OVERLAY_CLOSERS)
            .perform()
            .await?;
        ui.settle(ui.timing().settle.confirm_ms).await;
        info!("Order confirmed");
        Ok(OrderConfirmation { ui })
    }
}

/// Whatever the site shows after confirming.
pub struct OrderConfirmation<'d, D> {
    ui: Interactor<'d, D>,
}

impl<'d, D> OrderConfirmation<'d, D> {
    pub fn into_header(self) -> Header<'d, D> {
        Header::new(self.ui)
    }
}

impl<D: Driver> OrderConfirmation<'_, D> {
    pub async fn url(&self) -> Result<String> {
        self.ui.current_url().await
    }
}
