use crate::driver::Driver;
use crate::pages::{CartPage, CheckoutPage, Header, OrderConfirmation, QuantityPlan};
use crate::Result;
use tracing::{info, warn};

/// What to do on the checkout screen before confirming, in this order.
#[derive(Debug, Clone, Default)]
pub struct CheckoutPlan {
    pub quantities: Option<QuantityPlan>,
    pub discount_code: Option<String>,
    pub gift_card_code: Option<String>,
    pub pickup: bool,
}

/// What [`complete_order`] managed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutReport {
    pub quantity_clicks: usize,
    pub discount_applied: bool,
    pub gift_card_applied: bool,
    pub pickup_selected: bool,
    pub confirmation_url: String,
}

pub async fn go_to_cart<'d, D: Driver>(header: Header<'d, D>) -> Result<CartPage<'d, D>> {
    let cart = header.open_cart().await?;
    if !cart.has_items().await? {
        warn!("Cart page shows no items");
    }
    Ok(cart)
}

pub async fn go_to_checkout<'d, D: Driver>(cart: CartPage<'d, D>) -> Result<CheckoutPage<'d, D>> {
    let checkout = cart.proceed_to_checkout().await?;
    checkout.verify().await?;
    Ok(checkout)
}

/// Run the plan, then confirm. Missing coupon fields or pickup option are
/// reported, not errors.
pub async fn complete_order<'d, D: Driver>(
    checkout: CheckoutPage<'d, D>,
    plan: &CheckoutPlan,
) -> Result<(OrderConfirmation<'d, D>, CheckoutReport)> {
    let mut report = CheckoutReport::default();
    if let Some(quantities) = plan.quantities {
        report.quantity_clicks = checkout.adjust_quantities(quantities).await?;
    }
    if let Some(code) = &plan.discount_code {
        report.discount_applied = checkout.apply_discount(code).await?;
    }
    if let Some(code) = &plan.gift_card_code {
        report.gift_card_applied = checkout.apply_gift_card(code).await?;
    }
    if plan.pickup {
        report.pickup_selected = checkout.select_pickup().await?;
    }

    let confirmation = checkout.confirm_order().await?;
    report.confirmation_url = confirmation.url().await?;
    info!("Order placed: {:?}", report);
    Ok((confirmation, report))
}
