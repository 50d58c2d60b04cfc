use crate::config::steps::{AdjustQuantitiesStep, CodeStep};
use crate::config::{Config, Fixtures, Step};
use crate::driver::Driver;
use crate::flows;
use crate::interact::Interactor;
use crate::pages::{CartPage, CheckoutPage, QuantityPlan, Screen};
use crate::Result;
use chrono::Local;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a step may read besides the current screen.
pub(crate) struct StepContext<'a> {
    pub config: &'a Config,
    pub fixtures: &'a Fixtures,
}

/// Run one step against the current screen and return the screen it ends on.
pub(crate) async fn execute<'d, D: Driver>(
    ui: Interactor<'d, D>,
    step: &Step,
    screen: Screen<'d, D>,
    ctx: &StepContext<'_>,
) -> Result<Screen<'d, D>> {
    match step {
        Step::Launch => {
            if !matches!(screen, Screen::Blank) {
                debug!("Relaunching from {}", screen.state());
            }
            Ok(flows::launch_and_prepare(ui, &ctx.config.locale)
                .await?
                .into())
        }

        Step::Login => match screen {
            Screen::LocationSelected(home) => {
                Ok(flows::login_with_otp(home, &ctx.fixtures.login).await?.into())
            }
            other => Err(other.mismatch("home page with location selected")),
        },

        Step::OpenProfile => Ok(screen.into_header()?.open_profile().await?.into()),

        Step::UpdateProfile => {
            let header = screen.into_header()?;
            Ok(flows::update_profile(header, &ctx.fixtures.profile)
                .await?
                .into())
        }

        Step::VerifyProfile => {
            let page = match screen {
                Screen::Profile(page) => page,
                other => other.into_header()?.open_profile().await?,
            };
            flows::verify_profile(&page, &ctx.fixtures.profile).await?;
            Ok(page.into())
        }

        Step::AddProducts(step) => {
            let (header, added) =
                flows::add_multiple_products(screen.into_header()?, &step.products).await?;
            for product in &added {
                debug!("'{}' -> '{}' ({:?})", product.query, product.title, product.outcome);
            }
            info!("Added {} products to cart", added.len());
            Ok(Screen::Browsing(header))
        }

        Step::OpenCart => Ok(flows::go_to_cart(screen.into_header()?).await?.into()),

        Step::AdjustQuantities(AdjustQuantitiesStep { minus, plus }) => {
            let plan = QuantityPlan {
                minus: *minus,
                plus: *plus,
            };
            match screen {
                Screen::Cart(page) => {
                    page.adjust_quantities(plan).await?;
                    Ok(page.into())
                }
                Screen::Checkout(page) => {
                    page.adjust_quantities(plan).await?;
                    Ok(page.into())
                }
                other => Err(other.mismatch("cart or checkout page")),
            }
        }

        Step::DecreaseItem(step) => {
            let cart = expect_cart(screen)?;
            cart.decrease_item(&step.item_id, step.clicks).await?;
            Ok(cart.into())
        }

        Step::ProceedToCheckout => {
            let cart = expect_cart(screen)?;
            Ok(flows::go_to_checkout(cart).await?.into())
        }

        Step::ApplyDiscount(CodeStep { code }) => {
            let checkout = expect_checkout(screen)?;
            if !checkout.apply_discount(code).await? {
                warn!("Discount code '{}' not applied: no discount field", code);
            }
            Ok(checkout.into())
        }

        Step::ApplyGiftCard(CodeStep { code }) => {
            let checkout = expect_checkout(screen)?;
            if !checkout.apply_gift_card(code).await? {
                warn!("Gift card '{}' not applied: no gift card field", code);
            }
            Ok(checkout.into())
        }

        Step::SelectPickup => {
            let checkout = expect_checkout(screen)?;
            if !checkout.select_pickup().await? {
                warn!("Pickup not offered");
            }
            Ok(checkout.into())
        }

        Step::ConfirmOrder => {
            let checkout = expect_checkout(screen)?;
            Ok(checkout.confirm_order().await?.into())
        }

        Step::Screenshot(step) => {
            let data = ui.driver().screenshot().await?;
            let path = write_screenshot(&step.path, &data)?;
            info!("Screenshot saved to {}", path);
            Ok(screen)
        }

        Step::Log(step) => {
            info!("{}", step.message);
            Ok(screen)
        }
    }
}

fn expect_cart<D>(screen: Screen<'_, D>) -> Result<CartPage<'_, D>> {
    match screen {
        Screen::Cart(page) => Ok(page),
        other => Err(other.mismatch("cart page")),
    }
}

fn expect_checkout<D>(screen: Screen<'_, D>) -> Result<CheckoutPage<'_, D>> {
    match screen {
        Screen::Checkout(page) => Ok(page),
        other => Err(other.mismatch("checkout page")),
    }
}

/// Replace `{timestamp}` in a screenshot path.
pub(crate) fn timestamped(path: &str) -> String {
    path.replace(
        "{timestamp}",
        &Local::now().format("%Y%m%d-%H%M%S").to_string(),
    )
}

/// Write PNG bytes, creating parent directories. Returns the final path.
pub(crate) fn write_screenshot(path: &str, data: &[u8]) -> Result<String> {
    let path = timestamped(path);
    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, data)?;
    Ok(path)
}
