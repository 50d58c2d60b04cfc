use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// One configured, independently reported unit of a suite run.
#[derive(Debug, Clone)]
pub enum Step {
    // Session
    Launch,
    Login,

    // Profile
    OpenProfile,
    UpdateProfile,
    VerifyProfile,

    // Catalog
    AddProducts(AddProductsStep),

    // Cart and checkout
    OpenCart,
    AdjustQuantities(AdjustQuantitiesStep),
    DecreaseItem(DecreaseItemStep),
    ProceedToCheckout,
    ApplyDiscount(CodeStep),
    ApplyGiftCard(CodeStep),
    SelectPickup,
    ConfirmOrder,

    // Debug
    Screenshot(ScreenshotStep),
    Log(LogStep),
}

impl Step {
    /// Short name for logging and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Login => "login",
            Self::OpenProfile => "open_profile",
            Self::UpdateProfile => "update_profile",
            Self::VerifyProfile => "verify_profile",
            Self::AddProducts(_) => "add_products",
            Self::OpenCart => "open_cart",
            Self::AdjustQuantities(_) => "adjust_quantities",
            Self::DecreaseItem(_) => "decrease_item",
            Self::ProceedToCheckout => "proceed_to_checkout",
            Self::ApplyDiscount(_) => "apply_discount",
            Self::ApplyGiftCard(_) => "apply_gift_card",
            Self::SelectPickup => "select_pickup",
            Self::ConfirmOrder => "confirm_order",
            Self::Screenshot(_) => "screenshot",
            Self::Log(_) => "log",
        }
    }
}

const STEP_NAMES: &[&str] = &[
    "launch",
    "login",
    "open_profile",
    "update_profile",
    "verify_profile",
    "add_products",
    "open_cart",
    "adjust_quantities",
    "decrease_item",
    "proceed_to_checkout",
    "apply_discount",
    "apply_gift_card",
    "select_pickup",
    "confirm_order",
    "screenshot",
    "log",
];

/// Steps that can be written as a bare name.
const BARE_STEPS: &[&str] = &[
    "launch",
    "login",
    "open_profile",
    "update_profile",
    "verify_profile",
    "open_cart",
    "adjust_quantities",
    "proceed_to_checkout",
    "select_pickup",
    "confirm_order",
];

fn bare_step(name: &str) -> Option<Step> {
    Some(match name {
        "launch" => Step::Launch,
        "login" => Step::Login,
        "open_profile" => Step::OpenProfile,
        "update_profile" => Step::UpdateProfile,
        "verify_profile" => Step::VerifyProfile,
        "open_cart" => Step::OpenCart,
        "adjust_quantities" => Step::AdjustQuantities(AdjustQuantitiesStep::default()),
        "proceed_to_checkout" => Step::ProceedToCheckout,
        "select_pickup" => Step::SelectPickup,
        "confirm_order" => Step::ConfirmOrder,
        _ => return None,
    })
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StepVisitor)
    }
}

struct StepVisitor;

impl<'de> Visitor<'de> for StepVisitor {
    type Value = Step;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a step name, or a map with a single step key")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        bare_step(value).ok_or_else(|| de::Error::unknown_variant(value, BARE_STEPS))
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let key: String = map
            .next_key()?
            .ok_or_else(|| de::Error::custom("expected step name key"))?;

        let step = match key.as_str() {
            "add_products" => Step::AddProducts(map.next_value()?),
            "adjust_quantities" => {
                let plan: Option<AdjustQuantitiesStep> = map.next_value()?;
                Step::AdjustQuantities(plan.unwrap_or_default())
            }
            "decrease_item" => Step::DecreaseItem(map.next_value()?),
            "apply_discount" => Step::ApplyDiscount(map.next_value()?),
            "apply_gift_card" => Step::ApplyGiftCard(map.next_value()?),
            "screenshot" => Step::Screenshot(map.next_value()?),
            "log" => Step::Log(map.next_value()?),
            other => match bare_step(other) {
                // `login: {}` or `login: ~` reads the same as `login`
                Some(step) => {
                    let _: serde_yaml::Value = map.next_value()?;
                    step
                }
                None => return Err(de::Error::unknown_variant(other, STEP_NAMES)),
            },
        };

        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::custom(format!(
                "step '{}' has a second key '{}'; write one step per list item",
                key, extra
            )));
        }

        Ok(step)
    }
}

// --- Step payloads ---

#[derive(Debug, Clone, Deserialize)]
pub struct AddProductsStep {
    /// Product names, searched and added in order.
    pub products: Vec<String>,
}

fn default_minus() -> u32 {
    3
}
fn default_plus() -> u32 {
    1
}

/// Clicks applied to every cart line's quantity buttons.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct AdjustQuantitiesStep {
    #[serde(default = "default_minus")]
    pub minus: u32,
    #[serde(default = "default_plus")]
    pub plus: u32,
}

impl Default for AdjustQuantitiesStep {
    fn default() -> Self {
        Self {
            minus: default_minus(),
            plus: default_plus(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecreaseItemStep {
    /// Cart line id, as in `shoppingCartItem_<id>`.
    pub item_id: String,
    #[serde(default = "default_minus")]
    pub clicks: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeStep {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenshotStep {
    /// Output path (supports {timestamp}).
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogStep {
    pub message: String,
}
