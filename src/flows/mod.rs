//! User journeys composed from page objects.
//!
//! Flows only sequence page operations; they take page objects by value and
//! hand back whatever page the journey ends on.

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod profile;

pub use auth::{launch_and_prepare, login_with_otp};
pub use catalog::{add_multiple_products, add_product_to_cart, search_and_open, AddedProduct};
pub use checkout::{complete_order, go_to_cart, go_to_checkout, CheckoutPlan, CheckoutReport};
pub use profile::{update_profile, verify_profile};
