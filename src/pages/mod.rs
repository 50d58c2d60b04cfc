//! Page objects, one per screen of the storefront.
//!
//! Operations that navigate consume the page object and return the next one,
//! so a reference to a screen that was left cannot be used again. [`Screen`]
//! holds whichever page object a run is currently on.

pub mod cart;
pub mod checkout;
pub mod header;
pub mod home;
pub mod item;
pub mod login;
pub mod profile;
pub mod results;

pub use cart::{CartPage, QuantityPlan};
pub use checkout::{CheckoutPage, OrderConfirmation};
pub use header::Header;
pub use home::{Authenticated, Entry, HomePage, LanguageSelected, LocationSelected};
pub use item::{AddToCartOutcome, ItemPage};
pub use login::{AuthPrompt, LoginPage, OtpSent};
pub use profile::{ProfilePage, ProfileValues};
pub use results::SearchResultsPage;

use crate::driver::Selector;
use crate::Error;
use std::fmt;

/// Close buttons of popups known to cover the storefront.
pub(crate) const OVERLAY_CLOSERS: &[Selector] = &[
    Selector::css("#close-push-notification"),
    Selector::css(".popup-notification .close"),
    Selector::css(".newsletter-popup .close"),
    Selector::css("button.close"),
    Selector::css("span[title=\"Close\"]"),
    Selector::css(".modal-dialog .close"),
];

/// Which page object a [`Screen`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Blank,
    Entry,
    LanguageSelected,
    LocationSelected,
    AuthPrompt,
    OtpSent,
    Authenticated,
    /// Some authenticated page reached through the header.
    Browsing,
    ProfileOpen,
    SearchResults,
    ItemOpen,
    CartOpen,
    Checkout,
    OrderConfirmed,
}

impl fmt::Display for ScreenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Blank => "blank page",
            Self::Entry => "home page",
            Self::LanguageSelected => "home page (language selected)",
            Self::LocationSelected => "home page (location selected)",
            Self::AuthPrompt => "login prompt",
            Self::OtpSent => "login prompt (OTP sent)",
            Self::Authenticated => "home page (logged in)",
            Self::Browsing => "authenticated page",
            Self::ProfileOpen => "customer info page",
            Self::SearchResults => "search results",
            Self::ItemOpen => "product page",
            Self::CartOpen => "cart page",
            Self::Checkout => "checkout page",
            Self::OrderConfirmed => "order confirmation",
        };
        f.write_str(name)
    }
}

/// The page object a run is on, threaded by value from step to step.
pub enum Screen<'d, D> {
    Blank,
    Entry(HomePage<'d, D, Entry>),
    LanguageSelected(HomePage<'d, D, LanguageSelected>),
    LocationSelected(HomePage<'d, D, LocationSelected>),
    AuthPrompt(LoginPage<'d, D, AuthPrompt>),
    OtpSent(LoginPage<'d, D, OtpSent>),
    Authenticated(HomePage<'d, D, Authenticated>),
    Browsing(Header<'d, D>),
    Profile(ProfilePage<'d, D>),
    SearchResults(SearchResultsPage<'d, D>),
    Item(ItemPage<'d, D>),
    Cart(CartPage<'d, D>),
    Checkout(CheckoutPage<'d, D>),
    OrderConfirmed(OrderConfirmation<'d, D>),
}

impl<'d, D> Screen<'d, D> {
    pub fn state(&self) -> ScreenState {
        match self {
            Self::Blank => ScreenState::Blank,
            Self::Entry(_) => ScreenState::Entry,
            Self::LanguageSelected(_) => ScreenState::LanguageSelected,
            Self::LocationSelected(_) => ScreenState::LocationSelected,
            Self::AuthPrompt(_) => ScreenState::AuthPrompt,
            Self::OtpSent(_) => ScreenState::OtpSent,
            Self::Authenticated(_) => ScreenState::Authenticated,
            Self::Browsing(_) => ScreenState::Browsing,
            Self::Profile(_) => ScreenState::ProfileOpen,
            Self::SearchResults(_) => ScreenState::SearchResults,
            Self::Item(_) => ScreenState::ItemOpen,
            Self::Cart(_) => ScreenState::CartOpen,
            Self::Checkout(_) => ScreenState::Checkout,
            Self::OrderConfirmed(_) => ScreenState::OrderConfirmed,
        }
    }

    /// Error for a step that needs a different screen.
    pub fn mismatch(self, expected: &str) -> Error {
        Error::NavigationMismatch {
            expected: expected.to_string(),
            actual: self.state().to_string(),
        }
    }

    /// The site header, available on every page after login.
    pub fn into_header(self) -> crate::Result<Header<'d, D>> {
        match self {
            Self::Authenticated(p) => Ok(p.into_header()),
            Self::Browsing(h) => Ok(h),
            Self::Profile(p) => Ok(p.into_header()),
            Self::SearchResults(p) => Ok(p.into_header()),
            Self::Item(p) => Ok(p.into_header()),
            Self::Cart(p) => Ok(p.into_header()),
            Self::Checkout(p) => Ok(p.into_header()),
            Self::OrderConfirmed(p) => Ok(p.into_header()),
            other => Err(other.mismatch("a logged-in page")),
        }
    }
}

macro_rules! screen_from {
    ($($variant:ident => $page:ty),* $(,)?) => {
        $(
            impl<'d, D> From<$page> for Screen<'d, D> {
                fn from(page: $page) -> Self {
                    Self::$variant(page)
                }
            }
        )*
    };
}

screen_from! {
    Entry => HomePage<'d, D, Entry>,
    LanguageSelected => HomePage<'d, D, LanguageSelected>,
    LocationSelected => HomePage<'d, D, LocationSelected>,
    AuthPrompt => LoginPage<'d, D, AuthPrompt>,
    OtpSent => LoginPage<'d, D, OtpSent>,
    Authenticated => HomePage<'d, D, Authenticated>,
    Browsing => Header<'d, D>,
    Profile => ProfilePage<'d, D>,
    SearchResults => SearchResultsPage<'d, D>,
    Item => ItemPage<'d, D>,
    Cart => CartPage<'d, D>,
    Checkout => CheckoutPage<'d, D>,
    OrderConfirmed => OrderConfirmation<'d, D>,
}
