use super::{CartPage, ProfilePage, SearchResultsPage, OVERLAY_CLOSERS};
use crate::driver::Driver;
use crate::interact::{ElementRef, Interactor};
use crate::resilient::ResilientAction;
use crate::Result;
use futures::FutureExt;
use tracing::{debug, info, warn};

pub(crate) mod sel {
    use crate::driver::Selector;

    pub const SEARCH_INPUT: Selector = Selector::css("#small-searchterms");
    pub const CART_LINK: Selector = Selector::css("li#topcartlink a");
    pub const CART_LINK_HREF: Selector = Selector::css("a[href=\"/cart\"]");
    pub const CART_LABEL: Selector = Selector::css(".cart-label");
    pub const CART_TEXT: Selector = Selector::xpath("//span[normalize-space()='Shopping cart']");
    pub const USER_MENU: Selector = Selector::css(".header-links li.user-dropdown > span");
    pub const CUSTOMER_INFO_LINK: Selector = Selector::css("li.user-dropdown li.customer-info > a");
    pub const LOGOUT_LINK: Selector = Selector::css("a.ico-logout");
}

pub(crate) fn logout_link() -> ElementRef {
    ElementRef::new("logout link", sel::LOGOUT_LINK)
}

/// Site header present on every page once logged in.
pub struct Header<'d, D> {
    ui: Interactor<'d, D>,
}

impl<'d, D> Header<'d, D> {
    pub(crate) fn new(ui: Interactor<'d, D>) -> Self {
        Self { ui }
    }
}

impl<'d, D: Driver> Header<'d, D> {
    pub async fn is_logged_in(&self) -> bool {
        self.ui
            .is_visible(&logout_link(), self.ui.timing().probe_timeout())
            .await
    }

    /// Submit a search from the header box.
    ///
    /// Recovery: dismiss overlays and retry, then reload the home page once
    /// and retry.
    pub async fn search(self, query: &str) -> Result<SearchResultsPage<'d, D>> {
        let ui = self.ui;
        let dismissed = ui.dismiss_overlays(OVERLAY_CLOSERS).await;
        debug!("Dismissed {} overlays before search", dismissed);

        let input = ElementRef::new("search input", sel::SEARCH_INPUT);
        let input = &input;
        let done = ResilientAction::new(format!("search '{}'", query), "type-and-submit", move || {
            submit(ui, input, query).boxed_local()
        })
        .fallback("dismiss-overlays", move || {
            async move {
                ui.dismiss_overlays(OVERLAY_CLOSERS).await;
                submit(ui, input, query).await
            }
            .boxed_local()
        })
        .fallback("reload-home", move || {
            async move {
                ui.goto(&ui.site().url).await?;
                ui.settle(ui.timing().settle.reload_ms).await;
                ui.dismiss_overlays(OVERLAY_CLOSERS).await;
                submit(ui, input, query).await
            }
            .boxed_local()
        })
        .perform()
        .await?;

        info!("Searched for '{}' ({})", query, done.name);
        Ok(SearchResultsPage::new(ui))
    }

    /// Open the cart from the header link, or go to `/cart` directly.
    pub async fn open_cart(self) -> Result<CartPage<'d, D>> {
        let ui = self.ui;
        let link = ElementRef::new("cart link", sel::CART_LINK)
            .or(sel::CART_LINK_HREF)
            .or(sel::CART_LABEL)
            .or(sel::CART_TEXT);
        let link = &link;
        let cart_url = ui.site().url_for("/cart");
        let cart_url = cart_url.as_str();

        let done = ResilientAction::new("open cart", "cart-link", move || {
            async move { ui.click(link).await.map(|_| ()) }.boxed_local()
        })
        .fallback("direct-url", move || {
            async move { ui.goto(cart_url).await }.boxed_local()
        })
        .perform()
        .await?;

        ui.settle(ui.timing().settle.cart_ms).await;
        info!("Opened cart ({})", done.name);
        Ok(CartPage::new(ui))
    }

    /// Hover the user menu and follow "Customer info", or go to
    /// `/customer/info` directly.
    pub async fn open_profile(self) -> Result<ProfilePage<'d, D>> {
        let ui = self.ui;
        let menu = ElementRef::new("user menu", sel::USER_MENU);
        let menu = &menu;
        let info_link = ElementRef::new("customer info link", sel::CUSTOMER_INFO_LINK);
        let info_link = &info_link;
        let info_url = ui.site().url_for("/customer/info");
        let info_url = info_url.as_str();

        let opened = ResilientAction::new("open customer info", "user-menu", move || {
            async move {
                ui.hover(menu).await?;
                ui.settle(ui.timing().settle.menu_hover_ms).await;
                ui.click_within(info_link, ui.timing().wait_timeout())
                    .await?;
                ProfilePage::wait_loaded(ui).await
            }
            .boxed_local()
        })
        .fallback("direct-url", move || {
            async move {
                ui.goto(info_url).await?;
                ProfilePage::wait_loaded(ui).await
            }
            .boxed_local()
        })
        .perform()
        .await;

        match opened {
            Ok(done) => {
                info!("Opened customer info ({})", done.name);
                Ok(ProfilePage::new(ui))
            }
            Err(e) => {
                warn!("{}", e);
                Err(ui.mismatch("customer info form").await)
            }
        }
    }
}

async fn submit<D: Driver>(ui: Interactor<'_, D>, input: &ElementRef, query: &str) -> Result<()> {
    ui.click(input).await?;
    ui.fill(input, query).await?;
    ui.press("Enter").await
}
