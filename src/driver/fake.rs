//! Scripted in-memory browser for tests.
//!
//! Elements are keyed by selector; clicks, keys and navigations fire hooks that
//! mutate the state, so a test can script how the "site" reacts.

use super::{Driver, Locator, Selector};
use crate::pages::{cart, checkout, header, home, item, login, profile, results};
use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub text: String,
    pub value: String,
    /// Hidden when `None`.
    pub visible_from: Option<Instant>,
    /// Pointer clicks that fail as if another element covered this one.
    pub covered: u32,
    /// Option labels of a native `<select>`.
    pub options: Vec<String>,
    /// `maxlength` of an input; typing stops there.
    pub max_len: Option<usize>,
}

impl FakeElement {
    fn visible(&self) -> bool {
        self.visible_from.is_some_and(|t| Instant::now() >= t)
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub url: String,
    pub title: String,
    pub body: String,
    elements: HashMap<Selector, Vec<FakeElement>>,
    /// Every driver call that changes something, in order.
    pub log: Vec<String>,
    /// Scratch space for hooks.
    pub data: HashMap<String, String>,
    pub cart: Vec<String>,
}

impl FakeState {
    /// Attach one visible element.
    pub fn show(&mut self, selector: Selector, text: &str) {
        self.show_all(selector, &[text]);
    }

    /// Replace the matches of `selector` with visible elements.
    pub fn show_all(&mut self, selector: Selector, texts: &[&str]) {
        let now = Instant::now();
        let elements = texts
            .iter()
            .map(|t| FakeElement {
                text: t.to_string(),
                visible_from: Some(now),
                ..Default::default()
            })
            .collect();
        self.elements.insert(selector, elements);
    }

    /// Attach an element that becomes visible after `delay`.
    pub fn show_after(&mut self, selector: Selector, text: &str, delay: Duration) {
        self.show(selector.clone(), text);
        if let Some(el) = self.element_mut(&selector.first()) {
            el.visible_from = Some(Instant::now() + delay);
        }
    }

    /// Keep the elements attached but invisible.
    pub fn hide(&mut self, selector: &Selector) {
        if let Some(els) = self.elements.get_mut(selector) {
            for el in els {
                el.visible_from = None;
            }
        }
    }

    pub fn remove(&mut self, selector: &Selector) {
        self.elements.remove(selector);
    }

    pub fn element(&self, locator: &Locator) -> Option<&FakeElement> {
        self.elements.get(&locator.selector)?.get(locator.nth)
    }

    pub fn element_mut(&mut self, locator: &Locator) -> Option<&mut FakeElement> {
        self.elements.get_mut(&locator.selector)?.get_mut(locator.nth)
    }

    pub fn is_visible(&self, selector: &Selector) -> bool {
        self.element(&selector.first()).is_some_and(FakeElement::visible)
    }

    pub fn value(&self, selector: &Selector) -> String {
        self.element(&selector.first())
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    pub fn set_value(&mut self, selector: &Selector, value: &str) {
        if let Some(el) = self.element_mut(&selector.first()) {
            el.value = value.to_string();
        }
    }

    pub fn set_options(&mut self, selector: &Selector, options: &[&str]) {
        if let Some(el) = self.element_mut(&selector.first()) {
            el.options = options.iter().map(|o| o.to_string()).collect();
        }
    }

    pub fn limit_len(&mut self, selector: &Selector, max: usize) {
        if let Some(el) = self.element_mut(&selector.first()) {
            el.max_len = Some(max);
        }
    }

    /// Make the next `n` pointer clicks on `selector` fail.
    pub fn cover(&mut self, selector: &Selector, n: u32) {
        if let Some(el) = self.element_mut(&selector.first()) {
            el.covered = n;
        }
    }

    pub fn logged(&self, entry: &str) -> bool {
        self.log.iter().any(|l| l == entry)
    }

    /// Quantity of a cart line by product id; 0 when not in the cart.
    pub fn quantity(&self, id: &str) -> u32 {
        self.data
            .get(&format!("qty:{}", id))
            .and_then(|q| q.parse().ok())
            .unwrap_or(0)
    }
}

type Hook = Rc<dyn Fn(&mut FakeState, usize)>;

/// Hook keys: a selector's display form for clicks, `hover <selector>`,
/// `select <selector>`, `key <name>`, `goto <url>` and `reload`.
#[derive(Default)]
pub struct FakeDriver {
    state: RefCell<FakeState>,
    hooks: RefCell<HashMap<String, Hook>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::cell::Ref<'_, FakeState> {
        self.state.borrow()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    pub fn on(&self, key: impl Into<String>, hook: impl Fn(&mut FakeState, usize) + 'static) {
        self.hooks.borrow_mut().insert(key.into(), Rc::new(hook));
    }

    pub fn on_click(&self, selector: &Selector, hook: impl Fn(&mut FakeState, usize) + 'static) {
        self.on(selector.to_string(), hook);
    }

    fn fire(&self, key: &str, nth: usize) {
        let hook = self.hooks.borrow().get(key).cloned();
        if let Some(hook) = hook {
            hook(&mut self.state.borrow_mut(), nth);
        }
    }

    fn record(&self, entry: String) {
        self.state.borrow_mut().log.push(entry);
    }

    fn require(&self, locator: &Locator, visible: bool) -> Result<()> {
        let state = self.state.borrow();
        match state.element(locator) {
            Some(el) if !visible || el.visible() => Ok(()),
            _ => Err(Error::Browser(eoka::Error::ElementNotFound(
                locator.to_string(),
            ))),
        }
    }
}

impl Driver for FakeDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.with_state(|s| s.url = url.to_string());
        self.record(format!("goto {}", url));
        self.fire(&format!("goto {}", url), 0);
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.record("reload".into());
        self.fire("reload", 0);
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.state.borrow().url.clone())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.state.borrow().title.clone())
    }

    async fn body_text(&self) -> Result<String> {
        Ok(self.state.borrow().body.clone())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        Ok(self
            .state
            .borrow()
            .elements
            .get(selector)
            .map_or(0, Vec::len))
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        Ok(self
            .state
            .borrow()
            .element(locator)
            .is_some_and(FakeElement::visible))
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.require(locator, true)?;
        let covered = self.with_state(|s| {
            let el = s.element_mut(locator)?;
            (el.covered > 0).then(|| el.covered -= 1)
        });
        if covered.is_some() {
            self.record(format!("blocked {}", locator));
            return Err(Error::Browser(eoka::Error::CdpSimple(format!(
                "click on {} intercepted by another element",
                locator
            ))));
        }
        self.record(format!("click {}", locator));
        self.fire(&locator.selector.to_string(), locator.nth);
        Ok(())
    }

    async fn dispatch_click(&self, locator: &Locator) -> Result<()> {
        self.require(locator, false)?;
        self.record(format!("dispatch {}", locator));
        self.fire(&locator.selector.to_string(), locator.nth);
        Ok(())
    }

    async fn hover(&self, locator: &Locator) -> Result<()> {
        self.require(locator, true)?;
        self.record(format!("hover {}", locator));
        self.fire(&format!("hover {}", locator.selector), locator.nth);
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> Result<()> {
        self.require(locator, true)?;
        self.with_state(|s| {
            if let Some(el) = s.element_mut(locator) {
                el.value.clear();
            }
        });
        Ok(())
    }

    async fn type_into(&self, locator: &Locator, text: &str) -> Result<()> {
        self.require(locator, true)?;
        self.with_state(|s| {
            if let Some(el) = s.element_mut(locator) {
                el.value.push_str(text);
                if let Some(max) = el.max_len {
                    el.value = el.value.chars().take(max).collect();
                }
            }
        });
        self.record(format!("type {} {}", locator, text));
        Ok(())
    }

    async fn text_of(&self, locator: &Locator) -> Result<String> {
        self.require(locator, false)?;
        Ok(self
            .state
            .borrow()
            .element(locator)
            .map(|e| e.text.clone())
            .unwrap_or_default())
    }

    async fn value_of(&self, locator: &Locator) -> Result<String> {
        self.require(locator, false)?;
        Ok(self
            .state
            .borrow()
            .element(locator)
            .map(|e| e.value.clone())
            .unwrap_or_default())
    }

    async fn select_by_label(&self, locator: &Locator, label: &str) -> Result<bool> {
        self.require(locator, true)?;
        let found = self.with_state(|s| {
            let el = s.element_mut(locator)?;
            let opt = el.options.iter().find(|o| o.trim() == label.trim())?.clone();
            el.value = opt;
            Some(())
        });
        if found.is_none() {
            return Ok(false);
        }
        self.record(format!("select {} {}", locator, label));
        self.fire(&format!("select {}", locator.selector), locator.nth);
        Ok(true)
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.record(format!("key {}", key));
        self.fire(&format!("key {}", key), 0);
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.record("screenshot".into());
        Ok(b"\x89PNG fake".to_vec())
    }
}

// --- scripted storefront ---

pub const STORE_URL: &str = "https://www.vitacare.test/";
pub const STORE_OTP: &str = "123456";

/// Product id and title, in search result order.
pub const CATALOG: &[(&str, &str)] = &[
    ("6949", "Vitacare Air Freshener Anti-Tobacco Spray 300ml"),
    ("7012", "Vitacare Hand Wash Lemon 250ml"),
    ("7150", "Vitacare Baby Diaper Pants M 40pcs"),
];

const CITIES: &[&str] = &["Chattogram", "Dhaka", "Sylhet"];
const DHAKA_AREAS: &[&str] = &["Banani", "Banasree", "Dhanmondi"];

const PROFILE_FIELDS: [(Selector, &str); 4] = [
    (profile::sel::FIRST_NAME, "firstName"),
    (profile::sel::LAST_NAME, "lastName"),
    (profile::sel::EMAIL, "email"),
    (profile::sel::COMPANY, "companyName"),
];

fn logged_in(s: &FakeState) -> bool {
    s.data.contains_key("logged_in")
}

/// Replace the page: new URL and title, header kept when logged in.
fn open(s: &mut FakeState, path: &str, title: &str) {
    s.url = format!("{}{}", STORE_URL, path);
    s.title = title.to_string();
    s.body = title.to_string();
    s.elements.clear();
    if logged_in(s) {
        s.show(header::sel::LOGOUT_LINK, "Log out");
        s.show(header::sel::USER_MENU, "My account");
        s.show(header::sel::SEARCH_INPUT, "");
        s.show(header::sel::CART_LINK, "Shopping cart");
    }
}

fn home_page(s: &mut FakeState) {
    open(s, "", "Home page - Vitacare");
    if !logged_in(s) {
        s.show(home::sel::CLOSE_ALERT, "x");
        s.show(home::sel::LANGUAGE, "");
        s.set_options(&home::sel::LANGUAGE, &["EN", "BN"]);
        s.show(home::sel::LOCATION_LABEL, "Select Location");
    }
}

fn open_picker(s: &mut FakeState, picking: &str, options: &[&str]) {
    s.data.insert("picking".into(), picking.into());
    s.show(home::sel::PICKER_OPTIONS, "");
    s.show_all(home::sel::PICKER_OPTION, options);
}

fn profile_page(s: &mut FakeState) {
    open(s, "customer/info", "Customer info");
    for (selector, key) in PROFILE_FIELDS {
        let value = s.data.get(key).cloned().unwrap_or_default();
        s.show(selector.clone(), "");
        s.set_value(&selector, &value);
    }
    s.show(profile::sel::SAVE, "Save");
}

fn product_page(s: &mut FakeState, title: &str) {
    let id = product_id(title).unwrap_or("0");
    open(s, &format!("product/{}", id), title);
    s.data.insert("product".into(), title.into());
    s.show(item::sel::TITLE, title);
    s.show(item::sel::ADD_TO_CART, "Add to cart");
}

fn product_id(title: &str) -> Option<&'static str> {
    CATALOG.iter().find(|(_, t)| *t == title).map(|(id, _)| *id)
}

fn show_quantity_buttons(s: &mut FakeState) {
    let lines = vec!["-"; s.cart.len()];
    s.show_all(cart::sel::QTY_MINUS, &lines);
    let lines = vec!["+"; s.cart.len()];
    s.show_all(cart::sel::QTY_PLUS, &lines);
}

fn cart_page(s: &mut FakeState) {
    open(s, "cart", "Shopping cart");
    if s.cart.is_empty() {
        s.body = "Your Shopping Cart is empty!".into();
        return;
    }
    s.show(cart::sel::MARKERS, "");
    show_quantity_buttons(s);
    let ids: Vec<&str> = s.cart.iter().filter_map(|t| product_id(t)).collect();
    for id in ids {
        s.show(cart::decrease_button(id), "-");
    }
    s.show(cart::sel::GO_TO_CHECKOUT, "Go to cart");
}

fn checkout_page(s: &mut FakeState) {
    open(s, "onepagecheckout", "Checkout");
    s.show(checkout::sel::MARKERS, "");
    show_quantity_buttons(s);
    s.show(checkout::sel::DISCOUNT_INPUT, "");
    s.show(checkout::sel::DISCOUNT_APPLY, "Apply coupon");
    s.show(checkout::sel::GIFT_CARD_INPUT, "");
    s.show(checkout::sel::GIFT_CARD_APPLY, "Add gift card");
    s.show(checkout::sel::PICKUP, "Pickup");
    s.show(checkout::sel::CONFIRM, "Confirm");
}

fn add_line(s: &mut FakeState, title: String) {
    let Some(id) = product_id(&title) else {
        return;
    };
    let qty = s.quantity(id);
    if qty == 0 {
        s.cart.push(title);
    }
    s.data.insert(format!("qty:{}", id), (qty + 1).to_string());
}

/// Quantities never drop below 1.
fn change_quantity(s: &mut FakeState, id: &str, delta: i64) {
    let qty = (i64::from(s.quantity(id)) + delta).max(1);
    s.data.insert(format!("qty:{}", id), qty.to_string());
}

fn change_line(s: &mut FakeState, line: usize, delta: i64) {
    if let Some(id) = s.cart.get(line).and_then(|t| product_id(t)) {
        change_quantity(s, id, delta);
    }
}

/// A logged-out visitor on a small storefront: language and location
/// prompts, OTP login (code [`STORE_OTP`]), customer info, search over
/// [`CATALOG`], cart and checkout.
pub fn storefront() -> FakeDriver {
    let driver = FakeDriver::new();
    driver.with_state(|s| {
        for (key, value) in [
            ("firstName", "Old"),
            ("lastName", "Name"),
            ("email", "old@example.com"),
            ("companyName", ""),
        ] {
            s.data.insert(key.into(), value.into());
        }
    });

    driver.on(format!("goto {}", STORE_URL), |s, _| home_page(s));
    driver.on(format!("goto {}cart", STORE_URL), |s, _| cart_page(s));
    driver.on(format!("goto {}customer/info", STORE_URL), |s, _| {
        if logged_in(s) {
            profile_page(s);
        } else {
            open(s, "login", "Login");
        }
    });

    // Language and location
    driver.on_click(&home::sel::CLOSE_ALERT, |s, _| {
        s.remove(&home::sel::CLOSE_ALERT)
    });
    driver.on_click(&home::sel::LOCATION_LABEL, |s, _| {
        s.show(home::sel::CITY_PICKER, "Select city");
        s.show(home::sel::AREA_PICKER, "Select area");
        s.show(home::sel::LOCATION_CONTINUE, "Continue");
    });
    driver.on(format!("select {}", home::sel::LANGUAGE), |s, _| {
        let language = s.value(&home::sel::LANGUAGE);
        s.data.insert("language".into(), language);
    });
    driver.on_click(&home::sel::CITY_PICKER, |s, _| open_picker(s, "city", CITIES));
    driver.on_click(&home::sel::AREA_PICKER, |s, _| {
        let areas: &[&str] = match s.data.get("city").map(String::as_str) {
            Some("Dhaka") => DHAKA_AREAS,
            _ => &[],
        };
        open_picker(s, "area", areas);
    });
    driver.on_click(&home::sel::PICKER_OPTION, |s, nth| {
        let Some(label) = s
            .element(&home::sel::PICKER_OPTION.nth(nth))
            .map(|e| e.text.clone())
        else {
            return;
        };
        let picking = s.data.get("picking").cloned().unwrap_or_default();
        s.data.insert(picking, label);
        s.remove(&home::sel::PICKER_OPTION);
        s.hide(&home::sel::PICKER_OPTIONS);
    });
    driver.on_click(&home::sel::LOCATION_CONTINUE, |s, _| {
        if !(s.data.contains_key("city") && s.data.contains_key("area")) {
            return;
        }
        for selector in [
            home::sel::LOCATION_LABEL,
            home::sel::CITY_PICKER,
            home::sel::AREA_PICKER,
            home::sel::LOCATION_CONTINUE,
        ] {
            s.remove(&selector);
        }
        s.show(home::sel::LOGIN_LINK, "Log in");
    });

    // OTP login
    driver.on_click(&home::sel::LOGIN_LINK, |s, _| {
        s.show(login::sel::PHONE, "");
        s.show(login::sel::SEND_OTP, "Send OTP");
    });
    driver.on_click(&login::sel::SEND_OTP, |s, _| {
        if !s.value(&login::sel::PHONE).is_empty() {
            s.show(login::sel::OTP, "");
            s.show(login::sel::VERIFY_OTP, "Verify");
        }
    });
    driver.on_click(&login::sel::VERIFY_OTP, |s, _| {
        if s.value(&login::sel::OTP) != STORE_OTP {
            s.body = "Invalid OTP".into();
            return;
        }
        let phone = s.value(&login::sel::PHONE);
        s.data.insert("logged_in".into(), phone);
        home_page(s);
    });

    // Header
    driver.on(format!("hover {}", header::sel::USER_MENU), |s, _| {
        s.show(header::sel::CUSTOMER_INFO_LINK, "Customer info")
    });
    driver.on_click(&header::sel::CUSTOMER_INFO_LINK, |s, _| profile_page(s));
    driver.on_click(&header::sel::CART_LINK, |s, _| cart_page(s));
    driver.on_click(&header::sel::LOGOUT_LINK, |s, _| {
        s.data.remove("logged_in");
        home_page(s);
    });
    driver.on("key Enter", |s, _| {
        if !s.is_visible(&header::sel::SEARCH_INPUT) {
            return;
        }
        let query = s.value(&header::sel::SEARCH_INPUT);
        if query.trim().is_empty() {
            return;
        }
        open(s, &format!("search?q={}", query.replace(' ', "+")), "Search");
        let titles: Vec<&str> = CATALOG.iter().map(|(_, t)| *t).collect();
        s.show_all(results::sel::TITLE, &titles);
    });

    // Profile
    driver.on_click(&profile::sel::SAVE, |s, _| {
        for (selector, key) in PROFILE_FIELDS {
            let value = s.value(&selector);
            s.data.insert(key.into(), value);
        }
        profile_page(s);
    });

    // Catalog
    driver.on_click(&results::sel::TITLE, |s, nth| {
        if let Some(title) = s
            .element(&results::sel::TITLE.nth(nth))
            .map(|e| e.text.clone())
        {
            product_page(s, &title);
        }
    });
    driver.on_click(&item::sel::ADD_TO_CART, |s, _| {
        if let Some(product) = s.data.get("product").cloned() {
            add_line(s, product);
        }
        s.show(
            item::sel::POPUP,
            "The product has been added to your shopping cart",
        );
        s.show(item::sel::POPUP_CLOSE, "x");
    });
    driver.on_click(&item::sel::POPUP_CLOSE, |s, _| {
        s.remove(&item::sel::POPUP);
        s.remove(&item::sel::POPUP_CLOSE);
    });

    // Cart and checkout
    driver.on_click(&cart::sel::QTY_MINUS, |s, nth| change_line(s, nth, -1));
    driver.on_click(&cart::sel::QTY_PLUS, |s, nth| change_line(s, nth, 1));
    for (id, _) in CATALOG {
        driver.on_click(&cart::decrease_button(id), move |s, _| {
            change_quantity(s, id, -1)
        });
    }
    driver.on_click(&cart::sel::GO_TO_CHECKOUT, |s, _| checkout_page(s));
    driver.on_click(&checkout::sel::DISCOUNT_APPLY, |s, _| {
        let code = s.value(&checkout::sel::DISCOUNT_INPUT);
        s.data.insert("discount".into(), code);
    });
    driver.on_click(&checkout::sel::GIFT_CARD_APPLY, |s, _| {
        let code = s.value(&checkout::sel::GIFT_CARD_INPUT);
        s.data.insert("gift_card".into(), code);
    });
    driver.on_click(&checkout::sel::PICKUP, |s, _| {
        s.data.insert("shipping".into(), "pickup".into());
    });
    driver.on_click(&checkout::sel::CONFIRM, |s, _| {
        open(s, "checkout/completed", "Order completed");
        s.body = "Your order has been successfully processed!".into();
        s.data.insert("order".into(), "placed".into());
        s.cart.clear();
    });

    driver
}
