use super::{Header, LoginPage, OVERLAY_CLOSERS};
use crate::driver::Driver;
use crate::interact::{ElementRef, Interactor};
use crate::resilient::{self, ResilientAction};
use crate::{Error, Result};
use futures::FutureExt;
use shopcheck_match::find_exact;
use std::marker::PhantomData;
use tracing::{debug, info};

pub(crate) mod sel {
    use crate::driver::Selector;

    pub const CLOSE_ALERT: Selector = Selector::css("#close-push-notification");
    pub const LANGUAGE: Selector = Selector::css("#customerlanguage");
    pub const LOCATION_LABEL: Selector = Selector::css(".location-select label");
    pub const LOCATION_LABEL_ALT: Selector = Selector::css(".select-location label");
    pub const LOCATION_LABEL_TEXT: Selector = Selector::text("Select Location");
    pub const CITY_PICKER: Selector = Selector::css("#select2-SelectedCityId-container");
    pub const AREA_PICKER: Selector = Selector::css("#select2-SelectedAreaId-container");
    pub const PICKER_OPTIONS: Selector = Selector::css(".select2-results__options");
    pub const PICKER_OPTION: Selector = Selector::css(".select2-results__option");
    pub const LOCATION_CONTINUE: Selector = Selector::css("#saveButton");
    pub const LOGIN_LINK: Selector = Selector::css("#login-link");
}

/// Document title of the home page contains this.
const HOME_TITLE: &str = "Home page";

// Typestates of the home page.
pub struct Entry;
pub struct LanguageSelected;
pub struct LocationSelected;
pub struct Authenticated;

pub struct HomePage<'d, D, S = Entry> {
    ui: Interactor<'d, D>,
    state: PhantomData<S>,
}

impl<'d, D, S> HomePage<'d, D, S> {
    pub(crate) fn at(ui: Interactor<'d, D>) -> Self {
        Self {
            ui,
            state: PhantomData,
        }
    }

    pub(crate) fn ui(&self) -> Interactor<'d, D> {
        self.ui
    }

    fn advance<T>(self) -> HomePage<'d, D, T> {
        HomePage::at(self.ui)
    }
}

impl<'d, D: Driver, S> HomePage<'d, D, S> {
    pub async fn is_loaded(&self) -> Result<bool> {
        Ok(self.ui.driver().title().await?.contains(HOME_TITLE))
    }

    pub async fn url(&self) -> Result<String> {
        self.ui.current_url().await
    }
}

impl<'d, D: Driver> HomePage<'d, D, Entry> {
    /// Navigate to the site's home page.
    pub async fn open(ui: Interactor<'d, D>) -> Result<Self> {
        ui.goto(&ui.site().url).await?;
        Ok(Self::at(ui))
    }

    /// Close the push-notification prompt if it shows up.
    pub async fn close_alert(&self) -> bool {
        let close = ElementRef::new("push notification close", sel::CLOSE_ALERT);
        let closed = self.ui.try_click(&close, self.ui.timing().probe_timeout()).await;
        if closed {
            info!("Closed push notification prompt");
        } else {
            debug!("No push notification prompt");
        }
        closed
    }

    pub async fn select_language(self, label: &str) -> Result<HomePage<'d, D, LanguageSelected>> {
        let ui = self.ui;
        let select = ElementRef::new("language select", sel::LANGUAGE);
        let hit = ui.wait_visible(&select, ui.timing().action_timeout()).await?;
        if !ui.driver().select_by_label(&hit.locator, label).await? {
            return Err(Error::OptionNotFound {
                picker: "language".into(),
                label: label.into(),
            });
        }
        ui.settle(ui.timing().settle.option_ms).await;
        info!("Selected language: {}", label);
        Ok(self.advance())
    }
}

impl<'d, D: Driver> HomePage<'d, D, LanguageSelected> {
    /// Open the location popup, pick city then area by exact label, confirm.
    pub async fn select_location(
        self,
        city: &str,
        area: &str,
    ) -> Result<HomePage<'d, D, LocationSelected>> {
        let ui = self.ui;
        let label = ElementRef::new("location label", sel::LOCATION_LABEL)
            .or(sel::LOCATION_LABEL_ALT)
            .or(sel::LOCATION_LABEL_TEXT);
        resilient::click(ui, &label, OVERLAY_CLOSERS).perform().await?;

        let city_picker = ElementRef::new("city picker", sel::CITY_PICKER);
        self.pick("city", &city_picker, city).await?;
        let area_picker = ElementRef::new("area picker", sel::AREA_PICKER);
        self.pick("area", &area_picker, area).await?;

        let confirm = ElementRef::new("location continue button", sel::LOCATION_CONTINUE);
        resilient::click(ui, &confirm, OVERLAY_CLOSERS).perform().await?;
        ui.settle(ui.timing().settle.location_ms).await;

        info!("Selected location: {} / {}", city, area);
        Ok(self.advance())
    }

    async fn pick(&self, picker: &str, trigger: &ElementRef, label: &str) -> Result<()> {
        let ui = self.ui;
        ui.click(trigger).await?;

        let list = ElementRef::new("picker options", sel::PICKER_OPTIONS);
        ui.wait_visible(&list, ui.timing().wait_timeout()).await?;

        let options = ui.texts(&sel::PICKER_OPTION).await?;
        let Some(index) = find_exact(label, &options) else {
            debug!("{} options: {:?}", picker, options);
            return Err(Error::OptionNotFound {
                picker: picker.into(),
                label: label.into(),
            });
        };

        let option = sel::PICKER_OPTION.nth(index);
        let option = &option;
        ResilientAction::new(format!("select {} '{}'", picker, label), "pointer", move || {
            async move { ui.click_at("picker option", option).await }.boxed_local()
        })
        .fallback("dom-click", move || {
            async move { ui.driver().dispatch_click(option).await }.boxed_local()
        })
        .perform()
        .await?;

        ui.settle(ui.timing().settle.option_ms).await;
        debug!("Picked {} '{}' (option {})", picker, label, index);
        Ok(())
    }
}

impl<'d, D: Driver> HomePage<'d, D, LocationSelected> {
    pub async fn click_login(self) -> Result<LoginPage<'d, D>> {
        let link = ElementRef::new("login link", sel::LOGIN_LINK);
        resilient::click(self.ui, &link, OVERLAY_CLOSERS)
            .perform()
            .await?;
        info!("Opened login prompt");
        Ok(LoginPage::at(self.ui))
    }
}

impl<'d, D: Driver> HomePage<'d, D, Authenticated> {
    pub async fn is_logged_in(&self) -> bool {
        Header::new(self.ui).is_logged_in().await
    }

    /// Logged-in marker visible and the URL still on the target site.
    pub async fn verify_authenticated(&self) -> Result<()> {
        let ui = self.ui;
        let logout = super::header::logout_link();
        if ui
            .wait_visible(&logout, ui.timing().page_load_timeout())
            .await
            .is_err()
        {
            return Err(ui.mismatch("logged-in home page (logout link visible)").await);
        }

        let token = ui.site().domain_token();
        let url = ui.current_url().await?;
        if !url.to_lowercase().contains(&token) {
            return Err(Error::NavigationMismatch {
                expected: format!("URL containing '{}'", token),
                actual: url,
            });
        }
        info!("Logged in at {}", url);
        Ok(())
    }

    pub async fn open_profile(self) -> Result<super::ProfilePage<'d, D>> {
        self.into_header().open_profile().await
    }
}

impl<'d, D> HomePage<'d, D, Authenticated> {
    pub fn into_header(self) -> Header<'d, D> {
        Header::new(self.ui)
    }
}
