use super::{Authenticated, HomePage};
use crate::driver::Driver;
use crate::interact::{ElementRef, Interactor};
use crate::Result;
use std::marker::PhantomData;
use tracing::info;

pub(crate) mod sel {
    use crate::driver::Selector;

    pub const PHONE: Selector = Selector::css("#otp_login_Phone");
    pub const SEND_OTP: Selector = Selector::css("#btnOtpSendPopup");
    pub const OTP: Selector = Selector::css("#otp_login_Otp");
    pub const VERIFY_OTP: Selector = Selector::css("#btnVerifyOtpPopup");
}

fn phone_input() -> ElementRef {
    ElementRef::new("phone input", sel::PHONE)
}

fn otp_input() -> ElementRef {
    ElementRef::new("OTP input", sel::OTP)
}

/// Waiting for a phone number.
pub struct AuthPrompt;
/// OTP requested, waiting for the code.
pub struct OtpSent;

/// The OTP login popup.
pub struct LoginPage<'d, D, S = AuthPrompt> {
    ui: Interactor<'d, D>,
    state: PhantomData<S>,
}

impl<'d, D, S> LoginPage<'d, D, S> {
    pub(crate) fn at(ui: Interactor<'d, D>) -> Self {
        Self {
            ui,
            state: PhantomData,
        }
    }
}

impl<'d, D: Driver, S> LoginPage<'d, D, S> {
    /// Phone input visible.
    pub async fn is_loaded(&self) -> bool {
        self.ui
            .is_visible(&phone_input(), self.ui.timing().action_timeout())
            .await
    }

    pub async fn phone_value(&self) -> Result<String> {
        self.ui.read_value(&phone_input()).await
    }

    pub async fn is_otp_visible(&self) -> bool {
        self.ui
            .is_visible(&otp_input(), self.ui.timing().probe_timeout())
            .await
    }
}

impl<'d, D: Driver> LoginPage<'d, D, AuthPrompt> {
    pub async fn enter_phone(&self, phone: &str) -> Result<()> {
        self.ui.fill(&phone_input(), phone).await?;
        Ok(())
    }

    /// Request the code; the OTP field must appear.
    pub async fn send_otp(self) -> Result<LoginPage<'d, D, OtpSent>> {
        let ui = self.ui;
        ui.click(&ElementRef::new("send OTP button", sel::SEND_OTP))
            .await?;
        ui.wait_visible(&otp_input(), ui.timing().wait_timeout())
            .await?;
        info!("OTP requested");
        Ok(LoginPage::at(ui))
    }
}

impl<'d, D: Driver> LoginPage<'d, D, OtpSent> {
    pub async fn enter_otp(&self, otp: &str) -> Result<()> {
        self.ui.fill(&otp_input(), otp).await?;
        Ok(())
    }

    pub async fn otp_value(&self) -> Result<String> {
        self.ui.read_value(&otp_input()).await
    }

    pub async fn verify_otp(self) -> Result<HomePage<'d, D, Authenticated>> {
        let ui = self.ui;
        ui.click(&ElementRef::new("verify OTP button", sel::VERIFY_OTP))
            .await?;
        info!("OTP submitted");
        Ok(HomePage::at(ui))
    }
}
