use crate::config::{Locale, LoginFixture};
use crate::driver::Driver;
use crate::interact::Interactor;
use crate::pages::{Authenticated, HomePage, LocationSelected};
use crate::{Error, Result};
use tracing::info;

/// Open the home page, close the push prompt if any, pick language and
/// location.
pub async fn launch_and_prepare<'d, D: Driver>(
    ui: Interactor<'d, D>,
    locale: &Locale,
) -> Result<HomePage<'d, D, LocationSelected>> {
    let home = HomePage::open(ui).await?;
    if !home.is_loaded().await? {
        return Err(ui.mismatch("home page").await);
    }
    home.close_alert().await;
    let home = home.select_language(&locale.language).await?;
    let home = home.select_location(&locale.city, &locale.area).await?;
    info!(
        "Prepared storefront ({} / {} / {})",
        locale.language, locale.city, locale.area
    );
    Ok(home)
}

/// Log in through the OTP popup and check the session took.
pub async fn login_with_otp<'d, D: Driver>(
    home: HomePage<'d, D, LocationSelected>,
    login: &LoginFixture,
) -> Result<HomePage<'d, D, Authenticated>> {
    let ui = home.ui();
    let prompt = home.click_login().await?;
    if !prompt.is_loaded().await {
        return Err(ui.mismatch("login popup").await);
    }
    prompt.enter_phone(&login.phone).await?;
    let phone = prompt.phone_value().await?;
    if phone != login.phone {
        return Err(readback("phone", &login.phone, phone));
    }

    let prompt = prompt.send_otp().await?;
    if !prompt.is_otp_visible().await {
        return Err(ui.mismatch("OTP field").await);
    }
    prompt.enter_otp(&login.otp).await?;
    let otp = prompt.otp_value().await?;
    if otp.is_empty() || otp != login.otp {
        return Err(readback("OTP", &login.otp, otp));
    }
    let home = prompt.verify_otp().await?;
    home.verify_authenticated().await?;
    Ok(home)
}

fn readback(field: &str, expected: &str, actual: String) -> Error {
    Error::NavigationMismatch {
        expected: format!("{} input holding '{}'", field, expected),
        actual: format!("'{}'", actual),
    }
}
