use crate::config::ProfileFixture;
use crate::driver::Driver;
use crate::pages::{Header, ProfilePage, ProfileValues};
use crate::Result;

/// Open customer info from the header and save the fixture values.
pub async fn update_profile<'d, D: Driver>(
    header: Header<'d, D>,
    data: &ProfileFixture,
) -> Result<ProfilePage<'d, D>> {
    let page = header.open_profile().await?;
    page.update(&ProfileValues::from(data)).await?;
    Ok(page)
}

/// Read the form back; every differing field is reported.
pub async fn verify_profile<D: Driver>(
    page: &ProfilePage<'_, D>,
    data: &ProfileFixture,
) -> Result<()> {
    page.verify(&ProfileValues::from(data)).await
}
