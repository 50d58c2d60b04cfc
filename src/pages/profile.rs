use super::Header;
use crate::config::ProfileFixture;
use crate::driver::Driver;
use crate::interact::{ElementRef, Interactor};
use crate::{Error, FieldMismatch, Result};
use tracing::info;

pub(crate) mod sel {
    use crate::driver::Selector;

    pub const FIRST_NAME: Selector = Selector::css("#FirstName");
    pub const LAST_NAME: Selector = Selector::css("#LastName");
    pub const EMAIL: Selector = Selector::css("#Email");
    pub const COMPANY: Selector = Selector::css("#Company");
    pub const SAVE: Selector = Selector::css("#save-info-button");
}

/// The editable customer info fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileValues {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_name: String,
}

impl From<&ProfileFixture> for ProfileValues {
    fn from(f: &ProfileFixture) -> Self {
        Self {
            first_name: f.first_name.clone(),
            last_name: f.last_name.clone(),
            email: f.email.clone(),
            company_name: f.company_name.clone(),
        }
    }
}

impl ProfileValues {
    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("companyName", &self.company_name),
        ]
    }

    /// Every field where `actual` differs from `self`.
    pub fn diff(&self, actual: &ProfileValues) -> Vec<FieldMismatch> {
        self.fields()
            .into_iter()
            .zip(actual.fields())
            .filter(|((_, want), (_, got))| want != got)
            .map(|((field, want), (_, got))| FieldMismatch {
                field,
                expected: want.to_string(),
                actual: got.to_string(),
            })
            .collect()
    }
}

fn first_name() -> ElementRef {
    ElementRef::new("first name", sel::FIRST_NAME)
}

/// Customer info form.
pub struct ProfilePage<'d, D> {
    ui: Interactor<'d, D>,
}

impl<'d, D> ProfilePage<'d, D> {
    pub(crate) fn new(ui: Interactor<'d, D>) -> Self {
        Self { ui }
    }

    pub fn into_header(self) -> Header<'d, D> {
        Header::new(self.ui)
    }
}

impl<'d, D: Driver> ProfilePage<'d, D> {
    /// Wait for the form to render.
    pub(crate) async fn wait_loaded(ui: Interactor<'d, D>) -> Result<()> {
        ui.wait_visible(&first_name(), ui.timing().page_load_timeout())
            .await?;
        Ok(())
    }

    pub async fn is_loaded(&self) -> bool {
        self.ui
            .is_visible(&first_name(), self.ui.timing().wait_timeout())
            .await
    }

    /// Fill all four fields and save.
    pub async fn update(&self, values: &ProfileValues) -> Result<()> {
        let ui = self.ui;
        ui.fill(&first_name(), &values.first_name).await?;
        ui.fill(&ElementRef::new("last name", sel::LAST_NAME), &values.last_name)
            .await?;
        ui.fill(&ElementRef::new("email", sel::EMAIL), &values.email)
            .await?;
        ui.fill(&ElementRef::new("company", sel::COMPANY), &values.company_name)
            .await?;
        ui.click(&ElementRef::new("save button", sel::SAVE)).await?;
        Self::wait_loaded(ui).await?;
        info!("Saved customer info for {} {}", values.first_name, values.last_name);
        Ok(())
    }

    /// Current field values.
    pub async fn read(&self) -> Result<ProfileValues> {
        let ui = self.ui;
        Ok(ProfileValues {
            first_name: ui.read_value(&first_name()).await?,
            last_name: ui
                .read_value(&ElementRef::new("last name", sel::LAST_NAME))
                .await?,
            email: ui.read_value(&ElementRef::new("email", sel::EMAIL)).await?,
            company_name: ui
                .read_value(&ElementRef::new("company", sel::COMPANY))
                .await?,
        })
    }

    /// Read back and compare; the error lists every differing field.
    pub async fn verify(&self, expected: &ProfileValues) -> Result<()> {
        let actual = self.read().await?;
        let mismatches = expected.diff(&actual);
        if mismatches.is_empty() {
            info!("Customer info matches");
            Ok(())
        } else {
            Err(Error::ProfileMismatch(mismatches))
        }
    }
}
