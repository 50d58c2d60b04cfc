use super::FixturePaths;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// OTP login credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginFixture {
    pub phone: String,
    pub otp: String,
    #[serde(default)]
    pub expected_result: Option<String>,
}

/// Values written to and read back from the customer info form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFixture {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub email: String,
    pub company_name: String,
}

/// Test data for one run, read once before the first step.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub login: LoginFixture,
    pub profile: ProfileFixture,
}

impl Fixtures {
    /// Load both fixture files; `paths` are resolved against `base`.
    pub fn load<P: AsRef<Path>>(base: P, paths: &FixturePaths) -> Result<Self> {
        let base = base.as_ref();
        let login: LoginFixture = read_json(&base.join(&paths.login))?;
        let profile: ProfileFixture = read_json(&base.join(&paths.profile))?;

        let fixtures = Self { login, profile };
        fixtures.validate(paths)?;
        Ok(fixtures)
    }

    fn validate(&self, paths: &FixturePaths) -> Result<()> {
        require(&paths.login, "phone", &self.login.phone)?;
        require(&paths.login, "otp", &self.login.otp)?;

        let p = &self.profile;
        for (field, value) in [
            ("firstName", &p.first_name),
            ("lastName", &p.last_name),
            ("email", &p.email),
            ("companyName", &p.company_name),
        ] {
            require(&paths.profile, field, value)?;
        }
        Ok(())
    }
}

fn require(path: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Fixture {
            path: path.to_string(),
            reason: format!("{} must not be empty", field),
        });
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let fixture_err = |reason: String| Error::Fixture {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| fixture_err(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| fixture_err(e.to_string()))
}
