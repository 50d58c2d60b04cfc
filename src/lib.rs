//! # shopcheck
//!
//! End-to-end storefront checks over a real browser. Page objects model one
//! screen each, workflows compose them into user journeys, and a suite runs the
//! configured steps in order against a single page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shopcheck::{Config, Fixtures, Suite};
//!
//! # #[tokio::main]
//! # async fn main() -> shopcheck::Result<()> {
//! let config = Config::load("configs/storefront.yaml")?;
//! let fixtures = Fixtures::load("configs", &config.fixtures)?;
//! let mut suite = Suite::launch(&config.browser).await?;
//! let result = suite.run(&config, &fixtures).await?;
//! println!("Success: {}", result.success);
//! suite.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Layers, top to bottom: [`suite`] → [`flows`] → [`pages`] →
//! [`resilient`] / [`interact`] → [`driver`]. Search results are resolved by
//! [`shopcheck_match`].

mod config;
pub mod driver;
pub mod flows;
pub mod interact;
pub mod pages;
pub mod resilient;
pub mod suite;

pub use config::{
    BrowserConfig, Config, FixturePaths, Fixtures, Locale, LoginFixture, OnFailure, ParamDef,
    Params, ProfileFixture, ReportConfig, RetryConfig, SettleDelays, Step, TargetSite, Timing,
};
pub use driver::{Driver, Locator, Selector};
pub use interact::{ElementRef, InteractionResult, Interactor};
pub use pages::{Header, Screen, ScreenState};
pub use resilient::{Performed, ResilientAction};
pub use suite::{RunResult, RunSummary, StepReport, StepStatus, Suite};

use std::fmt;

/// Result type for shopcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a suite or driving the site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("fixture error in {path}: {reason}")]
    Fixture { path: String, reason: String },

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("timeout: {0}")]
    Timeout(String),

    /// No strategy of the element became visible within the timeout.
    #[error("element not interactable: {element} (not visible within {timeout_ms}ms)")]
    ElementNotInteractable { element: String, timeout_ms: u64 },

    /// An exact-label picker had no matching option.
    #[error("option not found in {picker}: '{label}'")]
    OptionNotFound { picker: String, label: String },

    /// No search result shares a meaningful token with the query.
    #[error("no matching product found for '{query}'")]
    ProductNotFound { query: String },

    /// The expected screen was not reached.
    #[error("navigation mismatch: expected {expected}, found {actual}")]
    NavigationMismatch { expected: String, actual: String },

    /// Saved profile fields read back differently.
    #[error("profile mismatch: {}", FieldMismatch::join(.0))]
    ProfileMismatch(Vec<FieldMismatch>),

    /// Every strategy of a resilient action failed.
    #[error("{action}: {attempts} strategies failed, last '{strategy}': {source}")]
    FallbacksExhausted {
        action: String,
        strategy: String,
        attempts: usize,
        source: Box<Error>,
    },
}

/// One profile field whose readback differs from what was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl FieldMismatch {
    fn join(fields: &[FieldMismatch]) -> String {
        fields
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (expected '{}', got '{}')",
            self.field, self.expected, self.actual
        )
    }
}
