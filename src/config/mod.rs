pub mod fixtures;
pub mod params;
pub mod schema;
pub mod steps;

pub use fixtures::{Fixtures, LoginFixture, ProfileFixture};
pub use params::{ParamDef, Params};
pub use schema::{
    BrowserConfig, Config, FixturePaths, Locale, OnFailure, ReportConfig, RetryConfig,
    SettleDelays, TargetSite, Timing,
};
pub use steps::Step;
