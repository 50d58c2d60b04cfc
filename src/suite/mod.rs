//! Runs the configured steps against one browser page.
//!
//! A failed step skips the rest of the attempt. When `on_failure.retry` is
//! set, the whole run is repeated from the first step; the report covers the
//! last attempt.

mod report;
mod steps;

pub use report::{RunSummary, StepReport, StepStatus, SUMMARY_FILE};

use crate::config::{BrowserConfig, Config, Fixtures};
use crate::driver::Driver;
use crate::interact::Interactor;
use crate::pages::Screen;
use crate::Result;
use chrono::Local;
use eoka::{Browser, Page};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use steps::StepContext;
use tracing::{debug, info, warn};

/// Result of running a suite config.
#[derive(Debug)]
pub struct RunResult {
    pub success: bool,
    /// First failure of the last attempt.
    pub error: Option<String>,
    /// Steps that passed in the last attempt.
    pub steps_executed: usize,
    pub duration_ms: u64,
    pub retries: u32,
    pub summary: RunSummary,
}

/// A browser with one page, owned for the length of a run.
pub struct Suite {
    browser: Browser,
    page: Page,
}

impl Suite {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
            viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(720),
            ..Default::default()
        };

        debug!(
            "Launching browser (headless: {}, proxy: {:?})",
            config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self { browser, page })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Run every step, retrying the whole run as configured.
    pub async fn run(&mut self, config: &Config, fixtures: &Fixtures) -> Result<RunResult> {
        run_with_retry(&self.page, config, fixtures).await
    }

    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

/// Run `config` on any driver with whole-run retry and a failure screenshot
/// after the last failed attempt.
pub async fn run_with_retry<D: Driver>(
    driver: &D,
    config: &Config,
    fixtures: &Fixtures,
) -> Result<RunResult> {
    let started_at = Local::now();
    let start = Instant::now();
    let max_attempts = config.attempts();
    let retry_delay = config
        .on_failure
        .as_ref()
        .and_then(|f| f.retry.as_ref())
        .map_or(0, |r| r.delay_ms);

    let mut failed_earlier = HashSet::new();
    let mut reports = Vec::new();
    let mut retries = 0;

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            retries += 1;
            info!("Retry attempt {}/{}", attempt, max_attempts);
            if retry_delay > 0 {
                tokio::time::sleep(Duration::from_millis(retry_delay)).await;
            }
        }

        reports = run_steps(driver, config, fixtures).await;
        let Some(failure) = first_failure(&reports) else {
            break;
        };
        warn!(
            "Attempt {} failed at '{}': {}",
            attempt,
            failure.name,
            failure.error.as_deref().unwrap_or_default()
        );
        if attempt == max_attempts {
            save_failure_screenshot(driver, config).await;
        } else {
            failed_earlier.extend(
                reports
                    .iter()
                    .filter(|r| r.status == StepStatus::Failed)
                    .map(|r| r.index),
            );
        }
    }

    let error = first_failure(&reports).and_then(|r| r.error.clone());
    let success = error.is_none();
    let flaky = if success {
        reports
            .iter()
            .filter(|r| failed_earlier.contains(&r.index))
            .count()
    } else {
        0
    };
    let steps_executed = reports
        .iter()
        .filter(|r| r.status == StepStatus::Passed)
        .count();
    let elapsed = start.elapsed();
    let summary = RunSummary::new(&config.name, started_at, elapsed, reports, retries, flaky);

    Ok(RunResult {
        success,
        error,
        steps_executed,
        duration_ms: elapsed.as_millis() as u64,
        retries,
        summary,
    })
}

fn first_failure(reports: &[StepReport]) -> Option<&StepReport> {
    reports.iter().find(|r| r.status == StepStatus::Failed)
}

/// One attempt: steps in order, the rest skipped after the first failure.
pub async fn run_steps<D: Driver>(
    driver: &D,
    config: &Config,
    fixtures: &Fixtures,
) -> Vec<StepReport> {
    let ui = Interactor::new(driver, &config.timing, &config.target);
    let ctx = StepContext { config, fixtures };
    let total = config.steps.len();

    let mut screen = Screen::Blank;
    let mut failed = false;
    let mut reports = Vec::with_capacity(total);

    for (i, step) in config.steps.iter().enumerate() {
        let name = step.name();
        if failed {
            reports.push(StepReport::skipped(i, name));
            continue;
        }

        info!("Step {}/{}: {}", i + 1, total, name);
        let start = Instant::now();
        match steps::execute(ui, step, screen, &ctx).await {
            Ok(next) => {
                debug!("Step {} done, now on {}", name, next.state());
                screen = next;
                reports.push(StepReport::passed(i, name, start.elapsed()));
            }
            Err(e) => {
                warn!("Step {} failed: {}", name, e);
                screen = Screen::Blank;
                reports.push(StepReport::failed(i, name, start.elapsed(), e.to_string()));
                failed = true;
            }
        }
    }

    reports
}

async fn save_failure_screenshot<D: Driver>(driver: &D, config: &Config) {
    let Some(path) = config
        .on_failure
        .as_ref()
        .and_then(|f| f.screenshot.as_deref())
    else {
        return;
    };
    match driver.screenshot().await {
        Ok(data) => match steps::write_screenshot(path, &data) {
            Ok(path) => info!("Saved failure screenshot to: {}", path),
            Err(e) => warn!("Failed to save screenshot: {}", e),
        },
        Err(e) => warn!("Failed to take screenshot: {}", e),
    }
}
