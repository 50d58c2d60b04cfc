use crate::Result;
use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the run summary inside the report directory.
pub const SUMMARY_FILE: &str = "summary-report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    /// Not run because an earlier step failed.
    Skipped,
}

/// Outcome of one configured step in the final attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    /// Position in the configured step list (0-based).
    pub index: usize,
    pub name: &'static str,
    pub status: StepStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    pub fn passed(index: usize, name: &'static str, elapsed: Duration) -> Self {
        Self {
            index,
            name,
            status: StepStatus::Passed,
            duration_ms: elapsed.as_millis() as u64,
            error: None,
        }
    }

    pub fn failed(index: usize, name: &'static str, elapsed: Duration, error: String) -> Self {
        Self {
            index,
            name,
            status: StepStatus::Failed,
            duration_ms: elapsed.as_millis() as u64,
            error: Some(error),
        }
    }

    pub fn skipped(index: usize, name: &'static str) -> Self {
        Self {
            index,
            name,
            status: StepStatus::Skipped,
            duration_ms: 0,
            error: None,
        }
    }
}

/// Totals of a run, written as `summary-report.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub suite: String,
    /// RFC 3339 start time.
    pub timestamp: String,
    /// Seconds with two decimals, e.g. `"42.17s"`.
    pub duration: String,
    pub duration_ms: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Steps that failed in an earlier attempt and passed in the last one.
    pub flaky: usize,
    pub retries: u32,
    /// Percentage of passed steps, one decimal.
    pub success_rate: f64,
    pub steps: Vec<StepReport>,
}

impl RunSummary {
    pub fn new(
        suite: impl Into<String>,
        started_at: DateTime<Local>,
        elapsed: Duration,
        steps: Vec<StepReport>,
        retries: u32,
        flaky: usize,
    ) -> Self {
        let count = |status| steps.iter().filter(|s| s.status == status).count();
        let (passed, failed, skipped) = (
            count(StepStatus::Passed),
            count(StepStatus::Failed),
            count(StepStatus::Skipped),
        );
        let total = steps.len();
        let success_rate = if total == 0 {
            0.0
        } else {
            (passed as f64 / total as f64 * 1000.0).round() / 10.0
        };

        Self {
            suite: suite.into(),
            timestamp: started_at.to_rfc3339_opts(SecondsFormat::Millis, false),
            duration: format!("{:.2}s", elapsed.as_secs_f64()),
            duration_ms: elapsed.as_millis() as u64,
            total,
            passed,
            failed,
            skipped,
            flaky,
            retries,
            success_rate,
            steps,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    /// Write `summary-report.json` into `dir`, creating it if needed.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(SUMMARY_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.suite)?;
        writeln!(f, "  Duration: {}", self.duration)?;
        writeln!(f, "  Passed:   {}", self.passed)?;
        writeln!(f, "  Failed:   {}", self.failed)?;
        writeln!(f, "  Skipped:  {}", self.skipped)?;
        writeln!(f, "  Flaky:    {}", self.flaky)?;
        write!(f, "  Success rate: {:.1}%", self.success_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        let steps = vec![
            StepReport::passed(0, "launch", Duration::from_millis(1200)),
            StepReport::passed(1, "login", Duration::from_millis(800)),
            StepReport::failed(2, "open_cart", Duration::from_millis(5000), "boom".into()),
            StepReport::skipped(3, "confirm_order"),
        ];
        RunSummary::new("Smoke", Local::now(), Duration::from_millis(7010), steps, 1, 0)
    }

    #[test]
    fn test_counts_and_rate() {
        let s = summary();
        assert_eq!((s.total, s.passed, s.failed, s.skipped), (4, 2, 1, 1));
        assert_eq!(s.success_rate, 50.0);
        assert_eq!(s.duration, "7.01s");
        assert!(!s.success());
    }

    #[test]
    fn test_empty_run_rate_is_zero() {
        let s = RunSummary::new("Empty", Local::now(), Duration::ZERO, Vec::new(), 0, 0);
        assert_eq!(s.success_rate, 0.0);
        assert!(s.success());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["successRate"], 50.0);
        assert_eq!(json["durationMs"], 7010);
        assert_eq!(json["steps"][2]["status"], "failed");
        assert_eq!(json["steps"][2]["error"], "boom");
        assert!(json["steps"][0].get("error").is_none());
    }

    #[test]
    fn test_write_to_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/results");
        let path = summary().write_to(&target).unwrap();
        assert!(path.ends_with(SUMMARY_FILE));
        let back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back["suite"], "Smoke");
        assert_eq!(back["total"], 4);
    }
}
