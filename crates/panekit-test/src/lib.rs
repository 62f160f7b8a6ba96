//! # PaneKit Test
//!
//! Fixture-driven test harness for the PaneKit style engine.
//!
//! ## Test Types
//!
//! 1. **Parse tests** (`parse/*.css`): the parsed rules, one per line
//! 2. **Style tests** (`style/*.css` + `.probes`): the render rule resolved
//!    for each probe node
//!
//! Every fixture is compared against a sibling `.expected` file; a fixture
//! without one passes as long as it can be read.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use panekit_test::TestHarness;
//!
//! let harness = TestHarness::new();
//! let results = harness.run_all("fixtures")?;
//! println!("Passed: {}/{}", results.passed, results.total);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod dump;
pub mod parse;
pub mod style;

pub use dump::{dump_render_rule, dump_rules};
pub use parse::ParseTestRunner;
pub use style::StyleTestRunner;

/// Errors that can occur in testing.
#[derive(Error, Debug)]
pub enum TestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid test format: {0}")]
    InvalidFormat(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Test result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
    Error,
}

/// Individual test result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub message: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl TestResult {
    pub fn pass(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Pass,
            duration_ms,
            message: None,
            expected: None,
            actual: None,
        }
    }

    pub fn fail_with_diff(
        name: impl Into<String>,
        duration_ms: u64,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self {
            name: name.into(),
            status: TestStatus::Fail,
            duration_ms,
            message: Some(diff_strings(&expected, &actual)),
            expected: Some(expected),
            actual: Some(actual),
        }
    }

    pub fn skip(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Skip,
            duration_ms: 0,
            message: Some(reason.into()),
            expected: None,
            actual: None,
        }
    }

    pub fn error(name: impl Into<String>, duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Error,
            duration_ms,
            message: Some(message.into()),
            expected: None,
            actual: None,
        }
    }

    /// Compare `actual` with `expected`, ignoring surrounding whitespace.
    pub fn compare(name: impl Into<String>, duration_ms: u64, expected: &str, actual: &str) -> Self {
        if expected.trim() == actual.trim() {
            Self::pass(name, duration_ms)
        } else {
            Self::fail_with_diff(name, duration_ms, expected, actual)
        }
    }
}

/// Aggregated test results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: TestResult) {
        self.total += 1;
        self.duration_ms += result.duration_ms;

        match result.status {
            TestStatus::Pass => self.passed += 1,
            TestStatus::Fail => self.failed += 1,
            TestStatus::Skip => self.skipped += 1,
            TestStatus::Error => self.errors += 1,
        }

        self.results.push(result);
    }

    pub fn merge(&mut self, other: TestSummary) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.errors += other.errors;
        self.duration_ms += other.duration_ms;
        self.results.extend(other.results);
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    /// Results that did not pass or skip.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.status, TestStatus::Fail | TestStatus::Error))
    }

    pub fn to_json(&self) -> Result<String, TestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Test configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Skip fixtures whose file name contains any of these.
    pub skip_patterns: Vec<String>,
    /// When non-empty, only run fixtures whose file name contains one of these.
    pub filter_patterns: Vec<String>,
}

impl TestConfig {
    /// Why `name` should not run, if it should not.
    pub(crate) fn skip_reason(&self, name: &str) -> Option<&'static str> {
        if self.skip_patterns.iter().any(|p| name.contains(p.as_str())) {
            return Some("Matches a skip pattern");
        }
        if !self.filter_patterns.is_empty() && !self.filter_patterns.iter().any(|p| name.contains(p.as_str())) {
            return Some("Excluded by filter");
        }
        None
    }
}

/// Main test harness.
pub struct TestHarness {
    parse_runner: ParseTestRunner,
    style_runner: StyleTestRunner,
}

impl TestHarness {
    /// Create a new test harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a new test harness with custom configuration.
    pub fn with_config(config: TestConfig) -> Self {
        Self {
            parse_runner: ParseTestRunner::new(config.clone()),
            style_runner: StyleTestRunner::new(config),
        }
    }

    /// Run every fixture under `test_dir/parse` and `test_dir/style`.
    pub fn run_all(&self, test_dir: impl AsRef<Path>) -> Result<TestSummary, TestError> {
        let test_dir = test_dir.as_ref();
        info!(?test_dir, "Running all fixtures");

        let mut summary = TestSummary::new();
        summary.merge(self.parse_runner.run_all(&test_dir.join("parse"))?);
        summary.merge(self.style_runner.run_all(&test_dir.join("style"))?);

        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "Fixture run complete"
        );

        Ok(summary)
    }

    /// Run a single fixture, picking the runner from its directory name.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<TestResult, TestError> {
        let path = path.as_ref();
        debug!(?path, "Running fixture");

        let parent = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str());

        match parent {
            Some("parse") => self.parse_runner.run_file(path),
            Some("style") => self.style_runner.run_file(path),
            _ => Ok(TestResult::skip(fixture_name(path), "Unknown test type")),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// `.css` files under `dir`, sorted by path.
pub(crate) fn css_fixtures(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "css"))
        .collect();
    files.sort();
    files
}

pub(crate) fn fixture_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Helper to diff two strings.
pub fn diff_strings(expected: &str, actual: &str) -> String {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(expected, actual);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(&format!("{}{}", sign, change));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_ignores_trailing_newline() {
        let result = TestResult::compare("a.css", 1, "x\ny\n", "x\ny");
        assert_eq!(result.status, TestStatus::Pass);
    }

    #[test]
    fn test_compare_reports_diff() {
        let result = TestResult::compare("a.css", 1, "line1\nline2\n", "line1\nmodified\n");
        assert_eq!(result.status, TestStatus::Fail);
        let message = result.message.unwrap();
        assert!(message.contains("-line2"));
        assert!(message.contains("+modified"));
    }

    #[test]
    fn test_summary() {
        let mut summary = TestSummary::new();
        summary.add(TestResult::pass("test1", 100));
        summary.add(TestResult::pass("test2", 200));
        summary.add(TestResult::error("test3", 150, "unreadable"));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.failures().count(), 1);
        assert!((summary.pass_rate() - 66.67).abs() < 1.0);
    }

    #[test]
    fn test_summary_json() {
        let mut summary = TestSummary::new();
        summary.add(TestResult::skip("x.css", "Matches a skip pattern"));
        let json = summary.to_json().unwrap();
        let back: TestSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.skipped, 1);
        assert_eq!(back.results[0].status, TestStatus::Skip);
    }

    #[test]
    fn test_config_patterns() {
        let config = TestConfig {
            skip_patterns: vec!["slow".into()],
            filter_patterns: vec!["border".into()],
        };
        assert!(config.skip_reason("border-slow.css").is_some());
        assert!(config.skip_reason("cascade.css").is_some());
        assert!(config.skip_reason("border.css").is_none());
        assert!(TestConfig::default().skip_reason("anything.css").is_none());
    }
}
