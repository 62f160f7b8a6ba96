//! Stylesheet parse tests.

use crate::dump::dump_rules;
use crate::{css_fixtures, fixture_name, TestConfig, TestError, TestResult, TestSummary};
use panekit_cssparser::parse_stylesheet;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Parse test runner.
pub struct ParseTestRunner {
    config: TestConfig,
}

impl ParseTestRunner {
    pub fn new(config: TestConfig) -> Self {
        Self { config }
    }

    /// Run all parse fixtures in a directory.
    pub fn run_all(&self, dir: &Path) -> Result<TestSummary, TestError> {
        let mut summary = TestSummary::new();
        for path in css_fixtures(dir) {
            summary.add(self.run_file(&path)?);
        }
        Ok(summary)
    }

    /// Parse one `.css` fixture and compare the rule dump.
    pub fn run_file(&self, path: &Path) -> Result<TestResult, TestError> {
        let name = fixture_name(path);
        if let Some(reason) = self.config.skip_reason(&name) {
            return Ok(TestResult::skip(name, reason));
        }

        debug!(?path, "Running parse test");
        let start = Instant::now();

        let css = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => return Ok(TestResult::error(&name, 0, e.to_string())),
        };
        let actual = dump_rules(&parse_stylesheet(&css));
        let duration = start.elapsed().as_millis() as u64;

        let expected_path = path.with_extension("expected");
        if !expected_path.exists() {
            return Ok(TestResult::pass(&name, duration));
        }
        let expected = fs::read_to_string(&expected_path)?;
        Ok(TestResult::compare(name, duration, &expected, &actual))
    }
}

impl Default for ParseTestRunner {
    fn default() -> Self {
        Self::new(TestConfig::default())
    }
}
