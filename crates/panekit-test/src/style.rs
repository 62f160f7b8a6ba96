//! Render-rule resolution tests.
//!
//! A style fixture is a stylesheet `name.css` installed as the application
//! sheet, plus `name.probes` listing one probe per line. A probe is written
//! like a selector, root first: `Dialog#main Button:hover` resolves a
//! `Button` in the hover state whose parent is a `Dialog` named `main`.
//! Blank lines and lines starting with `//` are ignored.

use crate::dump::dump_render_rule;
use crate::{css_fixtures, fixture_name, TestConfig, TestError, TestResult, TestSummary};
use panekit_common::StyleConfig;
use panekit_css::{QueryNode, StyleEngine};
use panekit_cssparser::{parse_selector, BasicSelector};
use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Style test runner.
pub struct StyleTestRunner {
    config: TestConfig,
}

impl StyleTestRunner {
    pub fn new(config: TestConfig) -> Self {
        Self { config }
    }

    /// Run all style fixtures in a directory.
    pub fn run_all(&self, dir: &Path) -> Result<TestSummary, TestError> {
        let mut summary = TestSummary::new();
        for path in css_fixtures(dir) {
            summary.add(self.run_file(&path)?);
        }
        Ok(summary)
    }

    /// Resolve every probe of one fixture and compare the dumps.
    pub fn run_file(&self, path: &Path) -> Result<TestResult, TestError> {
        let name = fixture_name(path);
        if let Some(reason) = self.config.skip_reason(&name) {
            return Ok(TestResult::skip(name, reason));
        }

        debug!(?path, "Running style test");
        let start = Instant::now();

        let css = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => return Ok(TestResult::error(&name, 0, e.to_string())),
        };
        let probes = match fs::read_to_string(path.with_extension("probes")) {
            Ok(p) => p,
            Err(e) => return Ok(TestResult::error(&name, 0, format!("missing probes: {e}"))),
        };

        let actual = match resolve_probes(&css, &probes) {
            Ok(actual) => actual,
            Err(e) => {
                let duration = start.elapsed().as_millis() as u64;
                return Ok(TestResult::error(&name, duration, e.to_string()));
            }
        };
        let duration = start.elapsed().as_millis() as u64;

        let expected_path = path.with_extension("expected");
        if !expected_path.exists() {
            return Ok(TestResult::pass(&name, duration));
        }
        let expected = fs::read_to_string(&expected_path)?;
        Ok(TestResult::compare(name, duration, &expected, &actual))
    }
}

impl Default for StyleTestRunner {
    fn default() -> Self {
        Self::new(TestConfig::default())
    }
}

/// Install `css` as the application sheet and dump the rule of each probe.
pub fn resolve_probes(css: &str, probes: &str) -> Result<String, TestError> {
    let mut engine = StyleEngine::new(StyleConfig::default());
    engine.set_app_style_sheet(css);

    let mut out = String::new();
    for line in probes.lines().map(str::trim) {
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let chain = parse_probe(line)?;

        let mut nodes: Vec<QueryNode> = Vec::with_capacity(chain.len());
        for component in &chain {
            let node = engine.create_query_node(
                component.element.as_deref().unwrap_or(""),
                component.id.as_deref().unwrap_or(""),
                nodes.last(),
            );
            nodes.push(node);
        }
        let (Some(subject), Some(component)) = (nodes.last(), chain.last()) else {
            continue;
        };
        let rule = engine.get_render_rule(subject, component.pseudo);

        let _ = writeln!(out, "{line}");
        out.push_str(&dump_render_rule(&rule));
        for node in &nodes {
            engine.remove_query_node(node);
        }
    }
    Ok(out)
}

fn parse_probe(line: &str) -> Result<Vec<BasicSelector>, TestError> {
    let selector = parse_selector(line)
        .ok_or_else(|| TestError::InvalidFormat(format!("unparsable probe `{line}`")))?;
    Ok(selector.components().to_vec())
}
