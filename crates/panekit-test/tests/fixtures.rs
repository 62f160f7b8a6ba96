//! Runs the bundled fixture corpus through the harness.

use std::path::PathBuf;

use panekit_test::{TestConfig, TestHarness, TestStatus};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

#[test]
fn test_all_fixtures_pass() {
    let harness = TestHarness::new();
    let summary = harness.run_all(fixture_dir()).expect("fixture run");

    for failure in summary.failures() {
        eprintln!(
            "{}: {}",
            failure.name,
            failure.message.as_deref().unwrap_or("no message")
        );
    }
    assert_eq!(summary.total, 4);
    assert_eq!(summary.passed, 4, "{} fixtures failed", summary.failures().count());
}

#[test]
fn test_skip_patterns_are_honored() {
    let harness = TestHarness::with_config(TestConfig {
        skip_patterns: vec!["backgrounds".into()],
        ..Default::default()
    });
    let summary = harness.run_all(fixture_dir()).expect("fixture run");
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.passed, 3);
}

#[test]
fn test_run_file_dispatches_on_directory() {
    let harness = TestHarness::new();
    let result = harness
        .run_file(fixture_dir().join("style").join("cascade.css"))
        .expect("style fixture");
    assert_eq!(result.status, TestStatus::Pass);

    let result = harness
        .run_file(fixture_dir().join("cascade.css"))
        .expect("unknown directory");
    assert_eq!(result.status, TestStatus::Skip);
}

#[test]
fn test_missing_directory_is_empty() {
    let summary = TestHarness::new()
        .run_all(fixture_dir().join("does-not-exist"))
        .expect("empty run");
    assert_eq!(summary.total, 0);
}
