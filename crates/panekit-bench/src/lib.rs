//! # PaneKit Bench
//!
//! Performance benchmarking library for the PaneKit style and compositing
//! core.
//!
//! ## Features
//!
//! - Stylesheet parsing benchmarks
//! - Render-rule lookup, cold and cached
//! - Dirty-region computation and painting
//! - Shared scene generators for the criterion benches
//!
//! ## Usage
//!
//! ```rust,ignore
//! use panekit_bench::Benchmark;
//!
//! let bench = Benchmark::new();
//! let results = bench.run_all();
//! results.print_summary();
//! ```

use panekit_common::{PaneKitConfig, Rect, Region};
use panekit_compositor::{DrawCommand, DrawError, RenderBackend};
use panekit_css::{PseudoClass, PseudoMask};
use panekit_engine::Application;
use panekit_tree::{Widget, WidgetId};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Benchmark errors.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Benchmark failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single benchmark result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark.
    pub name: String,
    /// Number of iterations.
    pub iterations: u64,
    /// Total time in nanoseconds.
    pub total_ns: u64,
    /// Mean time per iteration in nanoseconds.
    pub mean_ns: u64,
    /// Standard deviation in nanoseconds.
    pub std_dev_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    /// Throughput in operations per second.
    pub ops_per_sec: f64,
}

impl BenchmarkResult {
    /// Create a new result from sample times.
    pub fn from_samples(name: impl Into<String>, samples: &[Duration]) -> Self {
        let iterations = samples.len() as u64;
        let times_ns: Vec<u64> = samples.iter().map(|d| d.as_nanos() as u64).collect();
        let total_ns: u64 = times_ns.iter().sum();
        let mean_ns = total_ns.checked_div(iterations).unwrap_or(0);
        let min_ns = times_ns.iter().copied().min().unwrap_or(0);
        let max_ns = times_ns.iter().copied().max().unwrap_or(0);

        let variance = if iterations == 0 {
            0.0
        } else {
            times_ns
                .iter()
                .map(|&t| {
                    let diff = t as f64 - mean_ns as f64;
                    diff * diff
                })
                .sum::<f64>()
                / iterations as f64
        };

        let ops_per_sec = if mean_ns > 0 {
            1_000_000_000.0 / mean_ns as f64
        } else {
            0.0
        };

        Self {
            name: name.into(),
            iterations,
            total_ns,
            mean_ns,
            std_dev_ns: variance.sqrt() as u64,
            min_ns,
            max_ns,
            ops_per_sec,
        }
    }

    pub fn format_mean(&self) -> String {
        format_duration(self.mean_ns)
    }

    /// Print a summary line.
    pub fn print_line(&self) {
        println!(
            "{:40} {:>12} {:>12} {:>12}/s",
            self.name,
            self.format_mean(),
            format!("±{}", format_duration(self.std_dev_ns)),
            format_ops(self.ops_per_sec),
        );
    }
}

/// Format nanoseconds as human-readable duration.
fn format_duration(ns: u64) -> String {
    if ns >= 1_000_000_000 {
        format!("{:.2} s", ns as f64 / 1_000_000_000.0)
    } else if ns >= 1_000_000 {
        format!("{:.2} ms", ns as f64 / 1_000_000.0)
    } else if ns >= 1_000 {
        format!("{:.2} µs", ns as f64 / 1_000.0)
    } else {
        format!("{} ns", ns)
    }
}

fn format_ops(ops: f64) -> String {
    if ops >= 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops >= 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{:.2}", ops)
    }
}

/// Collection of benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub name: String,
    pub results: Vec<BenchmarkResult>,
    pub total_time: Duration,
}

impl BenchmarkSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
            total_time: Duration::ZERO,
        }
    }

    pub fn add(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }

    /// Print summary of all results.
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Benchmark Suite: {}", self.name);
        println!("{}", "=".repeat(80));
        println!("{:40} {:>12} {:>12} {:>12}", "Name", "Mean", "StdDev", "Throughput");
        println!("{}", "-".repeat(80));

        for result in &self.results {
            result.print_line();
        }

        println!("{}", "-".repeat(80));
        println!("Total time: {:?}", self.total_time);
        println!();
    }

    /// Save results to JSON file.
    pub fn save_json(&self, path: &str) -> Result<(), BenchError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| BenchError::Failed(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Backend that only counts draw calls.
#[derive(Debug, Default)]
pub struct CountingBackend {
    pub draws: u64,
}

impl RenderBackend<WidgetId> for CountingBackend {
    fn begin_paint(&mut self, _dirty: &Region) -> Result<(), DrawError> {
        Ok(())
    }

    fn draw(&mut self, _command: &DrawCommand<'_, WidgetId>) -> Result<(), DrawError> {
        self.draws += 1;
        Ok(())
    }

    fn end_paint(&mut self) -> Result<(), DrawError> {
        Ok(())
    }

    fn recreate_resources(&mut self) {}
}

/// A window filled with a grid of buttons, already painted once.
pub struct Scene {
    pub app: Application,
    pub window: WidgetId,
    pub buttons: Vec<WidgetId>,
}

/// Build a `columns` x `rows` grid of 40x20 buttons inside one panel.
pub fn generate_scene(columns: i32, rows: i32) -> Scene {
    let mut app = Application::new(PaneKitConfig::default());
    app.set_app_style_sheet(&generate_css(50));

    let size = Rect::new(0, 0, columns * 40, rows * 20);
    let window = app.create_window(Widget::new("Window").with_geometry(size).with_opaque(true));
    let mut buttons = Vec::with_capacity((columns * rows).max(0) as usize);
    if let Ok(panel) = app.create_widget(
        window,
        Widget::new("Panel").with_geometry(size).with_children_never_overlap(true),
    ) {
        for row in 0..rows {
            for column in 0..columns {
                let widget = Widget::new("Button")
                    .with_name(format!("b{}", row * columns + column))
                    .with_geometry(Rect::new(column * 40, row * 20, 40, 20));
                if let Ok(id) = app.create_widget(panel, widget) {
                    buttons.push(id);
                }
            }
        }
    }
    let _ = app.paint_window(window, &mut CountingBackend::default());
    Scene { app, window, buttons }
}

/// Generate CSS with `n` id rules plus a few type and pseudo rules.
pub fn generate_css(n: usize) -> String {
    let mut css = String::from(
        "Window { background: #f0f0f0; }\n\
         Button { background: #ffffff; border: 1px solid #808080; color: #000000; }\n\
         Button:hover { background: #e0e8ff; }\n\
         Panel > Button:pressed { background: #c0c8e0; }\n",
    );
    for i in 0..n {
        css.push_str(&format!(
            "#b{} {{ margin: {}px; padding: {}px; }}\n",
            i,
            i % 4,
            i % 3
        ));
    }
    css
}

/// Benchmark runner.
pub struct Benchmark {
    /// Number of warmup iterations.
    pub warmup: u64,
    /// Number of measured iterations.
    pub iterations: u64,
}

impl Benchmark {
    pub fn new() -> Self {
        Self {
            warmup: 10,
            iterations: 100,
        }
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_warmup(mut self, warmup: u64) -> Self {
        self.warmup = warmup;
        self
    }

    /// Run a benchmark function.
    pub fn run<F>(&self, name: &str, mut f: F) -> BenchmarkResult
    where
        F: FnMut(),
    {
        debug!(name, warmup = self.warmup, iterations = self.iterations, "Running benchmark");

        for _ in 0..self.warmup {
            f();
        }

        let mut samples = Vec::with_capacity(self.iterations as usize);
        for _ in 0..self.iterations {
            let start = Instant::now();
            f();
            samples.push(start.elapsed());
        }

        BenchmarkResult::from_samples(name, &samples)
    }

    /// Run all standard benchmarks.
    pub fn run_all(&self) -> BenchmarkSuite {
        let start = Instant::now();
        let mut suite = BenchmarkSuite::new("PaneKit");

        suite.add(self.bench_css_parse(10));
        suite.add(self.bench_css_parse(200));
        suite.add(self.bench_render_rule_cached());
        suite.add(self.bench_pseudo_toggle());
        suite.add(self.bench_repaint_one_button());

        suite.total_time = start.elapsed();
        suite
    }

    fn bench_css_parse(&self, rules: usize) -> BenchmarkResult {
        let css = generate_css(rules);
        self.run(&format!("css/parse/{} rules ({} bytes)", rules, css.len()), || {
            let _ = panekit_cssparser::parse_stylesheet(&css);
        })
    }

    fn bench_render_rule_cached(&self) -> BenchmarkResult {
        let mut scene = generate_scene(10, 10);
        self.run("style/render_rule/cached (100 widgets)", || {
            for &button in &scene.buttons {
                let _ = scene.app.render_rule(button);
            }
        })
    }

    fn bench_pseudo_toggle(&self) -> BenchmarkResult {
        let mut scene = generate_scene(10, 10);
        let hover: PseudoMask = PseudoClass::Hover.mask();
        self.run("style/pseudo_toggle (100 widgets)", || {
            for &button in &scene.buttons {
                let _ = scene.app.set_pseudo_state(button, hover);
                let _ = scene.app.set_pseudo_state(button, PseudoMask::EMPTY);
            }
        })
    }

    fn bench_repaint_one_button(&self) -> BenchmarkResult {
        let mut scene = generate_scene(20, 20);
        let mut backend = CountingBackend::default();
        let target = scene.buttons.get(210).copied();
        self.run("compositor/repaint one of 400", || {
            if let Some(button) = target {
                let _ = scene.app.request_update(button, None);
                let _ = scene.app.paint_window(scene.window, &mut backend);
            }
        })
    }
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_result() {
        let samples = vec![
            Duration::from_micros(100),
            Duration::from_micros(120),
            Duration::from_micros(90),
        ];
        let result = BenchmarkResult::from_samples("test", &samples);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.min_ns, 90_000);
        assert!(result.mean_ns > 0);
    }

    #[test]
    fn test_empty_samples() {
        let result = BenchmarkResult::from_samples("empty", &[]);
        assert_eq!(result.mean_ns, 0);
        assert_eq!(result.ops_per_sec, 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(500), "500 ns");
        assert_eq!(format_duration(1_500), "1.50 µs");
        assert_eq!(format_duration(1_500_000), "1.50 ms");
        assert_eq!(format_duration(1_500_000_000), "1.50 s");
    }

    #[test]
    fn test_generate_scene() {
        let scene = generate_scene(3, 2);
        assert_eq!(scene.buttons.len(), 6);
        assert!(scene.app.window_state(scene.window).unwrap().is_clean());
    }

    #[test]
    fn test_run_all_small() {
        let suite = Benchmark::new().with_warmup(0).with_iterations(2).run_all();
        assert_eq!(suite.results.len(), 5);
        assert!(suite.results.iter().all(|r| r.iterations == 2));
    }
}
