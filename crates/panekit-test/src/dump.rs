//! Canonical text dumps compared against `.expected` files.

use std::fmt::Write;

use panekit_css::{Brush, Edges, RenderRule};
use panekit_cssparser::StyleRule;

/// One line per rule, in source order.
pub fn dump_rules(rules: &[StyleRule]) -> String {
    let mut out = String::new();
    for rule in rules {
        let _ = writeln!(out, "{rule}");
    }
    out
}

/// Indented summary of a render rule: background layers bottom first, then
/// border widths, text, non-zero box edges and the opaque flag.
pub fn dump_render_rule(rule: &RenderRule) -> String {
    let Some(data) = rule.data() else {
        return "  invalid\n".to_string();
    };

    let mut out = String::new();
    for layer in &data.backgrounds {
        let brush = match &layer.brush {
            Brush::Color(color) => color.to_string(),
            Brush::Image(uri) => format!("url({uri})"),
        };
        let _ = writeln!(out, "  background {brush} clip={:?} frames={}", layer.clip, layer.frame_count);
    }
    if let Some(border) = &data.border {
        let _ = writeln!(out, "  border {}", edges(border.widths()));
    }
    if let Some(text) = &data.text {
        let _ = writeln!(
            out,
            "  text {} \"{}\" {}px weight={}",
            text.color, text.font_family, text.font_size, text.font_weight
        );
    }
    if !data.margin.is_zero() {
        let _ = writeln!(out, "  margin {}", edges(data.margin));
    }
    if !data.padding.is_zero() {
        let _ = writeln!(out, "  padding {}", edges(data.padding));
    }
    let _ = writeln!(out, "  opaque={}", data.opaque);
    out
}

fn edges(e: Edges) -> String {
    format!("{} {} {} {}", e.top, e.right, e.bottom, e.left)
}
