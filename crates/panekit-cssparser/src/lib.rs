//! # PaneKit CSS Parser
//!
//! This crate provides the CSS-subset parser used by PaneKit's style engine,
//! together with the parsed data model (values, declarations, selectors and
//! rules).
//!
//! Supported syntax:
//!
//! - Selectors: `Type`, `.Type`, `#id`, `:pseudo`, `*`, descendant (whitespace)
//!   and child (`>`) combinators, comma-separated alternatives
//! - Declarations: `property: value value ...;` for the properties in
//!   [`PropertyType`]
//! - Values: `#rrggbb`, `#rgb`, `#rrggbbaa`, `rgb()`, `rgba()`, `url()`, `Npx`, `N`, keywords
//! - Comments `/* ... */` almost anywhere
//!
//! Malformed input never aborts parsing. The smallest enclosing unit (value
//! token, declaration, selector alternative, rule) is skipped and parsing
//! continues. Widgets splice partial per-widget fragments into the toolkit,
//! so one bad fragment must not take the whole stylesheet down.

use tracing::{debug, trace};

pub mod keyword;
pub mod property;
pub mod pseudo;
pub mod rule;
pub mod selector;
pub mod values;

pub use keyword::Keyword;
pub use property::PropertyType;
pub use pseudo::{PseudoClass, PseudoMask};
pub use rule::{Declaration, StyleRule};
pub use selector::{parse_selector, BasicSelector, Relation, Selector};
pub use values::{parse_values, Color, CssValue, ValueList};

/// Parse a stylesheet into rules, in source order.
///
/// If the text does not end with `}` (ignoring comments and whitespace) it
/// is treated as a bare declaration list and wrapped in `* { ... }`, so
/// `"color: red;"` styles everything the stylesheet applies to.
pub fn parse_stylesheet(css: &str) -> Vec<StyleRule> {
    debug!(len = css.len(), "Parsing CSS");

    let cleaned = strip_comments(css);
    let source = if cleaned.trim_end().ends_with('}') {
        cleaned
    } else {
        format!("*{{{cleaned}}}")
    };
    let source = source.as_str();
    let len = source.len();

    let mut rules = Vec::new();
    let mut skipped_rules = 0usize;
    let mut pos = 0;

    while pos < len {
        let Some(open) = find_unescaped(source, pos, b'{') else {
            break;
        };
        // An unterminated final block runs to the end of input.
        let close = find_unescaped(source, open + 1, b'}').unwrap_or(len);
        let selector_text = &source[pos..open];
        let block = &source[open + 1..close];
        pos = (close + 1).min(len);

        let selectors: Vec<Selector> = split_unescaped(selector_text, b',')
            .into_iter()
            .filter_map(|alternative| parse_selector(alternative.trim()))
            .collect();
        if selectors.is_empty() {
            trace!(selector = selector_text.trim(), "Skipping rule without usable selectors");
            skipped_rules += 1;
            continue;
        }

        let declarations = parse_declaration_block(block);
        if declarations.is_empty() {
            trace!(selector = selector_text.trim(), "Skipping rule without declarations");
            skipped_rules += 1;
            continue;
        }

        rules.push(StyleRule {
            selectors,
            declarations,
            order: rules.len() as u32,
        });
    }

    debug!(rule_count = rules.len(), skipped_rules, "CSS parsed");
    rules
}

/// Parse the inside of a `{ ... }` block.
pub fn parse_declaration_block(block: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    for item in split_unescaped(block, b';') {
        if item.trim().is_empty() {
            continue;
        }
        let Some(colon) = find_unescaped(item, 0, b':') else {
            trace!(item = item.trim(), "Skipping declaration without ':'");
            continue;
        };
        let name = &item[..colon];
        let Some(property) = PropertyType::from_name(name) else {
            trace!(property = name.trim(), "Skipping unknown property");
            continue;
        };
        let values = parse_values(property, &item[colon + 1..]);
        if values.is_empty() {
            trace!(%property, "Skipping declaration without usable values");
            continue;
        }
        declarations.push(Declaration { property, values });
    }
    declarations
}

/// Remove `/* ... */` comments outside of quoted strings.
///
/// A comment is elided without leaving whitespace behind, so `But/**/ton`
/// reads as `Button`.
fn strip_comments(css: &str) -> String {
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&css[copied..i]);
                i = find_comment_end(bytes, i + 2);
                copied = i;
            }
            _ if opens_string(bytes, i) => match string_end(bytes, i) {
                Some(end) => i = end + 1,
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    out.push_str(&css[copied..]);
    out
}

/// Index just past the `*/` closing a comment whose body starts at `from`.
/// An unterminated comment runs to the end of input.
fn find_comment_end(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

/// A quote opens a string only at the start of a token, so the apostrophe in
/// `it's` is plain text.
fn opens_string(bytes: &[u8], i: usize) -> bool {
    matches!(bytes[i], b'"' | b'\'')
        && (i == 0 || matches!(bytes[i - 1], b' ' | b'\t' | b'\n' | b'\r' | b':' | b',' | b'(' | b'{' | b';'))
}

/// Index of the quote closing the string opened at `start`. A string that
/// reaches a line break or a brace first is unterminated and returns `None`.
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i),
            b'\n' | b'{' | b'}' => return None,
            _ => i += 1,
        }
    }
    None
}

/// Walk `text` from `from`, calling `visit` with each byte index that is
/// neither escaped nor inside a terminated string. Stops when `visit`
/// returns true.
///
/// Parentheses are not tracked: `url(...)` text is raw, and an unterminated
/// string or group must not hide the `;` and `}` that follow it.
fn scan_top_level(text: &str, from: usize, mut visit: impl FnMut(usize, u8) -> bool) {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            continue;
        }
        if opens_string(bytes, i) {
            if let Some(end) = string_end(bytes, i) {
                i = end + 1;
                continue;
            }
        }
        if visit(i, b) {
            return;
        }
        i += 1;
    }
}

/// Index of the first unescaped `needle` at or after `from`.
fn find_unescaped(text: &str, from: usize, needle: u8) -> Option<usize> {
    let mut found = None;
    scan_top_level(text, from, |i, b| {
        if b == needle {
            found = Some(i);
            true
        } else {
            false
        }
    });
    found
}

/// Split on unescaped `separator`.
fn split_unescaped(text: &str, separator: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    scan_top_level(text, 0, |i, b| {
        if b == separator {
            parts.push(&text[start..i]);
            start = i + 1;
        }
        false
    });
    parts.push(&text[start..]);
    parts
}
