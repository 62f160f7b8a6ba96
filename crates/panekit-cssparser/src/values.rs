//! Declaration values and value tokenization.

use std::fmt;

use smallvec::SmallVec;
use tracing::trace;

use crate::keyword::{named_color, Keyword};
use crate::property::PropertyType;

/// A color packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0);
    pub const BLACK: Color = Color(0x000000FF);
    pub const WHITE: Color = Color(0xFFFFFFFF);

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 0xFF)
    }

    pub fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn a(self) -> u8 {
        self.0 as u8
    }

    pub fn is_opaque(self) -> bool {
        self.a() == 0xFF
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

/// One value of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssValue {
    /// A bare number. Fractions are truncated.
    Number(i32),
    /// A length in pixels (`12px`).
    Length(i32),
    /// A recognised keyword.
    Identifier(Keyword),
    /// The raw text of `url(...)`.
    Uri(String),
    Color(Color),
    /// Free text, only kept for font properties.
    String(String),
}

impl CssValue {
    /// Numeric payload of a number or length.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            CssValue::Number(n) | CssValue::Length(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self {
            CssValue::Identifier(k) => Some(*k),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            CssValue::Color(c) => Some(*c),
            CssValue::Identifier(Keyword::Transparent) => Some(Color::TRANSPARENT),
            _ => None,
        }
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Number(n) => write!(f, "{n}"),
            CssValue::Length(n) => write!(f, "{n}px"),
            CssValue::Identifier(k) => write!(f, "{k}"),
            CssValue::Uri(u) => write!(f, "url({u})"),
            CssValue::Color(c) => write!(f, "{c}"),
            CssValue::String(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Values of one declaration, in source order.
pub type ValueList = SmallVec<[CssValue; 4]>;

/// Locale-independent decimal integer conversion of the longest leading
/// `[+-]?[0-9]*` prefix. Anything unparsable yields 0.
pub fn parse_int(text: &str) -> i32 {
    let bytes = text.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    let mut value: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = (value * 10 + (b - b'0') as i64).min(i32::MAX as i64 + 1);
    }
    let value = if negative { -value } else { value };
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Tokenize the value text of a declaration.
///
/// Recognised in priority order: hex colors (`#rgb`, `#rrggbb`, `#rrggbbaa`),
/// `rgb()`/`rgba()`, `url()`, numbers ending in `px` (lengths), other numbers,
/// keywords. Tokens that fit none of these are dropped, except that font
/// properties keep them as text.
pub fn parse_values(property: PropertyType, text: &str) -> ValueList {
    let mut out = ValueList::new();
    if property == PropertyType::FontFamily {
        let family = text.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if !family.is_empty() {
            out.push(CssValue::String(family.to_string()));
        }
        return out;
    }

    let mut free_text: Vec<String> = Vec::new();
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() || c == b',' {
            pos += 1;
            continue;
        }

        if c == b'"' || c == b'\'' {
            let end = find_byte(bytes, pos + 1, c).unwrap_or(bytes.len());
            let quoted = &text[pos + 1..end];
            if property.accepts_text() {
                free_text.push(quoted.to_string());
            } else {
                trace!(%property, quoted, "Dropping string value");
            }
            pos = (end + 1).min(bytes.len());
            continue;
        }

        let start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && bytes[pos] != b','
            && bytes[pos] != b'('
        {
            pos += 1;
        }
        let word = &text[start..pos];

        if pos < bytes.len() && bytes[pos] == b'(' {
            let close = find_byte(bytes, pos + 1, b')').unwrap_or(bytes.len());
            let args = &text[pos + 1..close];
            pos = (close + 1).min(bytes.len());
            match parse_function(word, args) {
                Some(value) => out.push(value),
                None => trace!(%property, function = word, "Dropping function value"),
            }
            continue;
        }

        match parse_word(word) {
            Some(value) => out.push(value),
            None if property.accepts_text() => free_text.push(word.to_string()),
            None => trace!(%property, word, "Dropping unrecognised identifier"),
        }
    }

    if !free_text.is_empty() {
        out.push(CssValue::String(free_text.join(" ")));
    }
    out
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == needle)
        .map(|i| i + from)
}

fn parse_function(name: &str, args: &str) -> Option<CssValue> {
    match name.to_ascii_lowercase().as_str() {
        "rgb" | "rgba" => parse_rgb_args(args).map(CssValue::Color),
        "url" => {
            let raw = args.trim();
            let raw = raw
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .or_else(|| raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
                .unwrap_or(raw);
            Some(CssValue::Uri(raw.to_string()))
        }
        _ => None,
    }
}

/// `r, g, b[, a]` with integer channels and a `0..=1` float alpha.
fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    let channel = |s: &str| parse_int(s).clamp(0, 255) as u8;
    let alpha = match parts.get(3) {
        Some(a) => {
            let a = a.parse::<f32>().unwrap_or(0.0).clamp(0.0, 1.0);
            (a * 255.0).round() as u8
        }
        None => 0xFF,
    };
    Some(Color::from_rgba(
        channel(parts[0]),
        channel(parts[1]),
        channel(parts[2]),
        alpha,
    ))
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let rgb = u32::from_str_radix(hex, 16).ok()?;
            Some(Color((rgb << 8) | 0xFF))
        }
        8 => u32::from_str_radix(hex, 16).ok().map(Color),
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|d| d * 17);
            Some(Color::from_rgb(digit(0).ok()?, digit(1).ok()?, digit(2).ok()?))
        }
        _ => None,
    }
}

fn is_numeric(word: &str) -> bool {
    let bytes = word.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_digit() => true,
        Some(b'-' | b'+' | b'.') => bytes.get(1).is_some_and(|b| b.is_ascii_digit() || *b == b'.'),
        _ => false,
    }
}

fn parse_word(word: &str) -> Option<CssValue> {
    if let Some(hex) = word.strip_prefix('#') {
        return parse_hex_color(hex).map(CssValue::Color);
    }
    if is_numeric(word) {
        let lower = word.to_ascii_lowercase();
        return Some(match lower.strip_suffix("px") {
            Some(number) => CssValue::Length(parse_int(number)),
            None => CssValue::Number(parse_int(&lower)),
        });
    }
    if let Some(keyword) = Keyword::from_name(word) {
        return Some(CssValue::Identifier(keyword));
    }
    named_color(word).map(CssValue::Color)
}
