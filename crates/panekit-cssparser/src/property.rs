//! Recognised property names.

use std::fmt;

/// A property the style engine understands.
///
/// Declarations naming any other property are dropped by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyType {
    /// `-inherit-background`: keep lower-weight background layers even when a
    /// higher-weight rule says `background: none`.
    InheritBackground,
    /// `background`: one layer per declaration, layers compose.
    Background,
    BackgroundClip,
    BackgroundColor,
    BackgroundImage,
    BackgroundPosition,
    BackgroundRepeat,
    BackgroundSize,
    Border,
    BorderBottom,
    BorderBottomColor,
    BorderBottomLeftRadius,
    BorderBottomRightRadius,
    BorderBottomStyle,
    BorderBottomWidth,
    BorderColor,
    BorderImage,
    BorderLeft,
    BorderLeftColor,
    BorderLeftStyle,
    BorderLeftWidth,
    BorderRadius,
    BorderRight,
    BorderRightColor,
    BorderRightStyle,
    BorderRightWidth,
    BorderStyle,
    BorderTop,
    BorderTopColor,
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderTopStyle,
    BorderTopWidth,
    BorderWidth,
    Color,
    Cursor,
    Font,
    FontFamily,
    FontSize,
    FontStyle,
    FontWeight,
    Height,
    Margin,
    MarginBottom,
    MarginLeft,
    MarginRight,
    MarginTop,
    MaxHeight,
    MaxWidth,
    MinHeight,
    MinWidth,
    Padding,
    PaddingBottom,
    PaddingLeft,
    PaddingRight,
    PaddingTop,
    TextAlign,
    TextDecoration,
    TextOutline,
    TextShadow,
    Width,
}

/// Property names sorted by byte order, for binary search.
const PROPERTY_TABLE: &[(&str, PropertyType)] = &[
    ("-inherit-background", PropertyType::InheritBackground),
    ("background", PropertyType::Background),
    ("background-clip", PropertyType::BackgroundClip),
    ("background-color", PropertyType::BackgroundColor),
    ("background-image", PropertyType::BackgroundImage),
    ("background-position", PropertyType::BackgroundPosition),
    ("background-repeat", PropertyType::BackgroundRepeat),
    ("background-size", PropertyType::BackgroundSize),
    ("border", PropertyType::Border),
    ("border-bottom", PropertyType::BorderBottom),
    ("border-bottom-color", PropertyType::BorderBottomColor),
    ("border-bottom-left-radius", PropertyType::BorderBottomLeftRadius),
    ("border-bottom-right-radius", PropertyType::BorderBottomRightRadius),
    ("border-bottom-style", PropertyType::BorderBottomStyle),
    ("border-bottom-width", PropertyType::BorderBottomWidth),
    ("border-color", PropertyType::BorderColor),
    ("border-image", PropertyType::BorderImage),
    ("border-left", PropertyType::BorderLeft),
    ("border-left-color", PropertyType::BorderLeftColor),
    ("border-left-style", PropertyType::BorderLeftStyle),
    ("border-left-width", PropertyType::BorderLeftWidth),
    ("border-radius", PropertyType::BorderRadius),
    ("border-right", PropertyType::BorderRight),
    ("border-right-color", PropertyType::BorderRightColor),
    ("border-right-style", PropertyType::BorderRightStyle),
    ("border-right-width", PropertyType::BorderRightWidth),
    ("border-style", PropertyType::BorderStyle),
    ("border-top", PropertyType::BorderTop),
    ("border-top-color", PropertyType::BorderTopColor),
    ("border-top-left-radius", PropertyType::BorderTopLeftRadius),
    ("border-top-right-radius", PropertyType::BorderTopRightRadius),
    ("border-top-style", PropertyType::BorderTopStyle),
    ("border-top-width", PropertyType::BorderTopWidth),
    ("border-width", PropertyType::BorderWidth),
    ("color", PropertyType::Color),
    ("cursor", PropertyType::Cursor),
    ("font", PropertyType::Font),
    ("font-family", PropertyType::FontFamily),
    ("font-size", PropertyType::FontSize),
    ("font-style", PropertyType::FontStyle),
    ("font-weight", PropertyType::FontWeight),
    ("height", PropertyType::Height),
    ("margin", PropertyType::Margin),
    ("margin-bottom", PropertyType::MarginBottom),
    ("margin-left", PropertyType::MarginLeft),
    ("margin-right", PropertyType::MarginRight),
    ("margin-top", PropertyType::MarginTop),
    ("max-height", PropertyType::MaxHeight),
    ("max-width", PropertyType::MaxWidth),
    ("min-height", PropertyType::MinHeight),
    ("min-width", PropertyType::MinWidth),
    ("padding", PropertyType::Padding),
    ("padding-bottom", PropertyType::PaddingBottom),
    ("padding-left", PropertyType::PaddingLeft),
    ("padding-right", PropertyType::PaddingRight),
    ("padding-top", PropertyType::PaddingTop),
    ("text-align", PropertyType::TextAlign),
    ("text-decoration", PropertyType::TextDecoration),
    ("text-outline", PropertyType::TextOutline),
    ("text-shadow", PropertyType::TextShadow),
    ("width", PropertyType::Width),
];

impl PropertyType {
    /// Look up a property by its CSS name (ASCII case-insensitive).
    pub fn from_name(name: &str) -> Option<PropertyType> {
        let lower = name.trim().to_ascii_lowercase();
        PROPERTY_TABLE
            .binary_search_by(|(candidate, _)| candidate.cmp(&lower.as_str()))
            .ok()
            .map(|idx| PROPERTY_TABLE[idx].1)
    }

    /// The CSS name of this property.
    pub fn name(self) -> &'static str {
        PROPERTY_TABLE
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(name, _)| *name)
            .unwrap_or("")
    }

    /// Properties whose unrecognised words are kept as free text.
    pub fn accepts_text(self) -> bool {
        matches!(self, PropertyType::Font | PropertyType::FontFamily)
    }

    /// Properties that feed the background layer list.
    pub fn is_background(self) -> bool {
        matches!(
            self,
            PropertyType::Background
                | PropertyType::BackgroundClip
                | PropertyType::BackgroundColor
                | PropertyType::BackgroundImage
                | PropertyType::BackgroundPosition
                | PropertyType::BackgroundRepeat
                | PropertyType::BackgroundSize
        )
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_for_binary_search() {
        for pair in PROPERTY_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(PropertyType::from_name("COLOR"), Some(PropertyType::Color));
        assert_eq!(
            PropertyType::from_name(" border-top-left-radius "),
            Some(PropertyType::BorderTopLeftRadius)
        );
        assert_eq!(
            PropertyType::from_name("-inherit-background"),
            Some(PropertyType::InheritBackground)
        );
        assert_eq!(PropertyType::from_name("display"), None);
    }

    #[test]
    fn test_every_entry_round_trips_through_name() {
        for (name, property) in PROPERTY_TABLE {
            assert_eq!(property.name(), *name);
            assert_eq!(PropertyType::from_name(name), Some(*property));
        }
    }
}
