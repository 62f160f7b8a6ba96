//! Identifier values.

use std::fmt;

use crate::values::Color;

/// A recognised identifier value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Arrow,
    Bold,
    Border,
    Bottom,
    Center,
    Content,
    Contain,
    Cover,
    Crosshair,
    Dashed,
    Default,
    Dotted,
    Double,
    EwResize,
    False,
    Hand,
    Help,
    Italic,
    Justify,
    Left,
    Light,
    LineThrough,
    Margin,
    Move,
    NeswResize,
    NoRepeat,
    None,
    Normal,
    NotAllowed,
    NsResize,
    NwseResize,
    Oblique,
    Overline,
    Padding,
    Pointer,
    Progress,
    Repeat,
    RepeatX,
    RepeatY,
    Right,
    Solid,
    Stretch,
    Text,
    Top,
    Transparent,
    True,
    Underline,
    Wait,
}

/// Keyword names sorted by byte order, for binary search.
const KEYWORD_TABLE: &[(&str, Keyword)] = &[
    ("arrow", Keyword::Arrow),
    ("bold", Keyword::Bold),
    ("border", Keyword::Border),
    ("bottom", Keyword::Bottom),
    ("center", Keyword::Center),
    ("contain", Keyword::Contain),
    ("content", Keyword::Content),
    ("cover", Keyword::Cover),
    ("crosshair", Keyword::Crosshair),
    ("dashed", Keyword::Dashed),
    ("default", Keyword::Default),
    ("dotted", Keyword::Dotted),
    ("double", Keyword::Double),
    ("ew-resize", Keyword::EwResize),
    ("false", Keyword::False),
    ("hand", Keyword::Hand),
    ("help", Keyword::Help),
    ("italic", Keyword::Italic),
    ("justify", Keyword::Justify),
    ("left", Keyword::Left),
    ("light", Keyword::Light),
    ("line-through", Keyword::LineThrough),
    ("margin", Keyword::Margin),
    ("move", Keyword::Move),
    ("nesw-resize", Keyword::NeswResize),
    ("no-repeat", Keyword::NoRepeat),
    ("none", Keyword::None),
    ("normal", Keyword::Normal),
    ("not-allowed", Keyword::NotAllowed),
    ("ns-resize", Keyword::NsResize),
    ("nwse-resize", Keyword::NwseResize),
    ("oblique", Keyword::Oblique),
    ("overline", Keyword::Overline),
    ("padding", Keyword::Padding),
    ("pointer", Keyword::Pointer),
    ("progress", Keyword::Progress),
    ("repeat", Keyword::Repeat),
    ("repeat-x", Keyword::RepeatX),
    ("repeat-y", Keyword::RepeatY),
    ("right", Keyword::Right),
    ("solid", Keyword::Solid),
    ("stretch", Keyword::Stretch),
    ("text", Keyword::Text),
    ("top", Keyword::Top),
    ("transparent", Keyword::Transparent),
    ("true", Keyword::True),
    ("underline", Keyword::Underline),
    ("wait", Keyword::Wait),
];

/// Named colors, sorted.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000FF),
    ("blue", 0x0000FFFF),
    ("gray", 0x808080FF),
    ("green", 0x008000FF),
    ("grey", 0x808080FF),
    ("orange", 0xFFA500FF),
    ("red", 0xFF0000FF),
    ("white", 0xFFFFFFFF),
    ("yellow", 0xFFFF00FF),
];

impl Keyword {
    /// Look up an identifier (ASCII case-insensitive).
    pub fn from_name(name: &str) -> Option<Keyword> {
        let lower = name.to_ascii_lowercase();
        KEYWORD_TABLE
            .binary_search_by(|(candidate, _)| candidate.cmp(&lower.as_str()))
            .ok()
            .map(|idx| KEYWORD_TABLE[idx].1)
    }

    pub fn name(self) -> &'static str {
        KEYWORD_TABLE
            .iter()
            .find(|(_, k)| *k == self)
            .map(|(name, _)| *name)
            .unwrap_or("")
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a color name such as `red`.
pub fn named_color(name: &str) -> Option<Color> {
    let lower = name.to_ascii_lowercase();
    NAMED_COLORS
        .binary_search_by(|(candidate, _)| candidate.cmp(&lower.as_str()))
        .ok()
        .map(|idx| Color(NAMED_COLORS[idx].1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_sorted() {
        for pair in KEYWORD_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
        for pair in NAMED_COLORS.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::from_name("No-Repeat"), Some(Keyword::NoRepeat));
        assert_eq!(Keyword::from_name("line-through"), Some(Keyword::LineThrough));
        assert_eq!(Keyword::from_name("inherit"), None);
        assert_eq!(Keyword::Solid.to_string(), "solid");
    }

    #[test]
    fn test_named_color_lookup() {
        assert_eq!(named_color("RED"), Some(Color(0xFF0000FF)));
        assert_eq!(named_color("teal"), None);
    }
}
