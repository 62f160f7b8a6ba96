//! Paint-ready style descriptors.
//!
//! A [`RenderRule`] is what the paint path consumes: background layers,
//! border, text and box geometry resolved from the merged declarations of
//! one (matched rule set, pseudo state) pair. It is immutable once built and
//! shared between every node that resolves to it; comparing two rules is a
//! pointer comparison.

use std::fmt;
use std::rc::Rc;

use panekit_common::{Rect, StyleConfig};
use panekit_cssparser::{Color, CssValue, Declaration, Keyword, PropertyType};

use crate::cascade::DeclarationMerge;

/// Per-side sizes in CSS order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Edges {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Edges {
    pub const ZERO: Edges = Edges::uniform(0);

    pub const fn uniform(value: i32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// CSS one-to-four value expansion (`top right bottom left`).
    pub fn from_values(values: &[i32]) -> Option<Self> {
        let [top, right, bottom, left] = expand_sides(values)?;
        Some(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    pub fn is_zero(&self) -> bool {
        *self == Edges::ZERO
    }

    fn set(&mut self, side: Side, value: i32) {
        match side {
            Side::Top => self.top = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
            Side::Left => self.left = value,
        }
    }
}

/// Shrink `rect` by `edges`, never below zero size.
pub fn deflate(rect: Rect, edges: Edges) -> Rect {
    let left = rect.x + edges.left;
    let top = rect.y + edges.top;
    let right = (rect.right() - edges.right).max(left);
    let bottom = (rect.bottom() - edges.bottom).max(top);
    Rect::from_edges(left, top, right, bottom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

const SIDES: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

fn expand_sides<T: Clone>(values: &[T]) -> Option<[T; 4]> {
    let v = values;
    match v.len() {
        0 => None,
        1 => Some([v[0].clone(), v[0].clone(), v[0].clone(), v[0].clone()]),
        2 => Some([v[0].clone(), v[1].clone(), v[0].clone(), v[1].clone()]),
        3 => Some([v[0].clone(), v[1].clone(), v[2].clone(), v[1].clone()]),
        _ => Some([v[0].clone(), v[1].clone(), v[2].clone(), v[3].clone()]),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Brush {
    Color(Color),
    /// Image location as written in `url(...)`; loading is up to the backend.
    Image(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundRepeat {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackgroundPosition {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
    pub dx: i32,
    pub dy: i32,
}

/// The box a background layer is clipped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipBox {
    /// The whole widget rectangle.
    Margin,
    #[default]
    Border,
    Padding,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundSize {
    #[default]
    Auto,
    Stretch,
    Contain,
    Cover,
    Fixed { width: i32, height: i32 },
}

/// One painted background layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundLayer {
    pub brush: Brush,
    pub repeat: BackgroundRepeat,
    pub position: BackgroundPosition,
    pub clip: ClipBox,
    pub size: BackgroundSize,
    /// Number of animation frames stacked in the image, at least 1.
    pub frame_count: u32,
}

impl BackgroundLayer {
    fn new(brush: Brush) -> Self {
        Self {
            brush,
            repeat: BackgroundRepeat::default(),
            position: BackgroundPosition::default(),
            clip: ClipBox::default(),
            size: BackgroundSize::default(),
            frame_count: 1,
        }
    }

    /// Frame of this layer to show for a widget-level frame counter.
    pub fn frame_for(&self, frame_index: u32) -> u32 {
        if self.frame_count <= 1 {
            0
        } else {
            frame_index % self.frame_count
        }
    }

    fn is_opaque_fill(&self) -> bool {
        matches!(self.brush, Brush::Color(c) if c.is_opaque())
    }
}

/// Attributes accumulated from the values of one or more background
/// declarations, turned into at most two layers (color below image).
#[derive(Debug, Default)]
struct LayerBuilder {
    color: Option<Color>,
    image: Option<String>,
    repeat: BackgroundRepeat,
    position: BackgroundPosition,
    horizontal_set: bool,
    offsets_seen: u8,
    clip: ClipBox,
    size: BackgroundSize,
    frame_count: u32,
}

impl LayerBuilder {
    fn feed(&mut self, value: &CssValue) {
        match value {
            CssValue::Color(c) => self.color = Some(*c),
            CssValue::Uri(uri) => self.image = Some(uri.clone()),
            CssValue::Number(n) => self.frame_count = (*n).max(1) as u32,
            CssValue::Length(n) => self.feed_offset(*n),
            CssValue::Identifier(keyword) => self.feed_keyword(*keyword),
            CssValue::String(_) => {}
        }
    }

    fn feed_offset(&mut self, offset: i32) {
        if self.offsets_seen == 0 {
            self.position.dx = offset;
        } else {
            self.position.dy = offset;
        }
        self.offsets_seen = self.offsets_seen.saturating_add(1);
    }

    fn feed_keyword(&mut self, keyword: Keyword) {
        match keyword {
            Keyword::Transparent => self.color = Some(Color::TRANSPARENT),
            Keyword::Repeat => self.repeat = BackgroundRepeat::Repeat,
            Keyword::RepeatX => self.repeat = BackgroundRepeat::RepeatX,
            Keyword::RepeatY => self.repeat = BackgroundRepeat::RepeatY,
            Keyword::NoRepeat => self.repeat = BackgroundRepeat::NoRepeat,
            Keyword::Stretch => self.size = BackgroundSize::Stretch,
            Keyword::Contain => self.size = BackgroundSize::Contain,
            Keyword::Cover => self.size = BackgroundSize::Cover,
            Keyword::Left => self.set_horizontal(HorizontalAlign::Left),
            Keyword::Right => self.set_horizontal(HorizontalAlign::Right),
            Keyword::Top => self.position.vertical = VerticalAlign::Top,
            Keyword::Bottom => self.position.vertical = VerticalAlign::Bottom,
            // First `center` is horizontal, a second one vertical.
            Keyword::Center if !self.horizontal_set => {
                self.set_horizontal(HorizontalAlign::Center);
                self.position.vertical = VerticalAlign::Center;
            }
            Keyword::Center => self.position.vertical = VerticalAlign::Center,
            Keyword::Margin => self.clip = ClipBox::Margin,
            Keyword::Border => self.clip = ClipBox::Border,
            Keyword::Padding => self.clip = ClipBox::Padding,
            Keyword::Content => self.clip = ClipBox::Content,
            _ => {}
        }
    }

    fn set_horizontal(&mut self, align: HorizontalAlign) {
        self.position.horizontal = align;
        self.horizontal_set = true;
    }

    fn set_size(&mut self, values: &[CssValue]) {
        let lengths: Vec<i32> = values.iter().filter_map(CssValue::as_int).collect();
        match lengths.as_slice() {
            [w] => self.size = BackgroundSize::Fixed { width: *w, height: *w },
            [w, h, ..] => self.size = BackgroundSize::Fixed { width: *w, height: *h },
            [] => values.iter().filter_map(CssValue::as_keyword).for_each(|k| self.feed_keyword(k)),
        }
    }

    fn finish(self, layers: &mut Vec<BackgroundLayer>) {
        if let Some(color) = self.color {
            let mut layer = BackgroundLayer::new(Brush::Color(color));
            layer.clip = self.clip;
            layers.push(layer);
        }
        if let Some(image) = self.image {
            layers.push(BackgroundLayer {
                brush: Brush::Image(image),
                repeat: self.repeat,
                position: self.position,
                clip: self.clip,
                size: self.size,
                frame_count: self.frame_count.max(1),
            });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    None,
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::None => Some(BorderStyle::None),
            Keyword::Solid => Some(BorderStyle::Solid),
            Keyword::Dashed => Some(BorderStyle::Dashed),
            Keyword::Dotted => Some(BorderStyle::Dotted),
            Keyword::Double => Some(BorderStyle::Double),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSide {
    pub width: i32,
    pub style: BorderStyle,
    pub color: Color,
}

impl Default for BorderSide {
    fn default() -> Self {
        Self {
            width: 0,
            style: BorderStyle::Solid,
            color: Color::BLACK,
        }
    }
}

impl BorderSide {
    /// Apply a `width style color` shorthand in any order.
    fn apply_shorthand(&mut self, values: &[CssValue]) {
        for value in values {
            match value {
                CssValue::Length(n) | CssValue::Number(n) => self.width = *n,
                CssValue::Color(c) => self.color = *c,
                CssValue::Identifier(Keyword::Transparent) => self.color = Color::TRANSPARENT,
                CssValue::Identifier(keyword) => {
                    if let Some(style) = BorderStyle::from_keyword(*keyword) {
                        self.style = style;
                        if style == BorderStyle::None {
                            self.width = 0;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Width actually taken up by this side.
    pub fn effective_width(&self) -> i32 {
        if self.style == BorderStyle::None {
            0
        } else {
            self.width.max(0)
        }
    }
}

/// Corner radii, clockwise from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Radii {
    pub top_left: i32,
    pub top_right: i32,
    pub bottom_right: i32,
    pub bottom_left: i32,
}

impl Radii {
    pub fn is_zero(&self) -> bool {
        *self == Radii::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Border {
    pub top: BorderSide,
    pub right: BorderSide,
    pub bottom: BorderSide,
    pub left: BorderSide,
    pub radii: Radii,
}

impl Border {
    fn side_mut(&mut self, side: Side) -> &mut BorderSide {
        match side {
            Side::Top => &mut self.top,
            Side::Right => &mut self.right,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
        }
    }

    pub fn widths(&self) -> Edges {
        Edges {
            top: self.top.effective_width(),
            right: self.right.effective_width(),
            bottom: self.bottom.effective_width(),
            left: self.left.effective_width(),
        }
    }

    /// Shorthands first, then per-side shorthands, then longhands.
    fn from_merge(merge: &DeclarationMerge<'_>) -> Option<Self> {
        const SIDE_SHORTHANDS: [(PropertyType, Side); 4] = [
            (PropertyType::BorderTop, Side::Top),
            (PropertyType::BorderRight, Side::Right),
            (PropertyType::BorderBottom, Side::Bottom),
            (PropertyType::BorderLeft, Side::Left),
        ];
        const WIDTHS: [(PropertyType, Side); 4] = [
            (PropertyType::BorderTopWidth, Side::Top),
            (PropertyType::BorderRightWidth, Side::Right),
            (PropertyType::BorderBottomWidth, Side::Bottom),
            (PropertyType::BorderLeftWidth, Side::Left),
        ];
        const COLORS: [(PropertyType, Side); 4] = [
            (PropertyType::BorderTopColor, Side::Top),
            (PropertyType::BorderRightColor, Side::Right),
            (PropertyType::BorderBottomColor, Side::Bottom),
            (PropertyType::BorderLeftColor, Side::Left),
        ];
        const STYLES: [(PropertyType, Side); 4] = [
            (PropertyType::BorderTopStyle, Side::Top),
            (PropertyType::BorderRightStyle, Side::Right),
            (PropertyType::BorderBottomStyle, Side::Bottom),
            (PropertyType::BorderLeftStyle, Side::Left),
        ];

        let mut border = Border::default();
        let mut touched = false;

        if let Some(decl) = merge.get(PropertyType::Border) {
            for side in SIDES {
                border.side_mut(side).apply_shorthand(&decl.values);
            }
            touched = true;
        }
        for (property, side) in SIDE_SHORTHANDS {
            if let Some(decl) = merge.get(property) {
                border.side_mut(side).apply_shorthand(&decl.values);
                touched = true;
            }
        }

        let widths: Vec<i32> = merge.values(PropertyType::BorderWidth).iter().filter_map(CssValue::as_int).collect();
        if let Some(widths) = expand_sides(&widths) {
            for (side, width) in SIDES.into_iter().zip(widths) {
                border.side_mut(side).width = width;
            }
            touched = true;
        }
        let colors: Vec<Color> = merge.values(PropertyType::BorderColor).iter().filter_map(CssValue::as_color).collect();
        if let Some(colors) = expand_sides(&colors) {
            for (side, color) in SIDES.into_iter().zip(colors) {
                border.side_mut(side).color = color;
            }
            touched = true;
        }
        let styles: Vec<BorderStyle> = merge
            .values(PropertyType::BorderStyle)
            .iter()
            .filter_map(|v| v.as_keyword().and_then(BorderStyle::from_keyword))
            .collect();
        if let Some(styles) = expand_sides(&styles) {
            for (side, style) in SIDES.into_iter().zip(styles) {
                border.side_mut(side).style = style;
            }
            touched = true;
        }

        for (property, side) in WIDTHS {
            if let Some(width) = merge.values(property).iter().find_map(CssValue::as_int) {
                border.side_mut(side).width = width;
                touched = true;
            }
        }
        for (property, side) in COLORS {
            if let Some(color) = merge.values(property).iter().find_map(CssValue::as_color) {
                border.side_mut(side).color = color;
                touched = true;
            }
        }
        for (property, side) in STYLES {
            let style = merge
                .values(property)
                .iter()
                .find_map(|v| v.as_keyword().and_then(BorderStyle::from_keyword));
            if let Some(style) = style {
                border.side_mut(side).style = style;
                touched = true;
            }
        }

        let radii: Vec<i32> = merge.values(PropertyType::BorderRadius).iter().filter_map(CssValue::as_int).collect();
        if let Some([tl, tr, br, bl]) = expand_sides(&radii) {
            border.radii = Radii {
                top_left: tl,
                top_right: tr,
                bottom_right: br,
                bottom_left: bl,
            };
            touched = true;
        }
        let corners: [(PropertyType, &mut i32); 4] = [
            (PropertyType::BorderTopLeftRadius, &mut border.radii.top_left),
            (PropertyType::BorderTopRightRadius, &mut border.radii.top_right),
            (PropertyType::BorderBottomRightRadius, &mut border.radii.bottom_right),
            (PropertyType::BorderBottomLeftRadius, &mut border.radii.bottom_left),
        ];
        for (property, slot) in corners {
            if let Some(radius) = merge.values(property).iter().find_map(CssValue::as_int) {
                *slot = radius;
                touched = true;
            }
        }

        touched.then_some(border)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderImageRepeat {
    #[default]
    Stretch,
    Repeat,
}

/// Nine-patch border image: `border-image: url(x) top right bottom left [stretch|repeat]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderImage {
    pub uri: String,
    pub slices: Edges,
    pub repeat: BorderImageRepeat,
}

impl BorderImage {
    fn from_values(values: &[CssValue]) -> Option<Self> {
        let uri = values.iter().find_map(|v| match v {
            CssValue::Uri(uri) => Some(uri.clone()),
            _ => None,
        })?;
        let slices: Vec<i32> = values.iter().filter_map(CssValue::as_int).collect();
        let repeat = match values.iter().find_map(CssValue::as_keyword) {
            Some(Keyword::Repeat) => BorderImageRepeat::Repeat,
            _ => BorderImageRepeat::Stretch,
        };
        Some(Self {
            uri,
            slices: Edges::from_values(&slices).unwrap_or_default(),
            repeat,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    Overline,
    LineThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextShadow {
    pub dx: i32,
    pub dy: i32,
    pub blur: i32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOutline {
    pub width: i32,
    pub color: Color,
}

pub const FONT_WEIGHT_LIGHT: u16 = 300;
pub const FONT_WEIGHT_NORMAL: u16 = 400;
pub const FONT_WEIGHT_BOLD: u16 = 700;

/// Resolved text attributes; missing font settings fall back to the
/// configured defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    pub font_family: String,
    pub font_size: i32,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub color: Color,
    pub align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub decoration: TextDecoration,
    pub shadow: Option<TextShadow>,
    pub outline: Option<TextOutline>,
}

impl TextRule {
    fn with_defaults(config: &StyleConfig) -> Self {
        Self {
            font_family: config.default_font_family.clone(),
            font_size: config.default_font_size,
            font_weight: FONT_WEIGHT_NORMAL,
            font_style: FontStyle::Normal,
            color: Color::BLACK,
            align: TextAlign::Left,
            vertical_align: VerticalAlign::Center,
            decoration: TextDecoration::None,
            shadow: None,
            outline: None,
        }
    }

    fn from_merge(merge: &DeclarationMerge<'_>, config: &StyleConfig) -> Option<Self> {
        const TEXT_PROPERTIES: [PropertyType; 10] = [
            PropertyType::Color,
            PropertyType::Font,
            PropertyType::FontFamily,
            PropertyType::FontSize,
            PropertyType::FontStyle,
            PropertyType::FontWeight,
            PropertyType::TextAlign,
            PropertyType::TextDecoration,
            PropertyType::TextOutline,
            PropertyType::TextShadow,
        ];
        if TEXT_PROPERTIES.iter().all(|p| merge.get(*p).is_none()) {
            return None;
        }

        let mut text = TextRule::with_defaults(config);
        if let Some(decl) = merge.get(PropertyType::Font) {
            text.apply_font_shorthand(decl);
        }
        if let Some(CssValue::String(family)) = merge.values(PropertyType::FontFamily).first() {
            text.font_family = family.clone();
        }
        if let Some(size) = merge.values(PropertyType::FontSize).iter().find_map(CssValue::as_int) {
            text.font_size = size;
        }
        for value in merge.values(PropertyType::FontWeight) {
            text.apply_weight(value);
        }
        for keyword in merge.values(PropertyType::FontStyle).iter().filter_map(CssValue::as_keyword) {
            text.apply_style(keyword);
        }
        if let Some(color) = merge.values(PropertyType::Color).iter().find_map(CssValue::as_color) {
            text.color = color;
        }
        for keyword in merge.values(PropertyType::TextAlign).iter().filter_map(CssValue::as_keyword) {
            match keyword {
                Keyword::Left => text.align = TextAlign::Left,
                Keyword::Right => text.align = TextAlign::Right,
                Keyword::Center => text.align = TextAlign::Center,
                Keyword::Justify => text.align = TextAlign::Justify,
                Keyword::Top => text.vertical_align = VerticalAlign::Top,
                Keyword::Bottom => text.vertical_align = VerticalAlign::Bottom,
                _ => {}
            }
        }
        if let Some(keyword) = merge.values(PropertyType::TextDecoration).iter().find_map(CssValue::as_keyword) {
            text.decoration = match keyword {
                Keyword::Underline => TextDecoration::Underline,
                Keyword::Overline => TextDecoration::Overline,
                Keyword::LineThrough => TextDecoration::LineThrough,
                _ => TextDecoration::None,
            };
        }

        let shadow = merge.values(PropertyType::TextShadow);
        let offsets: Vec<i32> = shadow.iter().filter_map(CssValue::as_int).collect();
        if offsets.len() >= 2 {
            text.shadow = Some(TextShadow {
                dx: offsets[0],
                dy: offsets[1],
                blur: offsets.get(2).copied().unwrap_or(0),
                color: shadow.iter().find_map(CssValue::as_color).unwrap_or(Color::BLACK),
            });
        }
        let outline = merge.values(PropertyType::TextOutline);
        if let Some(width) = outline.iter().find_map(CssValue::as_int) {
            text.outline = Some(TextOutline {
                width,
                color: outline.iter().find_map(CssValue::as_color).unwrap_or(Color::BLACK),
            });
        }

        Some(text)
    }

    fn apply_font_shorthand(&mut self, decl: &Declaration) {
        for value in &decl.values {
            match value {
                // Bare hundreds are weights, anything else numeric is a size.
                CssValue::Number(n) if *n >= 100 && n % 100 == 0 => self.apply_weight(value),
                CssValue::Number(n) | CssValue::Length(n) => self.font_size = *n,
                CssValue::String(family) => self.font_family = family.clone(),
                CssValue::Identifier(Keyword::Italic | Keyword::Oblique) => {
                    if let Some(keyword) = value.as_keyword() {
                        self.apply_style(keyword);
                    }
                }
                CssValue::Identifier(_) => self.apply_weight(value),
                _ => {}
            }
        }
    }

    fn apply_weight(&mut self, value: &CssValue) {
        match value {
            CssValue::Identifier(Keyword::Bold) => self.font_weight = FONT_WEIGHT_BOLD,
            CssValue::Identifier(Keyword::Light) => self.font_weight = FONT_WEIGHT_LIGHT,
            CssValue::Identifier(Keyword::Normal) => self.font_weight = FONT_WEIGHT_NORMAL,
            CssValue::Number(n) => self.font_weight = (*n).clamp(1, 1000) as u16,
            _ => {}
        }
    }

    fn apply_style(&mut self, keyword: Keyword) {
        match keyword {
            Keyword::Italic => self.font_style = FontStyle::Italic,
            Keyword::Oblique => self.font_style = FontStyle::Oblique,
            Keyword::Normal => self.font_style = FontStyle::Normal,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeConstraints {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub min_width: Option<i32>,
    pub min_height: Option<i32>,
    pub max_width: Option<i32>,
    pub max_height: Option<i32>,
}

impl SizeConstraints {
    fn from_merge(merge: &DeclarationMerge<'_>) -> Self {
        let int = |p| merge.values(p).iter().find_map(CssValue::as_int);
        Self {
            width: int(PropertyType::Width),
            height: int(PropertyType::Height),
            min_width: int(PropertyType::MinWidth),
            min_height: int(PropertyType::MinHeight),
            max_width: int(PropertyType::MaxWidth),
            max_height: int(PropertyType::MaxHeight),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    Arrow,
    Hand,
    IBeam,
    Wait,
    Progress,
    Crosshair,
    Help,
    Move,
    NotAllowed,
    ResizeNS,
    ResizeEW,
    ResizeNESW,
    ResizeNWSE,
    /// Cursor file named by `url(...)`.
    Custom(String),
}

impl Cursor {
    fn from_value(value: &CssValue) -> Option<Self> {
        let keyword = match value {
            CssValue::Uri(uri) => return Some(Cursor::Custom(uri.clone())),
            CssValue::Identifier(keyword) => *keyword,
            _ => return None,
        };
        Some(match keyword {
            Keyword::Arrow | Keyword::Default => Cursor::Arrow,
            Keyword::Hand | Keyword::Pointer => Cursor::Hand,
            Keyword::Text => Cursor::IBeam,
            Keyword::Wait => Cursor::Wait,
            Keyword::Progress => Cursor::Progress,
            Keyword::Crosshair => Cursor::Crosshair,
            Keyword::Help => Cursor::Help,
            Keyword::Move => Cursor::Move,
            Keyword::NotAllowed => Cursor::NotAllowed,
            Keyword::NsResize => Cursor::ResizeNS,
            Keyword::EwResize => Cursor::ResizeEW,
            Keyword::NeswResize => Cursor::ResizeNESW,
            Keyword::NwseResize => Cursor::ResizeNWSE,
            _ => return None,
        })
    }
}

/// Everything a backend needs to paint one widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRuleData {
    /// Bottom layer first.
    pub backgrounds: Vec<BackgroundLayer>,
    pub border: Option<Border>,
    pub border_image: Option<BorderImage>,
    pub text: Option<TextRule>,
    pub margin: Edges,
    pub padding: Edges,
    pub size: SizeConstraints,
    pub cursor: Option<Cursor>,
    /// Painting covers the whole widget rectangle with opaque pixels.
    pub opaque: bool,
    /// Largest frame count among the background layers.
    pub frame_count: u32,
}

impl RenderRuleData {
    pub fn from_merge(merge: &DeclarationMerge<'_>, config: &StyleConfig) -> Self {
        let mut backgrounds = Vec::new();

        let mut base = LayerBuilder::default();
        for property in [
            PropertyType::BackgroundColor,
            PropertyType::BackgroundImage,
            PropertyType::BackgroundRepeat,
            PropertyType::BackgroundPosition,
            PropertyType::BackgroundClip,
        ] {
            merge.values(property).iter().for_each(|v| base.feed(v));
        }
        if let Some(decl) = merge.get(PropertyType::BackgroundSize) {
            base.set_size(&decl.values);
        }
        base.finish(&mut backgrounds);

        for decl in merge.backgrounds() {
            let mut layer = LayerBuilder::default();
            decl.values.iter().for_each(|v| layer.feed(v));
            layer.finish(&mut backgrounds);
        }

        let border = Border::from_merge(merge);
        let border_image = merge
            .get(PropertyType::BorderImage)
            .and_then(|decl| BorderImage::from_values(&decl.values));
        let margin = box_edges(merge, PropertyType::Margin, MARGIN_SIDES);
        let padding = box_edges(merge, PropertyType::Padding, PADDING_SIDES);

        let square_corners = border.map_or(true, |b| b.radii.is_zero());
        let opaque = square_corners
            && backgrounds.iter().any(|layer| {
                layer.is_opaque_fill()
                    && (layer.clip == ClipBox::Margin || (layer.clip == ClipBox::Border && margin.is_zero()))
            });
        let frame_count = backgrounds.iter().map(|l| l.frame_count).max().unwrap_or(1);

        Self {
            backgrounds,
            border,
            border_image,
            text: TextRule::from_merge(merge, config),
            margin,
            padding,
            size: SizeConstraints::from_merge(merge),
            cursor: merge.values(PropertyType::Cursor).iter().find_map(Cursor::from_value),
            opaque,
            frame_count,
        }
    }

    pub fn border_widths(&self) -> Edges {
        self.border.map(|b| b.widths()).unwrap_or_default()
    }

    /// The widget rectangle minus margins.
    pub fn border_rect(&self, widget_rect: Rect) -> Rect {
        deflate(widget_rect, self.margin)
    }

    /// Inside the border.
    pub fn padding_rect(&self, widget_rect: Rect) -> Rect {
        deflate(self.border_rect(widget_rect), self.border_widths())
    }

    /// Where text and child content go.
    pub fn content_rect(&self, widget_rect: Rect) -> Rect {
        deflate(self.padding_rect(widget_rect), self.padding)
    }

    /// The area a background layer may paint.
    pub fn layer_rect(&self, layer: &BackgroundLayer, widget_rect: Rect) -> Rect {
        match layer.clip {
            ClipBox::Margin => widget_rect,
            ClipBox::Border => self.border_rect(widget_rect),
            ClipBox::Padding => self.padding_rect(widget_rect),
            ClipBox::Content => self.content_rect(widget_rect),
        }
    }
}

const MARGIN_SIDES: [(PropertyType, Side); 4] = [
    (PropertyType::MarginTop, Side::Top),
    (PropertyType::MarginRight, Side::Right),
    (PropertyType::MarginBottom, Side::Bottom),
    (PropertyType::MarginLeft, Side::Left),
];

const PADDING_SIDES: [(PropertyType, Side); 4] = [
    (PropertyType::PaddingTop, Side::Top),
    (PropertyType::PaddingRight, Side::Right),
    (PropertyType::PaddingBottom, Side::Bottom),
    (PropertyType::PaddingLeft, Side::Left),
];

fn box_edges(merge: &DeclarationMerge<'_>, shorthand: PropertyType, sides: [(PropertyType, Side); 4]) -> Edges {
    let values: Vec<i32> = merge.values(shorthand).iter().filter_map(CssValue::as_int).collect();
    let mut edges = Edges::from_values(&values).unwrap_or_default();
    for (property, side) in sides {
        if let Some(value) = merge.values(property).iter().find_map(CssValue::as_int) {
            edges.set(side, value);
        }
    }
    edges
}

/// Shared handle to a [`RenderRuleData`], or the invalid rule.
///
/// Equality is identity: two rules are equal only if they are the same
/// instance (or both invalid).
#[derive(Clone, Default)]
pub struct RenderRule(Option<Rc<RenderRuleData>>);

impl RenderRule {
    /// The rule for nodes no declaration applies to.
    pub fn invalid() -> Self {
        Self(None)
    }

    pub fn new(data: RenderRuleData) -> Self {
        Self(Some(Rc::new(data)))
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    pub fn data(&self) -> Option<&RenderRuleData> {
        self.0.as_deref()
    }

    pub fn is_opaque(&self) -> bool {
        self.data().is_some_and(|d| d.opaque)
    }

    /// Number of handles sharing this rule, 0 for the invalid rule.
    pub fn share_count(&self) -> usize {
        self.0.as_ref().map_or(0, Rc::strong_count)
    }
}

impl PartialEq for RenderRule {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for RenderRule {}

impl fmt::Debug for RenderRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(data) => write!(f, "RenderRule({:p})", Rc::as_ptr(data)),
            None => f.write_str("RenderRule(invalid)"),
        }
    }
}
