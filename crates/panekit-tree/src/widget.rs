//! Per-widget attributes.

use panekit_common::Rect;
use panekit_css::PseudoMask;

use crate::WidgetId;

/// One widget in a [`WidgetTree`](crate::WidgetTree).
///
/// Built with the `with_*` methods, then handed to
/// [`WidgetTree::insert`](crate::WidgetTree::insert).
#[derive(Debug, Clone)]
pub struct Widget {
    pub(crate) type_name: String,
    pub(crate) object_name: String,
    pub(crate) geometry: Rect,
    pub(crate) visible: bool,
    pub(crate) opaque: bool,
    pub(crate) children_never_overlap: bool,
    pub(crate) ignores_style_sheets: bool,
    pub(crate) pseudo: PseudoMask,
    pub(crate) text: String,
    pub(crate) frame: u32,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
}

impl Widget {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            object_name: String::new(),
            geometry: Rect::default(),
            visible: true,
            opaque: false,
            children_never_overlap: false,
            ignores_style_sheets: false,
            pseudo: PseudoMask::EMPTY,
            text: String::new(),
            frame: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = name.into();
        self
    }

    /// Position and size relative to the parent.
    pub fn with_geometry(mut self, geometry: Rect) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// The widget paints every pixel of its rectangle.
    pub fn with_opaque(mut self, opaque: bool) -> Self {
        self.opaque = opaque;
        self
    }

    /// Children laid out side by side, never on top of each other.
    pub fn with_children_never_overlap(mut self, flag: bool) -> Self {
        self.children_never_overlap = flag;
        self
    }

    pub fn with_ignores_style_sheets(mut self, flag: bool) -> Self {
        self.ignores_style_sheets = flag;
        self
    }

    pub fn with_pseudo(mut self, pseudo: PseudoMask) -> Self {
        self.pseudo = pseudo;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn children_never_overlap(&self) -> bool {
        self.children_never_overlap
    }

    pub fn ignores_style_sheets(&self) -> bool {
        self.ignores_style_sheets
    }

    pub fn pseudo(&self) -> PseudoMask {
        self.pseudo
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current animation frame counter.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    /// Children in z-order, topmost last.
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }
}
