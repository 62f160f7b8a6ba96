//! What the compositor needs to know about a widget tree.

use std::fmt::Debug;
use std::hash::Hash;

use panekit_common::Rect;
use panekit_css::{PseudoMask, StyleNode};

/// Structure and geometry of one window's widget tree.
pub trait CompositeTree {
    type Id: Copy + Eq + Hash + Debug;

    fn parent(&self, id: Self::Id) -> Option<Self::Id>;

    /// Children in z-order: later entries are drawn later and sit on top.
    fn children(&self, id: Self::Id) -> Vec<Self::Id>;

    /// Position and size relative to the parent.
    fn geometry(&self, id: Self::Id) -> Rect;

    fn is_visible(&self, id: Self::Id) -> bool;

    /// The widget paints every pixel of its rectangle opaquely.
    fn is_opaque(&self, id: Self::Id) -> bool;

    /// The parent guarantees its children never overlap each other.
    fn children_never_overlap(&self, id: Self::Id) -> bool;
}

/// Per-widget inputs of the paint walk.
pub trait PaintTree: CompositeTree {
    type Node<'a>: StyleNode
    where
        Self: 'a;

    fn style_node(&self, id: Self::Id) -> Self::Node<'_>;

    fn pseudo_state(&self, id: Self::Id) -> PseudoMask;

    fn text(&self, _id: Self::Id) -> &str {
        ""
    }

    /// Animation frame counter of the widget.
    fn frame_index(&self, _id: Self::Id) -> u32 {
        0
    }
}
