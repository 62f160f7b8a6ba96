//! # PaneKit Tree
//!
//! Arena-backed widget tree for PaneKit windows.
//!
//! ## Design Goals
//!
//! 1. **Stable ids**: a [`WidgetId`] is never reused, so stale ids miss
//!    instead of aliasing a newer widget
//! 2. **Cheap handles**: [`WidgetRef`] borrows the tree and implements
//!    [`StyleNode`](panekit_css::StyleNode) for the style engine
//! 3. **Compositor ready**: [`WidgetTree`] implements
//!    [`CompositeTree`](panekit_compositor::CompositeTree) and
//!    [`PaintTree`](panekit_compositor::PaintTree) directly
//!
//! A widget without a parent is a top-level window.

pub mod tree;
pub mod widget;

pub use tree::{WidgetRef, WidgetTree};
pub use widget::Widget;

use std::fmt;

use panekit_common::PaneKitError;
use thiserror::Error;

/// Errors that can occur in widget-tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Widget not found: {0}")]
    WidgetNotFound(WidgetId),

    #[error("Cannot move {widget} under {parent}: it is inside the subtree being moved")]
    Cycle { widget: WidgetId, parent: WidgetId },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<TreeError> for PaneKitError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::WidgetNotFound(id) => PaneKitError::NotFound(id.to_string()),
            other => PaneKitError::tree(other.to_string()),
        }
    }
}

/// Unique identifier for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(usize);

impl WidgetId {
    /// Create a new WidgetId.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}
