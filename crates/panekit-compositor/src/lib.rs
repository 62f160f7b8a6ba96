//! # PaneKit Compositor
//!
//! Dirty-region compositing for PaneKit windows.
//!
//! ## Design Goals
//!
//! 1. **Minimal repaint**: only the visible part of a change is redrawn
//! 2. **Occlusion**: opaque widgets above a change hide it
//! 3. **Translucency**: non-opaque widgets above a change, and whatever sits
//!    behind a non-opaque changed widget, are repainted with it
//! 4. **Backend-agnostic**: drawing goes through [`RenderBackend`]
//!
//! A window accumulates update requests in a [`WindowDirtyState`].
//! [`WindowDirtyState::compute`] turns them into per-widget passive regions in
//! window coordinates, and [`WindowDirtyState::paint`] walks the tree drawing
//! each scheduled widget with its [`RenderRule`](panekit_css::RenderRule).

pub mod dirty;
pub mod paint;
pub mod tree;

pub use dirty::{window_rect, WindowDirtyState};
pub use paint::{DrawCommand, DrawError, PaintReport, RenderBackend};
pub use tree::{CompositeTree, PaintTree};
