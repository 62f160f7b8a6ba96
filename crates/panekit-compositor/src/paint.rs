//! The paint walk and the graphics backend seam.

use std::cell::RefCell;
use std::hash::Hash;

use panekit_common::{retry_on_device_loss, PaneKitError, Rect, Region, RetryConfig};
use panekit_css::{RenderRule, StyleEngine};
use thiserror::Error;
use tracing::{debug, trace};

use crate::dirty::WindowDirtyState;
use crate::tree::PaintTree;

/// Failures reported by a [`RenderBackend`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// Device resources are gone; recreate them and paint again.
    #[error("Graphics device lost")]
    DeviceLost,

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<DrawError> for PaneKitError {
    fn from(err: DrawError) -> Self {
        match err {
            DrawError::DeviceLost => PaneKitError::DeviceLost,
            DrawError::Backend(message) => PaneKitError::paint(message),
        }
    }
}

/// One widget to draw.
#[derive(Debug)]
pub struct DrawCommand<'a, Id> {
    pub widget: Id,
    /// May be invalid; the backend then draws the built-in appearance.
    pub rule: &'a RenderRule,
    /// The widget rectangle in window coordinates.
    pub window_rect: Rect,
    /// Window-coordinate area the draw is limited to.
    pub clip: &'a Region,
    pub text: &'a str,
    pub frame_index: u32,
}

/// Turns draw commands into pixels. Brushes, bitmaps and device handles
/// belong to the backend.
pub trait RenderBackend<Id> {
    fn begin_paint(&mut self, dirty: &Region) -> Result<(), DrawError>;

    fn draw(&mut self, command: &DrawCommand<'_, Id>) -> Result<(), DrawError>;

    fn end_paint(&mut self) -> Result<(), DrawError>;

    /// Rebuild device resources after [`DrawError::DeviceLost`].
    fn recreate_resources(&mut self);
}

/// Outcome of a successful paint pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintReport {
    pub widgets_drawn: usize,
    pub dirty_bounds: Rect,
}

impl<Id: Copy + Eq + Hash + std::fmt::Debug> WindowDirtyState<Id> {
    /// Draw every widget with a passive region, then clear the passive set.
    ///
    /// Device loss recreates the backend's resources and repaints the same
    /// set, up to `retry.max_attempts` passes. On failure the passive set is
    /// kept so the next paint tries again.
    pub fn paint<T, B>(
        &mut self,
        tree: &T,
        styles: &mut StyleEngine,
        backend: &mut B,
        retry: &RetryConfig,
    ) -> panekit_common::Result<PaintReport>
    where
        T: PaintTree<Id = Id>,
        B: RenderBackend<Id>,
    {
        let dirty = self.dirty_region();
        if dirty.is_empty() {
            trace!("Nothing to paint");
            return Ok(PaintReport::default());
        }

        let backend = RefCell::new(backend);
        let widgets_drawn = retry_on_device_loss(
            retry,
            || {
                let mut guard = backend.borrow_mut();
                self.paint_pass(tree, styles, &mut **guard, &dirty)
                    .map_err(PaneKitError::from)
            },
            || backend.borrow_mut().recreate_resources(),
        )?;

        let report = PaintReport {
            widgets_drawn,
            dirty_bounds: dirty.bounding_rect(),
        };
        debug!(widgets = report.widgets_drawn, bounds = ?report.dirty_bounds, "Window painted");
        self.clear();
        Ok(report)
    }

    fn paint_pass<T, B>(
        &self,
        tree: &T,
        styles: &mut StyleEngine,
        backend: &mut B,
        dirty: &Region,
    ) -> Result<usize, DrawError>
    where
        T: PaintTree<Id = Id>,
        B: RenderBackend<Id>,
    {
        backend.begin_paint(dirty)?;
        let mut drawn = 0;
        let root = self.root();
        let size = tree.geometry(root);
        let root_rect = Rect::new(0, 0, size.width, size.height);
        self.paint_widget(tree, styles, backend, root, root_rect, None, &mut drawn)?;
        backend.end_paint()?;
        Ok(drawn)
    }

    /// Draw `id` if its clip is non-empty, then visit children that are
    /// scheduled, overlap the clip, or contain scheduled descendants.
    #[allow(clippy::too_many_arguments)]
    fn paint_widget<T, B>(
        &self,
        tree: &T,
        styles: &mut StyleEngine,
        backend: &mut B,
        id: Id,
        window_rect: Rect,
        inherited: Option<&Region>,
        drawn: &mut usize,
    ) -> Result<(), DrawError>
    where
        T: PaintTree<Id = Id>,
        B: RenderBackend<Id>,
    {
        if !tree.is_visible(id) {
            return Ok(());
        }

        let mut clip = inherited.cloned().unwrap_or_default();
        if let Some(own) = self.passive_region(id) {
            clip.union_region(own);
        }
        clip.intersect_rect(&window_rect);

        let painted = !clip.is_empty();
        if painted {
            let rule = styles.get_render_rule(&tree.style_node(id), tree.pseudo_state(id));
            backend.draw(&DrawCommand {
                widget: id,
                rule: &rule,
                window_rect,
                clip: &clip,
                text: tree.text(id),
                frame_index: tree.frame_index(id),
            })?;
            *drawn += 1;
        }

        for child in tree.children(id) {
            let geometry = tree.geometry(child);
            let child_rect = geometry.translated(window_rect.x, window_rect.y);
            let scheduled = self.passive_region(child).is_some();
            if scheduled || (painted && clip.intersects_rect(&child_rect)) {
                let inherited = painted.then_some(&clip);
                self.paint_widget(tree, styles, backend, child, child_rect, inherited, drawn)?;
            } else if self.is_subtree_dirty(child) {
                self.paint_widget(tree, styles, backend, child, child_rect, None, drawn)?;
            }
        }
        Ok(())
    }
}
