//! # PaneKit Engine
//!
//! Orchestration layer tying the widget tree, the style engine and the
//! per-window dirty-region compositor together.
//!
//! ## Design Goals
//!
//! 1. **Single owner**: [`Application`] owns every widget, stylesheet and
//!    window repaint state
//! 2. **Routed invalidation**: every mutation invalidates exactly the style
//!    caches and screen areas it can affect
//! 3. **Pluggable output**: painting goes through a caller-supplied
//!    [`RenderBackend`](panekit_compositor::RenderBackend)
//!
//! ```
//! use panekit_common::{PaneKitConfig, Rect};
//! use panekit_engine::Application;
//! use panekit_tree::Widget;
//!
//! let mut app = Application::new(PaneKitConfig::default());
//! app.set_app_style_sheet("Button { background: #336699; }");
//! let window = app.create_window(Widget::new("Window").with_geometry(Rect::new(0, 0, 320, 200)));
//! let button = app
//!     .create_widget(window, Widget::new("Button").with_geometry(Rect::new(10, 10, 80, 24)))
//!     .unwrap();
//! assert!(app.render_rule(button).unwrap().is_opaque());
//! ```

use std::collections::BTreeMap;

use panekit_common::{init_logging, LogConfig, PaneKitConfig, PaneKitError, Rect};
use panekit_compositor::{PaintReport, RenderBackend, WindowDirtyState};
use panekit_css::{NodeKey, PseudoMask, RenderRule, StyleEngine, StyleStats};
use panekit_tree::{TreeError, Widget, WidgetId, WidgetRef, WidgetTree};
use thiserror::Error;
use tracing::{debug, info, trace};

/// Errors that can occur in the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Window not found: {0}")]
    WindowNotFound(WidgetId),

    #[error(transparent)]
    Toolkit(#[from] PaneKitError),
}

/// Install the global `tracing` subscriber using `config.log_filter`.
pub fn init_tracing(config: &PaneKitConfig) -> Result<(), PaneKitError> {
    let mut log = LogConfig::default();
    if let Some(filter) = &config.log_filter {
        log = log.with_filter(filter.clone());
    }
    init_logging(log)
}

/// A set of top-level windows, their widgets and their styles.
pub struct Application {
    config: PaneKitConfig,
    styles: StyleEngine,
    tree: WidgetTree,
    windows: BTreeMap<WidgetId, WindowDirtyState<WidgetId>>,
}

impl Application {
    pub fn new(config: PaneKitConfig) -> Self {
        info!(
            alias_pseudo_states = config.style.alias_pseudo_states,
            max_region_rects = config.compositor.max_region_rects,
            "Initializing PaneKit application"
        );
        Self {
            styles: StyleEngine::new(config.style.clone()),
            tree: WidgetTree::new(),
            windows: BTreeMap::new(),
            config,
        }
    }

    /// Build from a JSON configuration document.
    pub fn from_json_config(json: &str) -> Result<Self, EngineError> {
        Ok(Self::new(PaneKitConfig::from_json_str(json)?))
    }

    /// Build from a JSON configuration file.
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        Ok(Self::new(PaneKitConfig::from_json_file(path)?))
    }

    pub fn config(&self) -> &PaneKitConfig {
        &self.config
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn style_stats(&self) -> StyleStats {
        self.styles.stats()
    }

    pub fn is_style_cached(&self, id: WidgetId) -> bool {
        self.styles.is_node_cached(widget_key(id))
    }

    pub fn window_state(&self, window: WidgetId) -> Option<&WindowDirtyState<WidgetId>> {
        self.windows.get(&window)
    }

    pub fn windows(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.windows.keys().copied()
    }

    // ==================== Styles ====================

    /// Replace the application stylesheet and repaint every window.
    pub fn set_app_style_sheet(&mut self, text: &str) {
        self.styles.set_app_style_sheet(text);
        for (&root, state) in self.windows.iter_mut() {
            state.request_update(root, None);
        }
    }

    pub fn app_style_sheet(&self) -> Option<&str> {
        self.styles.app_style_sheet_text()
    }

    /// Attach a stylesheet to `id`. Blank text removes it. The widget's
    /// window is repainted in full.
    pub fn set_widget_style_sheet(&mut self, id: WidgetId, text: &str) -> Result<(), EngineError> {
        let node = widget_node(&self.tree, id)?;
        self.styles.set_node_style_sheet(&node, text);
        let window = self.tree.window_of(id).ok_or(TreeError::WidgetNotFound(id))?;
        self.schedule(window, None);
        Ok(())
    }

    pub fn widget_style_sheet(&self, id: WidgetId) -> Option<&str> {
        self.styles.node_style_sheet_text(widget_key(id))
    }

    /// Resolved render rule of `id` in its current pseudo state.
    pub fn render_rule(&mut self, id: WidgetId) -> Result<RenderRule, EngineError> {
        let node = widget_node(&self.tree, id)?;
        let pseudo = self.tree.get(id).map(Widget::pseudo).unwrap_or(PseudoMask::EMPTY);
        Ok(self.styles.get_render_rule(&node, pseudo))
    }

    /// Render rule a top-level widget of the given type and name would get,
    /// without creating one.
    pub fn probe_style(&mut self, type_name: &str, object_name: &str, pseudo: PseudoMask) -> RenderRule {
        let probe = self.styles.create_query_node(type_name, object_name, None);
        let rule = self.styles.get_render_rule(&probe, pseudo);
        self.styles.remove_query_node(&probe);
        rule
    }

    // ==================== Widgets ====================

    /// Add a top-level window. Its first paint covers all of it.
    pub fn create_window(&mut self, widget: Widget) -> WidgetId {
        let id = self.tree.insert_window(widget);
        let mut state = WindowDirtyState::new(id);
        state.request_update(id, None);
        self.windows.insert(id, state);
        info!(window = %id, "Window created");
        id
    }

    pub fn create_widget(&mut self, parent: WidgetId, widget: Widget) -> Result<WidgetId, EngineError> {
        let id = self.tree.insert(Some(parent), widget)?;
        self.schedule(id, None);
        Ok(id)
    }

    /// Move `id` under `new_parent`, or make it a window of its own.
    pub fn reparent(&mut self, id: WidgetId, new_parent: Option<WidgetId>) -> Result<(), EngineError> {
        let widget = self.tree.get(id).ok_or(TreeError::WidgetNotFound(id))?;
        let old_parent = widget.parent();
        let old_geometry = widget.geometry();
        let old_window = self.tree.window_of(id);

        self.tree.reparent(id, new_parent)?;

        if let Some(parent) = old_parent {
            self.schedule(parent, Some(old_geometry));
        }
        let new_window = self.tree.window_of(id);
        if old_window != new_window {
            let moved = self.tree.subtree(id)?;
            self.forget_in_window(old_window, &moved);
        }
        match new_parent {
            None if old_parent.is_some() => {
                self.windows.insert(id, WindowDirtyState::new(id));
            }
            Some(_) if old_parent.is_none() => {
                self.windows.remove(&id);
            }
            _ => {}
        }

        let node = widget_node(&self.tree, id)?;
        self.styles.invalidate_subtree(&node);
        self.schedule(id, None);
        debug!(widget = %id, parent = ?new_parent, "Widget moved");
        Ok(())
    }

    /// Destroy `id` and its descendants. Returns the removed ids.
    pub fn destroy_widget(&mut self, id: WidgetId) -> Result<Vec<WidgetId>, EngineError> {
        let widget = self.tree.get(id).ok_or(TreeError::WidgetNotFound(id))?;
        let parent = widget.parent();
        let geometry = widget.geometry();
        let window = self.tree.window_of(id);

        let removed = self.tree.remove(id)?;
        for &gone in &removed {
            self.styles.node_destroyed(widget_key(gone));
        }
        match parent {
            Some(parent) => {
                self.forget_in_window(window, &removed);
                self.schedule(parent, Some(geometry));
            }
            None => {
                self.windows.remove(&id);
                info!(window = %id, "Window destroyed");
            }
        }
        Ok(removed)
    }

    pub fn set_geometry(&mut self, id: WidgetId, geometry: Rect) -> Result<(), EngineError> {
        let old = self.tree.get(id).ok_or(TreeError::WidgetNotFound(id))?;
        if old.geometry() == geometry {
            return Ok(());
        }
        if let Some(parent) = old.parent() {
            let old_geometry = old.geometry();
            self.schedule(parent, Some(old_geometry));
        }
        self.tree.set_geometry(id, geometry)?;
        self.schedule(id, None);
        Ok(())
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<(), EngineError> {
        let widget = self.tree.get(id).ok_or(TreeError::WidgetNotFound(id))?;
        if widget.is_visible() == visible {
            return Ok(());
        }
        if let Some(parent) = widget.parent().filter(|_| !visible) {
            let geometry = widget.geometry();
            self.schedule(parent, Some(geometry));
        }
        self.tree.set_visible(id, visible)?;
        if visible {
            self.schedule(id, None);
        }
        Ok(())
    }

    pub fn set_opaque(&mut self, id: WidgetId, opaque: bool) -> Result<(), EngineError> {
        self.tree.set_opaque(id, opaque)?;
        self.schedule(id, None);
        Ok(())
    }

    pub fn set_text(&mut self, id: WidgetId, text: impl Into<String>) -> Result<(), EngineError> {
        self.tree.set_text(id, text)?;
        self.schedule(id, None);
        Ok(())
    }

    /// Change the pseudo state of `id`. A repaint is requested only when
    /// the new state resolves to a different render rule; the return value
    /// says whether one was.
    pub fn set_pseudo_state(&mut self, id: WidgetId, pseudo: PseudoMask) -> Result<bool, EngineError> {
        let old = self.tree.set_pseudo(id, pseudo)?;
        if old == pseudo {
            return Ok(false);
        }
        let node = widget_node(&self.tree, id)?;
        let before = self.styles.get_render_rule(&node, old);
        let after = self.styles.get_render_rule(&node, pseudo);
        if before == after {
            trace!(widget = %id, %pseudo, "Pseudo state change keeps the render rule");
            return Ok(false);
        }
        self.schedule(id, None);
        Ok(true)
    }

    /// Step the background animation of `id`. Widgets whose rule has a
    /// single frame are left alone; returns whether a frame was advanced.
    pub fn advance_animation(&mut self, id: WidgetId) -> Result<bool, EngineError> {
        let rule = self.render_rule(id)?;
        let frames = rule.data().map_or(1, |data| data.frame_count);
        if frames <= 1 {
            return Ok(false);
        }
        self.tree.advance_frame(id)?;
        self.schedule(id, None);
        Ok(true)
    }

    /// Ask for part of `id` to be repainted, in widget coordinates.
    pub fn request_update(&mut self, id: WidgetId, rect: Option<Rect>) -> Result<(), EngineError> {
        if !self.tree.contains(id) {
            return Err(TreeError::WidgetNotFound(id).into());
        }
        self.schedule(id, rect);
        Ok(())
    }

    // ==================== Painting ====================

    /// Compute the dirty regions of `window` and paint them through `backend`.
    pub fn paint_window<B>(&mut self, window: WidgetId, backend: &mut B) -> Result<PaintReport, EngineError>
    where
        B: RenderBackend<WidgetId>,
    {
        let state = self
            .windows
            .get_mut(&window)
            .ok_or(EngineError::WindowNotFound(window))?;
        state.compute(&self.tree, &self.config.compositor);
        let report = state.paint(&self.tree, &mut self.styles, backend, &self.config.retry)?;
        Ok(report)
    }

    /// Paint every window with pending work.
    pub fn paint_all<B>(&mut self, backend: &mut B) -> Result<Vec<(WidgetId, PaintReport)>, EngineError>
    where
        B: RenderBackend<WidgetId>,
    {
        let pending: Vec<WidgetId> = self
            .windows
            .iter()
            .filter(|(_, state)| !state.is_clean())
            .map(|(&id, _)| id)
            .collect();
        let mut reports = Vec::with_capacity(pending.len());
        for window in pending {
            reports.push((window, self.paint_window(window, backend)?));
        }
        Ok(reports)
    }

    fn schedule(&mut self, id: WidgetId, rect: Option<Rect>) {
        let Some(window) = self.tree.window_of(id) else {
            return;
        };
        if let Some(state) = self.windows.get_mut(&window) {
            state.request_update(id, rect);
        }
    }

    fn forget_in_window(&mut self, window: Option<WidgetId>, widgets: &[WidgetId]) {
        let Some(state) = window.and_then(|w| self.windows.get_mut(&w)) else {
            return;
        };
        for &id in widgets {
            state.forget_widget(id);
        }
    }
}

fn widget_node(tree: &WidgetTree, id: WidgetId) -> Result<WidgetRef<'_>, TreeError> {
    tree.widget_ref(id).ok_or(TreeError::WidgetNotFound(id))
}

fn widget_key(id: WidgetId) -> NodeKey {
    NodeKey::Widget(id.raw() as u64)
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("widgets", &self.tree.len())
            .field("windows", &self.windows.len())
            .field("rule_sets", &self.styles.rule_set_count())
            .finish()
    }
}
