//! The widget arena and its style/compositor views.

use panekit_common::Rect;
use panekit_compositor::{CompositeTree, PaintTree};
use panekit_css::{NodeKey, PseudoMask, StyleNode};
use tracing::{debug, trace};

use crate::widget::Widget;
use crate::{TreeError, WidgetId};

/// Owns every widget of every window.
///
/// Slots of destroyed widgets stay empty; ids are never handed out twice.
#[derive(Debug, Default)]
pub struct WidgetTree {
    widgets: Vec<Option<Widget>>,
    live: usize,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.raw()).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: WidgetId) -> Result<&mut Widget, TreeError> {
        self.widgets
            .get_mut(id.raw())
            .and_then(Option::as_mut)
            .ok_or(TreeError::WidgetNotFound(id))
    }

    fn require(&self, id: WidgetId) -> Result<&Widget, TreeError> {
        self.get(id).ok_or(TreeError::WidgetNotFound(id))
    }

    /// Add `widget` as the topmost child of `parent`, or as a new window.
    pub fn insert(&mut self, parent: Option<WidgetId>, widget: Widget) -> Result<WidgetId, TreeError> {
        let Some(parent) = parent else {
            return Ok(self.insert_window(widget));
        };
        self.require(parent)?;
        let id = self.push(widget, Some(parent));
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Add `widget` as a new top-level window.
    pub fn insert_window(&mut self, widget: Widget) -> WidgetId {
        self.push(widget, None)
    }

    fn push(&mut self, mut widget: Widget, parent: Option<WidgetId>) -> WidgetId {
        let id = WidgetId::new(self.widgets.len());
        widget.parent = parent;
        widget.children.clear();
        trace!(%id, type_name = %widget.type_name, parent = ?parent, "Widget inserted");
        self.widgets.push(Some(widget));
        self.live += 1;
        id
    }

    /// Move `id` to become the topmost child of `new_parent`, or a window.
    pub fn reparent(&mut self, id: WidgetId, new_parent: Option<WidgetId>) -> Result<(), TreeError> {
        self.require(id)?;
        if let Some(parent) = new_parent {
            self.require(parent)?;
            if self.is_ancestor_or_self(id, parent) {
                return Err(TreeError::Cycle { widget: id, parent });
            }
        }

        if let Some(old) = self.require(id)?.parent {
            self.get_mut(old)?.children.retain(|&c| c != id);
        }
        self.get_mut(id)?.parent = new_parent;
        if let Some(parent) = new_parent {
            self.get_mut(parent)?.children.push(id);
        }
        debug!(%id, parent = ?new_parent, "Widget reparented");
        Ok(())
    }

    /// Remove `id` and its descendants. Returns the removed ids, `id` first.
    pub fn remove(&mut self, id: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        let removed = self.subtree(id)?;
        if let Some(parent) = self.require(id)?.parent {
            self.get_mut(parent)?.children.retain(|&c| c != id);
        }
        for &gone in &removed {
            if let Some(slot) = self.widgets.get_mut(gone.raw()) {
                *slot = None;
            }
        }
        self.live -= removed.len();
        debug!(%id, count = removed.len(), "Widget subtree removed");
        Ok(removed)
    }

    /// `id` and all its descendants in pre-order.
    pub fn subtree(&self, id: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        self.require(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(widget) = self.get(current) {
                stack.extend(widget.children.iter().rev().copied());
            }
        }
        Ok(out)
    }

    /// True when `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(widget) = current {
            if widget == ancestor {
                return true;
            }
            current = self.get(widget).and_then(|w| w.parent);
        }
        false
    }

    /// The top-level window containing `id`.
    pub fn window_of(&self, id: WidgetId) -> Option<WidgetId> {
        let mut current = self.get(id).map(|_| id)?;
        while let Some(parent) = self.get(current).and_then(|w| w.parent) {
            current = parent;
        }
        Some(current)
    }

    /// Every top-level window, in creation order.
    pub fn windows(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.widgets.iter().enumerate().filter_map(|(idx, slot)| match slot {
            Some(widget) if widget.parent.is_none() => Some(WidgetId::new(idx)),
            _ => None,
        })
    }

    pub fn widget_ref(&self, id: WidgetId) -> Option<WidgetRef<'_>> {
        self.get(id).map(|_| WidgetRef { tree: self, id })
    }

    pub fn set_geometry(&mut self, id: WidgetId, geometry: Rect) -> Result<(), TreeError> {
        self.get_mut(id)?.geometry = geometry;
        Ok(())
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<(), TreeError> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_opaque(&mut self, id: WidgetId, opaque: bool) -> Result<(), TreeError> {
        self.get_mut(id)?.opaque = opaque;
        Ok(())
    }

    pub fn set_children_never_overlap(&mut self, id: WidgetId, flag: bool) -> Result<(), TreeError> {
        self.get_mut(id)?.children_never_overlap = flag;
        Ok(())
    }

    pub fn set_ignores_style_sheets(&mut self, id: WidgetId, flag: bool) -> Result<(), TreeError> {
        self.get_mut(id)?.ignores_style_sheets = flag;
        Ok(())
    }

    pub fn set_object_name(&mut self, id: WidgetId, name: impl Into<String>) -> Result<(), TreeError> {
        self.get_mut(id)?.object_name = name.into();
        Ok(())
    }

    /// Returns the previous mask.
    pub fn set_pseudo(&mut self, id: WidgetId, pseudo: PseudoMask) -> Result<PseudoMask, TreeError> {
        let widget = self.get_mut(id)?;
        Ok(std::mem::replace(&mut widget.pseudo, pseudo))
    }

    pub fn set_text(&mut self, id: WidgetId, text: impl Into<String>) -> Result<(), TreeError> {
        self.get_mut(id)?.text = text.into();
        Ok(())
    }

    /// Step the animation frame counter. Returns the new value.
    pub fn advance_frame(&mut self, id: WidgetId) -> Result<u32, TreeError> {
        let widget = self.get_mut(id)?;
        widget.frame = widget.frame.wrapping_add(1);
        Ok(widget.frame)
    }

    /// Move `id` to the top of its siblings' z-order.
    pub fn raise(&mut self, id: WidgetId) -> Result<(), TreeError> {
        self.restack(id, true)
    }

    /// Move `id` to the bottom of its siblings' z-order.
    pub fn lower(&mut self, id: WidgetId) -> Result<(), TreeError> {
        self.restack(id, false)
    }

    fn restack(&mut self, id: WidgetId, top: bool) -> Result<(), TreeError> {
        let parent = self
            .require(id)?
            .parent
            .ok_or_else(|| TreeError::InvalidOperation(format!("{id} is a window and has no siblings")))?;
        let children = &mut self.get_mut(parent)?.children;
        children.retain(|&c| c != id);
        if top {
            children.push(id);
        } else {
            children.insert(0, id);
        }
        Ok(())
    }
}

/// Borrowed handle to one widget, used as the style engine's node.
#[derive(Debug, Clone, Copy)]
pub struct WidgetRef<'a> {
    tree: &'a WidgetTree,
    id: WidgetId,
}

impl<'a> WidgetRef<'a> {
    pub fn id(&self) -> WidgetId {
        self.id
    }

    fn widget(&self) -> Option<&'a Widget> {
        self.tree.get(self.id)
    }
}

impl StyleNode for WidgetRef<'_> {
    fn node_key(&self) -> NodeKey {
        NodeKey::Widget(self.id.raw() as u64)
    }

    fn object_name(&self) -> &str {
        self.widget().map_or("", |w| w.object_name.as_str())
    }

    fn type_name(&self) -> &str {
        self.widget().map_or("", |w| w.type_name.as_str())
    }

    fn parent(&self) -> Option<Self> {
        let parent = self.widget()?.parent?;
        self.tree.widget_ref(parent)
    }

    fn children(&self) -> Vec<Self> {
        self.widget()
            .map(|w| w.children.iter().filter_map(|&c| self.tree.widget_ref(c)).collect())
            .unwrap_or_default()
    }

    fn ignores_style_sheets(&self) -> bool {
        self.widget().is_some_and(|w| w.ignores_style_sheets)
    }
}

impl CompositeTree for WidgetTree {
    type Id = WidgetId;

    fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.get(id)?.parent
    }

    fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.get(id).map(|w| w.children.clone()).unwrap_or_default()
    }

    fn geometry(&self, id: WidgetId) -> Rect {
        self.get(id).map(|w| w.geometry).unwrap_or_default()
    }

    fn is_visible(&self, id: WidgetId) -> bool {
        self.get(id).is_some_and(|w| w.visible)
    }

    fn is_opaque(&self, id: WidgetId) -> bool {
        self.get(id).is_some_and(|w| w.opaque)
    }

    fn children_never_overlap(&self, id: WidgetId) -> bool {
        self.get(id).is_some_and(|w| w.children_never_overlap)
    }
}

impl PaintTree for WidgetTree {
    type Node<'a> = WidgetRef<'a>;

    fn style_node(&self, id: WidgetId) -> WidgetRef<'_> {
        WidgetRef { tree: self, id }
    }

    fn pseudo_state(&self, id: WidgetId) -> PseudoMask {
        self.get(id).map(|w| w.pseudo).unwrap_or(PseudoMask::EMPTY)
    }

    fn text(&self, id: WidgetId) -> &str {
        self.get(id).map_or("", |w| w.text.as_str())
    }

    fn frame_index(&self, id: WidgetId) -> u32 {
        self.get(id).map_or(0, |w| w.frame)
    }
}
