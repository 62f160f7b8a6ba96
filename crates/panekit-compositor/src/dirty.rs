//! Per-window dirty-region bookkeeping.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use panekit_common::{CompositorConfig, Rect, Region};
use tracing::{debug, trace};

use crate::tree::CompositeTree;

/// Update requests and the resulting repaint set of one top-level window.
///
/// Requests are coalesced per widget until [`compute`](Self::compute) turns
/// them into passive regions: for each widget, the window-coordinate area
/// that must be repainted, including widgets that never asked but sit above
/// or below a changed non-opaque area.
#[derive(Debug)]
pub struct WindowDirtyState<Id> {
    root: Id,
    requests: HashMap<Id, Option<Rect>>,
    request_order: Vec<Id>,
    passive: HashMap<Id, Region>,
    dirty_subtree: HashSet<Id>,
}

impl<Id: Copy + Eq + Hash + std::fmt::Debug> WindowDirtyState<Id> {
    pub fn new(root: Id) -> Self {
        Self {
            root,
            requests: HashMap::new(),
            request_order: Vec::new(),
            passive: HashMap::new(),
            dirty_subtree: HashSet::new(),
        }
    }

    pub fn root(&self) -> Id {
        self.root
    }

    /// Ask for part of a widget to be repainted, in widget-local coordinates.
    /// `None` means the whole widget. Repeated requests merge into their
    /// bounding rectangle.
    pub fn request_update(&mut self, id: Id, rect: Option<Rect>) {
        match self.requests.get_mut(&id) {
            Some(slot) => {
                *slot = match (*slot, rect) {
                    (Some(a), Some(b)) => Some(a.united(&b)),
                    _ => None,
                };
            }
            None => {
                self.requests.insert(id, rect);
                self.request_order.push(id);
            }
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// True when nothing is waiting to be painted.
    pub fn is_clean(&self) -> bool {
        self.requests.is_empty() && self.passive.is_empty()
    }

    /// Area of `id` to repaint, in window coordinates.
    pub fn passive_region(&self, id: Id) -> Option<&Region> {
        self.passive.get(&id)
    }

    pub fn passive_widgets(&self) -> impl Iterator<Item = (&Id, &Region)> {
        self.passive.iter()
    }

    /// Some descendant of `id` has a passive region.
    pub fn is_subtree_dirty(&self, id: Id) -> bool {
        self.dirty_subtree.contains(&id)
    }

    /// Union of every passive region.
    pub fn dirty_region(&self) -> Region {
        let mut region = Region::new();
        for passive in self.passive.values() {
            region.union_region(passive);
        }
        region
    }

    /// Drop a widget that left the window or was destroyed.
    pub fn forget_widget(&mut self, id: Id) {
        if self.requests.remove(&id).is_some() {
            self.request_order.retain(|&w| w != id);
        }
        self.passive.remove(&id);
        self.dirty_subtree.remove(&id);
    }

    /// Forget the passive set after a successful paint.
    pub fn clear(&mut self) {
        self.passive.clear();
        self.dirty_subtree.clear();
    }

    /// Turn pending requests into passive regions.
    pub fn compute<T>(&mut self, tree: &T, config: &CompositorConfig)
    where
        T: CompositeTree<Id = Id>,
    {
        let order = std::mem::take(&mut self.request_order);
        let mut requests = std::mem::take(&mut self.requests);
        for id in order {
            if let Some(rect) = requests.remove(&id) {
                self.process_request(tree, id, rect, config);
            }
        }
        debug!(
            widgets = self.passive.len(),
            subtrees = self.dirty_subtree.len(),
            "Dirty regions computed"
        );
    }

    fn process_request<T>(&mut self, tree: &T, id: Id, rect: Option<Rect>, config: &CompositorConfig)
    where
        T: CompositeTree<Id = Id>,
    {
        let chain = ancestor_chain(tree, id);
        if chain.last() != Some(&self.root) {
            debug!(widget = ?id, "Update request for a widget outside this window");
            return;
        }
        if chain.iter().any(|&w| !tree.is_visible(w)) {
            trace!(widget = ?id, "Update request for a hidden widget");
            return;
        }
        let origins = window_origins(tree, &chain);

        let geometry = tree.geometry(id);
        let bounds = Rect::new(0, 0, geometry.width, geometry.height);
        let local = rect.map_or(bounds, |r| r.intersect(&bounds));
        if local.is_empty() {
            return;
        }

        // Walk up to the root, clipping to every ancestor and removing what
        // opaque siblings above cover. Non-opaque siblings above see the
        // change through themselves and are repainted too.
        let mut region = Region::from_rect(local);
        let mut overlapped: Vec<(Id, Region)> = Vec::new();
        for level in 0..chain.len() - 1 {
            let current = chain[level];
            let parent = chain[level + 1];
            let offset = tree.geometry(current);
            region.translate(offset.x, offset.y);
            let parent_size = tree.geometry(parent);
            region.intersect_rect(&Rect::new(0, 0, parent_size.width, parent_size.height));
            if region.is_empty() {
                trace!(widget = ?id, clipped_by = ?parent, "Update clipped away");
                return;
            }

            if config.honor_non_overlap && tree.children_never_overlap(parent) {
                continue;
            }
            let siblings = tree.children(parent);
            let Some(position) = siblings.iter().position(|&s| s == current) else {
                continue;
            };
            let above = &siblings[position + 1..];

            for &sibling in above {
                if tree.is_visible(sibling) && tree.is_opaque(sibling) {
                    region.subtract_rect(&tree.geometry(sibling));
                }
            }
            if region.is_empty() {
                trace!(widget = ?id, "Update fully occluded");
                return;
            }

            let (ox, oy) = origins[level + 1];
            for &sibling in above {
                if !tree.is_visible(sibling) || tree.is_opaque(sibling) {
                    continue;
                }
                let mut overlap = region.intersected_with_rect(&tree.geometry(sibling));
                if !overlap.is_empty() {
                    overlap.translate(ox, oy);
                    overlapped.push((sibling, overlap));
                }
            }
        }

        // `region` is in window coordinates now.
        self.add_passive(tree, id, &region, config);
        for (sibling, mut overlap) in overlapped {
            overlap.intersect_region(&region);
            if !overlap.is_empty() {
                self.add_passive(tree, sibling, &overlap, config);
            }
        }

        if !tree.is_opaque(id) {
            self.add_behind(tree, &chain, &origins, region, config);
        }
    }

    /// Schedule whatever shows through the non-opaque widget `chain[0]`:
    /// lower siblings (topmost first) and the parent, level by level, until
    /// an opaque widget covers the rest.
    fn add_behind<T>(
        &mut self,
        tree: &T,
        chain: &[Id],
        origins: &[(i32, i32)],
        mut behind: Region,
        config: &CompositorConfig,
    ) where
        T: CompositeTree<Id = Id>,
    {
        for level in 0..chain.len() - 1 {
            let current = chain[level];
            let parent = chain[level + 1];
            let (ox, oy) = origins[level + 1];

            if !(config.honor_non_overlap && tree.children_never_overlap(parent)) {
                let siblings = tree.children(parent);
                let position = siblings.iter().position(|&s| s == current).unwrap_or(0);
                for &sibling in siblings[..position].iter().rev() {
                    if !tree.is_visible(sibling) {
                        continue;
                    }
                    let rect = tree.geometry(sibling).translated(ox, oy);
                    let overlap = behind.intersected_with_rect(&rect);
                    if overlap.is_empty() {
                        continue;
                    }
                    self.add_passive(tree, sibling, &overlap, config);
                    if tree.is_opaque(sibling) {
                        behind.subtract_rect(&rect);
                        if behind.is_empty() {
                            return;
                        }
                    }
                }
            }

            self.add_passive(tree, parent, &behind, config);
            if tree.is_opaque(parent) {
                return;
            }
        }
    }

    fn add_passive<T>(&mut self, tree: &T, id: Id, region: &Region, config: &CompositorConfig)
    where
        T: CompositeTree<Id = Id>,
    {
        let entry = self.passive.entry(id).or_default();
        entry.union_region(region);
        entry.simplify(config.max_region_rects);

        let mut ancestor = tree.parent(id);
        while let Some(current) = ancestor {
            if !self.dirty_subtree.insert(current) {
                break;
            }
            ancestor = tree.parent(current);
        }
    }
}

/// `id` followed by its ancestors up to the topmost.
fn ancestor_chain<T: CompositeTree>(tree: &T, id: T::Id) -> Vec<T::Id> {
    let mut chain = vec![id];
    let mut current = tree.parent(id);
    while let Some(parent) = current {
        chain.push(parent);
        current = tree.parent(parent);
    }
    chain
}

/// Window position of each chain entry's top-left corner. The topmost entry
/// is the window itself, at the origin.
fn window_origins<T: CompositeTree>(tree: &T, chain: &[T::Id]) -> Vec<(i32, i32)> {
    let mut origins = vec![(0, 0); chain.len()];
    for idx in (0..chain.len().saturating_sub(1)).rev() {
        let (px, py) = origins[idx + 1];
        let geometry = tree.geometry(chain[idx]);
        origins[idx] = (px + geometry.x, py + geometry.y);
    }
    origins
}

/// Window rectangle of `id`.
pub fn window_rect<T: CompositeTree>(tree: &T, id: T::Id) -> Rect {
    let chain = ancestor_chain(tree, id);
    let (x, y) = window_origins(tree, &chain)[0];
    let geometry = tree.geometry(id);
    Rect::new(x, y, geometry.width, geometry.height)
}
