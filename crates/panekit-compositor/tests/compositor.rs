//! Dirty-region and paint-walk tests against a hand-built widget tree

use panekit_common::{CompositorConfig, PaneKitError, Rect, Region, RetryConfig};
use panekit_compositor::{
    window_rect, CompositeTree, DrawCommand, DrawError, PaintTree, RenderBackend, WindowDirtyState,
};
use panekit_css::{NodeKey, PseudoMask, StyleEngine, StyleNode};

#[derive(Debug)]
struct TestWidget {
    type_name: &'static str,
    parent: Option<usize>,
    children: Vec<usize>,
    rect: Rect,
    opaque: bool,
    visible: bool,
    never_overlap: bool,
}

#[derive(Debug, Default)]
struct TestTree {
    widgets: Vec<TestWidget>,
}

impl TestTree {
    fn root(&mut self, rect: Rect) -> usize {
        self.add(None, "Window", rect, false)
    }

    fn add(&mut self, parent: Option<usize>, type_name: &'static str, rect: Rect, opaque: bool) -> usize {
        let id = self.widgets.len();
        self.widgets.push(TestWidget {
            type_name,
            parent,
            children: Vec::new(),
            rect,
            opaque,
            visible: true,
            never_overlap: false,
        });
        if let Some(parent) = parent {
            self.widgets[parent].children.push(id);
        }
        id
    }
}

impl CompositeTree for TestTree {
    type Id = usize;

    fn parent(&self, id: usize) -> Option<usize> {
        self.widgets[id].parent
    }

    fn children(&self, id: usize) -> Vec<usize> {
        self.widgets[id].children.clone()
    }

    fn geometry(&self, id: usize) -> Rect {
        self.widgets[id].rect
    }

    fn is_visible(&self, id: usize) -> bool {
        self.widgets[id].visible
    }

    fn is_opaque(&self, id: usize) -> bool {
        self.widgets[id].opaque
    }

    fn children_never_overlap(&self, id: usize) -> bool {
        self.widgets[id].never_overlap
    }
}

#[derive(Debug, Clone, Copy)]
struct Handle<'a> {
    tree: &'a TestTree,
    id: usize,
}

impl StyleNode for Handle<'_> {
    fn node_key(&self) -> NodeKey {
        NodeKey::Widget(self.id as u64)
    }

    fn object_name(&self) -> &str {
        ""
    }

    fn type_name(&self) -> &str {
        self.tree.widgets[self.id].type_name
    }

    fn parent(&self) -> Option<Self> {
        self.tree.widgets[self.id].parent.map(|id| Handle { tree: self.tree, id })
    }
}

impl PaintTree for TestTree {
    type Node<'a> = Handle<'a>;

    fn style_node(&self, id: usize) -> Handle<'_> {
        Handle { tree: self, id }
    }

    fn pseudo_state(&self, _id: usize) -> PseudoMask {
        PseudoMask::EMPTY
    }

    fn text(&self, id: usize) -> &str {
        self.widgets[id].type_name
    }

    fn frame_index(&self, id: usize) -> u32 {
        id as u32
    }
}

#[derive(Debug, Default)]
struct Recorder {
    passes: u32,
    recreated: u32,
    lose_device: u32,
    drawn: Vec<(usize, i64, bool)>,
}

impl RenderBackend<usize> for Recorder {
    fn begin_paint(&mut self, _dirty: &Region) -> Result<(), DrawError> {
        self.passes += 1;
        self.drawn.clear();
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand<'_, usize>) -> Result<(), DrawError> {
        if self.lose_device > 0 {
            self.lose_device -= 1;
            return Err(DrawError::DeviceLost);
        }
        assert_eq!(command.frame_index, command.widget as u32);
        self.drawn.push((command.widget, command.clip.area(), command.rule.is_valid()));
        Ok(())
    }

    fn end_paint(&mut self) -> Result<(), DrawError> {
        Ok(())
    }

    fn recreate_resources(&mut self) {
        self.recreated += 1;
    }
}

fn drawn_ids(recorder: &Recorder) -> Vec<usize> {
    recorder.drawn.iter().map(|d| d.0).collect()
}

/// P holds B (0,0,100,100) below an opaque A (0,0,50,50).
fn occlusion_tree(b_opaque: bool) -> (TestTree, usize, usize, usize) {
    let mut tree = TestTree::default();
    let p = tree.root(Rect::new(0, 0, 200, 200));
    let b = tree.add(Some(p), "B", Rect::new(0, 0, 100, 100), b_opaque);
    let a = tree.add(Some(p), "A", Rect::new(0, 0, 50, 50), true);
    (tree, p, b, a)
}

#[test]
fn test_opaque_sibling_above_is_subtracted() {
    let (tree, p, b, a) = occlusion_tree(false);
    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, Some(Rect::new(0, 0, 100, 100)));
    dirty.compute(&tree, &CompositorConfig::default());

    let region = dirty.passive_region(b).expect("B scheduled");
    assert_eq!(region.area(), 7500);
    assert_eq!(region.bounding_rect(), Rect::new(0, 0, 100, 100));
    assert!(!region.contains_point(10, 10));
    assert!(region.contains_point(75, 10));
    assert!(dirty.passive_region(a).is_none());
    assert!(dirty.is_subtree_dirty(p));

    // B is not opaque, so its parent shows through the same area.
    assert_eq!(dirty.passive_region(p).map(Region::area), Some(7500));
}

#[test]
fn test_opaque_widget_does_not_schedule_its_parent() {
    let (tree, p, b, _) = occlusion_tree(true);
    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, None);
    dirty.compute(&tree, &CompositorConfig::default());
    assert_eq!(dirty.passive_region(b).map(Region::area), Some(7500));
    assert!(dirty.passive_region(p).is_none());
}

#[test]
fn test_non_opaque_sibling_above_is_repainted_over_the_overlap() {
    let mut tree = TestTree::default();
    let p = tree.root(Rect::new(0, 0, 200, 200));
    let b = tree.add(Some(p), "B", Rect::new(0, 0, 100, 100), true);
    let glass = tree.add(Some(p), "Glass", Rect::new(50, 50, 100, 100), false);

    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, None);
    dirty.compute(&tree, &CompositorConfig::default());
    assert_eq!(dirty.passive_region(b).map(Region::area), Some(10_000));
    let overlap = dirty.passive_region(glass).expect("glass scheduled");
    assert_eq!(overlap.bounding_rect(), Rect::new(50, 50, 50, 50));
}

#[test]
fn test_non_overlapping_parent_skips_the_sibling_scan() {
    let (mut tree, p, b, _) = occlusion_tree(true);
    tree.widgets[p].never_overlap = true;

    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, None);
    dirty.compute(&tree, &CompositorConfig::default());
    assert_eq!(dirty.passive_region(b).map(Region::area), Some(10_000));

    let config = CompositorConfig {
        honor_non_overlap: false,
        ..CompositorConfig::default()
    };
    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, None);
    dirty.compute(&tree, &config);
    assert_eq!(dirty.passive_region(b).map(Region::area), Some(7500));
}

#[test]
fn test_behind_walk_stops_at_opaque_sibling() {
    let mut tree = TestTree::default();
    let p = tree.root(Rect::new(0, 0, 200, 200));
    let base = tree.add(Some(p), "Base", Rect::new(0, 0, 100, 100), true);
    let tint = tree.add(Some(p), "Tint", Rect::new(0, 0, 100, 100), false);
    let top = tree.add(Some(p), "Top", Rect::new(25, 25, 50, 50), false);

    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(top, None);
    dirty.compute(&tree, &CompositorConfig::default());

    let expected = Rect::new(25, 25, 50, 50);
    for id in [top, tint, base] {
        assert_eq!(dirty.passive_region(id).map(Region::bounding_rect), Some(expected));
    }
    assert!(dirty.passive_region(p).is_none());
}

#[test]
fn test_opaque_uncle_occludes_a_nested_change() {
    let mut tree = TestTree::default();
    let window = tree.root(Rect::new(0, 0, 200, 200));
    let panel = tree.add(Some(window), "Panel", Rect::new(10, 10, 100, 100), false);
    let icon = tree.add(Some(panel), "Icon", Rect::new(5, 5, 10, 10), false);
    let cover = tree.add(Some(window), "Cover", Rect::new(0, 0, 20, 20), true);

    let mut dirty = WindowDirtyState::new(window);
    dirty.request_update(icon, None);
    dirty.compute(&tree, &CompositorConfig::default());

    let region = dirty.passive_region(icon).expect("icon scheduled");
    assert_eq!(region.area(), 75);
    assert_eq!(region.bounding_rect(), Rect::new(15, 15, 10, 10));
    assert!(!region.contains_point(17, 17));
    assert!(region.contains_point(22, 22));

    // Both ancestors show through the icon, minus what the cover hides.
    assert_eq!(dirty.passive_region(panel).map(Region::area), Some(75));
    assert_eq!(dirty.passive_region(window).map(Region::area), Some(75));
    assert!(dirty.passive_region(cover).is_none());
}

#[test]
fn test_requests_are_clipped_to_ancestors_and_mapped_to_window() {
    let mut tree = TestTree::default();
    let p = tree.root(Rect::new(300, 300, 200, 200));
    let panel = tree.add(Some(p), "Panel", Rect::new(10, 20, 100, 100), true);
    let icon = tree.add(Some(panel), "Icon", Rect::new(5, 5, 10, 10), true);
    let outside = tree.add(Some(panel), "Outside", Rect::new(150, 0, 10, 10), true);

    assert_eq!(window_rect(&tree, icon), Rect::new(15, 25, 10, 10));

    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(icon, None);
    dirty.request_update(outside, None);
    dirty.compute(&tree, &CompositorConfig::default());
    assert_eq!(
        dirty.passive_region(icon).map(Region::bounding_rect),
        Some(Rect::new(15, 25, 10, 10))
    );
    assert!(dirty.passive_region(outside).is_none());
    assert!(dirty.is_subtree_dirty(panel));
    assert!(dirty.is_subtree_dirty(p));
}

#[test]
fn test_hidden_widgets_and_foreign_widgets_are_ignored() {
    let (mut tree, p, b, _) = occlusion_tree(true);
    let other_root = tree.root(Rect::new(0, 0, 50, 50));
    tree.widgets[b].visible = false;

    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, None);
    dirty.request_update(other_root, None);
    dirty.compute(&tree, &CompositorConfig::default());
    assert!(dirty.is_clean());
}

#[test]
fn test_repeated_requests_coalesce() {
    let (tree, p, b, _) = occlusion_tree(true);
    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, Some(Rect::new(60, 0, 10, 10)));
    dirty.request_update(b, Some(Rect::new(80, 80, 10, 10)));
    assert_eq!(dirty.pending_requests(), 1);
    dirty.compute(&tree, &CompositorConfig::default());
    assert_eq!(
        dirty.passive_region(b).map(Region::bounding_rect),
        Some(Rect::new(60, 0, 30, 90))
    );
    assert_eq!(dirty.pending_requests(), 0);
}

#[test]
fn test_paint_draws_scheduled_widgets_only() {
    let (tree, p, b, _) = occlusion_tree(false);
    let mut styles = StyleEngine::default();
    styles.set_app_style_sheet("B { background: #ffffff; }");

    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, None);
    dirty.compute(&tree, &CompositorConfig::default());

    let mut recorder = Recorder::default();
    let report = dirty
        .paint(&tree, &mut styles, &mut recorder, &RetryConfig::default())
        .expect("paint");
    assert_eq!(report.widgets_drawn, 2);
    assert_eq!(report.dirty_bounds, Rect::new(0, 0, 100, 100));
    assert_eq!(recorder.drawn, vec![(p, 7500, false), (b, 7500, true)]);
    assert!(dirty.is_clean());
}

#[test]
fn test_dirty_subtree_is_descended_without_drawing_ancestors() {
    let mut tree = TestTree::default();
    let p = tree.root(Rect::new(0, 0, 200, 200));
    let panel = tree.add(Some(p), "Panel", Rect::new(10, 10, 100, 100), false);
    let icon = tree.add(Some(panel), "Icon", Rect::new(5, 5, 10, 10), true);

    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(icon, None);
    dirty.compute(&tree, &CompositorConfig::default());

    let mut recorder = Recorder::default();
    dirty
        .paint(&tree, &mut StyleEngine::default(), &mut recorder, &RetryConfig::default())
        .expect("paint");
    assert_eq!(drawn_ids(&recorder), vec![icon]);
}

#[test]
fn test_device_loss_recreates_and_repaints() {
    let (tree, p, b, _) = occlusion_tree(true);
    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, None);
    dirty.compute(&tree, &CompositorConfig::default());

    let mut recorder = Recorder {
        lose_device: 1,
        ..Recorder::default()
    };
    let report = dirty
        .paint(&tree, &mut StyleEngine::default(), &mut recorder, &RetryConfig::default())
        .expect("paint after recreation");
    assert_eq!(recorder.passes, 2);
    assert_eq!(recorder.recreated, 1);
    assert_eq!(report.widgets_drawn, 1);
    assert_eq!(drawn_ids(&recorder), vec![b]);
}

#[test]
fn test_persistent_device_loss_keeps_the_dirty_set() {
    let (tree, p, b, _) = occlusion_tree(true);
    let mut dirty = WindowDirtyState::new(p);
    dirty.request_update(b, None);
    dirty.compute(&tree, &CompositorConfig::default());

    let mut recorder = Recorder {
        lose_device: u32::MAX,
        ..Recorder::default()
    };
    let result = dirty.paint(
        &tree,
        &mut StyleEngine::default(),
        &mut recorder,
        &RetryConfig { max_attempts: 2 },
    );
    assert!(matches!(result, Err(PaneKitError::DeviceLost)));
    assert_eq!(recorder.passes, 2);
    assert!(dirty.passive_region(b).is_some());
}
