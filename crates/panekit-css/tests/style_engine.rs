//! Cascade and cache behaviour of the style engine against a small tree

use panekit_common::StyleConfig;
use panekit_css::{Brush, Color, NodeKey, PseudoClass, PseudoMask, RenderRule, StyleEngine, StyleNode};

#[derive(Debug)]
struct TestNode {
    type_name: &'static str,
    object_name: &'static str,
    parent: Option<usize>,
    children: Vec<usize>,
    ignores_styles: bool,
}

#[derive(Debug, Default)]
struct TestTree {
    nodes: Vec<TestNode>,
}

impl TestTree {
    fn add(&mut self, parent: Option<usize>, type_name: &'static str, object_name: &'static str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TestNode {
            type_name,
            object_name,
            parent,
            children: Vec::new(),
            ignores_styles: false,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    fn reparent(&mut self, id: usize, new_parent: usize) {
        if let Some(old) = self.nodes[id].parent {
            self.nodes[old].children.retain(|&c| c != id);
        }
        self.nodes[id].parent = Some(new_parent);
        self.nodes[new_parent].children.push(id);
    }

    fn node(&self, id: usize) -> Node<'_> {
        Node { tree: self, id }
    }
}

#[derive(Debug, Clone, Copy)]
struct Node<'a> {
    tree: &'a TestTree,
    id: usize,
}

impl StyleNode for Node<'_> {
    fn node_key(&self) -> NodeKey {
        NodeKey::Widget(self.id as u64)
    }

    fn object_name(&self) -> &str {
        self.tree.nodes[self.id].object_name
    }

    fn type_name(&self) -> &str {
        self.tree.nodes[self.id].type_name
    }

    fn parent(&self) -> Option<Self> {
        self.tree.nodes[self.id].parent.map(|id| self.tree.node(id))
    }

    fn children(&self) -> Vec<Self> {
        self.tree.nodes[self.id]
            .children
            .iter()
            .map(|&id| self.tree.node(id))
            .collect()
    }

    fn ignores_style_sheets(&self) -> bool {
        self.tree.nodes[self.id].ignores_styles
    }
}

fn text_color(rule: &RenderRule) -> Color {
    rule.data()
        .and_then(|d| d.text.as_ref())
        .map(|t| t.color)
        .expect("rule with text")
}

fn hover() -> PseudoMask {
    PseudoClass::Hover.into()
}

#[test]
fn test_specificity_beats_source_order() {
    let mut tree = TestTree::default();
    let window = tree.add(None, "Window", "");
    let ok = tree.add(Some(window), "Button", "ok");
    let plain = tree.add(Some(window), "Button", "");
    let label = tree.add(Some(window), "Label", "");

    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet(
        "#ok { color: #000001; }
         .Button:hover { color: #000002; }
         .Button { color: #000003; }
         * { color: #000004; }",
    );

    let rule = engine.get_render_rule(&tree.node(ok), hover());
    assert_eq!(text_color(&rule), Color(0x000001FF));
    let rule = engine.get_render_rule(&tree.node(plain), hover());
    assert_eq!(text_color(&rule), Color(0x000002FF));
    let rule = engine.get_render_rule(&tree.node(plain), PseudoMask::EMPTY);
    assert_eq!(text_color(&rule), Color(0x000003FF));
    let rule = engine.get_render_rule(&tree.node(label), PseudoMask::EMPTY);
    assert_eq!(text_color(&rule), Color(0x000004FF));
}

#[test]
fn test_later_rule_wins_on_equal_specificity() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Button { color: #000001; } Button { color: #000002; }");
    let rule = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    assert_eq!(text_color(&rule), Color(0x000002FF));
}

#[test]
fn test_nearer_sheet_wins_on_equal_specificity_and_order() {
    let mut tree = TestTree::default();
    let window = tree.add(None, "Window", "");
    let styled = tree.add(Some(window), "Button", "");
    let sibling = tree.add(Some(window), "Button", "");

    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Button { color: #000001; }");
    engine.set_node_style_sheet(&tree.node(window), "Button { color: #000002; }");
    engine.set_node_style_sheet(&tree.node(styled), "Button { color: #000003; }");

    let rule = engine.get_render_rule(&tree.node(styled), PseudoMask::EMPTY);
    assert_eq!(text_color(&rule), Color(0x000003FF));
    let rule = engine.get_render_rule(&tree.node(sibling), PseudoMask::EMPTY);
    assert_eq!(text_color(&rule), Color(0x000002FF));
}

#[test]
fn test_own_sheet_type_rule_outranks_app_id_rule() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "ok");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("#ok { color: #000001; }");
    engine.set_node_style_sheet(&tree.node(button), "* { color: #000002; }");
    let rule = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    assert_eq!(text_color(&rule), Color(0x000002FF));
}

#[test]
fn test_backgrounds_stack_while_colors_deduplicate() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "ok");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet(
        "#ok { background: url(top.png); color: #000002; }
         Button { background: #ff0000; color: #000001; }",
    );
    let rule = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    let data = rule.data().expect("valid rule");
    let brushes: Vec<&Brush> = data.backgrounds.iter().map(|l| &l.brush).collect();
    assert_eq!(
        brushes,
        vec![&Brush::Color(Color(0xFF0000FF)), &Brush::Image("top.png".into())]
    );
    assert_eq!(text_color(&rule), Color(0x000002FF));
}

#[test]
fn test_background_none_hides_lower_layers_unless_inherited() {
    let mut tree = TestTree::default();
    let plain = tree.add(None, "Button", "plain");
    let keep = tree.add(None, "Button", "keep");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet(
        "Button { background: #ff0000; }
         #plain, #keep { background: none; }
         #keep { -inherit-background: true; }",
    );
    let rule = engine.get_render_rule(&tree.node(plain), PseudoMask::EMPTY);
    assert!(rule.data().expect("valid rule").backgrounds.is_empty());
    let rule = engine.get_render_rule(&tree.node(keep), PseudoMask::EMPTY);
    assert_eq!(rule.data().expect("valid rule").backgrounds.len(), 1);
}

#[test]
fn test_rule_with_several_matching_alternatives_applies_once() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Button, Button:hover { background: #ff0000; }");
    let rule = engine.get_render_rule(&tree.node(button), hover());
    assert_eq!(rule.data().expect("valid rule").backgrounds.len(), 1);
}

#[test]
fn test_unused_pseudo_bits_alias_to_the_same_rule() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Button { color: #000001; } Button:hover { color: #000002; }");
    let node = tree.node(button);

    let hover_focus = hover() | PseudoClass::Focus;
    let first = engine.get_render_rule(&node, hover_focus);
    let second = engine.get_render_rule(&node, hover());
    assert_eq!(first, second);
    assert_eq!(text_color(&first), Color(0x000002FF));

    // Asking for the narrow mask first reuses it for the wider one.
    let checked_hover = hover() | PseudoClass::Checked;
    let before = engine.stats().aliased;
    assert_eq!(engine.get_render_rule(&node, checked_hover), second);
    assert_eq!(engine.stats().aliased, before + 1);

    let focus = engine.get_render_rule(&node, PseudoClass::Focus.into());
    let normal = engine.get_render_rule(&node, PseudoMask::EMPTY);
    assert_eq!(focus, normal);
    assert_ne!(normal, second);
}

#[test]
fn test_aliasing_can_be_disabled() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "");
    let config = StyleConfig {
        alias_pseudo_states: false,
        ..StyleConfig::default()
    };
    let mut engine = StyleEngine::new(config);
    engine.set_app_style_sheet("Button:hover { color: #000002; }");
    let node = tree.node(button);
    let wide = engine.get_render_rule(&node, hover() | PseudoClass::Focus);
    let narrow = engine.get_render_rule(&node, hover());
    assert_ne!(wide, narrow);
    assert_eq!(text_color(&wide), text_color(&narrow));
}

#[test]
fn test_equivalent_nodes_share_one_rule() {
    let mut tree = TestTree::default();
    let panel = tree.add(None, "Panel", "");
    let a = tree.add(Some(panel), "Button", "");
    let b = tree.add(Some(panel), "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Panel Button { background: #ffffff; }");

    let first = engine.get_render_rule(&tree.node(a), PseudoMask::EMPTY);
    let second = engine.get_render_rule(&tree.node(b), PseudoMask::EMPTY);
    assert!(first.is_valid());
    assert_eq!(first, second);
    assert_eq!(engine.stats().shared_hits, 1);
    assert_eq!(engine.stats().built, 1);
    assert_eq!(engine.rule_set_count(), 1);
    assert_eq!(first.share_count(), 3);
}

#[test]
fn test_repeated_queries_hit_the_node_cache() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Button { width: 10px; }");
    let first = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    let second = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    assert_eq!(first, second);
    assert_eq!(engine.stats().node_hits, 1);
    assert_eq!(engine.stats().matched, 1);
}

#[test]
fn test_no_match_gives_invalid_rule() {
    let mut tree = TestTree::default();
    let label = tree.add(None, "Label", "");
    let opted_out = tree.add(None, "Button", "");
    tree.nodes[opted_out].ignores_styles = true;
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Button { width: 10px; }");
    assert!(!engine.get_render_rule(&tree.node(label), PseudoMask::EMPTY).is_valid());
    assert!(!engine.get_render_rule(&tree.node(opted_out), PseudoMask::EMPTY).is_valid());
    assert_eq!(
        engine.get_render_rule(&tree.node(label), hover()),
        RenderRule::invalid()
    );
}

#[test]
fn test_ancestor_sheet_change_recomputes_descendants() {
    let mut tree = TestTree::default();
    let window = tree.add(None, "Window", "");
    let panel = tree.add(Some(window), "Panel", "");
    let button = tree.add(Some(panel), "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Button { color: #000001; }");

    let stale = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    assert!(engine.is_node_cached(NodeKey::Widget(button as u64)));

    engine.set_node_style_sheet(&tree.node(window), "Button { color: #000002; }");
    assert!(!engine.is_node_cached(NodeKey::Widget(button as u64)));
    let fresh = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    assert_ne!(fresh, stale);
    assert_eq!(text_color(&fresh), Color(0x000002FF));

    // Clearing the sheet rematches even though the result equals the old one.
    let matched = engine.stats().matched;
    engine.clear_node_style_sheet(&tree.node(window));
    let again = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    assert_eq!(engine.stats().matched, matched + 1);
    assert_eq!(text_color(&again), Color(0x000001FF));
}

#[test]
fn test_reparenting_changes_descendant_matches() {
    let mut tree = TestTree::default();
    let root = tree.add(None, "Window", "");
    let toolbar = tree.add(Some(root), "Toolbar", "");
    let panel = tree.add(Some(root), "Panel", "");
    let button = tree.add(Some(panel), "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Toolbar > Button { width: 16px; }");

    assert!(!engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY).is_valid());
    tree.reparent(button, toolbar);
    engine.invalidate_subtree(&tree.node(button));
    let rule = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    assert_eq!(rule.data().and_then(|d| d.size.width), Some(16));
}

#[test]
fn test_child_and_descendant_combinators() {
    let mut tree = TestTree::default();
    let a = tree.add(None, "A", "");
    let c = tree.add(Some(a), "C", "");
    let b = tree.add(Some(c), "B", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet(".A > .B { width: 1px; }");
    assert!(!engine.get_render_rule(&tree.node(b), PseudoMask::EMPTY).is_valid());
    engine.set_app_style_sheet(".A .B { width: 1px; }");
    assert!(engine.get_render_rule(&tree.node(b), PseudoMask::EMPTY).is_valid());
}

#[test]
fn test_app_sheet_replacement_clears_all_caches() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Button { width: 1px; }");
    let old = engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY);
    engine.set_app_style_sheet("Button { width: 1px; }");
    assert_eq!(engine.rule_set_count(), 0);
    assert!(!engine.is_node_cached(NodeKey::Widget(button as u64)));
    assert_ne!(engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY), old);
    assert_eq!(engine.app_style_sheet_text(), Some("Button { width: 1px; }"));
}

#[test]
fn test_query_nodes_are_released_individually() {
    let mut engine = StyleEngine::default();
    engine.set_app_style_sheet("Dialog Button { width: 3px; }");
    let dialog = engine.create_query_node("Dialog", "", None);
    let first = engine.create_query_node("Button", "", Some(&dialog));
    let second = engine.create_query_node("Button", "", Some(&dialog));
    assert_ne!(first.node_key(), second.node_key());

    let a = engine.get_render_rule(&first, PseudoMask::EMPTY);
    let b = engine.get_render_rule(&second, PseudoMask::EMPTY);
    assert_eq!(a, b);

    engine.remove_query_node(&first);
    assert!(!engine.is_node_cached(first.node_key()));
    assert!(engine.is_node_cached(second.node_key()));
    assert_eq!(engine.get_render_rule(&second, PseudoMask::EMPTY), b);
}

#[test]
fn test_destroyed_node_loses_its_sheet() {
    let mut tree = TestTree::default();
    let button = tree.add(None, "Button", "");
    let mut engine = StyleEngine::default();
    engine.set_node_style_sheet(&tree.node(button), "width: 4px;");
    let key = NodeKey::Widget(button as u64);
    assert_eq!(engine.node_style_sheet_text(key), Some("width: 4px;"));
    assert!(engine.get_render_rule(&tree.node(button), PseudoMask::EMPTY).is_valid());

    engine.node_destroyed(key);
    assert_eq!(engine.node_style_sheet_text(key), None);
    assert_eq!(engine.rule_set_count(), 0);
}
