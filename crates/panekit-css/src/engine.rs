//! The style engine: stylesheets, matching and the render-rule caches.
//!
//! Lookups go through three maps:
//!
//! 1. node → matched rule vector (selector matching is the expensive part)
//! 2. rule-set key → pseudo mask → [`RenderRule`], shared by every node that
//!    matched the same rules
//! 3. node → rule-set key, the fast path into map 2
//!
//! Entries are erased, never patched, when a stylesheet or the tree changes.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use panekit_common::StyleConfig;
use panekit_cssparser::PseudoMask;
use tracing::{debug, trace};

use crate::cascade::{applicable_rules, CascadeWeight, DeclarationMerge, MatchedStyleRule, RuleRef, RuleSetKey};
use crate::matcher::matches;
use crate::node::{NodeKey, StyleNode};
use crate::query::QueryNode;
use crate::render_rule::{RenderRule, RenderRuleData};
use crate::stylesheet::{SheetId, StyleSheet};

type PseudoMap = HashMap<PseudoMask, RenderRule>;

/// Cache counters, mostly for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleStats {
    /// Answered from the node's own entry.
    pub node_hits: u64,
    /// Answered from another node's entry with the same matched rules.
    pub shared_hits: u64,
    /// Answered by reusing the rule built for the contributing pseudo states.
    pub aliased: u64,
    /// New render rules built, including invalid ones.
    pub built: u64,
    /// Selector matching runs.
    pub matched: u64,
    /// Node entries erased by invalidation.
    pub invalidated: u64,
}

/// Owns every stylesheet and the caches derived from them.
///
/// Single-threaded; nodes are referred to by [`NodeKey`] and must report
/// their own destruction through [`StyleEngine::node_destroyed`].
#[derive(Debug)]
pub struct StyleEngine {
    config: StyleConfig,
    next_sheet: u64,
    next_query: u64,
    app_sheet: Option<Rc<StyleSheet>>,
    node_sheets: HashMap<NodeKey, Rc<StyleSheet>>,
    matched_rules: HashMap<NodeKey, Rc<[MatchedStyleRule]>>,
    render_rules: BTreeMap<Rc<RuleSetKey>, PseudoMap>,
    node_rule_sets: HashMap<NodeKey, Rc<RuleSetKey>>,
    stats: StyleStats,
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

impl StyleEngine {
    pub fn new(config: StyleConfig) -> Self {
        Self {
            config,
            next_sheet: 1,
            next_query: 1,
            app_sheet: None,
            node_sheets: HashMap::new(),
            matched_rules: HashMap::new(),
            render_rules: BTreeMap::new(),
            node_rule_sets: HashMap::new(),
            stats: StyleStats::default(),
        }
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    pub fn stats(&self) -> StyleStats {
        self.stats
    }

    fn parse_sheet(&mut self, text: &str) -> Rc<StyleSheet> {
        let id = SheetId(self.next_sheet);
        self.next_sheet += 1;
        Rc::new(StyleSheet::parse(id, text))
    }

    /// Replace the application-wide stylesheet. Clears every cache.
    pub fn set_app_style_sheet(&mut self, text: &str) {
        let sheet = self.parse_sheet(text);
        debug!(sheet = %sheet.id(), rules = sheet.rules().len(), "Application style sheet replaced");
        self.app_sheet = Some(sheet);
        self.clear();
    }

    pub fn app_style_sheet_text(&self) -> Option<&str> {
        self.app_sheet.as_deref().map(StyleSheet::source)
    }

    /// Attach a stylesheet to `node`; it applies to the node and its
    /// descendants. Blank text removes the sheet.
    pub fn set_node_style_sheet<N: StyleNode>(&mut self, node: &N, text: &str) {
        if text.trim().is_empty() {
            self.clear_node_style_sheet(node);
            return;
        }
        let sheet = self.parse_sheet(text);
        debug!(node = ?node.node_key(), sheet = %sheet.id(), rules = sheet.rules().len(), "Node style sheet set");
        if let Some(old) = self.node_sheets.insert(node.node_key(), sheet) {
            self.forget_sheet(old.id());
        }
        self.invalidate_subtree(node);
    }

    pub fn clear_node_style_sheet<N: StyleNode>(&mut self, node: &N) {
        if let Some(old) = self.node_sheets.remove(&node.node_key()) {
            debug!(node = ?node.node_key(), sheet = %old.id(), "Node style sheet cleared");
            self.forget_sheet(old.id());
            self.invalidate_subtree(node);
        }
    }

    pub fn node_style_sheet_text(&self, key: NodeKey) -> Option<&str> {
        self.node_sheets.get(&key).map(|sheet| sheet.source())
    }

    /// Drop shared entries that can no longer be reached.
    fn forget_sheet(&mut self, sheet: SheetId) {
        let before = self.render_rules.len();
        self.render_rules.retain(|key, _| !key.references(sheet));
        trace!(%sheet, dropped = before - self.render_rules.len(), "Pruned rule sets");
    }

    /// Resolve the render rule for `node` in pseudo state `pseudo`.
    ///
    /// Repeated calls without an intervening invalidation return the same
    /// instance. Nodes nothing applies to get [`RenderRule::invalid`].
    pub fn get_render_rule<N: StyleNode>(&mut self, node: &N, pseudo: PseudoMask) -> RenderRule {
        if node.ignores_style_sheets() {
            return RenderRule::invalid();
        }
        let key = node.node_key();

        let cached = self
            .node_rule_sets
            .get(&key)
            .and_then(|set| self.render_rules.get(&**set))
            .and_then(|map| map.get(&pseudo))
            .cloned();
        if let Some(rule) = cached {
            self.stats.node_hits += 1;
            return rule;
        }

        let matched = match self.matched_rules.get(&key) {
            Some(matched) => matched.clone(),
            None => {
                let matched: Rc<[MatchedStyleRule]> = self.match_node(node).into();
                self.matched_rules.insert(key, matched.clone());
                matched
            }
        };

        let set_key = RuleSetKey::from_matched(&matched);
        let set_key = match self.render_rules.get_key_value(&set_key) {
            Some((shared, _)) => shared.clone(),
            None => {
                let set_key = Rc::new(set_key);
                self.render_rules.insert(set_key.clone(), PseudoMap::new());
                set_key
            }
        };
        self.node_rule_sets.insert(key, set_key.clone());

        let shared = self.render_rules.get(&*set_key).and_then(|map| map.get(&pseudo)).cloned();
        if let Some(rule) = shared {
            self.stats.shared_hits += 1;
            return rule;
        }

        let rule = self.build_render_rule(&matched, &set_key, pseudo);
        trace!(node = ?key, %pseudo, valid = rule.is_valid(), "Render rule resolved");
        rule
    }

    /// Merge the applicable declarations for `pseudo` and store the result
    /// in the rule set's pseudo map.
    fn build_render_rule(&mut self, matched: &[MatchedStyleRule], set_key: &RuleSetKey, pseudo: PseudoMask) -> RenderRule {
        let applied = applicable_rules(matched, |selector| selector.match_pseudo(pseudo));

        let mut real_pseudo = PseudoMask::EMPTY;
        let mut merge = DeclarationMerge::new();
        for &idx in &applied {
            let m = &matched[idx];
            real_pseudo |= m.selector().pseudo();
            merge.apply(&m.rule.declarations);
        }

        let alias = self.config.alias_pseudo_states && real_pseudo != pseudo;
        let Some(map) = self.render_rules.get_mut(set_key) else {
            // The set was inserted by the caller; reaching this means the
            // caches disagree, so answer without caching.
            return materialize(&merge, &self.config);
        };

        if alias {
            if let Some(existing) = map.get(&real_pseudo) {
                let existing = existing.clone();
                map.insert(pseudo, existing.clone());
                self.stats.aliased += 1;
                return existing;
            }
        }

        let rule = materialize(&merge, &self.config);
        self.stats.built += 1;
        map.insert(pseudo, rule.clone());
        if alias {
            map.insert(real_pseudo, rule.clone());
        }
        rule
    }

    /// Every rule of every applicable sheet that matches `node`, sorted by
    /// ascending cascade weight.
    fn match_node<N: StyleNode>(&mut self, node: &N) -> Vec<MatchedStyleRule> {
        self.stats.matched += 1;

        // Own sheet and ancestors' sheets, nearest first.
        let mut sheets: Vec<Rc<StyleSheet>> = Vec::new();
        if let Some(sheet) = self.node_sheets.get(&node.node_key()) {
            sheets.push(sheet.clone());
        }
        let mut ancestor = node.parent();
        while let Some(current) = ancestor {
            if let Some(sheet) = self.node_sheets.get(&current.node_key()) {
                sheets.push(sheet.clone());
            }
            ancestor = current.parent();
        }
        if let Some(app) = &self.app_sheet {
            sheets.push(app.clone());
        }

        let mut matched = Vec::new();
        let count = sheets.len() as u32;
        for (nearness, sheet) in sheets.iter().enumerate() {
            let level = count - 1 - nearness as u32;
            for (rule, selector_idx) in sheet.candidates(node.object_name(), node.type_name()) {
                let selector = &rule.selectors[selector_idx];
                if !matches(selector, node) {
                    continue;
                }
                matched.push(MatchedStyleRule {
                    rule: rule.clone(),
                    rule_ref: RuleRef {
                        sheet: sheet.id(),
                        rule: rule.order,
                        selector: selector_idx as u32,
                    },
                    weight: CascadeWeight {
                        level,
                        specificity: selector.specificity(),
                        order: rule.order,
                    },
                });
            }
        }
        matched.sort_by_key(|m| (m.weight, m.rule_ref.selector));
        trace!(node = ?node.node_key(), matched = matched.len(), sheets = sheets.len(), "Selectors matched");
        matched
    }

    /// Forget the cached rules of `node` only.
    pub fn invalidate_node<N: StyleNode>(&mut self, node: &N) {
        self.invalidate_key(node.node_key());
    }

    fn invalidate_key(&mut self, key: NodeKey) {
        let had_rules = self.matched_rules.remove(&key).is_some();
        let had_set = self.node_rule_sets.remove(&key).is_some();
        if had_rules || had_set {
            self.stats.invalidated += 1;
        }
    }

    /// Forget the cached rules of `node` and all its descendants.
    pub fn invalidate_subtree<N: StyleNode>(&mut self, node: &N) {
        let mut stack = vec![node.node_key()];
        let mut pending = node.children();
        while let Some(child) = pending.pop() {
            stack.push(child.node_key());
            pending.extend(child.children());
        }
        trace!(root = ?node.node_key(), nodes = stack.len(), "Invalidating subtree");
        for key in stack {
            self.invalidate_key(key);
        }
    }

    /// Drop everything the engine holds for a node that no longer exists.
    pub fn node_destroyed(&mut self, key: NodeKey) {
        self.invalidate_key(key);
        if let Some(sheet) = self.node_sheets.remove(&key) {
            self.forget_sheet(sheet.id());
        }
    }

    /// A probe node for style lookups without a widget.
    pub fn create_query_node(
        &mut self,
        type_name: &str,
        object_name: &str,
        parent: Option<&QueryNode>,
    ) -> QueryNode {
        let id = self.next_query;
        self.next_query += 1;
        QueryNode::new(id, type_name, object_name, parent)
    }

    /// Release a probe's cache entries. Other nodes are unaffected.
    pub fn remove_query_node(&mut self, node: &QueryNode) {
        self.node_destroyed(node.node_key());
    }

    /// Empty every cache; stylesheets stay.
    pub fn clear(&mut self) {
        debug!(
            nodes = self.node_rule_sets.len(),
            rule_sets = self.render_rules.len(),
            "Clearing style caches"
        );
        self.matched_rules.clear();
        self.render_rules.clear();
        self.node_rule_sets.clear();
    }

    /// Number of distinct matched rule sets currently cached.
    pub fn rule_set_count(&self) -> usize {
        self.render_rules.len()
    }

    pub fn is_node_cached(&self, key: NodeKey) -> bool {
        self.matched_rules.contains_key(&key) || self.node_rule_sets.contains_key(&key)
    }
}

fn materialize(merge: &DeclarationMerge<'_>, config: &StyleConfig) -> RenderRule {
    if merge.is_empty() {
        RenderRule::invalid()
    } else {
        RenderRule::new(RenderRuleData::from_merge(merge, config))
    }
}
