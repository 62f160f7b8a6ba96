//! Cascade ordering, rule-set keys and the declaration merge.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

use panekit_cssparser::{CssValue, Declaration, Keyword, PropertyType, Selector, StyleRule};
use smallvec::SmallVec;

use crate::stylesheet::SheetId;

/// Rank of a matched selector; later in the ordering wins.
///
/// Compared field by field: the sheet level first (0 for the application
/// sheet, growing toward the node's own sheet), then specificity, then
/// source order inside the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CascadeWeight {
    pub level: u32,
    pub specificity: u32,
    pub order: u32,
}

/// One selector alternative of one rule of one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleRef {
    pub sheet: SheetId,
    pub rule: u32,
    pub selector: u32,
}

impl RuleRef {
    /// The same rule, ignoring which alternative matched.
    fn rule_key(&self) -> (SheetId, u32) {
        (self.sheet, self.rule)
    }
}

/// A rule that matched a node, through one of its selector alternatives.
#[derive(Debug, Clone)]
pub struct MatchedStyleRule {
    pub rule: Rc<StyleRule>,
    pub rule_ref: RuleRef,
    pub weight: CascadeWeight,
}

impl MatchedStyleRule {
    pub fn selector(&self) -> &Selector {
        &self.rule.selectors[self.rule_ref.selector as usize]
    }
}

/// Identity of a matched rule sequence, shared by every node that matched
/// the same alternatives of the same rules in the same order.
///
/// Ordered by length first, then element by element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleSetKey {
    refs: SmallVec<[RuleRef; 8]>,
}

impl RuleSetKey {
    pub fn from_matched(matched: &[MatchedStyleRule]) -> Self {
        Self {
            refs: matched.iter().map(|m| m.rule_ref).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn references(&self, sheet: SheetId) -> bool {
        self.refs.iter().any(|r| r.sheet == sheet)
    }
}

impl Ord for RuleSetKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.refs
            .len()
            .cmp(&other.refs.len())
            .then_with(|| self.refs.iter().cmp(other.refs.iter()))
    }
}

impl PartialOrd for RuleSetKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pick, for every matched rule, the highest-weight alternative accepted by
/// `accept`. Returns indexes into `matched`, ascending.
///
/// `matched` must be sorted by weight.
pub fn applicable_rules(matched: &[MatchedStyleRule], mut accept: impl FnMut(&Selector) -> bool) -> Vec<usize> {
    let mut best: BTreeMap<(SheetId, u32), usize> = BTreeMap::new();
    for (idx, m) in matched.iter().enumerate() {
        if accept(m.selector()) {
            best.insert(m.rule_ref.rule_key(), idx);
        }
    }
    let mut picked: Vec<usize> = best.into_values().collect();
    picked.sort_unstable();
    picked
}

/// Declarations merged from lowest to highest weight.
///
/// Every property keeps only its last value, except `background`, whose
/// declarations stack as layers.
#[derive(Debug, Default, Clone)]
pub struct DeclarationMerge<'a> {
    properties: BTreeMap<PropertyType, &'a Declaration>,
    backgrounds: Vec<&'a Declaration>,
}

impl<'a> DeclarationMerge<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, declarations: impl IntoIterator<Item = &'a Declaration>) {
        for declaration in declarations {
            if declaration.property == PropertyType::Background {
                self.backgrounds.push(declaration);
            } else {
                self.properties.insert(declaration.property, declaration);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.backgrounds.is_empty()
    }

    pub fn get(&self, property: PropertyType) -> Option<&'a Declaration> {
        self.properties.get(&property).copied()
    }

    pub fn values(&self, property: PropertyType) -> &'a [CssValue] {
        self.get(property).map(|d| d.values.as_slice()).unwrap_or_default()
    }

    /// True when `-inherit-background` is set to anything but `false`.
    pub fn inherits_background(&self) -> bool {
        self.get(PropertyType::InheritBackground)
            .is_some_and(|d| d.values.first().and_then(CssValue::as_keyword) != Some(Keyword::False))
    }

    /// Background layer declarations, bottom layer first.
    ///
    /// `background: none` drops every layer below it unless the merged set
    /// inherits backgrounds; the `none` declarations themselves never paint.
    pub fn backgrounds(&self) -> Vec<&'a Declaration> {
        let start = if self.inherits_background() {
            0
        } else {
            self.backgrounds
                .iter()
                .rposition(|d| is_none_background(d))
                .map_or(0, |idx| idx + 1)
        };
        self.backgrounds[start..]
            .iter()
            .copied()
            .filter(|d| !is_none_background(d))
            .collect()
    }
}

fn is_none_background(declaration: &Declaration) -> bool {
    declaration.values.len() == 1 && declaration.values[0].as_keyword() == Some(Keyword::None)
}
