//! Parsed stylesheets with subject-component indexes.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use panekit_cssparser::{parse_stylesheet, StyleRule};
use tracing::debug;

/// Identity of one parsed stylesheet.
///
/// Handed out by the [`StyleEngine`](crate::StyleEngine) from a counter, so
/// re-parsing identical text still yields a distinct sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SheetId(pub u64);

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet#{}", self.0)
    }
}

/// Position of one selector alternative inside a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SelectorRef {
    rule: usize,
    selector: usize,
}

/// Rules of one stylesheet plus lookup tables keyed by the subject of each
/// selector alternative.
///
/// Every alternative lands in exactly one bucket: by id if the subject names
/// an id, else by type name if it names one, else the universal list.
pub struct StyleSheet {
    id: SheetId,
    source: String,
    rules: Vec<Rc<StyleRule>>,
    by_id: HashMap<String, Vec<SelectorRef>>,
    by_type: HashMap<String, Vec<SelectorRef>>,
    universal: Vec<SelectorRef>,
}

impl StyleSheet {
    pub fn parse(id: SheetId, source: impl Into<String>) -> Self {
        let source = source.into();
        let rules: Vec<Rc<StyleRule>> = parse_stylesheet(&source).into_iter().map(Rc::new).collect();

        let mut by_id: HashMap<String, Vec<SelectorRef>> = HashMap::new();
        let mut by_type: HashMap<String, Vec<SelectorRef>> = HashMap::new();
        let mut universal = Vec::new();

        for (rule_idx, rule) in rules.iter().enumerate() {
            for (selector_idx, selector) in rule.selectors.iter().enumerate() {
                let entry = SelectorRef {
                    rule: rule_idx,
                    selector: selector_idx,
                };
                let subject = selector.subject();
                if let Some(id) = &subject.id {
                    by_id.entry(id.clone()).or_default().push(entry);
                } else if let Some(element) = &subject.element {
                    by_type.entry(element.clone()).or_default().push(entry);
                } else {
                    universal.push(entry);
                }
            }
        }

        debug!(
            %id,
            rules = rules.len(),
            ids = by_id.len(),
            types = by_type.len(),
            universal = universal.len(),
            "Style sheet indexed"
        );

        Self {
            id,
            source,
            rules,
            by_id,
            by_type,
            universal,
        }
    }

    pub fn id(&self) -> SheetId {
        self.id
    }

    /// The text this sheet was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn rules(&self) -> &[Rc<StyleRule>] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Selector alternatives whose subject could match a node with the given
    /// object name and type name, as `(rule, selector index)` pairs.
    ///
    /// Universal alternatives come first, then type, then id. Callers still
    /// have to run the full matcher.
    pub fn candidates<'a>(
        &'a self,
        object_name: &str,
        type_name: &str,
    ) -> impl Iterator<Item = (&'a Rc<StyleRule>, usize)> + 'a {
        let by_type = self.by_type.get(type_name).map(Vec::as_slice).unwrap_or_default();
        let by_id = if object_name.is_empty() {
            &[][..]
        } else {
            self.by_id.get(object_name).map(Vec::as_slice).unwrap_or_default()
        };
        self.universal
            .iter()
            .chain(by_type)
            .chain(by_id)
            .map(move |entry| (&self.rules[entry.rule], entry.selector))
    }
}

impl fmt::Debug for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSheet")
            .field("id", &self.id)
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors_for(sheet: &StyleSheet, name: &str, ty: &str) -> Vec<String> {
        sheet
            .candidates(name, ty)
            .map(|(rule, idx)| rule.selectors[idx].to_string())
            .collect()
    }

    #[test]
    fn test_alternatives_are_indexed_by_subject() {
        let sheet = StyleSheet::parse(
            SheetId(1),
            "* { color: #000000; } Button, #ok { width: 1px; } Panel Button#ok { height: 2px; } Label { width: 3px; }",
        );
        assert_eq!(sheet.rules().len(), 4);
        assert_eq!(
            selectors_for(&sheet, "ok", "Button"),
            vec!["*", "Button", "#ok", "Panel Button#ok"]
        );
        assert_eq!(selectors_for(&sheet, "", "Label"), vec!["*", "Label"]);
        assert_eq!(selectors_for(&sheet, "cancel", "Edit"), vec!["*"]);
    }

    #[test]
    fn test_empty_name_skips_id_bucket() {
        let sheet = StyleSheet::parse(SheetId(2), "#ok { color: #000000; } Button { width: 1px; }");
        assert_eq!(selectors_for(&sheet, "", "Button"), vec!["Button"]);
    }

    #[test]
    fn test_keeps_source_text() {
        let sheet = StyleSheet::parse(SheetId(3), "color: #000000;");
        assert_eq!(sheet.source(), "color: #000000;");
        assert_eq!(sheet.id(), SheetId(3));
        assert!(!sheet.is_empty());
    }
}
