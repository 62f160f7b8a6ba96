//! Selector matching against a node and its ancestors.

use panekit_cssparser::{BasicSelector, Relation, Selector};

use crate::node::StyleNode;

/// Match one component against one node, ignoring pseudo-classes.
///
/// A component with neither id nor type name is the universal selector and
/// matches everything.
pub fn matches_basic<N: StyleNode>(basic: &BasicSelector, node: &N) -> bool {
    if let Some(id) = &basic.id {
        if node.object_name() != id {
            return false;
        }
    }
    if let Some(element) = &basic.element {
        if node.type_name() != element {
            return false;
        }
    }
    true
}

/// True if `selector` matches `node` in its current tree position.
///
/// Pseudo-class requirements are not checked here; they depend on the state
/// at query time and are resolved by [`Selector::match_pseudo`].
///
/// Matching walks leaf-to-root. A `>` component must match the very next
/// ancestor. A descendant component searches up the chain and commits to the
/// first ancestor that matches; there is no backtracking, so a later failure
/// fails the whole selector.
pub fn matches<N: StyleNode>(selector: &Selector, node: &N) -> bool {
    let components = selector.components();
    let mut idx = components.len() - 1;
    if !matches_basic(&components[idx], node) {
        return false;
    }

    let mut current = node.parent();
    while idx > 0 {
        let target = &components[idx - 1];
        match components[idx].relation {
            Relation::MatchNextIfParent => {
                let Some(parent) = current else {
                    return false;
                };
                if !matches_basic(target, &parent) {
                    return false;
                }
                current = parent.parent();
            }
            Relation::MatchNextIfAncestor | Relation::NoRelation => loop {
                let Some(ancestor) = current else {
                    return false;
                };
                current = ancestor.parent();
                if matches_basic(target, &ancestor) {
                    break;
                }
            },
        }
        idx -= 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKey;
    use panekit_cssparser::parse_selector;

    /// Chain of `(type, id)` pairs, leaf first.
    #[derive(Clone)]
    struct Chain<'a> {
        nodes: &'a [(&'a str, &'a str)],
        at: usize,
    }

    impl StyleNode for Chain<'_> {
        fn node_key(&self) -> NodeKey {
            NodeKey::Query(self.at as u64)
        }
        fn object_name(&self) -> &str {
            self.nodes[self.at].1
        }
        fn type_name(&self) -> &str {
            self.nodes[self.at].0
        }
        fn parent(&self) -> Option<Self> {
            (self.at + 1 < self.nodes.len()).then(|| Chain {
                nodes: self.nodes,
                at: self.at + 1,
            })
        }
    }

    fn check(selector: &str, nodes: &[(&str, &str)]) -> bool {
        matches(&parse_selector(selector).unwrap(), &Chain { nodes, at: 0 })
    }

    #[test]
    fn test_subject_id_and_type() {
        let leaf = [("Button", "ok")];
        assert!(check("Button", &leaf));
        assert!(check("#ok", &leaf));
        assert!(check("Button#ok", &leaf));
        assert!(check("*", &leaf));
        assert!(!check("Label", &leaf));
        assert!(!check("Button#cancel", &leaf));
    }

    #[test]
    fn test_child_combinator_needs_direct_parent() {
        let direct = [("B", ""), ("A", "")];
        let indirect = [("B", ""), ("C", ""), ("A", "")];
        assert!(check(".A > .B", &direct));
        assert!(!check(".A > .B", &indirect));
        assert!(check(".A .B", &indirect));
    }

    #[test]
    fn test_descendant_commits_to_first_match() {
        // W > X Y: the descendant step commits to the nearest X, whose parent
        // is not W, even though a farther X has W as parent.
        let chain = [("Y", ""), ("X", ""), ("Z", ""), ("X", ""), ("W", "")];
        assert!(!check("W > X Y", &chain));
        assert!(check("W X Y", &chain));
    }

    #[test]
    fn test_running_out_of_ancestors_fails() {
        let chain = [("B", ""), ("A", "")];
        assert!(!check("Root A B", &chain));
        assert!(!check("Root > B", &[("B", "")]));
    }
}
