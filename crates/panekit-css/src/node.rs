//! The node interface the style engine matches against.

/// Opaque cache key for a styled node.
///
/// Widgets and query nodes live in separate key spaces so a widget id can
/// never alias a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    Widget(u64),
    Query(u64),
}

/// Capabilities a node needs for selector matching and caching.
///
/// Implemented by lightweight handles (a borrowed widget reference, a
/// [`QueryNode`](crate::QueryNode)), so `parent` returns an owned handle.
pub trait StyleNode: Sized {
    /// Stable key used by the engine's caches and per-node stylesheets.
    fn node_key(&self) -> NodeKey;

    /// Matched by `#id` selectors. Empty when the node has no name.
    fn object_name(&self) -> &str;

    /// Matched by `Type` and `.Type` selectors.
    fn type_name(&self) -> &str;

    fn parent(&self) -> Option<Self>;

    /// Children, needed for recursive invalidation.
    fn children(&self) -> Vec<Self> {
        Vec::new()
    }

    /// Nodes that opt out of styling always get the invalid render rule.
    fn ignores_style_sheets(&self) -> bool {
        false
    }
}
