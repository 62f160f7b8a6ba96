//! Style probes for nodes that do not exist in a widget tree.

use std::rc::Rc;

use crate::node::{NodeKey, StyleNode};

#[derive(Debug)]
struct QueryNodeData {
    key: NodeKey,
    type_name: String,
    object_name: String,
    parent: Option<QueryNode>,
}

/// A lightweight node used to ask "what would a `type_name#object_name`
/// below this parent look like" without constructing a widget.
///
/// Created by [`StyleEngine::create_query_node`](crate::StyleEngine::create_query_node)
/// so its key is unique. Clones share identity.
#[derive(Debug, Clone)]
pub struct QueryNode {
    inner: Rc<QueryNodeData>,
}

impl QueryNode {
    pub(crate) fn new(
        id: u64,
        type_name: impl Into<String>,
        object_name: impl Into<String>,
        parent: Option<&QueryNode>,
    ) -> Self {
        Self {
            inner: Rc::new(QueryNodeData {
                key: NodeKey::Query(id),
                type_name: type_name.into(),
                object_name: object_name.into(),
                parent: parent.cloned(),
            }),
        }
    }
}

impl StyleNode for QueryNode {
    fn node_key(&self) -> NodeKey {
        self.inner.key
    }

    fn object_name(&self) -> &str {
        &self.inner.object_name
    }

    fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    fn parent(&self) -> Option<Self> {
        self.inner.parent.clone()
    }
}
