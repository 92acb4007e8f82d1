//! DOM queries: by id, class, tag; generic predicate matching.
//!
//! All queries walk a subtree in tree order, so detached nodes are only found
//! when the walk starts inside their tree.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

impl Dom {
    /// Find the first element under `<body>` whose `id` attribute matches.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_first(self.body(), |data| {
            data.as_element().and_then(|e| e.id()) == Some(id)
        })
    }

    /// Find all elements under `root` (inclusive) that have the given class.
    pub fn query_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.query_all(root, |data| {
            data.as_element().is_some_and(|e| e.has_class(class))
        })
    }

    /// First element under `root` (inclusive) with the given class.
    pub fn query_first_by_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.query_first(root, |data| {
            data.as_element().is_some_and(|e| e.has_class(class))
        })
    }

    /// Find all elements under `root` (inclusive) with the given tag name.
    pub fn query_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.query_all(root, |data| data.as_element().is_some_and(|e| e.tag == tag))
    }

    /// Find all nodes under `root` (inclusive) matching a predicate.
    pub fn query_all(&self, root: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.walk_depth_first(root)
            .into_iter()
            .filter(|&node| self.with_node(node, &predicate).unwrap_or(false))
            .collect()
    }

    /// First node under `root` (inclusive) matching a predicate.
    pub fn query_first(
        &self,
        root: NodeId,
        predicate: impl Fn(&NodeData) -> bool,
    ) -> Option<NodeId> {
        self.walk_depth_first(root)
            .into_iter()
            .find(|&node| self.with_node(node, &predicate).unwrap_or(false))
    }

    /// Nearest node, starting at `node` itself and walking up, that matches
    /// a predicate.
    pub fn closest(&self, node: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&n| self.with_node(n, &predicate).unwrap_or(false))
    }
}
