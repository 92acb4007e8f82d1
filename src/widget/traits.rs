//! Widget trait: identify a component and mount its nodes.

use crate::dom::{Dom, NodeId};

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Implemented by every page component.
///
/// A widget owns a detached subtree built at construction time. Mounting moves
/// that subtree into the document; the widget keeps working on the same nodes.
pub trait Widget {
    /// Short name used in logs, e.g. `"comments"`.
    fn widget_type(&self) -> &str;

    /// The widget's outermost node.
    fn root(&self) -> NodeId;

    /// All top-level nodes, for widgets that render a fragment.
    fn nodes(&self) -> Vec<NodeId> {
        vec![self.root()]
    }

    /// Append the widget's nodes to `parent`.
    fn mount(&self, dom: &Dom, parent: NodeId) {
        dom.append_children(parent, &self.nodes());
    }

    /// Serialize the widget's nodes.
    fn render_html(&self, dom: &Dom) -> String {
        self.nodes().into_iter().map(|n| dom.outer_html(n)).collect()
    }
}
