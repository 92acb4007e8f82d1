//! HTML serialization of document subtrees.

use super::node::{NodeData, NodeId};
use super::tree::{Dom, Tree};

impl Dom {
    /// Serialize a node and its subtree as HTML.
    pub fn outer_html(&self, id: NodeId) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        write_node(&tree, id, &mut out);
        out
    }

    /// Serialize the children of a node as HTML.
    pub fn inner_html(&self, id: NodeId) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        if let Some(kids) = tree.children.get(id) {
            for &kid in kids {
                write_node(&tree, kid, &mut out);
            }
        }
        out
    }
}

fn write_node(tree: &Tree, id: NodeId, out: &mut String) {
    match tree.nodes.get(id) {
        Some(NodeData::Text(text)) => escape_text(text, out),
        Some(NodeData::Element(el)) => {
            out.push('<');
            out.push_str(&el.tag);
            for attr in &el.attributes {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_attr(&attr.value, out);
                out.push('"');
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            if let Some(kids) = tree.children.get(id) {
                for &kid in kids {
                    write_node(tree, kid, out);
                }
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
        None => {}
    }
}

/// Escape text content: `&`, `<`, `>`.
pub fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
}

/// Escape a double-quoted attribute value: `&`, `"`.
pub fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
}
