//! Tree operations: create, append, detach, remove, walk, attribute access.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use slotmap::{SecondaryMap, SlotMap};

use super::node::{ElementData, NodeData, NodeId};
use crate::event::{Listener, ListenerId};

/// A registered event listener.
pub(crate) struct Registration {
    pub(crate) id: ListenerId,
    pub(crate) event: String,
    pub(crate) listener: Listener,
    pub(crate) once: bool,
}

/// Arena storage behind a [`Dom`] handle.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
pub(crate) struct Tree {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    pub(crate) children: SecondaryMap<NodeId, Vec<NodeId>>,
    pub(crate) parent: SecondaryMap<NodeId, NodeId>,
    pub(crate) listeners: SecondaryMap<NodeId, Vec<Registration>>,
    next_listener: u64,
    body: NodeId,
}

impl Tree {
    fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(NodeData::Element(ElementData::new("body")));
        let mut children = SecondaryMap::new();
        children.insert(body, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            listeners: SecondaryMap::new(),
            next_listener: 0,
            body,
        }
    }

    fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(old_parent) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != id);
            }
        }
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.parent.get(node).copied();
        }
        false
    }

    pub(crate) fn next_listener_id(&mut self) -> ListenerId {
        self.next_listener += 1;
        ListenerId(self.next_listener)
    }
}

/// Shared handle to a document.
///
/// Cloning a `Dom` yields another handle to the same document. Every method
/// borrows the tree only for its own duration, never across a listener call,
/// so listeners and signal handlers can call back into the document freely.
/// The document always has a `<body>` element that cannot be removed.
#[derive(Clone)]
pub struct Dom {
    pub(crate) tree: Rc<RefCell<Tree>>,
}

/// Non-owning handle to a document, for callbacks stored outside of it.
#[derive(Clone)]
pub struct WeakDom(Weak<RefCell<Tree>>);

impl WeakDom {
    /// Upgrade to a strong handle if the document is still alive.
    pub fn upgrade(&self) -> Option<Dom> {
        self.0.upgrade().map(|tree| Dom { tree })
    }
}

impl Dom {
    /// Create an empty document containing only `<body>`.
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new())),
        }
    }

    /// Downgrade to a handle that does not keep the document alive.
    pub fn downgrade(&self) -> WeakDom {
        WeakDom(Rc::downgrade(&self.tree))
    }

    /// Whether two handles refer to the same document.
    pub fn same_document(&self, other: &Dom) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.tree.borrow().body
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.insert(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.insert(NodeData::Text(text.into()))
    }

    /// Insert arbitrary detached node data.
    pub fn insert(&self, data: NodeData) -> NodeId {
        self.tree.borrow_mut().insert(data)
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it out of its
    /// current parent first. Identity and listeners are kept.
    ///
    /// Appending a node into its own subtree, or into a text node, is a no-op.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if !tree.nodes.contains_key(child) || !can_have_children(&tree, parent) {
            return;
        }
        if tree.is_ancestor_or_self(child, parent) {
            return;
        }
        tree.detach(child);
        tree.parent.insert(child, parent);
        if let Some(kids) = tree.children.get_mut(parent) {
            kids.push(child);
        }
    }

    /// Append several children in order.
    pub fn append_children(&self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.append_child(parent, child);
        }
    }

    /// Insert `child` into `parent` right before `reference`. Falls back to
    /// appending when `reference` is not a child of `parent`.
    pub fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if !tree.nodes.contains_key(child) || !can_have_children(&tree, parent) {
            return;
        }
        if tree.is_ancestor_or_self(child, parent) {
            return;
        }
        tree.detach(child);
        tree.parent.insert(child, parent);
        if let Some(kids) = tree.children.get_mut(parent) {
            match kids.iter().position(|&k| k == reference) {
                Some(pos) => kids.insert(pos, child),
                None => kids.push(child),
            }
        }
    }

    /// Unlink a node from its parent. The node and its subtree stay alive.
    pub fn detach(&self, id: NodeId) {
        self.tree.borrow_mut().detach(id);
    }

    /// Unlink all children of `id` and return them, still alive.
    pub fn detach_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut tree = self.tree.borrow_mut();
        let kids = match tree.children.get_mut(id) {
            Some(kids) => std::mem::take(kids),
            None => return Vec::new(),
        };
        for &kid in &kids {
            tree.parent.remove(kid);
        }
        kids
    }

    /// Remove a node and all its descendants, freeing them and their
    /// listeners.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't
    /// exist or is the body.
    pub fn remove(&self, id: NodeId) -> Option<NodeData> {
        let mut tree = self.tree.borrow_mut();
        if !tree.nodes.contains_key(id) || tree.body == id {
            return None;
        }
        tree.detach(id);

        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = tree.children.remove(current) {
                to_remove.extend(kids);
            }
            tree.parent.remove(current);
            tree.listeners.remove(current);
            let data = tree.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Remove (free) every child of `id`.
    pub fn remove_children(&self, id: NodeId) {
        for child in self.detach_children(id) {
            self.remove(child);
        }
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.borrow().parent.get(id).copied()
    }

    /// The children of a node, in order. Empty if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .children
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Element children only.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.children
            .get(id)
            .map(|kids| {
                kids.iter()
                    .copied()
                    .filter(|&k| tree.nodes.get(k).is_some_and(NodeData::is_element))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Walk from `id` up to the top of its tree, collecting ancestor ids.
    ///
    /// The returned vec does **not** include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = tree.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `id` is attached under `<body>`.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let body = self.body();
        id == body || self.ancestors(id).last() == Some(&body)
    }

    /// Number of live nodes, including `<body>` and detached nodes.
    pub fn len(&self) -> usize {
        self.tree.borrow().nodes.len()
    }

    /// Whether the document holds nothing but `<body>`.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Whether the document contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.tree.borrow().nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !tree.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            if let Some(kids) = tree.children.get(current) {
                stack.extend(kids.iter().rev());
            }
        }
        result
    }

    // -----------------------------------------------------------------------
    // Node data
    // -----------------------------------------------------------------------

    /// Run `f` against a node's data.
    pub fn with_node<R>(&self, id: NodeId, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        self.tree.borrow().nodes.get(id).map(f)
    }

    /// Run `f` against an element's data mutably. `None` for text nodes and
    /// missing ids.
    pub fn with_element_mut<R>(
        &self,
        id: NodeId,
        f: impl FnOnce(&mut ElementData) -> R,
    ) -> Option<R> {
        self.tree
            .borrow_mut()
            .nodes
            .get_mut(id)
            .and_then(NodeData::as_element_mut)
            .map(f)
    }

    /// A copy of a node's data.
    pub fn get(&self, id: NodeId) -> Option<NodeData> {
        self.with_node(id, Clone::clone)
    }

    /// Tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<String> {
        self.with_node(id, |n| n.as_element().map(|e| e.tag.clone()))
            .flatten()
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.with_node(id, |n| {
            n.as_element().and_then(|e| e.attr(name)).map(str::to_owned)
        })
        .flatten()
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.with_node(id, |n| n.as_element().is_some_and(|e| e.has_attr(name)))
            .unwrap_or(false)
    }

    pub fn set_attr(&self, id: NodeId, name: &str, value: impl Into<String>) {
        self.with_element_mut(id, |e| e.set_attr(name, value));
    }

    pub fn remove_attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.with_element_mut(id, |e| e.remove_attr(name)).flatten()
    }

    /// Set or clear a boolean attribute such as `disabled`.
    pub fn set_flag(&self, id: NodeId, name: &str, on: bool) {
        if on {
            self.set_attr(id, name, "");
        } else {
            self.remove_attr(id, name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.with_node(id, |n| n.as_element().is_some_and(|e| e.has_class(class)))
            .unwrap_or(false)
    }

    pub fn add_class(&self, id: NodeId, class: &str) {
        self.with_element_mut(id, |e| e.add_class(class));
    }

    pub fn remove_class(&self, id: NodeId, class: &str) {
        self.with_element_mut(id, |e| e.remove_class(class));
    }

    /// See [`ElementData::toggle_class`].
    pub fn toggle_class(&self, id: NodeId, class: &str, force: Option<bool>) -> bool {
        self.with_element_mut(id, |e| e.toggle_class(class, force))
            .unwrap_or(false)
    }

    /// Whether the element carries the `disabled` attribute.
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attr(id, "disabled")
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match tree.nodes.get(current) {
                Some(NodeData::Text(text)) => out.push_str(text),
                Some(NodeData::Element(_)) => {
                    if let Some(kids) = tree.children.get(current) {
                        stack.extend(kids.iter().rev());
                    }
                }
                None => {}
            }
        }
        out
    }

    /// Replace the contents of a node with a single text node (or update the
    /// text of a text node). Old children are freed.
    pub fn set_text_content(&self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        let is_text = self
            .with_node(id, |n| matches!(n, NodeData::Text(_)))
            .unwrap_or(false);
        if is_text {
            if let Some(NodeData::Text(existing)) = self.tree.borrow_mut().nodes.get_mut(id) {
                *existing = text;
            }
            return;
        }
        self.remove_children(id);
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node);
        }
    }

    /// The current value of a form control: text content for `<textarea>`,
    /// the `value` attribute otherwise.
    pub fn value(&self, id: NodeId) -> String {
        if self.tag(id).as_deref() == Some("textarea") {
            self.text_content(id)
        } else {
            self.attr(id, "value").unwrap_or_default()
        }
    }

    /// Set the value of a form control. See [`Dom::value`].
    pub fn set_value(&self, id: NodeId, value: impl Into<String>) {
        if self.tag(id).as_deref() == Some("textarea") {
            self.set_text_content(id, value);
        } else {
            self.set_attr(id, "value", value);
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dom")
            .field("nodes", &self.len())
            .field("body", &self.body())
            .finish()
    }
}

fn can_have_children(tree: &Tree, id: NodeId) -> bool {
    tree.nodes.get(id).is_some_and(NodeData::is_element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Build a small test tree under body:
    /// ```text
    ///       body
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let dom = Dom::new();
        let body = dom.body();
        let a = dom.create_element("section");
        let b = dom.create_element("aside");
        let c = dom.create_element("button");
        let d = dom.create_text("label");
        dom.append_child(body, a);
        dom.append_child(body, b);
        dom.append_child(a, c);
        dom.append_child(a, d);
        (dom, body, a, b, c, d)
    }

    #[test]
    fn new_document_has_body() {
        let dom = Dom::new();
        assert_eq!(dom.tag(dom.body()).as_deref(), Some("body"));
        assert_eq!(dom.len(), 1);
        assert!(dom.is_empty());
    }

    #[test]
    fn append_child_parent_relationship() {
        let (dom, body, a, _b, c, _d) = build_tree();
        assert_eq!(dom.parent(a), Some(body));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(body), None);
    }

    #[test]
    fn children_list() {
        let (dom, body, a, b, c, d) = build_tree();
        assert_eq!(dom.children(body), vec![a, b]);
        assert_eq!(dom.children(a), vec![c, d]);
        assert_eq!(dom.element_children(a), vec![c]);
        assert!(dom.children(c).is_empty());
    }

    #[test]
    fn append_moves_existing_child() {
        let (dom, _body, a, b, c, d) = build_tree();
        dom.append_child(b, c);
        assert_eq!(dom.parent(c), Some(b));
        assert_eq!(dom.children(a), vec![d]);
        assert_eq!(dom.children(b), vec![c]);
    }

    #[test]
    fn append_into_own_subtree_is_ignored() {
        let (dom, body, a, _b, c, _d) = build_tree();
        dom.append_child(c, a);
        assert_eq!(dom.parent(a), Some(body));
    }

    #[test]
    fn append_into_text_node_is_ignored() {
        let (dom, _body, a, _b, c, d) = build_tree();
        dom.append_child(d, c);
        assert_eq!(dom.parent(c), Some(a));
    }

    #[test]
    fn insert_before_reference() {
        let (dom, _body, a, _b, c, d) = build_tree();
        let e = dom.create_element("em");
        dom.insert_before(a, e, d);
        assert_eq!(dom.children(a), vec![c, e, d]);
    }

    #[test]
    fn ancestors_and_connection() {
        let (dom, body, a, _b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, body]);
        assert!(dom.is_connected(c));
        dom.detach(a);
        assert!(!dom.is_connected(c));
        assert_eq!(dom.ancestors(c), vec![a]);
    }

    #[test]
    fn detach_children_keeps_nodes_alive() {
        let (dom, _body, a, _b, c, d) = build_tree();
        let detached = dom.detach_children(a);
        assert_eq!(detached, vec![c, d]);
        assert!(dom.contains(c));
        assert!(dom.parent(c).is_none());
        assert!(dom.children(a).is_empty());
    }

    #[test]
    fn remove_subtree() {
        let (dom, body, a, b, c, d) = build_tree();
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert!(dom.contains(b));
        assert_eq!(dom.children(body), vec![b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_body_is_refused() {
        let (dom, body, ..) = build_tree();
        assert!(dom.remove(body).is_none());
        assert!(dom.contains(body));
    }

    #[test]
    fn remove_nonexistent() {
        let dom = Dom::new();
        let id = dom.create_element("p");
        dom.remove(id);
        assert!(dom.remove(id).is_none());
    }

    #[test]
    fn remove_children_frees_them() {
        let (dom, _body, a, _b, c, d) = build_tree();
        dom.remove_children(a);
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert!(dom.contains(a));
    }

    #[test]
    fn walk_depth_first() {
        let (dom, body, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(body), vec![body, a, c, d, b]);
        assert_eq!(dom.walk_depth_first(a), vec![a, c, d]);
    }

    #[test]
    fn attributes_and_classes() {
        let dom = Dom::new();
        let btn = dom.create_element("button");
        dom.set_attr(btn, "type", "button");
        dom.add_class(btn, "comment-next");
        assert_eq!(dom.attr(btn, "type").as_deref(), Some("button"));
        assert!(dom.has_class(btn, "comment-next"));
        dom.set_flag(btn, "disabled", true);
        assert!(dom.is_disabled(btn));
        dom.set_flag(btn, "disabled", false);
        assert!(!dom.is_disabled(btn));
        assert!(dom.toggle_class(btn, "active", None));
        assert_eq!(dom.remove_attr(btn, "type").as_deref(), Some("button"));
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let dom = Dom::new();
        let p = dom.create_element("p");
        let em = dom.create_element("em");
        let t1 = dom.create_text("Hello, ");
        let t2 = dom.create_text("world");
        dom.append_child(p, t1);
        dom.append_child(p, em);
        dom.append_child(em, t2);
        assert_eq!(dom.text_content(p), "Hello, world");
    }

    #[test]
    fn set_text_content_replaces_children() {
        let dom = Dom::new();
        let span = dom.create_element("span");
        let old = dom.create_element("b");
        dom.append_child(span, old);
        dom.set_text_content(span, "42");
        assert!(!dom.contains(old));
        assert_eq!(dom.text_content(span), "42");
        assert_eq!(dom.children(span).len(), 1);
    }

    #[test]
    fn value_of_input_and_textarea() {
        let dom = Dom::new();
        let input = dom.create_element("input");
        let area = dom.create_element("textarea");
        dom.set_value(input, "Ada");
        dom.set_value(area, "Nice site");
        assert_eq!(dom.value(input), "Ada");
        assert_eq!(dom.attr(input, "value").as_deref(), Some("Ada"));
        assert_eq!(dom.value(area), "Nice site");
        dom.set_value(area, "");
        assert_eq!(dom.value(area), "");
    }

    #[test]
    fn handles_share_one_document() {
        let dom = Dom::new();
        let other = dom.clone();
        let p = other.create_element("p");
        assert!(dom.contains(p));
        assert!(dom.same_document(&other));
        assert!(!dom.same_document(&Dom::new()));
    }

    #[test]
    fn weak_handle_upgrades_while_alive() {
        let dom = Dom::new();
        let weak = dom.downgrade();
        assert!(weak.upgrade().is_some());
        drop(dom);
        assert!(weak.upgrade().is_none());
    }
}
