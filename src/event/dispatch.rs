//! Listener registration and bubble-phase dispatch.
//!
//! `bubble_path` computes the traversal order from a node up to the top of its
//! tree. `Dom::dispatch_event` walks that path, running each node's listeners
//! for the event name in registration order.

use super::types::{listener, Event, Listener, ListenerId};
use crate::dom::tree::Registration;
use crate::dom::{Dom, NodeId};

/// Compute the bubble path from `start` up to the top of its tree
/// (inclusive).
///
/// Returns `[start, parent, grandparent, ...]`. If `start` does not exist in
/// the document, returns an empty vec.
pub fn bubble_path(dom: &Dom, start: NodeId) -> Vec<NodeId> {
    if !dom.contains(start) {
        return Vec::new();
    }
    let mut path = vec![start];
    path.extend(dom.ancestors(start));
    path
}

impl Dom {
    /// Register `listener` for `event` on `node`.
    pub fn add_event_listener(&self, node: NodeId, event: &str, listener: Listener) -> ListenerId {
        self.register(node, event, listener, false)
    }

    /// Register a listener that is removed after its first call.
    pub fn add_event_listener_once(
        &self,
        node: NodeId,
        event: &str,
        listener: Listener,
    ) -> ListenerId {
        self.register(node, event, listener, true)
    }

    /// Convenience for registering a closure.
    pub fn on(
        &self,
        node: NodeId,
        event: &str,
        f: impl Fn(&Dom, &mut Event) + 'static,
    ) -> ListenerId {
        self.add_event_listener(node, event, listener(f))
    }

    /// Remove a registration. Returns whether it was present.
    pub fn remove_event_listener(&self, node: NodeId, id: ListenerId) -> bool {
        let mut tree = self.tree.borrow_mut();
        let Some(regs) = tree.listeners.get_mut(node) else {
            return false;
        };
        let before = regs.len();
        regs.retain(|r| r.id != id);
        before != regs.len()
    }

    /// Number of listeners registered for `event` on `node`.
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.tree
            .borrow()
            .listeners
            .get(node)
            .map(|regs| regs.iter().filter(|r| r.event == event).count())
            .unwrap_or(0)
    }

    /// Dispatch `event` at `target` and return it after delivery, so callers
    /// can inspect `default_prevented`.
    ///
    /// Clicks on disabled elements are not delivered, as in a browser.
    pub fn dispatch_event(&self, target: NodeId, mut event: Event) -> Event {
        if !self.contains(target) {
            return event;
        }
        if event.name() == "click" && self.is_disabled(target) {
            return event;
        }
        event.set_target(target);

        let path = if event.bubbles() {
            bubble_path(self, target)
        } else {
            vec![target]
        };

        for node in path {
            let listeners = self.take_listeners(node, event.name());
            if listeners.is_empty() {
                continue;
            }
            event.set_current_target(Some(node));
            for listener in listeners {
                listener(self, &mut event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event.set_current_target(None);
        event
    }

    /// Dispatch a bubbling `click` at `target`.
    pub fn click(&self, target: NodeId) -> Event {
        self.dispatch_event(target, Event::new("click"))
    }

    fn register(&self, node: NodeId, event: &str, listener: Listener, once: bool) -> ListenerId {
        let mut tree = self.tree.borrow_mut();
        let id = tree.next_listener_id();
        if !tree.nodes.contains_key(node) {
            return id;
        }
        let registration = Registration {
            id,
            event: event.to_owned(),
            listener,
            once,
        };
        if let Some(entry) = tree.listeners.entry(node) {
            entry.or_default().push(registration);
        }
        id
    }

    /// Snapshot the listeners for one node/event, dropping `once`
    /// registrations. The tree borrow ends before any listener runs.
    fn take_listeners(&self, node: NodeId, event: &str) -> Vec<Listener> {
        let mut tree = self.tree.borrow_mut();
        let Some(regs) = tree.listeners.get_mut(node) else {
            return Vec::new();
        };
        let matching = regs
            .iter()
            .filter(|r| r.event == event)
            .map(|r| r.listener.clone())
            .collect();
        regs.retain(|r| !(r.once && r.event == event));
        matching
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use pretty_assertions::assert_eq;

    /// ```text
    ///   body
    ///    |
    ///    ul
    ///    |
    ///    li
    ///    |
    ///  button
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId) {
        let dom = Dom::new();
        let body = dom.body();
        let ul = dom.create_element("ul");
        let li = dom.create_element("li");
        let button = dom.create_element("button");
        dom.append_child(body, ul);
        dom.append_child(ul, li);
        dom.append_child(li, button);
        (dom, body, ul, li, button)
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Listener) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_c = log.clone();
        let make = move |tag: &str| {
            let log = log_c.clone();
            let tag = tag.to_owned();
            listener(move |_, _| log.borrow_mut().push(tag.clone()))
        };
        (log, make)
    }

    #[test]
    fn bubble_path_from_leaf() {
        let (dom, body, ul, li, button) = build_tree();
        assert_eq!(bubble_path(&dom, button), vec![button, li, ul, body]);
    }

    #[test]
    fn bubble_path_from_body() {
        let (dom, body, ..) = build_tree();
        assert_eq!(bubble_path(&dom, body), vec![body]);
    }

    #[test]
    fn bubble_path_nonexistent_node() {
        let (dom, ..) = build_tree();
        let stale = dom.create_element("p");
        dom.remove(stale);
        assert!(bubble_path(&dom, stale).is_empty());
    }

    #[test]
    fn click_bubbles_to_ancestors_in_order() {
        let (dom, body, ul, _li, button) = build_tree();
        let (log, make) = recorder();
        dom.add_event_listener(body, "click", make("body"));
        dom.add_event_listener(ul, "click", make("ul"));
        dom.add_event_listener(button, "click", make("button"));
        dom.add_event_listener(button, "click", make("button-2"));
        dom.click(button);
        assert_eq!(*log.borrow(), vec!["button", "button-2", "ul", "body"]);
    }

    #[test]
    fn local_event_stays_on_target() {
        let (dom, body, _ul, li, _button) = build_tree();
        let (log, make) = recorder();
        dom.add_event_listener(body, "toast-dismissed", make("body"));
        dom.add_event_listener(li, "toast-dismissed", make("li"));
        dom.dispatch_event(li, Event::local("toast-dismissed"));
        assert_eq!(*log.borrow(), vec!["li"]);
    }

    #[test]
    fn stop_propagation_halts_bubbling() {
        let (dom, body, ul, li, _button) = build_tree();
        let (log, make) = recorder();
        dom.on(li, "click", |_, ev| ev.stop_propagation());
        dom.add_event_listener(ul, "click", make("ul"));
        dom.add_event_listener(body, "click", make("body"));
        dom.click(li);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn listener_sees_target_and_current_target() {
        let (dom, _body, ul, _li, button) = build_tree();
        let seen = Rc::new(RefCell::new(None));
        let seen_c = seen.clone();
        dom.on(ul, "click", move |_, ev| {
            *seen_c.borrow_mut() = Some((ev.target(), ev.current_target()));
        });
        dom.click(button);
        assert_eq!(*seen.borrow(), Some((Some(button), Some(ul))));
    }

    #[test]
    fn prevent_default_is_reported_back() {
        let (dom, _body, _ul, li, _button) = build_tree();
        dom.on(li, "submit", |_, ev| ev.prevent_default());
        let ev = dom.dispatch_event(li, Event::new("submit"));
        assert!(ev.default_prevented());
        assert!(ev.current_target().is_none());
    }

    #[test]
    fn once_listener_runs_once() {
        let (dom, _body, _ul, li, _button) = build_tree();
        let (log, make) = recorder();
        dom.add_event_listener_once(li, "toast-dismissed", make("once"));
        dom.dispatch_event(li, Event::local("toast-dismissed"));
        dom.dispatch_event(li, Event::local("toast-dismissed"));
        assert_eq!(*log.borrow(), vec!["once"]);
        assert_eq!(dom.listener_count(li, "toast-dismissed"), 0);
    }

    #[test]
    fn remove_event_listener() {
        let (dom, _body, _ul, _li, button) = build_tree();
        let (log, make) = recorder();
        let id = dom.add_event_listener(button, "click", make("button"));
        assert!(dom.remove_event_listener(button, id));
        assert!(!dom.remove_event_listener(button, id));
        dom.click(button);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn disabled_button_swallows_clicks() {
        let (dom, _body, _ul, _li, button) = build_tree();
        let (log, make) = recorder();
        dom.add_event_listener(button, "click", make("button"));
        dom.set_flag(button, "disabled", true);
        dom.click(button);
        assert!(log.borrow().is_empty());
        dom.set_flag(button, "disabled", false);
        dom.click(button);
        assert_eq!(*log.borrow(), vec!["button"]);
    }

    #[test]
    fn listener_may_mutate_document() {
        let (dom, _body, ul, _li, button) = build_tree();
        dom.on(button, "click", move |dom, _| {
            let li = dom.create_element("li");
            dom.append_child(ul, li);
        });
        dom.click(button);
        assert_eq!(dom.children(ul).len(), 2);
    }

    #[test]
    fn removed_node_drops_listeners() {
        let (dom, _body, _ul, li, button) = build_tree();
        dom.on(button, "click", |_, _| {});
        dom.remove(li);
        assert_eq!(dom.listener_count(button, "click"), 0);
    }
}
