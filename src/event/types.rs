//! The `Event` object handed to listeners, and the listener type.

use std::rc::Rc;

use crate::dom::{Dom, NodeId};

/// A listener callback.
///
/// Listeners receive the document handle instead of capturing it, so a
/// listener stored in the document never keeps the document alive.
pub type Listener = Rc<dyn Fn(&Dom, &mut Event)>;

/// Wrap a closure as a [`Listener`].
pub fn listener(f: impl Fn(&Dom, &mut Event) + 'static) -> Listener {
    Rc::new(f)
}

/// Identifies one registration made with [`Dom::add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A DOM event travelling from its target up through its ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
    detail: Option<String>,
    bubbles: bool,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// A bubbling event with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
            bubbles: true,
            target: None,
            current_target: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// An event that is only delivered to its target.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            bubbles: false,
            ..Self::new(name)
        }
    }

    /// Attach a string payload (builder).
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// The node the event was dispatched on. `None` before dispatch.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// The node whose listener is currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop delivery to ancestors. Remaining listeners on the current node
    /// still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub(crate) fn set_target(&mut self, target: NodeId) {
        self.target = Some(target);
    }

    pub(crate) fn set_current_target(&mut self, node: Option<NodeId>) {
        self.current_target = node;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_bubbles() {
        let ev = Event::new("click");
        assert_eq!(ev.name(), "click");
        assert!(ev.bubbles());
        assert!(ev.target().is_none());
        assert!(!ev.default_prevented());
    }

    #[test]
    fn local_event_does_not_bubble() {
        let ev = Event::local("toast-dismissed");
        assert!(!ev.bubbles());
    }

    #[test]
    fn detail_builder() {
        let ev = Event::new("lightbox:show").with_detail("/img/pie.jpg");
        assert_eq!(ev.detail(), Some("/img/pie.jpg"));
    }

    #[test]
    fn prevent_and_stop() {
        let mut ev = Event::new("submit");
        ev.prevent_default();
        ev.stop_propagation();
        assert!(ev.default_prevented());
        assert!(ev.propagation_stopped());
    }
}
