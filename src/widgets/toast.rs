//! Toasts: short messages stacked in a container, dismissed by timeout or by
//! the user.
//!
//! Timed toasts count down while the pointer is away from them; hovering
//! pauses the countdown. Toasts without a timeout are modal and carry a
//! "Dismiss" button. Either way dismissal dispatches `toast-dismissed` on the
//! toast element, marks it with the `toast-dismissed` class, and resolves the
//! [`ToastHandle`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

use crate::dom::{Dom, NodeId};
use crate::event::names::TOAST_DISMISSED;
use crate::event::Event;
use crate::template::{on, TemplateError};
use crate::widget::Widget;
use crate::{html, html_fragment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Info,
    Error,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves when its toast is dismissed.
#[derive(Debug)]
pub struct ToastHandle {
    node: NodeId,
    done: oneshot::Receiver<()>,
}

impl ToastHandle {
    /// The toast's `<li>`.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Wait for dismissal. Also returns if the toaster is dropped first.
    pub async fn dismissed(self) {
        let _ = self.done.await;
    }

    /// Whether the toast has been dismissed, without waiting.
    pub fn is_dismissed(&mut self) -> bool {
        !matches!(self.done.try_recv(), Err(oneshot::error::TryRecvError::Empty))
    }
}

struct ToastState {
    node: NodeId,
    timer: Option<NodeId>,
    timeout: Option<Duration>,
    remaining: Duration,
    paused: Rc<Cell<bool>>,
    dismissed: bool,
    done: Option<oneshot::Sender<()>>,
}

// ---------------------------------------------------------------------------
// Toaster
// ---------------------------------------------------------------------------

/// The `#toast-container` list and the toasts inside it.
pub struct Toaster {
    dom: Dom,
    container: NodeId,
    default_timeout: Duration,
    toasts: Rc<RefCell<Vec<ToastState>>>,
}

impl Toaster {
    pub fn new(dom: &Dom, default_timeout: Duration) -> Result<Self, TemplateError> {
        let container = html!(dom, r#"<ul id="toast-container"></ul>"#)?;
        Ok(Self {
            dom: dom.clone(),
            container,
            default_timeout,
            toasts: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Show a toast with the default timeout.
    pub fn info(&self, message: &str) -> Result<ToastHandle, TemplateError> {
        self.show(message, ToastKind::Info, Some(self.default_timeout))
    }

    /// Show an error toast that stays until dismissed.
    pub fn error(&self, message: &str) -> Result<ToastHandle, TemplateError> {
        self.show(message, ToastKind::Error, None)
    }

    /// Show `message`. `timeout: None` makes the toast modal.
    pub fn show(
        &self,
        message: &str,
        kind: ToastKind,
        timeout: Option<Duration>,
    ) -> Result<ToastHandle, TemplateError> {
        let dom = &self.dom;
        let text = dom.create_text(message);
        let node = html!(
            dom,
            r#"<li class="toast toast-{}"><div class="toast-content">{}</div></li>"#,
            kind.as_str(),
            text,
        )?;

        let paused = Rc::new(Cell::new(false));
        let timer = match timeout {
            Some(_) => {
                let timer = html!(
                    dom,
                    r#"<progress class="toast-timer" max="100" value="100"></progress>"#
                )?;
                dom.append_child(node, timer);
                let p = paused.clone();
                dom.on(node, "mouseover", move |_, _| p.set(true));
                let p = paused.clone();
                dom.on(node, "mouseout", move |_, _| p.set(false));
                Some(timer)
            }
            None => {
                let nodes = html_fragment!(
                    dom,
                    r#"<button type="button" class="toast-dismiss" @click={}>Dismiss</button>"#,
                    on(move |dom, _| {
                        dom.dispatch_event(node, Event::local(TOAST_DISMISSED));
                    }),
                )?;
                dom.append_children(node, &nodes);
                None
            }
        };

        let (tx, rx) = oneshot::channel();
        let toasts = Rc::clone(&self.toasts);
        dom.add_event_listener_once(
            node,
            TOAST_DISMISSED,
            crate::event::listener(move |dom, _| {
                dom.add_class(node, "toast-dismissed");
                let mut toasts = toasts.borrow_mut();
                if let Some(state) = toasts.iter_mut().find(|t| t.node == node) {
                    state.dismissed = true;
                    if let Some(done) = state.done.take() {
                        let _ = done.send(());
                    }
                }
            }),
        );

        self.toasts.borrow_mut().push(ToastState {
            node,
            timer,
            timeout,
            remaining: timeout.unwrap_or_default(),
            paused,
            dismissed: false,
            done: Some(tx),
        });
        dom.append_child(self.container, node);
        debug!(kind = kind.as_str(), ?timeout, "toast shown");

        Ok(ToastHandle { node, done: rx })
    }

    /// Dismiss a toast now.
    pub fn dismiss(&self, node: NodeId) {
        let live = self
            .toasts
            .borrow()
            .iter()
            .any(|t| t.node == node && !t.dismissed);
        if live {
            self.dom.dispatch_event(node, Event::local(TOAST_DISMISSED));
        }
    }

    /// Advance every running countdown by `delta`, dismissing expired toasts.
    pub fn advance(&self, delta: Duration) {
        let mut expired = Vec::new();
        let mut progress = Vec::new();
        for toast in self.toasts.borrow_mut().iter_mut() {
            let Some(timeout) = toast.timeout else {
                continue;
            };
            if toast.dismissed || toast.paused.get() {
                continue;
            }
            toast.remaining = toast.remaining.saturating_sub(delta);
            if toast.remaining.is_zero() {
                expired.push(toast.node);
            } else if let Some(timer) = toast.timer {
                let percent = toast.remaining.as_secs_f64() / timeout.as_secs_f64() * 100.0;
                progress.push((timer, format!("{percent:.0}")));
            }
        }
        for (timer, value) in progress {
            self.dom.set_attr(timer, "value", value);
        }
        for node in expired {
            self.dom.dispatch_event(node, Event::local(TOAST_DISMISSED));
        }
    }

    /// Remove dismissed toasts from the document.
    pub fn prune(&self) {
        let gone: Vec<NodeId> = {
            let mut toasts = self.toasts.borrow_mut();
            let gone = toasts.iter().filter(|t| t.dismissed).map(|t| t.node).collect();
            toasts.retain(|t| !t.dismissed);
            gone
        };
        for node in gone {
            self.dom.remove(node);
        }
    }

    /// Toasts still showing.
    pub fn active(&self) -> Vec<NodeId> {
        self.toasts
            .borrow()
            .iter()
            .filter(|t| !t.dismissed)
            .map(|t| t.node)
            .collect()
    }

    /// Drive countdowns from a timer ticking every `tick`, pruning as it goes.
    /// Runs until the future is dropped.
    pub async fn run(&self, tick: Duration) {
        let mut ticks = interval(tick);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();
        loop {
            let now = ticks.tick().await;
            self.advance(now.saturating_duration_since(last));
            self.prune();
            last = now;
        }
    }
}

impl Widget for Toaster {
    fn widget_type(&self) -> &str {
        "toaster"
    }

    fn root(&self) -> NodeId {
        self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn toaster() -> Toaster {
        let dom = Dom::new();
        let t = Toaster::new(&dom, Duration::from_millis(7000)).unwrap();
        t.mount(&dom, dom.body());
        t
    }

    #[test]
    fn shows_message_as_text() {
        let t = toaster();
        let h = t.show("<b>saved</b>", ToastKind::Info, None).unwrap();
        assert!(t.dom.has_class(h.node(), "toast-info"));
        assert_eq!(t.dom.parent(h.node()), Some(t.root()));
        let content = t.dom.query_first_by_class(h.node(), "toast-content").unwrap();
        assert_eq!(t.dom.text_content(content), "<b>saved</b>");
        assert!(t.dom.query_by_tag(content, "b").is_empty());
    }

    #[test]
    fn timed_toast_expires() {
        let t = toaster();
        let mut h = t.info("hello").unwrap();
        t.advance(Duration::from_millis(3500));
        assert!(!h.is_dismissed());
        let timer = t.dom.query_first_by_class(h.node(), "toast-timer").unwrap();
        assert_eq!(t.dom.attr(timer, "value").as_deref(), Some("50"));

        t.advance(Duration::from_millis(3500));
        assert!(h.is_dismissed());
        assert!(t.dom.has_class(h.node(), "toast-dismissed"));
        assert!(t.active().is_empty());
    }

    #[test]
    fn hover_pauses_countdown() {
        let t = toaster();
        let mut h = t.show("hi", ToastKind::Info, Some(Duration::from_secs(1))).unwrap();
        t.dom.dispatch_event(h.node(), Event::new("mouseover"));
        t.advance(Duration::from_secs(5));
        assert!(!h.is_dismissed());
        t.dom.dispatch_event(h.node(), Event::new("mouseout"));
        t.advance(Duration::from_secs(1));
        assert!(h.is_dismissed());
    }

    #[test]
    fn modal_toast_needs_dismiss_click() {
        let t = toaster();
        let mut h = t.error("failed").unwrap();
        t.advance(Duration::from_secs(60));
        assert!(!h.is_dismissed());
        assert!(t.dom.query_first_by_class(h.node(), "toast-timer").is_none());

        let button = t.dom.query_first_by_class(h.node(), "toast-dismiss").unwrap();
        t.dom.click(button);
        assert!(h.is_dismissed());
    }

    #[test]
    fn prune_removes_dismissed_nodes() {
        let t = toaster();
        let a = t.error("a").unwrap();
        let b = t.error("b").unwrap();
        t.dismiss(a.node());
        t.prune();
        assert!(!t.dom.contains(a.node()));
        assert_eq!(t.dom.children(t.root()), vec![b.node()]);
        assert_eq!(t.active(), vec![b.node()]);
    }

    #[test]
    fn handle_resolves_on_dismiss() {
        let t = toaster();
        let h = t.error("x").unwrap();
        t.dismiss(h.node());
        tokio_test::block_on(h.dismissed());
    }

    #[tokio::test(start_paused = true)]
    async fn run_drives_timeouts() {
        let t = toaster();
        let h = t.show("tick", ToastKind::Info, Some(Duration::from_millis(300))).unwrap();
        let node = h.node();
        tokio::select! {
            _ = t.run(Duration::from_millis(100)) => unreachable!(),
            _ = h.dismissed() => {}
        }
        assert!(t.dom.has_class(node, "toast-dismissed"));
    }
}
