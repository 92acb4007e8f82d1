//! Per-widget action queue.
//!
//! Listeners run synchronously inside dispatch and cannot await, so they push
//! an action here. The widget drains the queue with `process_pending` or
//! `run`, which applies actions one at a time in arrival order.

use std::cell::Cell;

use tokio::sync::{mpsc, Mutex, Notify};

pub(crate) struct ActionQueue<A> {
    tx: mpsc::UnboundedSender<A>,
    rx: Mutex<mpsc::UnboundedReceiver<A>>,
    closed: Cell<bool>,
    wake: Notify,
}

impl<A> ActionQueue<A> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            closed: Cell::new(false),
            wake: Notify::new(),
        }
    }

    /// A sender for listeners to capture.
    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    pub(crate) fn push(&self, action: A) {
        // The receiver lives as long as `self`, so this cannot fail.
        let _ = self.tx.send(action);
    }

    /// Next queued action without waiting.
    pub(crate) fn try_next(&self) -> Option<A> {
        if self.closed.get() {
            return None;
        }
        self.rx.try_lock().ok()?.try_recv().ok()
    }

    /// Wait for the next action. `None` once the queue is closed.
    pub(crate) async fn next(&self) -> Option<A> {
        if self.closed.get() {
            return None;
        }
        let mut rx = self.rx.lock().await;
        tokio::select! {
            biased;
            action = rx.recv() => action,
            _ = self.wake.notified() => None,
        }
    }

    /// Stop `next` from waiting; pending and future actions are dropped.
    pub(crate) fn close(&self) {
        self.closed.set(true);
        self.wake.notify_one();
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

/// Send on a listener-held sender, ignoring a dropped widget.
pub(crate) fn send<A>(tx: &mpsc::UnboundedSender<A>, action: A) {
    if tx.send(action).is_err() {
        tracing::debug!("widget dropped, action discarded");
    }
}
