//! `Signal<T>`: a value plus an ordered list of change handlers.
//!
//! Single-threaded and synchronous. Handlers run inside `set` before it
//! returns, in subscription order. The handler list is snapshotted before each
//! notification and no borrow is held while a handler runs, so handlers may
//! read or write the signal and subscribe or unsubscribe freely.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// A change handler, called with `(new, old)`.
type Handler<T> = Rc<dyn Fn(&T, &T)>;

/// Identifies one subscription on a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner<T> {
    value: RefCell<T>,
    handlers: RefCell<Vec<(SubscriptionId, Handler<T>)>>,
    next_id: Cell<u64>,
}

/// An observable value. Clones share the same value and handlers.
pub struct Signal<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.handlers.borrow().len())
            .finish()
    }
}

impl<T: Default + Clone + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                handlers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// The current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Read the current value by reference.
    ///
    /// Do not write to the signal from `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store `value` and notify every handler with `(value, previous)`.
    ///
    /// Handlers are notified even when the value did not change. A panicking
    /// handler propagates and the remaining handlers are skipped.
    pub fn set(&self, value: T) {
        let old = self.inner.value.replace(value);
        self.notify(&old);
    }

    /// Mutate the value in place, then notify.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let old = {
            let mut value = self.inner.value.borrow_mut();
            let old = value.clone();
            f(&mut value);
            old
        };
        self.notify(&old);
    }

    /// Register a handler for future writes.
    pub fn subscribe(&self, handler: impl Fn(&T, &T) + 'static) -> Subscription<T> {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .handlers
            .borrow_mut()
            .push((id, Rc::new(handler)));
        Subscription {
            id,
            signal: Rc::downgrade(&self.inner),
        }
    }

    /// Remove a handler. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_handler(&self.inner, id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    fn notify(&self, old: &T) {
        let snapshot: Vec<Handler<T>> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        if snapshot.is_empty() {
            return;
        }
        let new = self.get();
        for handler in snapshot {
            handler(&new, old);
        }
    }
}

fn remove_handler<T>(inner: &Inner<T>, id: SubscriptionId) -> bool {
    let mut handlers = inner.handlers.borrow_mut();
    let before = handlers.len();
    handlers.retain(|(hid, _)| *hid != id);
    before != handlers.len()
}

/// Handle returned by [`Signal::subscribe`].
///
/// Dropping it keeps the handler registered; call [`Subscription::unsubscribe`]
/// to remove it.
pub struct Subscription<T> {
    id: SubscriptionId,
    signal: Weak<Inner<T>>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the handler. Returns `true` if it was still registered.
    pub fn unsubscribe(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|inner| remove_handler(&inner, self.id))
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
