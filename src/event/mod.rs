//! Events: the event object, listeners, bubbling dispatch, custom event names.

pub mod dispatch;
pub mod names;
mod types;

pub use dispatch::bubble_path;
pub use types::{listener, Event, Listener, ListenerId};
