//! Reactive state.
//!
//! [`Signal`] is an observable value box: every write synchronously notifies
//! the subscribed handlers with the new and previous value.

pub mod signal;

pub use signal::{Signal, Subscription, SubscriptionId};
