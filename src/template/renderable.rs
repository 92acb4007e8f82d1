//! Values that can be interpolated into a template.

use std::fmt;

use crate::dom::{Dom, NodeId};
use crate::event::{listener, Event, Listener};

/// One interpolated template value.
///
/// Interpolation is typed: markup is spliced into the source text, nodes are
/// adopted into the result at their position, and handlers bind to the `@event`
/// attribute they are placed in.
#[derive(Clone, Default)]
pub enum Renderable {
    /// Contributes nothing.
    #[default]
    Empty,
    /// Raw markup text, parsed together with the surrounding fragments.
    Markup(String),
    /// An existing node, moved into the result.
    Node(NodeId),
    /// Several values rendered in order.
    List(Vec<Renderable>),
    /// An event handler. Only valid as the value of an `@event` attribute.
    Handler(Listener),
}

impl Renderable {
    /// Wrap a closure as a handler value.
    pub fn handler(f: impl Fn(&Dom, &mut Event) + 'static) -> Self {
        Self::Handler(listener(f))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Markup(s) => s.is_empty(),
            Self::List(items) => items.iter().all(Renderable::is_empty),
            Self::Node(_) | Self::Handler(_) => false,
        }
    }
}

/// Shorthand for [`Renderable::handler`], for use inside `html!`.
pub fn on(f: impl Fn(&Dom, &mut Event) + 'static) -> Renderable {
    Renderable::handler(f)
}

impl fmt::Debug for Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Markup(s) => f.debug_tuple("Markup").field(s).finish(),
            Self::Node(id) => f.debug_tuple("Node").field(id).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl From<&str> for Renderable {
    fn from(s: &str) -> Self {
        Self::Markup(s.to_owned())
    }
}

impl From<String> for Renderable {
    fn from(s: String) -> Self {
        Self::Markup(s)
    }
}

impl From<&String> for Renderable {
    fn from(s: &String) -> Self {
        Self::Markup(s.clone())
    }
}

impl From<NodeId> for Renderable {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<Listener> for Renderable {
    fn from(l: Listener) -> Self {
        Self::Handler(l)
    }
}

impl<T: Into<Renderable>> From<Vec<T>> for Renderable {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Renderable>> From<Option<T>> for Renderable {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

macro_rules! impl_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Renderable {
                fn from(v: $ty) -> Self {
                    Self::Markup(v.to_string())
                }
            }
        )*
    };
}

impl_from_display!(i32, i64, u32, u64, usize, char);
