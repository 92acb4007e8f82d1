//! Retained document: slotmap-backed node arena with element/text nodes,
//! attributes, classes, listeners, queries and HTML serialization.

pub mod node;
pub mod query;
pub mod serialize;
pub mod tree;

pub use node::{is_void, Attribute, ElementData, NodeData, NodeId};
pub use tree::{Dom, WeakDom};
