//! Widget trait: the common surface of every page component.

pub mod traits;

pub use traits::Widget;
