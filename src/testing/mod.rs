//! Test doubles: an in-memory [`SiteApi`](crate::api::SiteApi) and a
//! [`Navigator`](crate::widgets::authentication::Navigator) that records what
//! it was asked to open.
//!
//! Both let widgets run headless, without a server or a browser window.

pub mod memory;
pub mod navigator;

pub use memory::{Endpoint, MemoryApi, Request};
pub use navigator::RecordingNavigator;
