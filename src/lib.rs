//! # folio
//!
//! The interactive parts of a personal portfolio site, running against an
//! in-process document instead of a browser.
//!
//! folio renders markup templates into a retained DOM, wires widgets together
//! with custom events and [`Signal`](reactive::Signal)s, and talks to the
//! site's comment and session endpoints over HTTP. Pages can be rendered back
//! to HTML without a browser.
//!
//! ## Core Systems
//!
//! - **[`dom`]**: slotmap-backed document arena with queries and serialization
//! - **[`event`]**: events, bubbling dispatch, custom event names
//! - **[`template`]**: markup templates with typed slots (see [`html!`])
//! - **[`reactive`]**: `Signal<T>` observable values
//! - **[`api`]**: the site's HTTP endpoints behind the `SiteApi` trait
//! - **[`widget`]** / **[`widgets`]**: the page components
//! - **[`site`]**: the assembled page
//! - **[`config`]**, **[`logging`]**: configuration and tracing setup
//! - **[`testing`]**: in-memory backend and navigator for headless tests
//!
//! ## Example
//!
//! ```ignore
//! use folio::{html, template::on, dom::Dom};
//!
//! let dom = Dom::new();
//! let button = html!(dom, r#"<button @click={}>Hi</button>"#, on(|_, _| println!("hi")))?;
//! dom.append_child(dom.body(), button);
//! ```

extern crate self as folio;

// Document
pub mod dom;
pub mod event;
pub mod template;

// State and data
pub mod api;
pub mod reactive;

// Widget system
pub mod widget;
pub mod widgets;

// Application
pub mod config;
pub mod logging;
pub mod site;
pub mod testing;

pub use folio_macros::{html, html_fragment};
