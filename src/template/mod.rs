//! Template rendering: literal fragments plus typed interpolations in, live
//! document nodes out.
//!
//! ```ignore
//! let count = dom.create_text("3");
//! let li = folio::html!(dom, r#"<li class="comment">{} votes <button @click={}>+</button></li>"#,
//!     count,
//!     folio::template::on(|_, _| println!("vote")),
//! )?;
//! ```
//!
//! String values are parsed as markup together with the surrounding fragments.
//! Nodes are adopted by identity, so their listeners keep firing. Handlers are
//! only accepted as the value of an `@event` attribute, which registers them
//! on the element instead of writing an attribute.

mod parser;
mod renderable;
pub mod tokenizer;

pub use renderable::{on, Renderable};

use crate::dom::{Dom, NodeId};
use parser::TreeBuilder;

/// Errors produced while rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A single-root render produced zero or several top-level elements.
    #[error("template must produce exactly one top-level element, got {count}")]
    InvalidTemplateShape { count: usize },

    /// An `@event` attribute whose value is not exactly one handler.
    #[error("event attribute `{attribute}` needs exactly one handler value")]
    MissingEventHandler { attribute: String },

    /// A node in tag or attribute position, or a handler outside an
    /// attribute value.
    #[error("interpolated value {index} cannot appear in {context}")]
    MisplacedSlot { index: usize, context: &'static str },

    /// Input ended inside a start tag.
    #[error("template ends inside the `<{tag}` tag")]
    UnterminatedTag { tag: String },

    /// Fragments must outnumber values by exactly one.
    #[error("{fragments} fragments cannot surround {values} values")]
    SlotCountMismatch { fragments: usize, values: usize },
}

/// Render a template to its top-level nodes.
///
/// Whitespace-only text between top-level nodes is dropped. On error nothing
/// created by this call survives and interpolated nodes are left detached.
pub fn html_fragment(
    dom: &Dom,
    fragments: &[&str],
    values: Vec<Renderable>,
) -> Result<Vec<NodeId>, TemplateError> {
    render(dom, fragments, values).map(|r| r.nodes)
}

/// Render a template that must produce exactly one top-level element.
///
/// Top-level text around the element is not part of the result and is
/// discarded.
pub fn html_element(
    dom: &Dom,
    fragments: &[&str],
    values: Vec<Renderable>,
) -> Result<NodeId, TemplateError> {
    let rendered = render(dom, fragments, values)?;
    let elements: Vec<NodeId> = rendered
        .nodes
        .iter()
        .copied()
        .filter(|&node| dom.tag(node).is_some())
        .collect();
    match elements.as_slice() {
        [single] => {
            rendered.discard_except(dom, Some(*single));
            Ok(*single)
        }
        _ => {
            rendered.discard_except(dom, None);
            Err(TemplateError::InvalidTemplateShape {
                count: elements.len(),
            })
        }
    }
}

/// Parse a plain markup string, such as pre-rendered article HTML.
pub fn parse_html(dom: &Dom, markup: &str) -> Result<Vec<NodeId>, TemplateError> {
    html_fragment(dom, &[markup], Vec::new())
}

/// Escape text for splicing into markup, in content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

struct Rendered {
    nodes: Vec<NodeId>,
    adopted: Vec<NodeId>,
}

impl Rendered {
    /// Drop every top-level node except `keep`. Adopted nodes are detached,
    /// created ones freed.
    fn discard_except(self, dom: &Dom, keep: Option<NodeId>) {
        // Adopted nodes leave before their created parents are freed.
        if keep.is_none() {
            for &node in &self.adopted {
                dom.detach(node);
            }
        }
        for node in self.nodes {
            if Some(node) == keep {
                continue;
            }
            if self.adopted.contains(&node) {
                dom.detach(node);
            } else {
                dom.remove(node);
            }
        }
    }
}

fn render(
    dom: &Dom,
    fragments: &[&str],
    values: Vec<Renderable>,
) -> Result<Rendered, TemplateError> {
    if fragments.len() != values.len() + 1 {
        return Err(TemplateError::SlotCountMismatch {
            fragments: fragments.len(),
            values: values.len(),
        });
    }

    let mut builder = TreeBuilder::new(dom);
    let mut values = values.into_iter();
    for (index, fragment) in fragments.iter().enumerate() {
        let fed = builder.feed_markup(fragment).and_then(|()| match values.next() {
            Some(value) => feed_value(&mut builder, index, value),
            None => Ok(()),
        });
        if let Err(err) = fed {
            builder.abort();
            return Err(err);
        }
    }
    let adopted = builder.adopted();
    let nodes = builder.finish()?;
    Ok(Rendered { nodes, adopted })
}

/// Feed one value, flattening lists in place under the caller's index.
fn feed_value(
    builder: &mut TreeBuilder<'_>,
    index: usize,
    value: Renderable,
) -> Result<(), TemplateError> {
    match value {
        Renderable::Empty => Ok(()),
        Renderable::Markup(markup) => builder.feed_markup(&markup),
        Renderable::Node(node) => builder.feed_node(index, node),
        Renderable::Handler(listener) => builder.feed_handler(index, listener),
        Renderable::List(items) => items
            .into_iter()
            .try_for_each(|item| feed_value(builder, index, item)),
    }
}
