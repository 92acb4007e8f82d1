//! Read-more box: long content that can be collapsed to a fixed height.

use crate::dom::{Dom, NodeId};
use crate::event::names::{READMORE_COLLAPSE, READMORE_EXPAND};
use crate::event::Event;
use crate::html;
use crate::template::{Renderable, TemplateError};
use crate::widget::Widget;

/// Wraps content in `<div class="readmore collapsed">`. Starts collapsed.
///
/// State changes dispatch `readmore-expand` / `readmore-collapse` on the root.
/// They do not bubble.
pub struct ReadMore {
    dom: Dom,
    root: NodeId,
}

impl ReadMore {
    pub fn new(dom: &Dom, content: impl Into<Renderable>) -> Result<Self, TemplateError> {
        let content: Renderable = content.into();
        let root = html!(dom, r#"<div class="readmore collapsed">{}</div>"#, content)?;
        Ok(Self {
            dom: dom.clone(),
            root,
        })
    }

    pub fn is_expanded(&self) -> bool {
        !self.dom.has_class(self.root, "collapsed")
    }

    /// Expand. A no-op when already expanded.
    pub fn expand(&self) {
        expand(&self.dom, self.root);
    }

    /// Collapse. A no-op when already collapsed.
    pub fn collapse(&self) {
        collapse(&self.dom, self.root);
    }
}

/// Expand the read-more rooted at `root`.
pub fn expand(dom: &Dom, root: NodeId) {
    if !dom.has_class(root, "collapsed") {
        return;
    }
    dom.remove_class(root, "collapsed");
    dom.dispatch_event(root, Event::local(READMORE_EXPAND));
}

/// Collapse the read-more rooted at `root`.
pub fn collapse(dom: &Dom, root: NodeId) {
    if dom.has_class(root, "collapsed") {
        return;
    }
    dom.add_class(root, "collapsed");
    dom.dispatch_event(root, Event::local(READMORE_COLLAPSE));
}

impl Widget for ReadMore {
    fn widget_type(&self) -> &str {
        "readmore"
    }

    fn root(&self) -> NodeId {
        self.root
    }
}
