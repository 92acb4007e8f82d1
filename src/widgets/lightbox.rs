//! Lightbox: a full-page overlay showing one image, plus the items that open
//! it.
//!
//! Items and the overlay only talk through events on the document, so any
//! number of items can share one overlay:
//!
//! - an image item dispatches a bubbling `lightbox:show` whose detail is the
//!   image URI;
//! - the overlay listens on `<body>` for `lightbox:show` / `lightbox:hide` and
//!   their older spellings `lightbox-show` / `lightbox-hide`.
//!
//! An inline item ([`LightboxItem::wrap`]) highlights its own content in place
//! instead, and announces that with non-bubbling `lightbox-show` /
//! `lightbox-hide` events on its root.

use crate::dom::{Dom, NodeId};
use crate::event::names::{
    LIGHTBOX_HIDE, LIGHTBOX_HIDE_LEGACY, LIGHTBOX_SHOW, LIGHTBOX_SHOW_LEGACY,
};
use crate::event::Event;
use crate::reactive::Signal;
use crate::template::{escape, on, Renderable, TemplateError};
use crate::widget::Widget;
use crate::html;

// ---------------------------------------------------------------------------
// Lightbox
// ---------------------------------------------------------------------------

/// The overlay. Mount it once per page.
pub struct Lightbox {
    root: NodeId,
    visible: Signal<bool>,
    image: Signal<String>,
}

impl Lightbox {
    pub fn new(dom: &Dom) -> Result<Self, TemplateError> {
        let visible = Signal::new(false);
        let image = Signal::new(String::new());

        // Clicking the image itself must not follow a link; the click still
        // reaches the overlay and closes it.
        let img = html!(dom, r#"<img @click={}>"#, on(|_, ev| ev.prevent_default()))?;
        let hide = visible.clone();
        let root = html!(
            dom,
            r#"<div id="lightbox" @click={}>{}</div>"#,
            on(move |_, _| hide.set(false)),
            img,
        )?;

        let weak = dom.downgrade();
        visible.subscribe(move |shown, _| {
            if let Some(dom) = weak.upgrade() {
                dom.toggle_class(root, "active", Some(*shown));
            }
        });
        let weak = dom.downgrade();
        image.subscribe(move |src, _| {
            if let Some(dom) = weak.upgrade() {
                dom.set_attr(img, "src", src.as_str());
            }
        });

        let body = dom.body();
        for name in [LIGHTBOX_SHOW, LIGHTBOX_SHOW_LEGACY] {
            let (visible, image) = (visible.clone(), image.clone());
            dom.on(body, name, move |_, ev| {
                if let Some(src) = ev.detail() {
                    image.set(src.to_owned());
                    visible.set(true);
                }
            });
        }
        for name in [LIGHTBOX_HIDE, LIGHTBOX_HIDE_LEGACY] {
            let visible = visible.clone();
            dom.on(body, name, move |_, _| visible.set(false));
        }

        Ok(Self {
            root,
            visible,
            image,
        })
    }

    pub fn show(&self, src: impl Into<String>) {
        self.image.set(src.into());
        self.visible.set(true);
    }

    pub fn hide(&self) {
        self.visible.set(false);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// URI of the image currently shown (or last shown).
    pub fn image(&self) -> String {
        self.image.get()
    }

    pub fn visible_signal(&self) -> &Signal<bool> {
        &self.visible
    }
}

impl Widget for Lightbox {
    fn widget_type(&self) -> &str {
        "lightbox"
    }

    fn root(&self) -> NodeId {
        self.root
    }
}

// ---------------------------------------------------------------------------
// LightboxItem
// ---------------------------------------------------------------------------

/// Something that opens the lightbox when clicked.
pub struct LightboxItem {
    dom: Dom,
    root: NodeId,
}

impl LightboxItem {
    /// A thumbnail that opens the overlay on `src`.
    pub fn image(dom: &Dom, src: &str, alt: Option<&str>) -> Result<Self, TemplateError> {
        let uri = src.to_owned();
        let root = html!(
            dom,
            r#"<div class="lightbox-item" @click={}><img alt="{}" src="{}"></div>"#,
            on(move |dom, ev| {
                if let Some(item) = ev.current_target() {
                    dom.dispatch_event(item, Event::new(LIGHTBOX_SHOW).with_detail(uri.as_str()));
                }
            }),
            escape(alt.unwrap_or_default()),
            escape(src),
        )?;
        Ok(Self {
            dom: dom.clone(),
            root,
        })
    }

    /// Highlight `target` in place when clicked; a second click releases it.
    pub fn wrap(dom: &Dom, target: impl Into<Renderable>) -> Result<Self, TemplateError> {
        let target: Renderable = target.into();
        let root = html!(
            dom,
            r#"<div class="lightbox-item lightbox-inline" @click={}>{}</div>"#,
            on(|dom, ev| {
                if let Some(item) = ev.current_target() {
                    if dom.has_class(item, "active") {
                        hide_inline(dom, item);
                    } else {
                        show_inline(dom, item);
                    }
                }
            }),
            target,
        )?;
        Ok(Self {
            dom: dom.clone(),
            root,
        })
    }

    /// Open: image items ask the overlay, inline items highlight themselves.
    pub fn show(&self) {
        if self.is_inline() {
            show_inline(&self.dom, self.root);
        } else {
            self.dom.click(self.root);
        }
    }

    /// Close: image items ask the overlay, inline items release themselves.
    pub fn hide(&self) {
        if self.is_inline() {
            hide_inline(&self.dom, self.root);
        } else {
            self.dom.dispatch_event(self.root, Event::new(LIGHTBOX_HIDE));
        }
    }

    pub fn is_active(&self) -> bool {
        self.dom.has_class(self.root, "active")
    }

    fn is_inline(&self) -> bool {
        self.dom.has_class(self.root, "lightbox-inline")
    }
}

pub(crate) fn show_inline(dom: &Dom, item: NodeId) {
    if !dom.has_class(item, "active") {
        dom.add_class(item, "active");
        dom.dispatch_event(item, Event::local(LIGHTBOX_SHOW_LEGACY));
    }
}

pub(crate) fn hide_inline(dom: &Dom, item: NodeId) {
    if dom.has_class(item, "active") {
        dom.remove_class(item, "active");
        dom.dispatch_event(item, Event::local(LIGHTBOX_HIDE_LEGACY));
    }
}

impl Widget for LightboxItem {
    fn widget_type(&self) -> &str {
        "lightbox-item"
    }

    fn root(&self) -> NodeId {
        self.root
    }
}
