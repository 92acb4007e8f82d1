//! Labeled input: a `<label>` followed by an `<input>` or `<textarea>`.
//!
//! The label doubles as a placeholder. It carries `empty` while the field is
//! empty, `focused` while the field has focus, and `soft` when it should fade
//! out instead of moving aside.

use crate::dom::{Dom, NodeId};
use crate::event::Event;
use crate::html;
use crate::template::{escape, TemplateError};
use crate::widget::Widget;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputKind {
    #[default]
    Text,
    Number,
    Email,
    TextArea,
}

impl InputKind {
    fn type_attr(self) -> &'static str {
        match self {
            Self::Text | Self::TextArea => "text",
            Self::Number => "number",
            Self::Email => "email",
        }
    }
}

/// Options for [`LabeledInput::new`].
#[derive(Debug, Clone)]
pub struct LabeledInputOptions {
    pub label: String,
    pub id: String,
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub kind: InputKind,
    pub value: Option<String>,
    pub soft: bool,
}

impl LabeledInputOptions {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
            name: None,
            class_name: None,
            kind: InputKind::Text,
            value: None,
            soft: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_name = Some(class.into());
        self
    }

    pub fn with_kind(mut self, kind: InputKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn soft(mut self, soft: bool) -> Self {
        self.soft = soft;
        self
    }
}

pub struct LabeledInput {
    dom: Dom,
    label: NodeId,
    input: NodeId,
}

impl LabeledInput {
    pub fn new(dom: &Dom, options: LabeledInputOptions) -> Result<Self, TemplateError> {
        let id = escape(&options.id);
        let label_text = escape(&options.label);
        let name = escape(options.name.as_deref().unwrap_or(&options.id));
        let value = options.value.as_deref().map(escape).unwrap_or_default();

        let label = html!(
            dom,
            r#"<label for="{}" class="input-label">{}</label>"#,
            id.as_str(),
            label_text.as_str(),
        )?;
        if options.soft {
            dom.add_class(label, "soft");
        }
        if value.is_empty() {
            dom.add_class(label, "empty");
        }

        let input = match options.kind {
            InputKind::TextArea => html!(
                dom,
                r#"<textarea id="{}" name="{}" placeholder="{}">{}</textarea>"#,
                id.as_str(),
                name.as_str(),
                label_text.as_str(),
                value.as_str(),
            )?,
            kind => html!(
                dom,
                r#"<input id="{}" name="{}" type="{}" value="{}" placeholder="{}">"#,
                id.as_str(),
                name.as_str(),
                kind.type_attr(),
                value.as_str(),
                label_text.as_str(),
            )?,
        };
        if let Some(class) = &options.class_name {
            dom.add_class(input, class);
        }

        dom.on(input, "focus", move |dom, _| dom.add_class(label, "focused"));
        dom.on(input, "blur", move |dom, _| dom.remove_class(label, "focused"));
        dom.on(input, "input", move |dom, _| {
            let empty = dom.value(input).is_empty();
            dom.toggle_class(label, "empty", Some(empty));
        });

        Ok(Self {
            dom: dom.clone(),
            label,
            input,
        })
    }

    pub fn label(&self) -> NodeId {
        self.label
    }

    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn value(&self) -> String {
        self.dom.value(self.input)
    }

    /// Set the value as if the user typed it, firing `input`.
    pub fn set_value(&self, value: &str) {
        self.dom.set_value(self.input, value);
        self.dom.dispatch_event(self.input, Event::new("input"));
    }

    pub fn clear(&self) {
        self.set_value("");
    }
}

impl Widget for LabeledInput {
    fn widget_type(&self) -> &str {
        "labeled-input"
    }

    fn root(&self) -> NodeId {
        self.label
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.label, self.input]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_label_and_input() {
        let dom = Dom::new();
        let field = LabeledInput::new(
            &dom,
            LabeledInputOptions::new("Name", "comment-name").with_name("name"),
        )
        .unwrap();
        assert_snapshot!(
            field.render_html(&dom),
            @r#"<label for="comment-name" class="input-label soft empty">Name</label><input id="comment-name" name="name" type="text" value="" placeholder="Name">"#
        );
    }

    #[test]
    fn textarea_holds_value_as_text() {
        let dom = Dom::new();
        let field = LabeledInput::new(
            &dom,
            LabeledInputOptions::new("Comment", "comment-content")
                .with_kind(InputKind::TextArea)
                .with_value("a < b")
                .soft(false),
        )
        .unwrap();
        assert_eq!(dom.tag(field.input()).as_deref(), Some("textarea"));
        assert_eq!(field.value(), "a < b");
        assert!(!dom.has_class(field.label(), "empty"));
        assert!(!dom.has_class(field.label(), "soft"));
    }

    #[test]
    fn focus_and_blur_toggle_label() {
        let dom = Dom::new();
        let field = LabeledInput::new(&dom, LabeledInputOptions::new("Email", "e")).unwrap();
        dom.dispatch_event(field.input(), Event::local("focus"));
        assert!(dom.has_class(field.label(), "focused"));
        dom.dispatch_event(field.input(), Event::local("blur"));
        assert!(!dom.has_class(field.label(), "focused"));
    }

    #[test]
    fn typing_clears_empty_class() {
        let dom = Dom::new();
        let field = LabeledInput::new(&dom, LabeledInputOptions::new("Name", "n")).unwrap();
        field.set_value("Ada");
        assert!(!dom.has_class(field.label(), "empty"));
        assert_eq!(field.value(), "Ada");
        field.clear();
        assert!(dom.has_class(field.label(), "empty"));
    }

    #[test]
    fn label_text_is_escaped() {
        let dom = Dom::new();
        let field =
            LabeledInput::new(&dom, LabeledInputOptions::new("<i>x</i>", "q").with_class("wide"))
                .unwrap();
        assert_eq!(dom.text_content(field.label()), "<i>x</i>");
        assert!(dom.has_class(field.input(), "wide"));
    }
}
