//! Node types: NodeId, NodeData, ElementData.

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Elements that never have children and are serialized without an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Whether `tag` names a void element.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// A single `name="value"` pair on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Data associated with a single DOM node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

impl NodeData {
    /// The element payload, if this is an element node.
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    /// Mutable element payload, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    /// The text payload, if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeData::Element(_))
    }
}

impl From<ElementData> for NodeData {
    fn from(el: ElementData) -> Self {
        NodeData::Element(el)
    }
}

/// Tag name plus ordered attributes. Classes live in the `class` attribute,
/// exactly as in HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<Attribute>,
}

impl ElementData {
    /// Create an element with the given tag name (lowercased).
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    /// Set an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set the `id` attribute (builder).
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr("id", id)
    }

    /// Add a single class (builder).
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing an existing value in place so attribute
    /// order stays stable.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Remove an attribute. Returns the old value if it was present.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(pos).value)
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Iterate over the whitespace-separated classes.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut classes: Vec<&str> = self.classes().collect();
        classes.push(class);
        let joined = classes.join(" ");
        self.set_attr("class", joined);
    }

    /// Remove a class. No-op if not present. An emptied list keeps the
    /// attribute with an empty value, like `classList.remove`.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let joined = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", joined);
    }

    /// Toggle a class. With `force`, add (`Some(true)`) or remove
    /// (`Some(false)`) unconditionally. Returns whether the class is present
    /// afterwards.
    pub fn toggle_class(&mut self, class: &str, force: Option<bool>) -> bool {
        let add = force.unwrap_or(!self.has_class(class));
        if add {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
        add
    }

    /// Whether this is a void element.
    pub fn is_void(&self) -> bool {
        is_void(&self.tag)
    }
}
