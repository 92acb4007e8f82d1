//! Streaming tree builder fed with markup text and typed slots.
//!
//! The builder keeps its lexer mode across feeds, so a slot can sit between two
//! markup chunks anywhere: in text content, inside an attribute value, or in
//! tag position.

use logos::Logos;

use super::tokenizer::{decode_char_ref, ContentToken, TagToken, UnquotedToken, ValueToken};
use super::TemplateError;
use crate::dom::{is_void, Attribute, Dom, ElementData, NodeData, NodeId};
use crate::event::Listener;

const WHITESPACE: [char; 5] = [' ', '\t', '\n', '\r', '\x0c'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Content,
    Tag,
    Value(Quote),
    Unquoted,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrState {
    /// Name seen, no `=` yet.
    Named,
    /// `=` seen, value pending.
    AwaitingValue,
}

enum ValuePart {
    Text(String),
    Handler { index: usize, listener: Listener },
}

struct PendingAttr {
    name: String,
    state: AttrState,
    parts: Vec<ValuePart>,
}

impl PendingAttr {
    fn push_text(&mut self, text: &str) {
        if let Some(ValuePart::Text(buf)) = self.parts.last_mut() {
            buf.push_str(text);
        } else {
            self.parts.push(ValuePart::Text(text.to_owned()));
        }
    }
}

struct PendingTag {
    name: String,
    attributes: Vec<Attribute>,
    handlers: Vec<(String, Listener)>,
    attr: Option<PendingAttr>,
}

/// Builds nodes in a [`Dom`] from a stream of markup and slots.
pub(crate) struct TreeBuilder<'d> {
    dom: &'d Dom,
    mode: Mode,
    text: String,
    tag: Option<PendingTag>,
    open: Vec<(NodeId, String)>,
    top_level: Vec<NodeId>,
    adopted: Vec<NodeId>,
}

impl<'d> TreeBuilder<'d> {
    pub(crate) fn new(dom: &'d Dom) -> Self {
        Self {
            dom,
            mode: Mode::Content,
            text: String::new(),
            tag: None,
            open: Vec::new(),
            top_level: Vec::new(),
            adopted: Vec::new(),
        }
    }

    /// Feed a chunk of markup text.
    pub(crate) fn feed_markup(&mut self, src: &str) -> Result<(), TemplateError> {
        let mut rest = src;
        while !rest.is_empty() {
            let consumed = match self.mode {
                Mode::Content => self.lex_content(rest),
                Mode::Tag => self.lex_tag(rest)?,
                Mode::Value(quote) => self.lex_value(rest, quote)?,
                Mode::Unquoted => self.lex_unquoted(rest)?,
                Mode::Comment => self.lex_comment(rest),
            };
            rest = &rest[consumed..];
        }
        Ok(())
    }

    /// Place an existing node at the current position.
    pub(crate) fn feed_node(&mut self, index: usize, node: NodeId) -> Result<(), TemplateError> {
        match self.mode {
            Mode::Content => {
                self.flush_text();
                self.adopted.push(node);
                self.append(node);
                Ok(())
            }
            // A node inside a comment is commented out.
            Mode::Comment => Ok(()),
            Mode::Tag => Err(TemplateError::MisplacedSlot {
                index,
                context: "tag",
            }),
            Mode::Value(_) | Mode::Unquoted => Err(TemplateError::MisplacedSlot {
                index,
                context: "attribute value",
            }),
        }
    }

    /// Place an event handler at the current position.
    pub(crate) fn feed_handler(
        &mut self,
        index: usize,
        listener: Listener,
    ) -> Result<(), TemplateError> {
        match self.mode {
            Mode::Value(_) | Mode::Unquoted => {
                if let Some(attr) = self.tag.as_mut().and_then(|t| t.attr.as_mut()) {
                    attr.parts.push(ValuePart::Handler { index, listener });
                }
                Ok(())
            }
            Mode::Tag => {
                let awaiting = self
                    .tag
                    .as_ref()
                    .and_then(|t| t.attr.as_ref())
                    .is_some_and(|a| a.state == AttrState::AwaitingValue);
                if !awaiting {
                    return Err(TemplateError::MisplacedSlot {
                        index,
                        context: "tag",
                    });
                }
                if let Some(attr) = self.tag.as_mut().and_then(|t| t.attr.as_mut()) {
                    attr.parts.push(ValuePart::Handler { index, listener });
                }
                self.finish_attr()
            }
            Mode::Content => Err(TemplateError::MisplacedSlot {
                index,
                context: "text content",
            }),
            Mode::Comment => Ok(()),
        }
    }

    /// Nodes adopted from interpolated values so far.
    pub(crate) fn adopted(&self) -> Vec<NodeId> {
        self.adopted.clone()
    }

    /// End of input. Returns the top-level nodes.
    pub(crate) fn finish(mut self) -> Result<Vec<NodeId>, TemplateError> {
        if let Some(tag) = &self.tag {
            let err = TemplateError::UnterminatedTag {
                tag: tag.name.clone(),
            };
            self.abort();
            return Err(err);
        }
        self.flush_text();
        self.open.clear();
        Ok(std::mem::take(&mut self.top_level))
    }

    /// Undo everything built so far: adopted nodes are detached and left
    /// alive, created nodes are freed.
    pub(crate) fn abort(&mut self) {
        for &node in &self.adopted {
            self.dom.detach(node);
        }
        for node in self.top_level.drain(..) {
            if !self.adopted.contains(&node) {
                self.dom.remove(node);
            }
        }
        self.adopted.clear();
        self.open.clear();
        self.tag = None;
        self.text.clear();
    }

    fn lex_content(&mut self, src: &str) -> usize {
        let mut lexer = ContentToken::lexer(src);
        while let Some(token) = lexer.next() {
            let slice = lexer.slice();
            match token {
                Ok(ContentToken::Text) | Ok(ContentToken::Stray) | Err(()) => {
                    self.text.push_str(slice);
                }
                Ok(ContentToken::CharRef) => match decode_char_ref(slice) {
                    Some(decoded) => self.text.push_str(&decoded),
                    None => self.text.push_str(slice),
                },
                Ok(ContentToken::EndTag) => {
                    let name = slice[2..slice.len() - 1].trim_end().to_ascii_lowercase();
                    self.flush_text();
                    self.close_element(&name);
                }
                Ok(ContentToken::StartTagOpen) => {
                    self.tag = Some(PendingTag {
                        name: slice[1..].to_ascii_lowercase(),
                        attributes: Vec::new(),
                        handlers: Vec::new(),
                        attr: None,
                    });
                    self.mode = Mode::Tag;
                    return lexer.span().end;
                }
                Ok(ContentToken::CommentOpen) => {
                    self.mode = Mode::Comment;
                    return lexer.span().end;
                }
            }
        }
        src.len()
    }

    fn lex_tag(&mut self, src: &str) -> Result<usize, TemplateError> {
        let mut lexer = TagToken::lexer(src);
        loop {
            if self.pending_attr_state() == Some(AttrState::AwaitingValue) {
                let value = src[lexer.span().end..].trim_start_matches(WHITESPACE);
                if !value.is_empty() && !value.starts_with(['"', '\'', '>']) {
                    self.mode = Mode::Unquoted;
                    return Ok(src.len() - value.len());
                }
            }
            let Some(token) = lexer.next() else {
                break;
            };
            let slice = lexer.slice();
            match token {
                Ok(TagToken::Name) => {
                    let awaiting = self.pending_attr_state() == Some(AttrState::AwaitingValue);
                    if awaiting {
                        if let Some(attr) = self.pending_attr() {
                            attr.push_text(slice);
                        }
                        self.finish_attr()?;
                    } else {
                        self.finish_attr()?;
                        if let Some(tag) = self.tag.as_mut() {
                            tag.attr = Some(PendingAttr {
                                name: slice.to_owned(),
                                state: AttrState::Named,
                                parts: Vec::new(),
                            });
                        }
                    }
                }
                Ok(TagToken::Equals) => {
                    if let Some(attr) = self.pending_attr() {
                        if attr.state == AttrState::Named {
                            attr.state = AttrState::AwaitingValue;
                        }
                    }
                }
                Ok(quote @ (TagToken::DoubleQuote | TagToken::SingleQuote)) => {
                    if self.pending_attr_state() == Some(AttrState::AwaitingValue) {
                        self.mode = Mode::Value(if quote == TagToken::DoubleQuote {
                            Quote::Double
                        } else {
                            Quote::Single
                        });
                        return Ok(lexer.span().end);
                    }
                }
                Ok(TagToken::Close) => {
                    self.finish_attr()?;
                    self.emit_start_tag(false);
                    self.mode = Mode::Content;
                    return Ok(lexer.span().end);
                }
                Ok(TagToken::SelfClose) => {
                    self.finish_attr()?;
                    self.emit_start_tag(true);
                    self.mode = Mode::Content;
                    return Ok(lexer.span().end);
                }
                Ok(TagToken::Stray) | Err(()) => {}
            }
        }
        Ok(src.len())
    }

    fn lex_value(&mut self, src: &str, quote: Quote) -> Result<usize, TemplateError> {
        let mut lexer = ValueToken::lexer(src);
        while let Some(token) = lexer.next() {
            let slice = lexer.slice();
            let closes = matches!(
                (token, quote),
                (Ok(ValueToken::DoubleQuote), Quote::Double)
                    | (Ok(ValueToken::SingleQuote), Quote::Single)
            );
            if closes {
                self.finish_attr()?;
                self.mode = Mode::Tag;
                return Ok(lexer.span().end);
            }
            let decoded = match token {
                Ok(ValueToken::CharRef) => decode_char_ref(slice),
                _ => None,
            };
            if let Some(attr) = self.pending_attr() {
                attr.push_text(decoded.as_deref().unwrap_or(slice));
            }
        }
        Ok(src.len())
    }

    fn lex_unquoted(&mut self, src: &str) -> Result<usize, TemplateError> {
        let mut lexer = UnquotedToken::lexer(src);
        while let Some(token) = lexer.next() {
            let slice = lexer.slice();
            match token {
                Ok(UnquotedToken::Space) => {
                    self.finish_attr()?;
                    self.mode = Mode::Tag;
                    return Ok(lexer.span().end);
                }
                Ok(UnquotedToken::Close) => {
                    self.finish_attr()?;
                    self.emit_start_tag(false);
                    self.mode = Mode::Content;
                    return Ok(lexer.span().end);
                }
                Ok(UnquotedToken::CharRef) => {
                    let decoded = decode_char_ref(slice);
                    if let Some(attr) = self.pending_attr() {
                        attr.push_text(decoded.as_deref().unwrap_or(slice));
                    }
                }
                Ok(UnquotedToken::Text) | Ok(UnquotedToken::Amp) | Err(()) => {
                    if let Some(attr) = self.pending_attr() {
                        attr.push_text(slice);
                    }
                }
            }
        }
        Ok(src.len())
    }

    fn lex_comment(&mut self, src: &str) -> usize {
        match src.find("-->") {
            Some(pos) => {
                self.mode = Mode::Content;
                pos + 3
            }
            None => src.len(),
        }
    }

    fn pending_attr(&mut self) -> Option<&mut PendingAttr> {
        self.tag.as_mut().and_then(|t| t.attr.as_mut())
    }

    fn pending_attr_state(&self) -> Option<AttrState> {
        self.tag.as_ref().and_then(|t| t.attr.as_ref()).map(|a| a.state)
    }

    /// Complete the pending attribute, turning `@event` attributes into
    /// handler bindings.
    fn finish_attr(&mut self) -> Result<(), TemplateError> {
        let Some(tag) = self.tag.as_mut() else {
            return Ok(());
        };
        let Some(attr) = tag.attr.take() else {
            return Ok(());
        };

        if let Some(event) = attr.name.strip_prefix('@') {
            let mut listeners = Vec::new();
            let mut stray_text = false;
            for part in attr.parts {
                match part {
                    ValuePart::Handler { listener, .. } => listeners.push(listener),
                    ValuePart::Text(t) => stray_text |= !t.trim().is_empty(),
                }
            }
            if event.is_empty() || stray_text || listeners.len() != 1 {
                return Err(TemplateError::MissingEventHandler {
                    attribute: attr.name,
                });
            }
            if let Some(listener) = listeners.pop() {
                tag.handlers.push((event.to_ascii_lowercase(), listener));
            }
            return Ok(());
        }

        let mut value = String::new();
        for part in attr.parts {
            match part {
                ValuePart::Text(t) => value.push_str(&t),
                ValuePart::Handler { index, .. } => {
                    return Err(TemplateError::MisplacedSlot {
                        index,
                        context: "attribute value",
                    });
                }
            }
        }
        let name = attr.name.to_ascii_lowercase();
        // First occurrence wins, as in HTML.
        if !tag.attributes.iter().any(|a| a.name == name) {
            tag.attributes.push(Attribute { name, value });
        }
        Ok(())
    }

    fn emit_start_tag(&mut self, self_closing: bool) {
        let Some(tag) = self.tag.take() else {
            return;
        };
        self.flush_text();

        let mut element = ElementData::new(&tag.name);
        element.attributes = tag.attributes;
        let node = self.dom.insert(NodeData::Element(element));
        for (event, listener) in tag.handlers {
            self.dom.add_event_listener(node, &event, listener);
        }
        self.append(node);

        if !(self_closing || is_void(&tag.name)) {
            self.open.push((node, tag.name));
        }
    }

    fn close_element(&mut self, name: &str) {
        // An end tag with no matching open element is ignored.
        if let Some(pos) = self.open.iter().rposition(|(_, open)| open == name) {
            self.open.truncate(pos);
        }
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        if self.open.is_empty() && text.trim().is_empty() {
            return;
        }
        let node = self.dom.create_text(text);
        self.append(node);
    }

    fn append(&mut self, node: NodeId) {
        match self.open.last() {
            Some(&(parent, _)) => self.dom.append_child(parent, node),
            None => {
                self.dom.detach(node);
                self.top_level.push(node);
            }
        }
    }
}
