//! logos-based markup tokenizer.
//!
//! Markup is lexed in four modes, one token enum each, because the same
//! character means different things depending on where the parser is:
//!
//! - [`ContentToken`]: between tags (text, start/end tags, comments).
//! - [`TagToken`]: inside a start tag (attribute names, `=`, quotes, `>`).
//! - [`ValueToken`]: inside a quoted attribute value.
//! - [`UnquotedToken`]: inside an unquoted attribute value, where `/` is
//!   ordinary text.
//!
//! Logos picks the longest match, so `<div` is one [`ContentToken::StartTagOpen`]
//! rather than a stray `<` followed by text, and `/>` beats `/`.

use logos::Logos;

/// Token produced between tags.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentToken {
    /// `<!--`
    #[token("<!--")]
    CommentOpen,

    /// `</name>`, whitespace allowed before `>`.
    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\n\r\f]*>")]
    EndTag,

    /// `<name`, the attribute list follows in tag mode.
    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*")]
    StartTagOpen,

    /// `&amp;`, `&#39;`, `&#x2014;`.
    #[regex(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);")]
    CharRef,

    /// Plain text.
    #[regex(r"[^<&]+")]
    Text,

    /// A `<` or `&` that starts nothing; kept as text.
    #[token("<")]
    #[token("&")]
    Stray,
}

/// Token produced inside a start tag.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum TagToken {
    /// `>`
    #[token(">")]
    Close,

    /// `/>`
    #[token("/>")]
    SelfClose,

    /// `=`
    #[token("=")]
    Equals,

    /// `"`
    #[token("\"")]
    DoubleQuote,

    /// `'`
    #[token("'")]
    SingleQuote,

    /// Attribute name or unquoted value: `class`, `@click`, `data-id`, `text`.
    #[regex(r#"[^ \t\n\r\f"'<>/=]+"#)]
    Name,

    /// A `/` or `<` that starts nothing; ignored.
    #[token("/")]
    #[token("<")]
    Stray,
}

/// Token produced inside a quoted attribute value.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueToken {
    /// `"`
    #[token("\"")]
    DoubleQuote,

    /// `'`
    #[token("'")]
    SingleQuote,

    /// Character reference.
    #[regex(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);")]
    CharRef,

    /// A bare `&`.
    #[token("&")]
    Amp,

    /// Plain value text.
    #[regex(r#"[^"'&]+"#)]
    Text,
}

/// Token produced inside an unquoted attribute value such as `href=/a/b`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnquotedToken {
    /// Whitespace ends the value.
    #[regex(r"[ \t\n\r\f]+")]
    Space,

    /// `>` ends the value and the tag.
    #[token(">")]
    Close,

    /// Character reference.
    #[regex(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);")]
    CharRef,

    /// A bare `&`.
    #[token("&")]
    Amp,

    /// Value text, `/` included.
    #[regex(r"[^ \t\n\r\f>&]+")]
    Text,
}

/// Named references worth supporting in hand-written templates.
const NAMED_REFS: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{a0}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("times", "\u{d7}"),
    ("middot", "\u{b7}"),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("hellip", "\u{2026}"),
];

/// Decode a character reference such as `&amp;` or `&#x41;`.
///
/// Returns `None` for unknown names and invalid code points; callers keep the
/// reference as literal text in that case, as browsers do for unknown names.
pub fn decode_char_ref(reference: &str) -> Option<String> {
    let body = reference.strip_prefix('&')?.strip_suffix(';')?;
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    NAMED_REFS
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, value)| (*value).to_owned())
}
