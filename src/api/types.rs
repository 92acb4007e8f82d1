//! Wire types for the site's JSON endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, server-issued continuation token for comment pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A published comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub content: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    /// Set by the server when the comment looks like it contains HTML.
    #[serde(default)]
    pub shameful: bool,
    /// Source language, present when the content was machine-translated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_translated: Option<String>,
}

impl Comment {
    /// A comment with no votes, flags or translation.
    pub fn new(id: i64, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            user: None,
            content: content.into(),
            upvotes: 0,
            downvotes: 0,
            shameful: false,
            content_lang: None,
            content_translated: None,
        }
    }

    /// `(language, translated text)` when both are present.
    pub fn translation(&self) -> Option<(&str, &str)> {
        match (&self.content_lang, &self.content_translated) {
            (Some(lang), Some(text)) => Some((lang, text)),
            _ => None,
        }
    }
}

/// One page of `GET /api/comments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub next_comment_cursor: Option<Cursor>,
}

/// Body of `POST /api/comments`, sent as multipart form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewComment {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct VoteRequest {
    pub kind: VoteKind,
}

/// Response of `GET /api/vote/<id>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub logout_uri: String,
    pub id: String,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInfo {
    pub login_uri: String,
}

/// Response of `GET /api/users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeResponse {
    LoggedIn(UserInfo),
    LoggedOut(LoginInfo),
}
