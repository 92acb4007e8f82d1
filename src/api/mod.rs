//! Client for the site's HTTP endpoints.
//!
//! Widgets talk to the backend through the [`SiteApi`] trait. [`HttpApi`] is
//! the real implementation; `folio::testing::MemoryApi` is an in-memory one.

mod http;
mod types;

use async_trait::async_trait;

pub use http::HttpApi;
pub use types::{
    Comment, CommentPage, Cursor, LoginInfo, MeResponse, NewComment, Role, UserInfo, VoteKind,
    VoteTally,
};

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    Status { status: u16, endpoint: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

/// The endpoints the widgets consume.
///
/// `?Send`: the UI is single-threaded and implementations may use `RefCell`.
#[async_trait(?Send)]
pub trait SiteApi {
    /// `GET /api/users/me`
    async fn current_user(&self) -> Result<MeResponse, ApiError>;

    /// `GET <logoutUri>`
    async fn logout(&self, logout_uri: &str) -> Result<(), ApiError>;

    /// `GET /api/comments?limit=<n>&cursor=<cursor>`
    async fn comments(&self, limit: usize, cursor: Option<&Cursor>)
        -> Result<CommentPage, ApiError>;

    /// `POST /api/comments`
    async fn post_comment(&self, comment: &NewComment) -> Result<(), ApiError>;

    /// `POST /api/vote/<id>`. Only a 200 response counts as success.
    async fn vote(&self, id: i64, kind: VoteKind) -> Result<(), ApiError>;

    /// `GET /api/vote/<id>`
    async fn tally(&self, id: i64) -> Result<VoteTally, ApiError>;
}
