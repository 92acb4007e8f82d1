//! In-memory comment and session backend.

use std::cell::RefCell;
use std::collections::HashSet;

use async_trait::async_trait;

use crate::api::{
    ApiError, Comment, CommentPage, Cursor, LoginInfo, MeResponse, NewComment, SiteApi, UserInfo,
    VoteKind, VoteTally,
};
use crate::config::MAX_COMMENT_PAGE_SIZE;

/// Which endpoint a request hit, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CurrentUser,
    Logout,
    Comments,
    PostComment,
    Vote,
    Tally,
}

/// A request as [`MemoryApi`] saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CurrentUser,
    Logout(String),
    Comments { limit: usize, cursor: Option<Cursor> },
    PostComment(NewComment),
    Vote { id: i64, kind: VoteKind },
    Tally(i64),
}

impl Request {
    fn endpoint(&self) -> Endpoint {
        match self {
            Self::CurrentUser => Endpoint::CurrentUser,
            Self::Logout(_) => Endpoint::Logout,
            Self::Comments { .. } => Endpoint::Comments,
            Self::PostComment(_) => Endpoint::PostComment,
            Self::Vote { .. } => Endpoint::Vote,
            Self::Tally(_) => Endpoint::Tally,
        }
    }
}

#[derive(Debug)]
struct State {
    user: Option<UserInfo>,
    login_uri: String,
    /// Newest first.
    comments: Vec<Comment>,
    next_id: i64,
    failing: HashSet<Endpoint>,
    requests: Vec<Request>,
    final_cursor: bool,
}

/// A [`SiteApi`] backed by a `Vec`.
///
/// Comments are listed newest first. Cursors are offsets (`"c5"`), and every
/// page carries a continuation cursor, even the last one, like the real
/// datastore-backed server, unless [`MemoryApi::omit_final_cursor`] is set.
#[derive(Debug)]
pub struct MemoryApi {
    state: RefCell<State>,
}

impl Default for MemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryApi {
    /// No comments, logged out, login at `/login`.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                user: None,
                login_uri: "/login".to_owned(),
                comments: Vec::new(),
                next_id: 1,
                failing: HashSet::new(),
                requests: Vec::new(),
                final_cursor: true,
            }),
        }
    }

    /// Seed `count` comments named `c1`..`cN`, `cN` being the newest.
    pub fn with_comments(count: usize) -> Self {
        let api = Self::new();
        for n in 1..=count {
            api.insert(format!("c{n}"), format!("comment {n}"));
        }
        api
    }

    /// Answer the page that reaches the end of the data without a
    /// continuation cursor.
    pub fn omit_final_cursor(self) -> Self {
        self.state.borrow_mut().final_cursor = false;
        self
    }

    /// Add a comment as the newest. Returns its id.
    pub fn insert(&self, name: impl Into<String>, content: impl Into<String>) -> i64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.comments.insert(0, Comment::new(id, name, content));
        id
    }

    /// Replace a stored comment, matched by id.
    pub fn replace(&self, comment: Comment) {
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.comments.iter_mut().find(|c| c.id == comment.id) {
            *slot = comment;
        }
    }

    pub fn set_user(&self, user: Option<UserInfo>) {
        self.state.borrow_mut().user = user;
    }

    /// Make the next request to `endpoint` fail with status 500.
    pub fn fail_next(&self, endpoint: Endpoint) {
        self.state.borrow_mut().failing.insert(endpoint);
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    /// Cursors passed to the comments endpoint, in order.
    pub fn comment_cursors(&self) -> Vec<Option<Cursor>> {
        self.state
            .borrow()
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::Comments { cursor, .. } => Some(cursor.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn comment(&self, id: i64) -> Option<Comment> {
        self.state.borrow().comments.iter().find(|c| c.id == id).cloned()
    }

    pub fn comment_count(&self) -> usize {
        self.state.borrow().comments.len()
    }

    fn record(&self, request: Request, path: &str) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        let endpoint = request.endpoint();
        state.requests.push(request);
        if state.failing.remove(&endpoint) {
            return Err(ApiError::Status {
                status: 500,
                endpoint: path.to_owned(),
            });
        }
        Ok(())
    }
}

fn offset(cursor: Option<&Cursor>) -> Result<usize, ApiError> {
    match cursor {
        None => Ok(0),
        Some(c) => c
            .as_str()
            .strip_prefix('c')
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| ApiError::Status {
                status: 400,
                endpoint: "/api/comments".to_owned(),
            }),
    }
}

fn looks_like_markup(text: &str) -> bool {
    text.contains('<') && text.contains("</")
}

#[async_trait(?Send)]
impl SiteApi for MemoryApi {
    async fn current_user(&self) -> Result<MeResponse, ApiError> {
        self.record(Request::CurrentUser, "/api/users/me")?;
        let state = self.state.borrow();
        Ok(match &state.user {
            Some(user) => MeResponse::LoggedIn(user.clone()),
            None => MeResponse::LoggedOut(LoginInfo {
                login_uri: state.login_uri.clone(),
            }),
        })
    }

    async fn logout(&self, logout_uri: &str) -> Result<(), ApiError> {
        self.record(Request::Logout(logout_uri.to_owned()), logout_uri)?;
        self.state.borrow_mut().user = None;
        Ok(())
    }

    async fn comments(
        &self,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<CommentPage, ApiError> {
        self.record(
            Request::Comments {
                limit,
                cursor: cursor.cloned(),
            },
            "/api/comments",
        )?;
        let start = offset(cursor)?;
        let limit = limit.min(MAX_COMMENT_PAGE_SIZE);
        let state = self.state.borrow();
        let start = start.min(state.comments.len());
        let end = (start + limit).min(state.comments.len());
        let at_end = end == state.comments.len();
        Ok(CommentPage {
            comments: state.comments[start..end].to_vec(),
            next_comment_cursor: (state.final_cursor || !at_end)
                .then(|| Cursor(format!("c{end}"))),
        })
    }

    async fn post_comment(&self, comment: &NewComment) -> Result<(), ApiError> {
        self.record(Request::PostComment(comment.clone()), "/api/comments")?;
        if comment.name.is_empty() || comment.content.is_empty() {
            return Err(ApiError::Status {
                status: 400,
                endpoint: "/api/comments".to_owned(),
            });
        }
        let id = self.insert(comment.name.clone(), comment.content.clone());
        let mut state = self.state.borrow_mut();
        let user = state.user.as_ref().map(|u| u.id.clone());
        if let Some(stored) = state.comments.first_mut() {
            debug_assert_eq!(stored.id, id);
            stored.user = user;
            stored.shameful = looks_like_markup(&comment.name) || looks_like_markup(&comment.content);
        }
        Ok(())
    }

    async fn vote(&self, id: i64, kind: VoteKind) -> Result<(), ApiError> {
        let path = format!("/api/vote/{id}");
        self.record(Request::Vote { id, kind }, &path)?;
        let mut state = self.state.borrow_mut();
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ApiError::Status {
                status: 404,
                endpoint: path,
            })?;
        match kind {
            VoteKind::Up => comment.upvotes += 1,
            VoteKind::Down => comment.downvotes += 1,
        }
        Ok(())
    }

    async fn tally(&self, id: i64) -> Result<VoteTally, ApiError> {
        let path = format!("/api/vote/{id}");
        self.record(Request::Tally(id), &path)?;
        let state = self.state.borrow();
        let comment = state
            .comments
            .iter()
            .find(|c| c.id == id)
            .ok_or(ApiError::Status {
                status: 404,
                endpoint: path,
            })?;
        Ok(VoteTally {
            upvotes: comment.upvotes,
            downvotes: comment.downvotes,
        })
    }
}
