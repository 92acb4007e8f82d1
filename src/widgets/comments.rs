//! Comment section: the paginated comment list, voting, and the new-comment
//! form.
//!
//! Clicks and submits only enqueue actions. [`CommentSection::process_pending`]
//! or [`CommentSection::run`] applies them one at a time, so two quick clicks
//! on "next" fetch two pages in order instead of racing.

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

use crate::api::{ApiError, Comment, NewComment, SiteApi, VoteKind, VoteTally};
use crate::dom::{Dom, NodeData, NodeId};
use crate::event::Event;
use crate::html;
use crate::reactive::Signal;
use crate::template::{on, Renderable, TemplateError};
use crate::widget::Widget;
use crate::widgets::authentication::AuthState;
use crate::widgets::labeled_input::{InputKind, LabeledInput, LabeledInputOptions};
use crate::widgets::pagination::{Page, PageChain, PaginationError};
use crate::widgets::queue::{self, ActionQueue};

/// Shown in place of the list when a page comes back empty.
pub const EMPTY_PLACEHOLDER: &str = "No more comments.";

#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to render comments: {0}")]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentAction {
    LoadNext,
    LoadPrevious,
    Reload,
    Submit,
    Vote { id: i64, kind: VoteKind },
}

/// What a submit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Posted,
    /// Name or content was empty; nothing was sent.
    Skipped,
}

pub struct CommentSection {
    dom: Dom,
    root: NodeId,
    form: NodeId,
    list: NodeId,
    prev: NodeId,
    next: NodeId,
    name: LabeledInput,
    content: LabeledInput,
    chain: RefCell<PageChain>,
    api: Rc<dyn SiteApi>,
    queue: ActionQueue<CommentAction>,
}

impl CommentSection {
    /// Build the section and queue the first page load.
    ///
    /// With `auth`, a logged-in user's name is filled into an empty name field.
    /// `page_size` is clamped to `1..=MAX_COMMENT_PAGE_SIZE`.
    pub fn new(
        dom: &Dom,
        api: Rc<dyn SiteApi>,
        page_size: usize,
        auth: Option<&Signal<AuthState>>,
    ) -> Result<Self, TemplateError> {
        let queue = ActionQueue::new();

        let name = LabeledInput::new(
            dom,
            LabeledInputOptions::new("Name", "comment-name").with_name("name"),
        )?;
        let content = LabeledInput::new(
            dom,
            LabeledInputOptions::new("Comment", "comment-content")
                .with_name("content")
                .with_kind(InputKind::TextArea)
                .soft(false),
        )?;

        let tx = queue.sender();
        let form = html!(
            dom,
            r#"
            <form class="comment-form" @submit={}>
              <div class="field">{}</div>
              <div class="field">{}</div>
              <button type="submit" @click={}>Post</button>
            </form>"#,
            on(move |_, ev| {
                ev.prevent_default();
                queue::send(&tx, CommentAction::Submit);
            }),
            name.nodes(),
            content.nodes(),
            on(|dom, ev| {
                let form = ev
                    .current_target()
                    .and_then(|button| dom.closest(button, |n| is_tag(n, "form")));
                if let Some(form) = form {
                    ev.prevent_default();
                    dom.dispatch_event(form, Event::local("submit"));
                }
            }),
        )?;

        let (tx_prev, tx_next) = (queue.sender(), queue.sender());
        let prev = html!(
            dom,
            r#"<button type="button" class="comment-prev" disabled @click={}>Previous</button>"#,
            on(move |_, _| queue::send(&tx_prev, CommentAction::LoadPrevious)),
        )?;
        let next = html!(
            dom,
            r#"<button type="button" class="comment-next" disabled @click={}>Next</button>"#,
            on(move |_, _| queue::send(&tx_next, CommentAction::LoadNext)),
        )?;
        let list = html!(dom, r#"<ul class="comment-list"></ul>"#)?;
        let root = html!(
            dom,
            r#"
            <section id="comment-section">
              <h2>Comments</h2>
              {}
              {}
              <nav class="comment-pages">{}{}</nav>
            </section>"#,
            form,
            list,
            prev,
            next,
        )?;

        if let Some(auth) = auth {
            let weak = dom.downgrade();
            let name_input = name.input();
            auth.subscribe(move |state, _| {
                let (Some(dom), Some(user)) = (weak.upgrade(), state.user()) else {
                    return;
                };
                if dom.value(name_input).is_empty() {
                    dom.set_value(name_input, user.username.as_str());
                    dom.dispatch_event(name_input, Event::new("input"));
                }
            });
        }

        queue.push(CommentAction::LoadNext);
        Ok(Self {
            dom: dom.clone(),
            root,
            form,
            list,
            prev,
            next,
            name,
            content,
            chain: RefCell::new(PageChain::new(page_size)),
            api,
            queue,
        })
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn list(&self) -> NodeId {
        self.list
    }

    pub fn prev_button(&self) -> NodeId {
        self.prev
    }

    pub fn next_button(&self) -> NodeId {
        self.next
    }

    pub fn name_input(&self) -> &LabeledInput {
        &self.name
    }

    pub fn content_input(&self) -> &LabeledInput {
        &self.content
    }

    /// A snapshot of the page chain.
    pub fn chain(&self) -> PageChain {
        self.chain.borrow().clone()
    }

    /// The `<li class="comment">` entries currently shown.
    pub fn entries(&self) -> Vec<NodeId> {
        self.dom.query_by_class(self.list, "comment")
    }

    /// The entry for comment `id`, if shown.
    pub fn entry(&self, id: i64) -> Option<NodeId> {
        let id = id.to_string();
        self.dom.query_first(self.list, |n| {
            n.as_element()
                .is_some_and(|e| e.has_class("comment") && e.attr("data-id") == Some(id.as_str()))
        })
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub async fn load_next(&self) -> Result<(), CommentError> {
        let mut chain = self.chain();
        let result = chain.load_next(self.api.as_ref()).await;
        self.settle(chain, result)
    }

    pub async fn load_previous(&self) -> Result<(), CommentError> {
        let mut chain = self.chain();
        let result = chain.load_previous(self.api.as_ref()).await;
        self.settle(chain, result)
    }

    /// Re-fetch the current page, or page one if none loaded yet.
    pub async fn reload(&self) -> Result<(), CommentError> {
        let mut chain = self.chain();
        let result = if chain.is_loaded() {
            chain.refresh_current(self.api.as_ref()).await
        } else {
            chain.load_next(self.api.as_ref()).await
        };
        self.settle(chain, result)
    }

    /// Post the form. On success the fields are cleared and the list goes
    /// back to page one.
    pub async fn submit(&self) -> Result<SubmitOutcome, CommentError> {
        let comment = NewComment {
            name: self.name.value().trim().to_owned(),
            content: self.content.value().trim().to_owned(),
        };
        if comment.name.is_empty() || comment.content.is_empty() {
            debug!("empty comment form, not submitted");
            return Ok(SubmitOutcome::Skipped);
        }
        self.api.post_comment(&comment).await?;
        self.name.clear();
        self.content.clear();

        self.chain.borrow_mut().reset();
        self.load_next().await?;
        Ok(SubmitOutcome::Posted)
    }

    /// Vote on a comment, then show the server's tally.
    pub async fn vote(&self, id: i64, kind: VoteKind) -> Result<VoteTally, CommentError> {
        self.api.vote(id, kind).await?;
        let tally = self.api.tally(id).await?;
        if let Some(entry) = self.entry(id) {
            self.set_count(entry, "upvotes", tally.upvotes);
            self.set_count(entry, "downvotes", tally.downvotes);
        }
        Ok(tally)
    }

    // -----------------------------------------------------------------------
    // Action loop
    // -----------------------------------------------------------------------

    /// Apply every queued action. Returns how many ran.
    pub async fn process_pending(&self) -> usize {
        let mut ran = 0;
        while let Some(action) = self.queue.try_next() {
            self.apply(action).await;
            ran += 1;
        }
        ran
    }

    /// Apply actions as they arrive until [`close`](Self::close) is called.
    pub async fn run(&self) {
        while let Some(action) = self.queue.next().await {
            self.apply(action).await;
        }
    }

    pub fn close(&self) {
        self.queue.close();
    }

    async fn apply(&self, action: CommentAction) {
        debug!(?action, "comment action");
        match action {
            CommentAction::LoadNext => log_load(self.load_next().await),
            CommentAction::LoadPrevious => log_load(self.load_previous().await),
            CommentAction::Reload => log_load(self.reload().await),
            CommentAction::Submit => {
                if let Err(err) = self.submit().await {
                    error!(%err, "comment submission failed");
                }
            }
            CommentAction::Vote { id, kind } => {
                if let Err(err) = self.vote(id, kind).await {
                    warn!(id, kind = kind.as_str(), %err, "vote failed");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Store a fetched chain and redraw, or draw the error entry.
    fn settle(
        &self,
        chain: PageChain,
        result: Result<Rc<Page>, PaginationError>,
    ) -> Result<(), CommentError> {
        match result {
            Ok(page) => {
                *self.chain.borrow_mut() = chain;
                self.render_page(&page)
            }
            Err(err @ PaginationError::Api(_)) => {
                self.render_error()?;
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn render_page(&self, page: &Page) -> Result<(), CommentError> {
        let entries = if page.comments.is_empty() {
            vec![html!(
                self.dom,
                r#"<li class="placeholder">{}</li>"#,
                EMPTY_PLACEHOLDER
            )?]
        } else {
            let tx = self.queue.sender();
            page.comments
                .iter()
                .map(|c| comment_entry(&self.dom, c, &tx))
                .collect::<Result<Vec<_>, _>>()?
        };
        self.dom.remove_children(self.list);
        self.dom.append_children(self.list, &entries);

        let chain = self.chain.borrow();
        self.dom.set_flag(self.prev, "disabled", !chain.has_previous());
        self.dom.set_flag(self.next, "disabled", !chain.has_next());
        Ok(())
    }

    fn render_error(&self) -> Result<(), TemplateError> {
        let tx = self.queue.sender();
        let entry = html!(
            self.dom,
            r#"<li class="error">Failed to load comments. <button type="button" class="reload" @click={}>Reload</button></li>"#,
            on(move |_, _| queue::send(&tx, CommentAction::Reload)),
        )?;
        self.dom.remove_children(self.list);
        self.dom.append_child(self.list, entry);
        Ok(())
    }

    fn set_count(&self, entry: NodeId, class: &str, count: i64) {
        if let Some(node) = self.dom.query_first_by_class(entry, class) {
            self.dom.set_text_content(node, count.to_string());
        }
    }
}

fn log_load(result: Result<(), CommentError>) {
    if let Err(err) = result {
        error!(%err, "loading comments failed");
    }
}

fn is_tag(node: &NodeData, tag: &str) -> bool {
    node.as_element().is_some_and(|e| e.tag == tag)
}

/// One `<li class="comment">`. Name and content are user input and go in as
/// text nodes.
fn comment_entry(
    dom: &Dom,
    comment: &Comment,
    tx: &UnboundedSender<CommentAction>,
) -> Result<NodeId, TemplateError> {
    let id = comment.id;
    let vote = |kind: VoteKind| {
        let tx = tx.clone();
        on(move |_, _| queue::send(&tx, CommentAction::Vote { id, kind }))
    };
    let translated = match comment.translation() {
        Some((_, text)) => Renderable::from(html!(
            dom,
            r#"<div class="content-translated" lang="en">{}</div>"#,
            dom.create_text(text),
        )?),
        None => Renderable::Empty,
    };

    let entry = html!(
        dom,
        r#"
        <li class="comment" data-id="{}">
          <span class="info">
            <span class="name">{}</span>
            <button type="button" class="upvote" @click={}>+</button>
            <span class="upvotes">{}</span>
            <button type="button" class="downvote" @click={}>-</button>
            <span class="downvotes">{}</span>
          </span>
          <div class="content">{}</div>
          {}
        </li>"#,
        id,
        dom.create_text(comment.name.as_str()),
        vote(VoteKind::Up),
        comment.upvotes,
        vote(VoteKind::Down),
        comment.downvotes,
        dom.create_text(comment.content.as_str()),
        translated,
    )?;
    if comment.shameful {
        dom.add_class(entry, "shameful");
    }
    if let Some((lang, _)) = comment.translation() {
        if let Some(content) = dom.query_first_by_class(entry, "content") {
            dom.set_attr(content, "lang", lang);
        }
    }
    Ok(entry)
}

impl Widget for CommentSection {
    fn widget_type(&self) -> &str {
        "comments"
    }

    fn root(&self) -> NodeId {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Cursor, Role, UserInfo};
    use crate::testing::{Endpoint, MemoryApi, Request};
    use pretty_assertions::assert_eq;

    fn section(api: &Rc<MemoryApi>, page_size: usize) -> (Dom, CommentSection) {
        let dom = Dom::new();
        let comments = CommentSection::new(&dom, api.clone(), page_size, None).unwrap();
        comments.mount(&dom, dom.body());
        (dom, comments)
    }

    fn shown_names(dom: &Dom, comments: &CommentSection) -> Vec<String> {
        comments
            .entries()
            .into_iter()
            .filter_map(|e| dom.query_first_by_class(e, "name"))
            .map(|n| dom.text_content(n))
            .collect()
    }

    #[tokio::test]
    async fn first_page_loads_on_start() {
        let api = Rc::new(MemoryApi::with_comments(3));
        let (dom, comments) = section(&api, 5);
        assert!(comments.entries().is_empty());
        assert_eq!(comments.process_pending().await, 1);
        assert_eq!(shown_names(&dom, &comments), vec!["c3", "c2", "c1"]);
        assert!(dom.is_disabled(comments.prev_button()));
        assert!(dom.is_disabled(comments.next_button()));
    }

    #[tokio::test]
    async fn short_second_page_disables_next() {
        let api = Rc::new(MemoryApi::with_comments(8));
        let (dom, comments) = section(&api, 5);
        comments.process_pending().await;
        assert_eq!(comments.entries().len(), 5);
        assert!(!dom.is_disabled(comments.next_button()));
        assert!(dom.is_disabled(comments.prev_button()));

        dom.click(comments.next_button());
        comments.process_pending().await;
        assert_eq!(comments.entries().len(), 3);
        assert!(dom.is_disabled(comments.next_button()));
        assert!(!dom.is_disabled(comments.prev_button()));
        assert_eq!(api.comment_cursors().last(), Some(&Some(Cursor::from("c5"))));
    }

    #[tokio::test]
    async fn zero_page_size_fetches_one() {
        let api = Rc::new(MemoryApi::with_comments(3));
        let (dom, comments) = section(&api, 0);
        comments.process_pending().await;
        assert_eq!(comments.chain().page_size(), 1);
        assert_eq!(
            api.requests(),
            vec![Request::Comments {
                limit: 1,
                cursor: None
            }]
        );
        assert_eq!(shown_names(&dom, &comments), vec!["c3"]);
    }

    #[tokio::test]
    async fn final_page_without_cursor_disables_next() {
        let api = Rc::new(MemoryApi::with_comments(5).omit_final_cursor());
        let (dom, comments) = section(&api, 5);
        comments.process_pending().await;
        assert_eq!(comments.entries().len(), 5);
        assert!(dom.is_disabled(comments.next_button()));
    }

    #[tokio::test]
    async fn previous_returns_to_first_page() {
        let api = Rc::new(MemoryApi::with_comments(8));
        let (dom, comments) = section(&api, 5);
        comments.process_pending().await;
        dom.click(comments.next_button());
        comments.process_pending().await;
        dom.click(comments.prev_button());
        comments.process_pending().await;
        assert_eq!(shown_names(&dom, &comments)[0], "c8");
        assert!(dom.is_disabled(comments.prev_button()));
        assert_eq!(comments.chain().current().map(|p| p.depth()), Some(1));
    }

    #[tokio::test]
    async fn empty_page_shows_placeholder() {
        let api = Rc::new(MemoryApi::new());
        let (dom, comments) = section(&api, 5);
        comments.process_pending().await;
        assert_eq!(dom.text_content(comments.list()), EMPTY_PLACEHOLDER);
    }

    #[tokio::test]
    async fn failed_load_offers_reload() {
        let api = Rc::new(MemoryApi::with_comments(2));
        api.fail_next(Endpoint::Comments);
        let (dom, comments) = section(&api, 5);
        comments.process_pending().await;
        let error = dom.query_first_by_class(comments.list(), "error").unwrap();
        assert!(dom.text_content(error).starts_with("Failed to load comments."));

        let reload = dom.query_first_by_class(error, "reload").unwrap();
        dom.click(reload);
        comments.process_pending().await;
        assert_eq!(comments.entries().len(), 2);
    }

    #[tokio::test]
    async fn submit_clears_form_and_returns_to_page_one() {
        let api = Rc::new(MemoryApi::with_comments(12));
        let (dom, comments) = section(&api, 5);
        comments.process_pending().await;
        dom.click(comments.next_button());
        comments.process_pending().await;

        comments.name_input().set_value("Ada");
        comments.content_input().set_value("Lovely site");
        let submit = dom.query_by_tag(comments.form(), "button")[0];
        dom.click(submit);
        comments.process_pending().await;

        assert_eq!(comments.name_input().value(), "");
        assert_eq!(comments.content_input().value(), "");
        assert_eq!(shown_names(&dom, &comments)[0], "Ada");
        assert_eq!(comments.chain().current().map(|p| p.depth()), Some(1));
        assert_eq!(api.comment_cursors().last(), Some(&None));
    }

    #[tokio::test]
    async fn empty_form_is_not_posted() {
        let api = Rc::new(MemoryApi::new());
        let (_, comments) = section(&api, 5);
        comments.process_pending().await;
        comments.name_input().set_value("Ada");
        assert_eq!(comments.submit().await.unwrap(), SubmitOutcome::Skipped);
        assert!(!api
            .requests()
            .iter()
            .any(|r| matches!(r, Request::PostComment(_))));
    }

    #[tokio::test]
    async fn failed_post_keeps_fields() {
        let api = Rc::new(MemoryApi::new());
        let (_, comments) = section(&api, 5);
        comments.process_pending().await;
        comments.name_input().set_value("Ada");
        comments.content_input().set_value("hi");
        api.fail_next(Endpoint::PostComment);
        assert!(comments.submit().await.is_err());
        assert_eq!(comments.content_input().value(), "hi");
    }

    #[tokio::test]
    async fn voting_updates_counts() {
        let api = Rc::new(MemoryApi::with_comments(1));
        let (dom, comments) = section(&api, 5);
        comments.process_pending().await;
        let entry = comments.entry(1).unwrap();
        let up = dom.query_first_by_class(entry, "upvote").unwrap();
        dom.click(up);
        dom.click(up);
        comments.process_pending().await;

        let count = dom.query_first_by_class(entry, "upvotes").unwrap();
        assert_eq!(dom.text_content(count), "2");
        assert!(api.requests().contains(&Request::Tally(1)));
    }

    #[tokio::test]
    async fn comment_text_is_not_markup() {
        let api = Rc::new(MemoryApi::new());
        let id = api.insert("<b>x</b>", "<script>alert(1)</script>");
        let mut stored = api.comment(id).unwrap();
        stored.shameful = true;
        stored.content_lang = Some("fr".into());
        stored.content_translated = Some("Hello".into());
        api.replace(stored);

        let (dom, comments) = section(&api, 5);
        comments.process_pending().await;
        let entry = comments.entry(id).unwrap();
        assert!(dom.has_class(entry, "shameful"));
        assert!(dom.query_by_tag(entry, "script").is_empty());
        let content = dom.query_first_by_class(entry, "content").unwrap();
        assert_eq!(dom.attr(content, "lang").as_deref(), Some("fr"));
        let translated = dom.query_first_by_class(entry, "content-translated").unwrap();
        assert_eq!(dom.text_content(translated), "Hello");
    }

    #[tokio::test]
    async fn logged_in_name_is_prefilled() {
        let api = Rc::new(MemoryApi::new());
        let dom = Dom::new();
        let auth = Signal::new(AuthState::Loading);
        let comments = CommentSection::new(&dom, api.clone(), 5, Some(&auth)).unwrap();
        auth.set(AuthState::LoggedIn(UserInfo {
            logout_uri: "/logout".into(),
            id: "7".into(),
            username: "ada".into(),
            role: Role::User,
        }));
        assert_eq!(comments.name_input().value(), "ada");
        assert!(!dom.has_class(comments.name_input().label(), "empty"));
    }
}
