//! Cursor chain behind the comment list.
//!
//! Each [`Page`] remembers the cursor that produced it, the server's
//! continuation cursor, its comments, and the page before it. Going forward
//! pushes a page; going back re-fetches the previous page and makes it current
//! while keeping its own `previous` link.

use std::rc::Rc;

use tracing::debug;

use crate::api::{ApiError, Comment, Cursor, SiteApi};
use crate::config::MAX_COMMENT_PAGE_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    #[error("no page before the current one")]
    NoPreviousPage,

    #[error("no page loaded")]
    NoPageLoaded,

    #[error("the current page has no continuation cursor")]
    NoNextPage,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub struct Page {
    /// Cursor this page was fetched with. `None` for page one.
    pub cursor: Option<Cursor>,
    /// Cursor for the page after this one.
    pub next_cursor: Option<Cursor>,
    pub comments: Vec<Comment>,
    pub previous: Option<Rc<Page>>,
}

impl Page {
    /// Number of pages from the start of the chain, counting this one.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut page = self.previous.as_deref();
        while let Some(p) = page {
            depth += 1;
            page = p.previous.as_deref();
        }
        depth
    }
}

/// `None` until the first load, then the current page.
#[derive(Debug, Clone)]
pub struct PageChain {
    current: Option<Rc<Page>>,
    page_size: usize,
}

impl PageChain {
    /// `page_size` is clamped to `1..=MAX_COMMENT_PAGE_SIZE`.
    pub fn new(page_size: usize) -> Self {
        Self {
            current: None,
            page_size: page_size.clamp(1, MAX_COMMENT_PAGE_SIZE),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current(&self) -> Option<&Rc<Page>> {
        self.current.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.current.as_ref().is_some_and(|p| p.previous.is_some())
    }

    /// A short page, or one without a continuation cursor, is the end of the
    /// data. An exactly full last page still reports more.
    pub fn has_next(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|p| p.next_cursor.is_some() && p.comments.len() >= self.page_size)
    }

    /// Fetch the page after the current one (or page one) and push it.
    pub async fn load_next(&mut self, api: &dyn SiteApi) -> Result<Rc<Page>, PaginationError> {
        let cursor = match &self.current {
            Some(page) => Some(page.next_cursor.clone().ok_or(PaginationError::NoNextPage)?),
            None => None,
        };
        let fetched = api.comments(self.page_size, cursor.as_ref()).await?;
        let page = Rc::new(Page {
            cursor,
            next_cursor: fetched.next_comment_cursor,
            comments: fetched.comments,
            previous: self.current.take(),
        });
        debug!(depth = page.depth(), count = page.comments.len(), "comment page pushed");
        self.current = Some(Rc::clone(&page));
        Ok(page)
    }

    /// Re-fetch the previous page and make it current.
    pub async fn load_previous(
        &mut self,
        api: &dyn SiteApi,
    ) -> Result<Rc<Page>, PaginationError> {
        let previous = self
            .current
            .as_ref()
            .and_then(|p| p.previous.clone())
            .ok_or(PaginationError::NoPreviousPage)?;
        let page = self.refetch(api, &previous).await?;
        debug!(depth = page.depth(), "moved to previous comment page");
        self.current = Some(Rc::clone(&page));
        Ok(page)
    }

    /// Re-fetch the current page in place.
    pub async fn refresh_current(
        &mut self,
        api: &dyn SiteApi,
    ) -> Result<Rc<Page>, PaginationError> {
        let current = self.current.clone().ok_or(PaginationError::NoPageLoaded)?;
        let page = self.refetch(api, &current).await?;
        self.current = Some(Rc::clone(&page));
        Ok(page)
    }

    /// Forget every page.
    pub fn reset(&mut self) {
        self.current = None;
    }

    async fn refetch(&self, api: &dyn SiteApi, page: &Page) -> Result<Rc<Page>, ApiError> {
        let fetched = api.comments(self.page_size, page.cursor.as_ref()).await?;
        Ok(Rc::new(Page {
            cursor: page.cursor.clone(),
            next_cursor: fetched.next_comment_cursor,
            comments: fetched.comments,
            previous: page.previous.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Endpoint, MemoryApi};
    use pretty_assertions::assert_eq;
    use tokio_test::block_on;

    fn names(page: &Page) -> Vec<&str> {
        page.comments.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn load_next_builds_chain() {
        let api = MemoryApi::with_comments(12);
        let mut chain = PageChain::new(5);
        assert!(!chain.is_loaded());
        for k in 1..=3 {
            let page = block_on(chain.load_next(&api)).unwrap();
            assert_eq!(page.depth(), k);
        }
        assert_eq!(
            api.comment_cursors(),
            vec![None, Some(Cursor::from("c5")), Some(Cursor::from("c10"))]
        );
    }

    #[test]
    fn load_previous_restores_link() {
        let api = MemoryApi::with_comments(12);
        let mut chain = PageChain::new(5);
        block_on(chain.load_next(&api)).unwrap();
        let before = chain.current().cloned().unwrap();
        block_on(chain.load_next(&api)).unwrap();

        let back = block_on(chain.load_previous(&api)).unwrap();
        assert_eq!(back.depth(), 1);
        assert!(back.previous.is_none());
        assert_eq!(back.cursor, before.cursor);
        assert_eq!(names(&back), names(&before));
        assert!(!Rc::ptr_eq(&back, &before));
    }

    #[test]
    fn previous_from_third_page_keeps_first() {
        let api = MemoryApi::with_comments(12);
        let mut chain = PageChain::new(5);
        block_on(chain.load_next(&api)).unwrap();
        let first = chain.current().cloned().unwrap();
        block_on(chain.load_next(&api)).unwrap();
        block_on(chain.load_next(&api)).unwrap();

        let second = block_on(chain.load_previous(&api)).unwrap();
        assert_eq!(second.cursor, Some(Cursor::from("c5")));
        assert!(Rc::ptr_eq(second.previous.as_ref().unwrap(), &first));
    }

    #[test]
    fn short_page_disables_next() {
        let api = MemoryApi::with_comments(8);
        let mut chain = PageChain::new(5);
        block_on(chain.load_next(&api)).unwrap();
        assert!(chain.has_next());
        assert!(!chain.has_previous());

        let page = block_on(chain.load_next(&api)).unwrap();
        assert_eq!(page.comments.len(), 3);
        assert!(!chain.has_next());
        assert!(chain.has_previous());
    }

    #[test]
    fn illegal_moves_are_errors() {
        let api = MemoryApi::new();
        let mut chain = PageChain::new(5);
        assert!(matches!(
            block_on(chain.refresh_current(&api)),
            Err(PaginationError::NoPageLoaded)
        ));
        block_on(chain.load_next(&api)).unwrap();
        assert!(matches!(
            block_on(chain.load_previous(&api)),
            Err(PaginationError::NoPreviousPage)
        ));
    }

    #[test]
    fn refresh_replaces_in_place() {
        let api = MemoryApi::with_comments(3);
        let mut chain = PageChain::new(5);
        block_on(chain.load_next(&api)).unwrap();
        api.insert("late", "hello");
        let page = block_on(chain.refresh_current(&api)).unwrap();
        assert_eq!(names(&page)[0], "late");
        assert_eq!(page.depth(), 1);
    }

    #[test]
    fn missing_cursor_ends_the_chain() {
        let api = MemoryApi::with_comments(5).omit_final_cursor();
        let mut chain = PageChain::new(5);
        let page = block_on(chain.load_next(&api)).unwrap();
        assert_eq!(page.comments.len(), 5);
        assert!(page.next_cursor.is_none());
        assert!(!chain.has_next());

        assert!(matches!(
            block_on(chain.load_next(&api)),
            Err(PaginationError::NoNextPage)
        ));
        assert_eq!(chain.current().map(|p| p.depth()), Some(1));
        assert_eq!(api.comment_cursors(), vec![None]);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageChain::new(0).page_size(), 1);
        assert_eq!(PageChain::new(500).page_size(), MAX_COMMENT_PAGE_SIZE);

        let api = MemoryApi::with_comments(3);
        let mut chain = PageChain::new(0);
        let page = block_on(chain.load_next(&api)).unwrap();
        assert_eq!(page.comments.len(), 1);
        assert!(chain.has_next());
    }

    #[test]
    fn failed_fetch_leaves_chain_alone() {
        let api = MemoryApi::with_comments(8);
        let mut chain = PageChain::new(5);
        block_on(chain.load_next(&api)).unwrap();
        api.fail_next(Endpoint::Comments);
        assert!(block_on(chain.load_next(&api)).is_err());
        assert_eq!(chain.current().map(|p| p.depth()), Some(1));
    }
}
