//! Recording navigator.

use std::cell::{Cell, RefCell};

use crate::widgets::authentication::Navigator;

/// Records every URI it opens. Can simulate a popup blocker.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    opened: RefCell<Vec<String>>,
    blocked: Cell<bool>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to open windows while `blocked` is set.
    pub fn block(&self, blocked: bool) {
        self.blocked.set(blocked);
    }

    /// URIs opened so far, oldest first.
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open(&self, uri: &str) -> bool {
        if self.blocked.get() {
            return false;
        }
        self.opened.borrow_mut().push(uri.to_owned());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_blocks() {
        let nav = RecordingNavigator::new();
        assert!(nav.open("/a"));
        nav.block(true);
        assert!(!nav.open("/b"));
        assert_eq!(nav.opened(), vec!["/a".to_owned()]);
    }
}
