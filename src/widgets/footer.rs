//! Page footer.

use crate::dom::{Dom, NodeId};
use crate::html;
use crate::template::TemplateError;

/// `<footer>` with the copyright notice.
pub fn footer(dom: &Dom) -> Result<NodeId, TemplateError> {
    html!(
        dom,
        r#"
        <footer>
          <p>&copy; 2020 Google, Inc.</p>
          <p>Because this stuff isn't owned by <em>me</em>...</p>
        </footer>"#
    )
}
