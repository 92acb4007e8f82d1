//! Page header: the site title and the theme switcher.

use crate::dom::{Dom, NodeId};
use crate::html;
use crate::template::{escape, TemplateError};
use crate::widget::Widget;
use crate::widgets::theme_switcher::{Theme, ThemeSwitcher};

pub struct Header {
    root: NodeId,
    switcher: ThemeSwitcher,
}

impl Header {
    pub fn new(dom: &Dom, title: &str, theme: Theme) -> Result<Self, TemplateError> {
        let switcher = ThemeSwitcher::new(dom, theme)?;
        let root = html!(
            dom,
            "<header><h1>{}</h1>{}</header>",
            escape(title),
            switcher.root(),
        )?;
        Ok(Self { root, switcher })
    }

    pub fn theme_switcher(&self) -> &ThemeSwitcher {
        &self.switcher
    }
}

impl Widget for Header {
    fn widget_type(&self) -> &str {
        "header"
    }

    fn root(&self) -> NodeId {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn renders_title_and_switcher() {
        let dom = Dom::new();
        let header = Header::new(&dom, "Hi & welcome", Theme::Light).unwrap();
        assert_snapshot!(
            header.render_html(&dom),
            @r#"<header><h1>Hi &amp; welcome</h1><button type="button" class="theme-switcher">Switch theme</button></header>"#
        );
    }

    #[test]
    fn switcher_inside_header_still_works() {
        let dom = Dom::new();
        let header = Header::new(&dom, "x", Theme::Light).unwrap();
        header.mount(&dom, dom.body());
        dom.click(header.theme_switcher().root());
        assert_eq!(header.theme_switcher().theme(), Theme::Dark);
    }
}
