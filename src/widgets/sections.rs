//! Content sections of the home page: dishes and projects.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Dom, NodeId};
use crate::event::names::{
    LIGHTBOX_HIDE_LEGACY, LIGHTBOX_SHOW_LEGACY, READMORE_COLLAPSE, READMORE_EXPAND,
};
use crate::html;
use crate::template::{escape, Renderable, TemplateError};
use crate::widget::Widget;
use crate::widgets::lightbox::{self, LightboxItem};
use crate::widgets::readmore::{self, ReadMore};

// ---------------------------------------------------------------------------
// Cooking
// ---------------------------------------------------------------------------

/// A dish: front matter plus the rendered description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishInfo {
    pub name: String,
    /// Image URI.
    pub image: String,
    /// Description markup.
    pub html: String,
}

/// `<section class="cooking-section">` with a thumbnail that opens the
/// lightbox.
pub fn cooking_section(dom: &Dom, dish: &DishInfo) -> Result<NodeId, TemplateError> {
    let thumbnail = LightboxItem::image(dom, &dish.image, Some(&dish.name))?;
    html!(
        dom,
        r#"
        <section class="cooking-section">
          <div class="thumbnail">{}</div>
          <div class="content">
            <h3>{}</h3>
            {}
          </div>
        </section>"#,
        thumbnail.root(),
        escape(&dish.name),
        dish.html.as_str(),
    )
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Year the project started.
    pub year: u32,
    /// Description markup.
    pub html: String,
}

/// One project: its description in a read-more box, wrapped in an inline
/// lightbox item. Expanding the box highlights the item and highlighting the
/// item expands the box.
pub fn project_item(dom: &Dom, info: &ProjectInfo) -> Result<NodeId, TemplateError> {
    let more = ReadMore::new(dom, info.html.as_str())?;
    let technologies = if info.technologies.is_empty() {
        Renderable::Empty
    } else {
        Renderable::from(format!(
            r#"<li class="technologies">{}</li>"#,
            escape(&info.technologies.join(", "))
        ))
    };
    let content = html!(
        dom,
        r#"
        <div class="project-content">
          <h3>{}</h3>
          <ul class="project-stats"><li class="year">{}</li><li class="languages">{}</li>{}</ul>
          {}
        </div>"#,
        escape(&info.name),
        info.year,
        escape(&info.languages.join(", ")),
        technologies,
        more.root(),
    )?;
    let item = LightboxItem::wrap(dom, content)?;

    let (box_root, item_root) = (more.root(), item.root());
    dom.on(box_root, READMORE_EXPAND, move |dom, _| {
        lightbox::show_inline(dom, item_root)
    });
    dom.on(box_root, READMORE_COLLAPSE, move |dom, _| {
        lightbox::hide_inline(dom, item_root)
    });
    dom.on(item_root, LIGHTBOX_SHOW_LEGACY, move |dom, _| {
        readmore::expand(dom, box_root)
    });
    dom.on(item_root, LIGHTBOX_HIDE_LEGACY, move |dom, _| {
        readmore::collapse(dom, box_root)
    });

    html!(dom, r#"<div class="project-item">{}</div>"#, item_root)
}

/// `<section id="project-section">`, newest project first.
pub fn project_section(dom: &Dom, projects: &[ProjectInfo]) -> Result<NodeId, TemplateError> {
    let mut sorted: Vec<&ProjectInfo> = projects.iter().collect();
    sorted.sort_by(|a, b| b.year.cmp(&a.year));
    let items = sorted
        .into_iter()
        .map(|p| project_item(dom, p))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = items.len(), "project section built");
    html!(dom, r#"<section id="project-section">{}</section>"#, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::lightbox::Lightbox;
    use pretty_assertions::assert_eq;

    fn project(name: &str, year: u32) -> ProjectInfo {
        ProjectInfo {
            name: name.into(),
            languages: vec!["Rust".into(), "TypeScript".into()],
            technologies: Vec::new(),
            year,
            html: "<p>About it.</p>".into(),
        }
    }

    #[test]
    fn dish_thumbnail_opens_lightbox() {
        let dom = Dom::new();
        let overlay = Lightbox::new(&dom).unwrap();
        overlay.mount(&dom, dom.body());
        let dish = DishInfo {
            name: "Jollof".into(),
            image: "/img/dish/jollof.jpg".into(),
            html: "<p>Spicy.</p>".into(),
        };
        let section = cooking_section(&dom, &dish).unwrap();
        dom.append_child(dom.body(), section);

        assert_eq!(dom.text_content(dom.query_by_tag(section, "h3")[0]), "Jollof");
        let img = dom.query_by_tag(section, "img")[0];
        dom.click(img);
        assert!(overlay.is_visible());
        assert_eq!(overlay.image(), "/img/dish/jollof.jpg");
    }

    #[test]
    fn projects_sorted_newest_first() {
        let dom = Dom::new();
        let section = project_section(
            &dom,
            &[project("old", 2015), project("new", 2020), project("mid", 2018)],
        )
        .unwrap();
        let names: Vec<String> = dom
            .query_by_tag(section, "h3")
            .into_iter()
            .map(|h| dom.text_content(h))
            .collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
        let stats = dom.query_first_by_class(section, "languages").unwrap();
        assert_eq!(dom.text_content(stats), "Rust, TypeScript");
    }

    #[test]
    fn readmore_and_item_stay_in_step() {
        let dom = Dom::new();
        let item = project_item(&dom, &project("p", 2020)).unwrap();
        let inline = dom.query_first_by_class(item, "lightbox-item").unwrap();
        let more = dom.query_first_by_class(item, "readmore").unwrap();

        dom.click(inline);
        assert!(dom.has_class(inline, "active"));
        assert!(!dom.has_class(more, "collapsed"));

        readmore::collapse(&dom, more);
        assert!(!dom.has_class(inline, "active"));

        readmore::expand(&dom, more);
        assert!(dom.has_class(inline, "active"));
    }

    #[test]
    fn technologies_listed_when_present() {
        let dom = Dom::new();
        let mut info = project("p", 2020);
        info.technologies = vec!["tokio".into()];
        let item = project_item(&dom, &info).unwrap();
        let tech = dom.query_first_by_class(item, "technologies").unwrap();
        assert_eq!(dom.text_content(tech), "tokio");
    }
}
