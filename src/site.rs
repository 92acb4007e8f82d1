//! The whole page: header, content sections, comments, footer, toasts and the
//! lightbox overlay, mounted into `<body>`.

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiError, HttpApi, SiteApi};
use crate::config::{ConfigError, SiteConfig};
use crate::dom::{Dom, NodeId};
use crate::html;
use crate::template::TemplateError;
use crate::widget::Widget;
use crate::widgets::{
    cooking_section, footer, project_section, Authentication, CommentSection, DishInfo, Header,
    Lightbox, Navigator, ProjectInfo, Toaster,
};

/// How often toast countdowns advance while [`Site::run`] is active.
pub const TOAST_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("could not build the page: {0}")]
    Template(#[from] TemplateError),

    #[error("could not create the API client: {0}")]
    Api(#[from] ApiError),
}

/// The static content of the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContent {
    /// Introductory markup, shown first in `<main>`.
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub projects: Vec<ProjectInfo>,
    #[serde(default)]
    pub dishes: Vec<DishInfo>,
}

pub struct Site {
    dom: Dom,
    main: NodeId,
    header: Header,
    auth: Authentication,
    comments: CommentSection,
    toaster: Toaster,
    lightbox: Lightbox,
}

impl Site {
    /// Validate `config`, build every widget and append them to `<body>`.
    pub fn mount(
        dom: &Dom,
        config: &SiteConfig,
        content: &SiteContent,
        api: Rc<dyn SiteApi>,
        navigator: Rc<dyn Navigator>,
    ) -> Result<Self, SiteError> {
        config.validate()?;

        let header = Header::new(dom, &config.title, config.initial_theme)?;
        let auth = Authentication::new(dom, Rc::clone(&api), navigator)?;
        let comments =
            CommentSection::new(dom, api, config.comment_page_size, Some(auth.signal()))?;
        let projects = project_section(dom, &content.projects)?;
        let dishes = content
            .dishes
            .iter()
            .map(|dish| cooking_section(dom, dish))
            .collect::<Result<Vec<_>, _>>()?;

        let main = html!(
            dom,
            r#"
            <main>
              {}
              {}
              <h2>Coding</h2>
              {}
              <h2>Cooking</h2>
              {}
              {}
            </main>"#,
            content.intro.as_str(),
            auth.root(),
            projects,
            dishes,
            comments.root(),
        )?;

        let toaster = Toaster::new(dom, config.toast_timeout)?;
        let lightbox = Lightbox::new(dom)?;
        let footer = footer(dom)?;

        let body = dom.body();
        header.mount(dom, body);
        dom.append_children(body, &[main, footer]);
        toaster.mount(dom, body);
        lightbox.mount(dom, body);
        info!(
            projects = content.projects.len(),
            dishes = content.dishes.len(),
            "site mounted"
        );

        Ok(Self {
            dom: dom.clone(),
            main,
            header,
            auth,
            comments,
            toaster,
            lightbox,
        })
    }

    /// [`mount`](Self::mount) against the real backend at `config.api_base`.
    pub fn mount_http(
        dom: &Dom,
        config: &SiteConfig,
        content: &SiteContent,
        navigator: Rc<dyn Navigator>,
    ) -> Result<Self, SiteError> {
        config.validate()?;
        let api = Rc::new(HttpApi::from_config(config)?);
        Self::mount(dom, config, content, api, navigator)
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn main(&self) -> NodeId {
        self.main
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn auth(&self) -> &Authentication {
        &self.auth
    }

    pub fn comments(&self) -> &CommentSection {
        &self.comments
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// Apply every action queued by the widgets so far.
    pub async fn process_pending(&self) -> usize {
        self.auth.process_pending().await + self.comments.process_pending().await
    }

    /// Drive every widget until [`close`](Self::close) is called.
    pub async fn run(&self) {
        tokio::select! {
            _ = async { tokio::join!(self.auth.run(), self.comments.run()) } => {}
            _ = self.toaster.run(TOAST_TICK) => {}
        }
        info!("site stopped");
    }

    /// Stop [`run`](Self::run) once the in-flight actions finish.
    pub fn close(&self) {
        self.auth.close();
        self.comments.close();
    }

    /// The whole `<body>` as HTML.
    pub fn render_html(&self) -> String {
        self.dom.outer_html(self.dom.body())
    }
}
