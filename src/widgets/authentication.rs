//! Authentication control: a button that reads "Log in" or "Log out" depending
//! on the session, plus the session state other widgets observe.
//!
//! The state starts as [`AuthState::Loading`] and a refresh is queued at
//! construction. Refreshes are also queued whenever `auth-login` or
//! `auth-logout` reaches `<body>`, which is how the login popup reports back.

use std::rc::Rc;

use tracing::{debug, error};

use crate::api::{ApiError, MeResponse, SiteApi, UserInfo};
use crate::dom::{Dom, NodeId};
use crate::event::names::{AUTH_LOGIN, AUTH_LOGOUT};
use crate::html;
use crate::reactive::Signal;
use crate::template::{on, TemplateError};
use crate::widget::Widget;
use crate::widgets::queue::{self, ActionQueue};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Loading,
    LoggedOut {
        login_uri: String,
    },
    LoggedIn(UserInfo),
}

impl AuthState {
    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            Self::LoggedIn(user) => Some(user),
            _ => None,
        }
    }
}

impl From<MeResponse> for AuthState {
    fn from(me: MeResponse) -> Self {
        match me {
            MeResponse::LoggedIn(user) => Self::LoggedIn(user),
            MeResponse::LoggedOut(info) => Self::LoggedOut {
                login_uri: info.login_uri,
            },
        }
    }
}

/// Opens the login page in a new window.
pub trait Navigator {
    /// Open `uri`. Returns `false` if the window could not be opened.
    fn open(&self, uri: &str) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login window for {uri} was blocked")]
    PopupBlocked { uri: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthAction {
    Refresh,
    Login,
    Logout,
}

pub struct Authentication {
    root: NodeId,
    state: Signal<AuthState>,
    api: Rc<dyn SiteApi>,
    navigator: Rc<dyn Navigator>,
    queue: ActionQueue<AuthAction>,
}

impl Authentication {
    pub fn new(
        dom: &Dom,
        api: Rc<dyn SiteApi>,
        navigator: Rc<dyn Navigator>,
    ) -> Result<Self, TemplateError> {
        let queue = ActionQueue::new();
        let state = Signal::new(AuthState::Loading);

        let loading = html!(dom, "<span>Loading...</span>")?;
        let tx = queue.sender();
        let login = html!(
            dom,
            r#"<button type="button" class="auth-login" @click={}>Log in</button>"#,
            on(move |_, _| queue::send(&tx, AuthAction::Login)),
        )?;
        let tx = queue.sender();
        let logout = html!(
            dom,
            r#"<button type="button" class="auth-logout" @click={}>Log out</button>"#,
            on(move |_, _| queue::send(&tx, AuthAction::Logout)),
        )?;
        let root = html!(dom, r#"<div class="auth-container loading">{}</div>"#, loading)?;

        let weak = dom.downgrade();
        state.subscribe(move |new, _| {
            let Some(dom) = weak.upgrade() else {
                return;
            };
            dom.remove_class(root, "loading");
            dom.detach_children(root);
            let content = match new {
                AuthState::Loading => loading,
                AuthState::LoggedOut { .. } => login,
                AuthState::LoggedIn(_) => logout,
            };
            dom.append_child(root, content);
        });

        for name in [AUTH_LOGIN, AUTH_LOGOUT] {
            let tx = queue.sender();
            dom.on(dom.body(), name, move |_, _| {
                queue::send(&tx, AuthAction::Refresh)
            });
        }

        queue.push(AuthAction::Refresh);
        Ok(Self {
            root,
            state,
            api,
            navigator,
            queue,
        })
    }

    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    /// The session state, shared with widgets that depend on it.
    pub fn signal(&self) -> &Signal<AuthState> {
        &self.state
    }

    /// Re-read the session from the server.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let me = self.api.current_user().await?;
        let state = AuthState::from(me);
        debug!(logged_in = state.user().is_some(), "session refreshed");
        self.state.set(state);
        Ok(())
    }

    /// Open the login page if logged out. A no-op otherwise.
    pub fn login(&self) -> Result<(), AuthError> {
        let AuthState::LoggedOut { login_uri } = self.state.get() else {
            return Ok(());
        };
        if self.navigator.open(&login_uri) {
            Ok(())
        } else {
            Err(AuthError::PopupBlocked { uri: login_uri })
        }
    }

    /// Hit the logout URI and re-read the session. A no-op unless logged in.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let AuthState::LoggedIn(user) = self.state.get() else {
            return Ok(());
        };
        self.api.logout(&user.logout_uri).await?;
        self.refresh().await
    }

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

    async fn apply(&self, action: AuthAction) {
        let result = match action {
            AuthAction::Refresh => self.refresh().await,
            AuthAction::Login => self.login(),
            AuthAction::Logout => self.logout().await,
        };
        if let Err(err) = result {
            error!(?action, %err, "authentication action failed");
        }
    }
}

impl Widget for Authentication {
    fn widget_type(&self) -> &str {
        "authentication"
    }

    fn root(&self) -> NodeId {
        self.root
    }
}
