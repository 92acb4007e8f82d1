//! Theme switcher: a button that flips the body between light and dark.

use std::fmt;
use std::str::FromStr;

use crate::dom::{Dom, NodeId};
use crate::html;
use crate::reactive::Signal;
use crate::template::{on, TemplateError};
use crate::widget::Widget;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Body class for this theme.
    pub fn class(self) -> &'static str {
        match self {
            Self::Light => "theme-light",
            Self::Dark => "theme-dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}`")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(UnknownTheme(s.to_owned())),
        }
    }
}

/// Put `theme` on the body: exactly one `theme-*` class plus `data-theme`.
fn apply(dom: &Dom, theme: Theme) {
    let body = dom.body();
    dom.remove_class(body, theme.toggled().class());
    dom.add_class(body, theme.class());
    dom.set_attr(body, "data-theme", theme.as_str());
}

// ---------------------------------------------------------------------------
// ThemeSwitcher
// ---------------------------------------------------------------------------

pub struct ThemeSwitcher {
    root: NodeId,
    theme: Signal<Theme>,
}

impl ThemeSwitcher {
    /// Build the button and apply `initial` to the body immediately.
    pub fn new(dom: &Dom, initial: Theme) -> Result<Self, TemplateError> {
        let theme = Signal::new(initial);
        apply(dom, initial);

        let weak = dom.downgrade();
        theme.subscribe(move |new, _| {
            if let Some(dom) = weak.upgrade() {
                apply(&dom, *new);
            }
        });

        let toggle = theme.clone();
        let root = html!(
            dom,
            r#"<button type="button" class="theme-switcher" @click={}>Switch theme</button>"#,
            on(move |_, _| toggle.update(|t| *t = t.toggled())),
        )?;

        Ok(Self { root, theme })
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
    }

    pub fn toggle(&self) {
        self.theme.update(|t| *t = t.toggled());
    }

    /// The underlying signal, for observers.
    pub fn signal(&self) -> &Signal<Theme> {
        &self.theme
    }
}

impl Widget for ThemeSwitcher {
    fn widget_type(&self) -> &str {
        "theme-switcher"
    }

    fn root(&self) -> NodeId {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_theme() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!(" light ".parse::<Theme>(), Ok(Theme::Light));
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn initial_theme_is_applied() {
        let dom = Dom::new();
        let switcher = ThemeSwitcher::new(&dom, Theme::Dark).unwrap();
        assert_eq!(switcher.theme(), Theme::Dark);
        assert!(dom.has_class(dom.body(), "theme-dark"));
        assert_eq!(dom.attr(dom.body(), "data-theme").as_deref(), Some("dark"));
    }

    #[test]
    fn click_toggles_body_class() {
        let dom = Dom::new();
        let switcher = ThemeSwitcher::new(&dom, Theme::Light).unwrap();
        switcher.mount(&dom, dom.body());

        dom.click(switcher.root());
        assert_eq!(switcher.theme(), Theme::Dark);
        assert!(dom.has_class(dom.body(), "theme-dark"));
        assert!(!dom.has_class(dom.body(), "theme-light"));

        dom.click(switcher.root());
        assert_eq!(switcher.theme(), Theme::Light);
        assert!(dom.has_class(dom.body(), "theme-light"));
        assert_eq!(dom.attr(dom.body(), "data-theme").as_deref(), Some("light"));
    }

    #[test]
    fn signal_observers_see_changes() {
        let dom = Dom::new();
        let switcher = ThemeSwitcher::new(&dom, Theme::Light).unwrap();
        let seen = std::rc::Rc::new(std::cell::Cell::new(None));
        let s = seen.clone();
        switcher.signal().subscribe(move |new, old| s.set(Some((*new, *old))));
        switcher.toggle();
        assert_eq!(seen.get(), Some((Theme::Dark, Theme::Light)));
    }
}
