//! Site configuration.

use std::time::Duration;

use crate::widgets::theme_switcher::Theme;

/// Largest page the comment endpoint will serve.
pub const MAX_COMMENT_PAGE_SIZE: usize = 50;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse `{value}`")]
    Invalid { var: &'static str, value: String },

    #[error("comment page size must be between 1 and {max}, got {size}")]
    PageSize { size: usize, max: usize },

    #[error("api base must be an http(s) URL, got `{0}`")]
    ApiBase(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Configuration for the site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// Origin of the backend, e.g. `https://example.com`.
    pub api_base: String,
    /// Comments per page.
    pub comment_page_size: usize,
    /// How long a timed toast stays up.
    pub toast_timeout: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    pub initial_theme: Theme,
    /// Page heading.
    pub title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".into(),
            comment_page_size: 5,
            toast_timeout: Duration::from_millis(7000),
            request_timeout: Duration::from_secs(10),
            initial_theme: Theme::Light,
            title: "Hi!".into(),
        }
    }
}

impl SiteConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `FOLIO_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base) = lookup("FOLIO_API_BASE") {
            config.api_base = base;
        }
        if let Some(size) = lookup("FOLIO_COMMENT_PAGE_SIZE") {
            config.comment_page_size = parse("FOLIO_COMMENT_PAGE_SIZE", &size)?;
        }
        if let Some(ms) = lookup("FOLIO_TOAST_TIMEOUT_MS") {
            config.toast_timeout = Duration::from_millis(parse("FOLIO_TOAST_TIMEOUT_MS", &ms)?);
        }
        if let Some(ms) = lookup("FOLIO_REQUEST_TIMEOUT_MS") {
            config.request_timeout =
                Duration::from_millis(parse("FOLIO_REQUEST_TIMEOUT_MS", &ms)?);
        }
        if let Some(theme) = lookup("FOLIO_THEME") {
            config.initial_theme = parse("FOLIO_THEME", &theme)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the API origin (builder).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Set the comment page size (builder).
    pub fn with_comment_page_size(mut self, size: usize) -> Self {
        self.comment_page_size = size;
        self
    }

    /// Set the toast timeout (builder).
    pub fn with_toast_timeout(mut self, timeout: Duration) -> Self {
        self.toast_timeout = timeout;
        self
    }

    /// Set the request timeout (builder).
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the starting theme (builder).
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.initial_theme = theme;
        self
    }

    /// Set the page heading (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_COMMENT_PAGE_SIZE).contains(&self.comment_page_size) {
            return Err(ConfigError::PageSize {
                size: self.comment_page_size,
                max: MAX_COMMENT_PAGE_SIZE,
            });
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(ConfigError::ApiBase(self.api_base.clone()));
        }
        if self.toast_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("toast timeout"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request timeout"));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = SiteConfig::new();
        assert_eq!(config.comment_page_size, 5);
        assert_eq!(config.toast_timeout, Duration::from_millis(7000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_chain() {
        let config = SiteConfig::new()
            .with_api_base("https://folio.test")
            .with_comment_page_size(20)
            .with_theme(Theme::Dark)
            .with_title("Welcome");
        assert_eq!(config.api_base, "https://folio.test");
        assert_eq!(config.comment_page_size, 20);
        assert_eq!(config.initial_theme, Theme::Dark);
        assert_eq!(config.title, "Welcome");
    }

    #[test]
    fn env_overlay() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("FOLIO_API_BASE", "https://folio.test"),
            ("FOLIO_COMMENT_PAGE_SIZE", "10"),
            ("FOLIO_TOAST_TIMEOUT_MS", "1500"),
            ("FOLIO_THEME", "dark"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "https://folio.test");
        assert_eq!(config.comment_page_size, 10);
        assert_eq!(config.toast_timeout, Duration::from_millis(1500));
        assert_eq!(config.initial_theme, Theme::Dark);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_parse_error() {
        let err = SiteConfig::from_lookup(lookup(&[("FOLIO_COMMENT_PAGE_SIZE", "lots")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "FOLIO_COMMENT_PAGE_SIZE",
                value: "lots".into()
            }
        );
    }

    #[test]
    fn page_size_bounds() {
        assert_eq!(
            SiteConfig::new().with_comment_page_size(0).validate(),
            Err(ConfigError::PageSize { size: 0, max: 50 })
        );
        assert!(SiteConfig::new().with_comment_page_size(50).validate().is_ok());
        assert!(SiteConfig::new().with_comment_page_size(51).validate().is_err());
    }

    #[test]
    fn rejects_bad_base_and_zero_timeouts() {
        assert!(matches!(
            SiteConfig::new().with_api_base("ftp://x").validate(),
            Err(ConfigError::ApiBase(_))
        ));
        assert_eq!(
            SiteConfig::new()
                .with_request_timeout(Duration::ZERO)
                .validate(),
            Err(ConfigError::ZeroDuration("request timeout"))
        );
    }
}
