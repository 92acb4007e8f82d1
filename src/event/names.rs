//! Custom event names used as in-page pub/sub between widgets.

/// Fired (bubbling) when a login completes elsewhere; auth widgets re-poll.
pub const AUTH_LOGIN: &str = "auth-login";
/// Fired (bubbling) when a logout completes elsewhere; auth widgets re-poll.
pub const AUTH_LOGOUT: &str = "auth-logout";

/// Request to open the lightbox. Detail carries the image URI.
pub const LIGHTBOX_SHOW: &str = "lightbox:show";
/// Request to close the lightbox.
pub const LIGHTBOX_HIDE: &str = "lightbox:hide";
/// Older spelling of [`LIGHTBOX_SHOW`], still honoured.
pub const LIGHTBOX_SHOW_LEGACY: &str = "lightbox-show";
/// Older spelling of [`LIGHTBOX_HIDE`], still honoured.
pub const LIGHTBOX_HIDE_LEGACY: &str = "lightbox-hide";

pub const READMORE_EXPAND: &str = "readmore-expand";
pub const READMORE_COLLAPSE: &str = "readmore-collapse";

/// Fired on a toast element when it is dismissed.
pub const TOAST_DISMISSED: &str = "toast-dismissed";
