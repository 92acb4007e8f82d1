//! Page widgets.
//!
//! Each widget builds its nodes with the template renderer at construction
//! time and keeps the ids it needs. Widgets that talk to the backend queue
//! actions from their listeners and apply them in `process_pending` / `run`.

pub mod authentication;
pub mod comments;
pub mod footer;
pub mod header;
pub mod labeled_input;
pub mod lightbox;
pub mod pagination;
mod queue;
pub mod readmore;
pub mod responsive_image;
pub mod sections;
pub mod theme_switcher;
pub mod toast;

pub use authentication::{AuthError, AuthState, Authentication, Navigator};
pub use comments::{CommentError, CommentSection, SubmitOutcome};
pub use footer::footer;
pub use header::Header;
pub use labeled_input::{InputKind, LabeledInput, LabeledInputOptions};
pub use lightbox::{Lightbox, LightboxItem};
pub use pagination::{Page, PageChain, PaginationError};
pub use readmore::ReadMore;
pub use responsive_image::{responsive_image, ImageVariant, ResponsiveImageInfo};
pub use sections::{cooking_section, project_item, project_section, DishInfo, ProjectInfo};
pub use theme_switcher::{Theme, ThemeSwitcher, UnknownTheme};
pub use toast::{ToastHandle, ToastKind, Toaster};
