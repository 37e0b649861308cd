//! Application flows on top of the [`Backend`](crate::backend::Backend):
//! the session gate, the add-bookmark form and the synchronized list view.

pub mod form;
pub mod list;
pub mod session;
pub mod view;

pub use form::AddBookmarkForm;
pub use list::{display_domain, BookmarkList, EMPTY_STATE};
pub use session::{Gate, Session};
pub use view::{DeleteMode, ListStatus, ListView, SyncStrategy, ViewOptions, ViewState};
