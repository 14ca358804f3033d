//! Types kept in the visitor's session.

pub mod notice;
pub mod page;
pub mod session;

pub use notice::{Notice, NoticeLevel};
pub use page::PageContext;
pub use session::{CurrentUser, session_keys};
