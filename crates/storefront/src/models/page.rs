//! Data every full page needs for the shared layout.

use tower_sessions::Session;

use super::notice::Notice;
use super::session::{CurrentUser, load_cart};

/// Navigation state and the pending notice, rendered by `base.html`.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub current_user: Option<CurrentUser>,
    pub notice: Option<Notice>,
    pub cart_count: usize,
}

impl PageContext {
    /// Build the layout context, consuming the pending notice.
    pub async fn load(session: &Session, current_user: Option<CurrentUser>) -> Self {
        let cart_count = load_cart(session)
            .await
            .map(|cart| cart.line_count())
            .unwrap_or_default();
        Self {
            current_user,
            notice: Notice::take(session).await,
            cart_count,
        }
    }

    /// Context for pages rendered outside a handler, such as rejections.
    #[must_use]
    pub fn signed_in(user: CurrentUser) -> Self {
        Self {
            current_user: Some(user),
            ..Self::default()
        }
    }

    /// Context carrying a notice produced while handling this request.
    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    /// Name shown in the navigation bar.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.current_user.as_ref().map(|u| u.user.display_name())
    }
}
