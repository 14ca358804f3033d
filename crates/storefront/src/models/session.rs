//! Session-related types.
//!
//! Everything the storefront remembers about a visitor lives in their
//! tower-sessions record: who is signed in, the cart, the design draft and a
//! pending notice. The record is persisted by the session store, so a
//! returning visitor picks up where they left off.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use teeforge_core::account::User;
use teeforge_core::cart::Cart;
use teeforge_core::design::DesignDraft;
use teeforge_core::UserId;

use crate::backend::{BackendClient, BearerToken};

/// The signed-in user as returned by the backend at login, plus the bearer
/// token used for every subsequent backend call made on their behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user: User,
    pub token: Option<BearerToken>,
}

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> Option<UserId> {
        self.user.id()
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Backend client authenticated as this user.
    #[must_use]
    pub fn backend(&self, backend: &BackendClient) -> BackendClient {
        backend.with_token(self.token.clone())
    }

    /// Key identifying this user for per-user guards.
    #[must_use]
    pub fn guard_key(&self) -> String {
        self.id().map_or_else(
            || format!("user:{}", self.user.profile().user_name),
            |id| format!("id:{id}"),
        )
    }
}

/// Session keys.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for the design being edited.
    pub const DESIGN_DRAFT: &str = "design_draft";

    /// Key for the one-shot notice shown on the next page.
    pub const NOTICE: &str = "notice";
}

/// Read the cart, or an empty one.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Read the design draft, or a fresh one.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_draft(session: &Session) -> Result<DesignDraft, tower_sessions::session::Error> {
    Ok(session
        .get::<DesignDraft>(session_keys::DESIGN_DRAFT)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_draft(
    session: &Session,
    draft: &DesignDraft,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::DESIGN_DRAFT, draft).await
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_draft(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<DesignDraft>(session_keys::DESIGN_DRAFT)
        .await?;
    Ok(())
}
