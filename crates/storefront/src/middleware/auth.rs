//! Authentication extractors and session helpers.
//!
//! Signing in stores the backend's user record (and bearer token) under
//! [`session_keys::CURRENT_USER`]; signing out flushes the whole session.
//! Every later request restores the user from the session store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::filters;
use crate::models::{CurrentUser, PageContext, session_keys};

/// Extractor that requires a signed-in user.
///
/// Page requests without a user are redirected to the login page; `/api/`
/// requests get a bare 401.
pub struct RequireAuth(pub CurrentUser);

/// Rejection type for authentication failures.
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Return 401 Unauthorized.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let rejection = if parts.uri.path().starts_with("/api/") {
            AuthRejection::Unauthorized
        } else {
            AuthRejection::RedirectToLogin
        };

        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(rejection);
        };

        current_user(session).await.map(Self).ok_or(rejection)
    }
}

/// Extractor that optionally gets the current user.
///
/// Never rejects; yields `None` for anonymous visitors.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };
        Ok(Self(user))
    }
}

/// Extractor that requires a signed-in administrator.
pub struct RequireAdmin(pub CurrentUser);

/// Access denied page.
#[derive(Template, WebTemplate)]
#[template(path = "errors/forbidden.html")]
pub struct ForbiddenTemplate {
    pub page: PageContext,
}

/// Rejection for [`RequireAdmin`].
pub enum AdminRejection {
    NotSignedIn(AuthRejection),
    Forbidden(Box<CurrentUser>),
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotSignedIn(rejection) => rejection.into_response(),
            Self::Forbidden(user) => {
                tracing::warn!(user = %user.user.profile().user_name, "Non-admin denied admin page");
                (
                    StatusCode::FORBIDDEN,
                    ForbiddenTemplate {
                        page: PageContext::signed_in(*user),
                    },
                )
                    .into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(AdminRejection::NotSignedIn)?;

        if user.is_admin() {
            Ok(Self(user))
        } else {
            Err(AdminRejection::Forbidden(Box::new(user)))
        }
    }
}

/// The signed-in user, if any. A store failure reads as signed out.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Sign a user in.
///
/// The session id is cycled first so a pre-login id cannot be replayed.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Sign the user out, dropping the cart and design draft with them.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use teeforge_core::UserId;
    use teeforge_core::account::{Admin, Customer, User, UserProfile};
    use tower_sessions::MemoryStore;

    use super::*;

    fn customer() -> CurrentUser {
        CurrentUser {
            user: User::Customer(Customer {
                profile: UserProfile {
                    user_id: Some(UserId::new(4)),
                    user_name: "thandi".into(),
                    ..UserProfile::default()
                },
                ..Customer::default()
            }),
            token: None,
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            user: User::Admin(Admin {
                profile: UserProfile {
                    user_id: Some(UserId::new(1)),
                    user_name: "root".into(),
                    ..UserProfile::default()
                },
                ..Admin::default()
            }),
            token: None,
        }
    }

    fn parts_for(path: &str, session: Option<Session>) -> Parts {
        let (mut parts, ()) = Request::builder().uri(path).body(()).unwrap().into_parts();
        if let Some(session) = session {
            parts.extensions.insert(session);
        }
        parts
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_login_then_restore_yields_same_user() {
        let session = session();
        set_current_user(&session, &customer()).await.unwrap();
        let restored = current_user(&session).await.unwrap();
        assert_eq!(restored.id(), Some(UserId::new(4)));
        assert_eq!(restored.user.profile().user_name, "thandi");
    }

    #[tokio::test]
    async fn test_logout_then_restore_yields_nobody() {
        let session = session();
        set_current_user(&session, &customer()).await.unwrap();
        clear_current_user(&session).await.unwrap();
        assert!(current_user(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_require_auth_redirects_pages_and_rejects_api() {
        let mut page = parts_for("/account", Some(session()));
        let rejection = RequireAuth::from_request_parts(&mut page, &()).await.err().unwrap();
        assert!(matches!(rejection, AuthRejection::RedirectToLogin));
        assert_eq!(rejection.into_response().status(), StatusCode::SEE_OTHER);

        let mut api = parts_for("/api/anything", None);
        let rejection = RequireAuth::from_request_parts(&mut api, &()).await.err().unwrap();
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_optional_auth_never_rejects() {
        let mut parts = parts_for("/", None);
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_require_admin_forbids_customers() {
        let session = session();
        set_current_user(&session, &customer()).await.unwrap();
        let mut parts = parts_for("/admin/customers", Some(session));
        let rejection = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_require_admin_admits_admins() {
        let session = session();
        set_current_user(&session, &admin()).await.unwrap();
        let mut parts = parts_for("/admin/customers", Some(session));
        let RequireAdmin(user) = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert!(user.is_admin());
    }
}
