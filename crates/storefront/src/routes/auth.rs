//! Authentication route handlers.
//!
//! Login and registration go straight to the REST backend. A successful login
//! stores the returned user record and bearer token in the session; logout
//! flushes the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use teeforge_core::account::CustomerDraft;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::AuthenticatedUser;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Notice, PageContext};
use crate::state::AppState;

/// Shown when the backend rejects a login without saying why.
pub const LOGIN_FAILED: &str = "Login failed";

/// Shown when the backend rejects a registration without saying why.
pub const REGISTRATION_FAILED: &str = "Registration failed";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub user_name: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub form: CustomerDraft,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Where a freshly signed-in user lands.
fn landing_page(user: &CurrentUser) -> &'static str {
    if user.is_admin() {
        "/admin/customers"
    } else {
        "/designer"
    }
}

/// Display the login page.
pub async fn login_page(session: Session, OptionalAuth(current_user): OptionalAuth) -> Response {
    if let Some(user) = current_user {
        return Redirect::to(landing_page(&user)).into_response();
    }
    LoginTemplate {
        page: PageContext::load(&session, None).await,
        user_name: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(user_name = %form.user_name))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let user_name = form.user_name.trim();
    if user_name.is_empty() || form.password.is_empty() {
        return login_failed(&session, user_name, "Please enter your username and password").await;
    }

    match state.backend().login(user_name, &form.password).await {
        Ok(authenticated) => sign_in(&session, authenticated).await,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            login_failed(&session, user_name, &e.user_message(LOGIN_FAILED)).await
        }
    }
}

/// Re-render the login form with the username kept and an error notice.
async fn login_failed(session: &Session, user_name: &str, message: &str) -> Response {
    LoginTemplate {
        page: PageContext::load(session, None)
            .await
            .with_notice(Notice::error(message)),
        user_name: user_name.to_owned(),
    }
    .into_response()
}

/// Store the user in the session and send them on.
async fn sign_in(session: &Session, authenticated: AuthenticatedUser) -> Response {
    let current_user = CurrentUser {
        user: authenticated.user,
        token: authenticated.token,
    };

    if let Err(e) = set_current_user(session, &current_user).await {
        tracing::error!("Failed to set session: {}", e);
        let _ = Notice::error(LOGIN_FAILED).flash(session).await;
        return Redirect::to("/auth/login").into_response();
    }

    set_sentry_user(
        current_user.id().map(|id| id.to_string()),
        &current_user.user.profile().user_name,
    );
    tracing::info!(role = %current_user.user.role(), "User signed in");

    let _ = Notice::success(format!("Welcome, {}!", current_user.user.display_name()))
        .flash(session)
        .await;
    Redirect::to(landing_page(&current_user)).into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(session: Session, OptionalAuth(current_user): OptionalAuth) -> Response {
    if let Some(user) = current_user {
        return Redirect::to(landing_page(&user)).into_response();
    }
    RegisterTemplate {
        page: PageContext::load(&session, None).await,
        form: CustomerDraft::default(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// Every field except the numbered address parts is required. The password is
/// never echoed back into the re-rendered form.
#[instrument(skip(state, session, form), fields(user_name = %form.user_name))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CustomerDraft>,
) -> Response {
    let registration = match form.to_registration() {
        Ok(registration) => registration,
        Err(e) => return register_failed(&session, form, &e.to_string()).await,
    };

    match state.backend().register(&registration).await {
        Ok(created) if created.token.is_some() => sign_in(&session, created).await,
        Ok(_) => {
            let _ = Notice::success("Registration successful. Please log in.")
                .flash(&session)
                .await;
            Redirect::to("/auth/login").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            register_failed(&session, form, &e.user_message(REGISTRATION_FAILED)).await
        }
    }
}

async fn register_failed(session: &Session, mut form: CustomerDraft, message: &str) -> Response {
    form.password.clear();
    RegisterTemplate {
        page: PageContext::load(session, None)
            .await
            .with_notice(Notice::error(message)),
        form,
    }
    .into_response()
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/auth/login").into_response()
}
