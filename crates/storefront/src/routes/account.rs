//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use teeforge_core::{Money, TShirtId};
use teeforge_core::account::{CustomerDraft, PasswordRule, User};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::TShirtRecord;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Notice, PageContext, session_keys};
use crate::state::AppState;

/// Shown when the backend rejects a profile update without saying why.
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";

/// Saved t-shirt display data for templates.
pub struct TShirtView {
    pub id: Option<TShirtId>,
    pub name: String,
    pub description: String,
    /// Formatted for display, e.g. `R150.00`.
    pub price: Option<String>,
    pub details: String,
}

impl From<TShirtRecord> for TShirtView {
    fn from(record: TShirtRecord) -> Self {
        let details = [&record.color, &record.size, &record.view]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ");
        Self {
            id: record.tshirt_id,
            price: record
                .price
                .and_then(|p| Money::new(p).ok())
                .map(|m| m.to_string()),
            name: record.name,
            description: record.description,
            details,
        }
    }
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/show.html")]
pub struct AccountTemplate {
    pub page: PageContext,
    pub form: CustomerDraft,
    pub role: String,
    pub editable: bool,
    pub tshirts: Vec<TShirtView>,
}

/// Display the profile and saved t-shirts.
#[instrument(skip(state, session, current_user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
) -> Result<Response> {
    let backend = current_user.backend(state.backend());

    // Customers see the backend's current copy; the session copy can be stale.
    let mut form = CustomerDraft::from_profile(current_user.user.profile());
    if let Some(id) = current_user.user.as_customer().and_then(|_| current_user.id()) {
        match backend.get_customer(id).await {
            Ok(fresh) => form = CustomerDraft::from_profile(&fresh.profile),
            Err(e) => tracing::warn!(error = %e, "Could not refresh profile"),
        }
    }

    let tshirts = match backend.list_tshirts().await {
        Ok(records) => records.into_iter().map(TShirtView::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not load saved t-shirts");
            Vec::new()
        }
    };

    Ok(AccountTemplate {
        form,
        role: current_user.user.role().to_string(),
        editable: current_user.user.as_customer().is_some(),
        tshirts,
        page: PageContext::load(&session, Some(current_user)).await,
    }
    .into_response())
}

/// Save profile changes.
///
/// The backend's reply replaces the session copy of the user; the bearer token
/// is kept.
#[instrument(skip(state, session, current_user, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
    Form(form): Form<CustomerDraft>,
) -> Result<Response> {
    let Some(existing) = current_user.user.as_customer() else {
        Notice::error("Only customer profiles can be edited here")
            .flash(&session)
            .await?;
        return Ok(Redirect::to("/account").into_response());
    };

    let mut customer = match form.to_customer(PasswordRule::KeepWhenBlank, Some(existing)) {
        Ok(customer) => customer,
        Err(e) => {
            Notice::error(e.to_string()).flash(&session).await?;
            return Ok(Redirect::to("/account").into_response());
        }
    };
    // The profile form never changes the password.
    customer.password = None;

    let backend = current_user.backend(state.backend());
    match backend.update_customer(&customer).await {
        Ok(updated) => {
            let refreshed = CurrentUser {
                user: User::Customer(updated),
                token: current_user.token.clone(),
            };
            session
                .insert(session_keys::CURRENT_USER, &refreshed)
                .await?;
            Notice::success("Profile updated successfully")
                .flash(&session)
                .await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Profile update failed");
            Notice::error(e.user_message(PROFILE_UPDATE_FAILED))
                .flash(&session)
                .await?;
        }
    }

    Ok(Redirect::to("/account").into_response())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_tshirt_view_joins_details() {
        let record = TShirtRecord {
            tshirt_id: Some(TShirtId::new(8)),
            name: "Springbok".into(),
            description: String::new(),
            price: Some(Decimal::new(15_000, 2)),
            color: Some("green".into()),
            size: Some("L".into()),
            view: None,
        };
        let view = TShirtView::from(record);
        assert_eq!(view.details, "green / L");
        assert_eq!(view.price.as_deref(), Some("R150.00"));
    }
}
