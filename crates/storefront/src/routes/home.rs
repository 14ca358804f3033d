//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use teeforge_core::design::GarmentColor;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::PageContext;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub unit_price: String,
    pub colors: &'static [GarmentColor],
}

/// Display the home page.
#[instrument(skip(state, session, current_user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
) -> impl IntoResponse {
    HomeTemplate {
        page: PageContext::load(&session, current_user).await,
        unit_price: state.config().designer.unit_price.to_string(),
        colors: GarmentColor::ALL,
    }
}
