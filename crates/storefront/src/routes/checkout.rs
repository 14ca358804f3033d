//! Checkout route handlers.
//!
//! The shopper picks a payment method and the cart total is submitted to the
//! backend as a payment. Cash on collection is recorded as completed; bank
//! transfer and cryptocurrency stay pending until the money arrives, so the
//! confirmation page shows where to send it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use teeforge_core::payment::{PaymentInfo, PaymentRequest, confirmation_message};
use teeforge_core::{Email, PaymentMethod};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::session::{load_cart, save_cart};
use crate::models::{CurrentUser, Notice, PageContext};
use crate::routes::cart::CartView;
use crate::state::AppState;

/// Shown when the backend does not accept the payment.
pub const PAYMENT_FAILED: &str = "Failed to create payment. Please try again.";

/// Payment method radio button.
pub struct MethodView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn method_choices(selected: PaymentMethod) -> Vec<MethodView> {
    PaymentMethod::ALL
        .iter()
        .map(|m| MethodView {
            value: m.as_str(),
            label: m.label(),
            selected: *m == selected,
        })
        .collect()
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub method: PaymentMethod,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub methods: Vec<MethodView>,
    pub name: String,
    pub email: String,
    pub payment_info: Option<PaymentInfo>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub page: PageContext,
    pub message: String,
    pub method: PaymentMethod,
    pub amount: String,
    pub payment_info: Option<PaymentInfo>,
}

/// Instructions are optional: without them the page still works.
async fn load_payment_info(state: &AppState, user: &CurrentUser) -> Option<PaymentInfo> {
    match user.backend(state.backend()).payment_info().await {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(error = %e, "Payment instructions unavailable");
            None
        }
    }
}

/// Display the checkout page.
#[instrument(skip(state, session, current_user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
) -> Result<Response> {
    let cart = load_cart(&session).await?;
    let profile = current_user.user.profile();
    let name = profile.full_name();
    let email = profile.contact.email.clone();
    let payment_info = load_payment_info(&state, &current_user).await;

    Ok(CheckoutTemplate {
        cart: CartView::from(&cart),
        methods: method_choices(PaymentMethod::BankTransfer),
        name,
        email,
        payment_info,
        page: PageContext::load(&session, Some(current_user)).await,
    }
    .into_response())
}

/// Submit the payment.
///
/// On success the cart is emptied; on failure it is left as it was and no
/// retry is attempted.
#[instrument(skip(state, session, current_user, form), fields(method = %form.method))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    if cart.is_empty() {
        Notice::error("Cart is empty").flash(&session).await?;
        return Ok(Redirect::to("/checkout").into_response());
    }
    if form.name.trim().is_empty() {
        Notice::error("Name is required").flash(&session).await?;
        return Ok(Redirect::to("/checkout").into_response());
    }
    if let Err(e) = Email::parse(&form.email) {
        Notice::error(e.to_string()).flash(&session).await?;
        return Ok(Redirect::to("/checkout").into_response());
    }

    let total = cart.total();
    let request = PaymentRequest::for_cart(total, form.method);
    let backend = current_user.backend(state.backend());

    let record = match backend.create_payment(&request).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(error = %e, "Payment failed");
            Notice::error(PAYMENT_FAILED).flash(&session).await?;
            return Ok(Redirect::to("/checkout").into_response());
        }
    };

    cart.clear();
    save_cart(&session, &cart).await?;

    let payment_id = record.payment_id.to_string();
    add_breadcrumb("checkout", "Payment created", Some(&[("payment_id", payment_id.as_str())]));
    tracing::info!(payment_id = %record.payment_id, status = %request.payment_status, "Payment created");

    let payment_info = if form.method == PaymentMethod::Cash {
        None
    } else {
        load_payment_info(&state, &current_user).await
    };

    Ok(ConfirmationTemplate {
        message: confirmation_message(record.payment_id, form.method),
        method: form.method,
        amount: total.rounded().to_string(),
        payment_info,
        page: PageContext::load(&session, Some(current_user)).await,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_transfer_is_preselected() {
        let methods = method_choices(PaymentMethod::BankTransfer);
        assert_eq!(methods.len(), 3);
        let selected: Vec<_> = methods.iter().filter(|m| m.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(|m| m.value), Some("BANK_TRANSFER"));
    }
}
