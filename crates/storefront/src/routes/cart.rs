//! Cart route handlers.
//!
//! The cart is kept in the session. Lines are keyed by t-shirt id, so adding
//! an id that is already present raises its quantity instead of adding a line.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use teeforge_core::cart::{Cart, CartItem};
use teeforge_core::design::DesignDraft;
use teeforge_core::{Money, TShirtId};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::TShirtRecord;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::session::{load_cart, save_cart};
use crate::models::{Notice, PageContext};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: TShirtId,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub is_empty: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart
                .items()
                .iter()
                .map(|item| CartLineView {
                    id: item.id,
                    name: item.name.clone(),
                    unit_price: item.unit_price.to_string(),
                    quantity: item.quantity(),
                    line_total: item.line_total().to_string(),
                })
                .collect(),
            total: cart.total().to_string(),
            is_empty: cart.is_empty(),
        }
    }
}

/// Add to cart form data.
///
/// Name and price always come from the backend's t-shirt record, never from
/// the form.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: TShirtId,
    pub quantity: Option<u32>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: TShirtId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(session, current_user))]
pub async fn show(session: Session, RequireAuth(current_user): RequireAuth) -> Result<Response> {
    let cart = load_cart(&session).await?;
    Ok(CartShowTemplate {
        cart: CartView::from(&cart),
        page: PageContext::load(&session, Some(current_user)).await,
    }
    .into_response())
}

/// Add a line, merging with an existing line of the same id.
#[instrument(skip(state, session, current_user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    let quantity = form.quantity.unwrap_or(1);

    let (name, unit_price) = match cart.get(form.item_id) {
        Some(existing) => (existing.name.clone(), existing.unit_price),
        None => {
            let backend = current_user.backend(state.backend());
            let tshirts = match backend.list_tshirts().await {
                Ok(tshirts) => tshirts,
                Err(e) => {
                    tracing::warn!(error = %e, item_id = %form.item_id, "T-shirt lookup failed");
                    Notice::error(e.user_message("Could not load that t-shirt"))
                        .flash(&session)
                        .await?;
                    return Ok(Redirect::to("/cart").into_response());
                }
            };
            match catalogue_line(&tshirts, form.item_id, state.config().designer.unit_price) {
                Ok(line) => line,
                Err(message) => {
                    Notice::error(message).flash(&session).await?;
                    return Ok(Redirect::to("/cart").into_response());
                }
            }
        }
    };

    match CartItem::new(form.item_id, name, unit_price, quantity).and_then(|item| {
        let name = item.name.clone();
        cart.add(item).map(|()| name)
    }) {
        Ok(name) => {
            save_cart(&session, &cart).await?;
            Notice::success(format!("{name} added to cart"))
                .flash(&session)
                .await?;
        }
        Err(e) => Notice::error(e.to_string()).flash(&session).await?,
    }

    Ok(Redirect::to("/cart").into_response())
}

/// Name and unit price for `id` from the backend's t-shirt records. A record
/// without a price is charged at `default_price`.
fn catalogue_line(
    tshirts: &[TShirtRecord],
    id: TShirtId,
    default_price: Money,
) -> std::result::Result<(String, Money), &'static str> {
    let record = tshirts
        .iter()
        .find(|t| t.tshirt_id == Some(id))
        .ok_or("That t-shirt is not available")?;
    let unit_price = match record.price {
        Some(price) => Money::new(price).map_err(|_| "That t-shirt has no valid price")?,
        None => default_price,
    };
    let name = match record.name.trim() {
        "" => DesignDraft::DEFAULT_NAME.to_owned(),
        name => name.to_owned(),
    };
    Ok((name, unit_price))
}

/// Remove a line. Removing an id that is not in the cart does nothing.
#[instrument(skip(session, _current_user))]
pub async fn remove(
    session: Session,
    RequireAuth(_current_user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(form.item_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(Redirect::to("/cart").into_response())
}

/// Empty the cart.
#[instrument(skip(session, _current_user))]
pub async fn clear(session: Session, RequireAuth(_current_user): RequireAuth) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_view_formats_money() {
        let mut cart = Cart::new();
        cart.add(CartItem::new(TShirtId::new(3), "Braai Tee", Money::parse("150").unwrap(), 2).unwrap())
            .unwrap();
        cart.add(CartItem::new(TShirtId::new(4), "Rugby Tee", Money::parse("99.99").unwrap(), 1).unwrap())
            .unwrap();

        let view = CartView::from(&cart);
        assert!(!view.is_empty);
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].line_total, "R300.00");
        assert_eq!(view.total, "R399.99");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert!(view.is_empty);
        assert_eq!(view.total, "R0.00");
    }

    fn record(id: i64, name: &str, price: Option<&str>) -> TShirtRecord {
        TShirtRecord {
            tshirt_id: Some(TShirtId::new(id)),
            name: name.into(),
            description: String::new(),
            price: price.map(|p| p.parse().unwrap()),
            color: None,
            size: None,
            view: None,
        }
    }

    #[test]
    fn test_catalogue_line_uses_backend_price() {
        let tshirts = [record(7, "Sunset tee", Some("299.99")), record(8, "  ", None)];
        let default = Money::parse("150").unwrap();

        let (name, price) = catalogue_line(&tshirts, TShirtId::new(7), default).unwrap();
        assert_eq!(name, "Sunset tee");
        assert_eq!(price.to_string(), "R299.99");

        let (name, price) = catalogue_line(&tshirts, TShirtId::new(8), default).unwrap();
        assert_eq!(name, DesignDraft::DEFAULT_NAME);
        assert_eq!(price, default);
    }

    #[test]
    fn test_catalogue_line_unknown_or_negative() {
        let tshirts = [record(9, "Odd", Some("-5"))];
        assert_eq!(
            catalogue_line(&tshirts, TShirtId::new(404), Money::ZERO),
            Err("That t-shirt is not available")
        );
        assert_eq!(
            catalogue_line(&tshirts, TShirtId::new(9), Money::ZERO),
            Err("That t-shirt has no valid price")
        );
    }
}
