//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page
//!
//! # Auth
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Login action
//! GET  /auth/register                 - Register page
//! POST /auth/register                 - Register action
//! POST /auth/logout                   - Logout action
//!
//! # Designer (requires auth)
//! GET  /designer                      - Editor with live preview
//! POST /designer/upload               - Accept artwork (multipart `file`)
//! POST /designer/adjust               - Nudge, scale, rotate or reset
//! POST /designer/options              - Colour, size, view, name, quantity
//! POST /designer/remove               - Drop the artwork
//! POST /designer/save                 - Run the save chain, add to cart
//!
//! # Cart & checkout (requires auth)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add (merge) a line
//! POST /cart/remove                   - Remove a line
//! POST /cart/clear                    - Empty the cart
//! GET  /checkout                      - Payment method and instructions
//! POST /checkout                      - Submit payment
//!
//! # Account (requires auth)
//! GET  /account                       - Profile and saved t-shirts
//! POST /account                       - Update profile
//!
//! # Admin (requires ADMIN)
//! GET  /admin/customers               - List (optional ?filter=)
//! POST /admin/customers               - Create
//! GET  /admin/customers/search        - Backend search (?name=)
//! GET  /admin/customers/new           - Create form
//! GET  /admin/customers/{id}          - Detail
//! POST /admin/customers/{id}          - Update
//! GET  /admin/customers/{id}/edit     - Edit form
//! GET  /admin/customers/{id}/delete   - Delete confirmation
//! POST /admin/customers/{id}/delete   - Delete (requires confirm=yes)
//! POST /admin/customers/{id}/activate
//! POST /admin/customers/{id}/deactivate
//! GET  /admin/placements              - Stored position/rotation/scale records
//! POST /admin/placements/{kind}/{id}  - Update one record
//! POST /admin/placements/{kind}/{id}/delete
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod designer;
pub mod home;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Multipart envelope allowance on top of the artwork limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the designer routes router.
///
/// The handler enforces the exact artwork limit itself. The body limit is
/// twice that plus multipart framing, so moderately oversized files are read
/// to the end and rejected with a notice instead of a reset connection.
pub fn designer_routes(max_upload_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(designer::show))
        .route(
            "/upload",
            post(designer::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/adjust", post(designer::adjust))
        .route("/options", post(designer::options))
        .route("/remove", post(designer::remove))
        .route("/save", post(designer::save))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/", get(account::show).post(account::update))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    use admin::{customers, placements};

    Router::new()
        .route("/customers", get(customers::index).post(customers::create))
        .route("/customers/search", get(customers::search))
        .route("/customers/new", get(customers::new))
        .route(
            "/customers/{id}",
            get(customers::show).post(customers::update),
        )
        .route("/customers/{id}/edit", get(customers::edit))
        .route(
            "/customers/{id}/delete",
            get(customers::confirm_delete).post(customers::delete),
        )
        .route("/customers/{id}/activate", post(customers::activate))
        .route("/customers/{id}/deactivate", post(customers::deactivate))
        .route("/placements", get(placements::index))
        .route("/placements/{kind}/{id}", post(placements::update))
        .route("/placements/{kind}/{id}/delete", post(placements::delete))
}

/// Create all routes for the storefront except `/auth`, which the caller
/// wraps in the rate limiter.
pub fn routes(max_upload_bytes: u64) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/designer", designer_routes(max_upload_bytes))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .nest("/account", account_routes())
        .nest("/admin", admin_routes())
}
