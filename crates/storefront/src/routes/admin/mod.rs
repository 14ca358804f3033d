//! Admin console route handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin) and
//! talks to the backend with the admin's bearer token. Mutations redirect to
//! a page that fetches the records again instead of patching anything in the
//! session.

pub mod customers;
pub mod placements;
