//! Teeforge Core - Shared domain types.
//!
//! This crate provides the types used across all Teeforge components:
//! - `storefront` - Customer-facing t-shirt designer, cart, checkout and admin console
//! - `cli` - Command-line tools for session-store setup and backend checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Everything that talks to the REST backend lives in
//! the storefront crate; this crate describes the records exchanged with it and
//! the arithmetic behind the cart and the design placement editor.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, money and status enums
//! - [`account`] - Users, customers, addresses and contacts
//! - [`cart`] - Shopping cart with merge-by-id semantics
//! - [`design`] - Placement math, garment catalogue and image intake rules
//! - [`payment`] - Payment requests, records and payment instructions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod design;
pub mod payment;
pub mod types;

pub use types::*;
