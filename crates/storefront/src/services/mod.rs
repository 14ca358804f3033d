//! Storefront services that sit between the route handlers and the backend.
//!
//! - `uploads` - artwork held in memory between upload and save
//! - `design_save` - the multi-step chain that turns a draft into an order

pub mod design_save;
pub mod uploads;

pub use design_save::{SaveError, SaveGuard, SavePermit, SaveStep, SavedDesign, save_design};
pub use uploads::{StoredUpload, UploadStore};
