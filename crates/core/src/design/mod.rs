//! The design placement editor's pure logic.
//!
//! - [`placement`] - position, scale and rotation state with clamped adjustments
//! - [`garment`] - colour, size and view catalogue plus preview geometry
//! - [`upload`] - image intake rules
//! - [`draft`] - the in-progress design a shopper is editing

pub mod draft;
pub mod garment;
pub mod placement;
pub mod upload;

pub use draft::{ArtworkRef, DesignDraft, DraftError};
pub use garment::{GarmentColor, GarmentSize, GarmentView, PreviewLayout};
pub use placement::{DesignAction, DesignPlacement};
pub use upload::{check_image_upload, UploadRejection, MAX_UPLOAD_BYTES};
