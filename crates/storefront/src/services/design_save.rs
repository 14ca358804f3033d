//! Turning a design draft into a t-shirt order.
//!
//! Saving is a chain of dependent backend calls, each needing the id returned
//! by the one before:
//!
//! ```text
//! upload -> design -> position -> rotation -> scale -> placement -> t-shirt
//! ```
//!
//! The first failure stops the chain and is reported with the step it happened
//! at. Nothing is invented to stand in for a failed step, and records created
//! by earlier steps are left on the backend.
//!
//! A user may have one save in flight at a time; [`SaveGuard`] hands out a
//! permit per user and a second attempt is refused while the first runs.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use teeforge_core::design::DesignDraft;
use teeforge_core::{Money, TShirtId};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::backend::{
    BackendClient, BackendError, PlacementRequest, Position, Rotation, Scale, TShirtRecord,
    TShirtRequest,
};
use crate::services::uploads::StoredUpload;

/// One call in the save chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    Upload,
    Design,
    Position,
    Rotation,
    Scale,
    Placement,
    TShirt,
}

impl SaveStep {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Design => "design",
            Self::Position => "position",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::Placement => "placement",
            Self::TShirt => "t-shirt",
        }
    }
}

impl fmt::Display for SaveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The step that failed and why.
#[derive(Debug, Error)]
#[error("{step}: {}", reason(.source))]
pub struct SaveError {
    pub step: SaveStep,
    #[source]
    pub source: BackendError,
}

impl SaveError {
    fn at(step: SaveStep) -> impl FnOnce(BackendError) -> Self {
        move |source| Self { step, source }
    }
}

/// Short explanation of a backend failure, fit for a notice.
fn reason(error: &BackendError) -> String {
    if let Some(message) = error.backend_message() {
        return message.to_owned();
    }
    match error {
        BackendError::Api { status, .. } => format!("backend returned status {status}"),
        BackendError::Http(e) if e.is_timeout() => "backend timed out".to_owned(),
        BackendError::Http(_) => "backend unreachable".to_owned(),
        BackendError::Parse(_) => "unexpected response from backend".to_owned(),
        BackendError::MissingId(_) | BackendError::InvalidUrl(_) => error.to_string(),
    }
}

/// What a successful save produced.
#[derive(Debug, Clone)]
pub struct SavedDesign {
    pub tshirt_id: TShirtId,
    pub record: TShirtRecord,
}

/// Run the save chain for `draft` using the held `artwork` bytes.
///
/// # Errors
///
/// Returns the first failing step as a [`SaveError`].
#[instrument(skip_all, fields(file = %artwork.file_name, name = %draft.name))]
pub async fn save_design(
    backend: &BackendClient,
    draft: &DesignDraft,
    artwork: &StoredUpload,
    unit_price: Money,
) -> Result<SavedDesign, SaveError> {
    let file_path = backend
        .upload_image(
            &artwork.file_name,
            &artwork.content_type,
            artwork.bytes.clone(),
        )
        .await
        .map_err(SaveError::at(SaveStep::Upload))?;

    let design_id = backend
        .create_design(&file_path)
        .await
        .and_then(|d| d.design_id.ok_or(BackendError::MissingId("Design")))
        .map_err(SaveError::at(SaveStep::Design))?;

    let position = backend
        .create_component(&Position::from_placement(&draft.placement))
        .await
        .map_err(SaveError::at(SaveStep::Position))?;
    let rotation = backend
        .create_component(&Rotation::from_placement(&draft.placement))
        .await
        .map_err(SaveError::at(SaveStep::Rotation))?;
    let scale = backend
        .create_component(&Scale::from_placement(&draft.placement))
        .await
        .map_err(SaveError::at(SaveStep::Scale))?;

    let placement_data_id = backend
        .create_placement(&PlacementRequest {
            position: &position,
            rotation: &rotation,
            scale: &scale,
        })
        .await
        .and_then(|p| p.placement_data_id.ok_or(BackendError::MissingId("Placement")))
        .map_err(SaveError::at(SaveStep::Placement))?;

    let record = backend
        .create_tshirt(&TShirtRequest {
            design_id,
            placement_data_id,
            name: draft.name.trim(),
            description: draft.description.trim(),
            price: unit_price.rounded().amount(),
            color: draft.color,
            size: draft.size,
            view: draft.view,
        })
        .await
        .map_err(SaveError::at(SaveStep::TShirt))?;
    let tshirt_id = record
        .tshirt_id
        .ok_or(BackendError::MissingId("T-shirt"))
        .map_err(SaveError::at(SaveStep::TShirt))?;

    info!(%tshirt_id, %design_id, %placement_data_id, "Design saved");
    Ok(SavedDesign { tshirt_id, record })
}

/// Per-user lock on the save chain.
#[derive(Clone, Default)]
pub struct SaveGuard {
    active: Arc<Mutex<HashSet<String>>>,
}

impl SaveGuard {
    /// Claim the save slot for `key`, or `None` if a save for it is running.
    #[must_use]
    pub fn try_acquire(&self, key: &str) -> Option<SavePermit> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(key.to_owned()) {
            warn!(key, "Save already in progress");
            return None;
        }
        Some(SavePermit {
            active: Arc::clone(&self.active),
            key: key.to_owned(),
        })
    }
}

/// Held for the duration of one save. Dropping it frees the slot.
pub struct SavePermit {
    active: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for SavePermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_save_for_same_user_is_refused() {
        let guard = SaveGuard::default();
        let first = guard.try_acquire("id:7");
        assert!(first.is_some());
        assert!(guard.try_acquire("id:7").is_none());
        assert!(guard.try_acquire("id:8").is_some());

        drop(first);
        assert!(guard.try_acquire("id:7").is_some());
    }

    #[test]
    fn test_error_message_names_step_and_backend_reason() {
        let err = SaveError {
            step: SaveStep::Rotation,
            source: BackendError::Api {
                status: 400,
                message: Some("Angle out of range".into()),
            },
        };
        assert_eq!(err.to_string(), "rotation: Angle out of range");

        let err = SaveError {
            step: SaveStep::Placement,
            source: BackendError::MissingId("Placement"),
        };
        assert_eq!(err.to_string(), "placement: Placement not saved correctly");

        let err = SaveError {
            step: SaveStep::TShirt,
            source: BackendError::Api {
                status: 503,
                message: None,
            },
        };
        assert_eq!(err.to_string(), "t-shirt: backend returned status 503");
    }
}
