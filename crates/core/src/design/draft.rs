//! The design a shopper is currently editing.

use serde::{Deserialize, Serialize};

use super::garment::{GarmentColor, GarmentSize, GarmentView};
use crate::cart::MAX_QUANTITY;
use super::placement::{DesignAction, DesignPlacement};

/// Problems that stop a draft from being saved.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Please upload a design first")]
    NoArtwork,
    #[error("Please enter a product name")]
    MissingName,
    #[error("Quantity must be at least 1")]
    QuantityTooLow,
    #[error("Quantity cannot be more than {MAX_QUANTITY}")]
    QuantityTooHigh,
}

/// Reference to uploaded artwork held by the storefront until the design is
/// saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkRef {
    /// Key of the stored bytes.
    pub key: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignDraft {
    pub artwork: Option<ArtworkRef>,
    pub placement: DesignPlacement,
    pub color: GarmentColor,
    pub size: GarmentSize,
    pub view: GarmentView,
    pub name: String,
    pub description: String,
    pub quantity: u32,
}

impl Default for DesignDraft {
    fn default() -> Self {
        Self {
            artwork: None,
            placement: DesignPlacement::default(),
            color: GarmentColor::default(),
            size: GarmentSize::default(),
            view: GarmentView::default(),
            name: Self::DEFAULT_NAME.to_owned(),
            description: String::new(),
            quantity: 1,
        }
    }
}

impl DesignDraft {
    pub const DEFAULT_NAME: &'static str = "Custom T-Shirt";

    /// Attach freshly uploaded artwork. Placement starts over so the new image
    /// appears centred at natural size.
    pub fn attach_artwork(&mut self, artwork: ArtworkRef) -> Option<ArtworkRef> {
        self.placement = DesignPlacement::default();
        self.artwork.replace(artwork)
    }

    /// Drop the artwork, returning it so its stored bytes can be released.
    pub fn remove_artwork(&mut self) -> Option<ArtworkRef> {
        self.placement = DesignPlacement::default();
        self.artwork.take()
    }

    pub fn apply(&mut self, action: DesignAction) {
        self.placement = self.placement.apply(action);
    }

    /// Check that the draft can be turned into an order.
    ///
    /// # Errors
    ///
    /// Returns the first [`DraftError`] that applies.
    pub fn ready_to_save(&self) -> Result<&ArtworkRef, DraftError> {
        let artwork = self.artwork.as_ref().ok_or(DraftError::NoArtwork)?;
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingName);
        }
        if self.quantity < 1 {
            return Err(DraftError::QuantityTooLow);
        }
        if self.quantity > MAX_QUANTITY {
            return Err(DraftError::QuantityTooHigh);
        }
        Ok(artwork)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn artwork(name: &str) -> ArtworkRef {
        ArtworkRef {
            key: format!("key-{name}"),
            file_name: name.to_owned(),
            content_type: "image/png".to_owned(),
            size: 1024,
        }
    }

    #[test]
    fn test_new_upload_resets_placement() {
        let mut draft = DesignDraft::default();
        draft.attach_artwork(artwork("one.png"));
        draft.apply(DesignAction::Up);
        draft.apply(DesignAction::Larger);
        let previous = draft.attach_artwork(artwork("two.png"));
        assert_eq!(previous.unwrap().file_name, "one.png");
        assert_eq!(draft.placement, DesignPlacement::default());
        assert_eq!(draft.artwork.as_ref().unwrap().file_name, "two.png");
    }

    #[test]
    fn test_ready_to_save_checks_in_order() {
        let mut draft = DesignDraft::default();
        draft.name.clear();
        draft.quantity = 0;
        assert_eq!(draft.ready_to_save(), Err(DraftError::NoArtwork));

        draft.attach_artwork(artwork("a.png"));
        assert_eq!(draft.ready_to_save(), Err(DraftError::MissingName));

        draft.name = "Braai Club".to_owned();
        assert_eq!(draft.ready_to_save(), Err(DraftError::QuantityTooLow));

        draft.quantity = MAX_QUANTITY + 1;
        assert_eq!(draft.ready_to_save(), Err(DraftError::QuantityTooHigh));

        draft.quantity = 2;
        assert_eq!(draft.ready_to_save().unwrap().file_name, "a.png");
    }
}
