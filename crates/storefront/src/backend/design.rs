//! Design pipeline endpoints: artwork upload, design records, the three
//! placement components, placement records and t-shirt orders.

use axum::body::Bytes;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use teeforge_core::design::DesignPlacement;
use teeforge_core::{PositionId, RotationId, ScaleId};
use tracing::instrument;

use super::{
    BackendClient, BackendError, DesignRecord, DesignRequest, PlacementRecord, PlacementRequest,
    TShirtRecord, TShirtRequest,
};

/// A record type stored under `/{PATH}` with the backend's standard
/// `getAll`, `read/{id}`, `create`, `update` and `delete/{id}` routes.
pub trait PlacementComponent:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// First path segment.
    const PATH: &'static str;
    /// Name used in messages, e.g. "Rotation not saved correctly".
    const LABEL: &'static str;

    /// Backend identifier, absent until the record is stored.
    fn id(&self) -> Option<i64>;
}

/// Horizontal and vertical offset of the artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub position_id: Option<PositionId>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Rotation of the artwork in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rotation {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub rotation_id: Option<RotationId>,
    pub angle: f64,
}

/// Uniform scale factor of the artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub scale_id: Option<ScaleId>,
    pub value: f64,
}

impl Position {
    #[must_use]
    pub fn from_placement(placement: &DesignPlacement) -> Self {
        Self {
            position_id: None,
            x: f64::from(placement.x()),
            y: f64::from(placement.y()),
            z: 0.0,
        }
    }
}

impl Rotation {
    #[must_use]
    pub fn from_placement(placement: &DesignPlacement) -> Self {
        Self {
            rotation_id: None,
            angle: f64::from(placement.rotation()),
        }
    }
}

impl Scale {
    #[must_use]
    pub fn from_placement(placement: &DesignPlacement) -> Self {
        Self {
            scale_id: None,
            value: placement.scale(),
        }
    }
}

impl PlacementComponent for Position {
    const PATH: &'static str = "position";
    const LABEL: &'static str = "Position";

    fn id(&self) -> Option<i64> {
        self.position_id.map(|id| id.as_i64())
    }
}

impl PlacementComponent for Rotation {
    const PATH: &'static str = "rotation";
    const LABEL: &'static str = "Rotation";

    fn id(&self) -> Option<i64> {
        self.rotation_id.map(|id| id.as_i64())
    }
}

impl PlacementComponent for Scale {
    const PATH: &'static str = "scale";
    const LABEL: &'static str = "Scale";

    fn id(&self) -> Option<i64> {
        self.scale_id.map(|id| id.as_i64())
    }
}

impl BackendClient {
    /// Upload artwork as multipart field `file`. Returns the stored file path.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response has no path.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, BackendError> {
        let url = self.url(&["upload"])?;
        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_owned())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self.request(Method::POST, url).multipart(form).send().await?;
        let response = super::check(response).await?;
        let body = response.text().await?;
        file_path_from_body(&body).ok_or(BackendError::MissingId("Upload"))
    }

    /// # Errors
    ///
    /// Returns error if the request fails or the record has no id.
    #[instrument(skip(self))]
    pub async fn create_design(&self, file_path: &str) -> Result<DesignRecord, BackendError> {
        let url = self.url(&["design", "create"])?;
        let record: DesignRecord = self
            .send_json(self.request(Method::POST, url).json(&DesignRequest { file_path }))
            .await?;
        if record.design_id.is_none() {
            return Err(BackendError::MissingId("Design"));
        }
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(kind = C::PATH))]
    pub async fn list_components<C: PlacementComponent>(&self) -> Result<Vec<C>, BackendError> {
        let url = self.url(&[C::PATH, "getAll"])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails or the record does not exist.
    #[instrument(skip(self), fields(kind = C::PATH))]
    pub async fn read_component<C: PlacementComponent>(&self, id: i64) -> Result<C, BackendError> {
        let url = self.url(&[C::PATH, "read", &id.to_string()])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// Store a component. The returned record must carry its new id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::MissingId` when the backend answers without an
    /// id, or any request error.
    #[instrument(skip(self, component), fields(kind = C::PATH))]
    pub async fn create_component<C: PlacementComponent>(
        &self,
        component: &C,
    ) -> Result<C, BackendError> {
        let url = self.url(&[C::PATH, "create"])?;
        let saved: C = self
            .send_json(self.request(Method::POST, url).json(component))
            .await?;
        if saved.id().is_none() {
            return Err(BackendError::MissingId(C::LABEL));
        }
        Ok(saved)
    }

    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the record.
    #[instrument(skip(self, component), fields(kind = C::PATH, id = ?component.id()))]
    pub async fn update_component<C: PlacementComponent>(
        &self,
        component: &C,
    ) -> Result<C, BackendError> {
        let url = self.url(&[C::PATH, "update"])?;
        self.send_json(self.request(Method::PUT, url).json(component))
            .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(kind = C::PATH))]
    pub async fn delete_component<C: PlacementComponent>(&self, id: i64) -> Result<(), BackendError> {
        let url = self.url(&[C::PATH, "delete", &id.to_string()])?;
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    /// Combine stored position, rotation and scale into one placement record.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the record has no id.
    #[instrument(skip_all)]
    pub async fn create_placement(
        &self,
        request: &PlacementRequest<'_>,
    ) -> Result<PlacementRecord, BackendError> {
        let url = self.url(&["placement-data", "create"])?;
        let record: PlacementRecord = self
            .send_json(self.request(Method::POST, url).json(request))
            .await?;
        if record.placement_data_id.is_none() {
            return Err(BackendError::MissingId("Placement"));
        }
        Ok(record)
    }

    /// Create the t-shirt order that references a design and a placement.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the record has no id.
    #[instrument(skip_all, fields(design_id = %request.design_id))]
    pub async fn create_tshirt(
        &self,
        request: &TShirtRequest<'_>,
    ) -> Result<TShirtRecord, BackendError> {
        let url = self.url(&["tshirt", "create"])?;
        let record: TShirtRecord = self
            .send_json(self.request(Method::POST, url).json(request))
            .await?;
        if record.tshirt_id.is_none() {
            return Err(BackendError::MissingId("T-shirt"));
        }
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_tshirts(&self) -> Result<Vec<TShirtRecord>, BackendError> {
        let url = self.url(&["tshirt", "getAll"])?;
        self.send_json(self.request(Method::GET, url)).await
    }
}

/// The upload endpoint answers with the stored path as plain text, as a JSON
/// string, or as an object with a `filePath` field.
fn file_path_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    let path = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(obj)) => obj
            .get("filePath")
            .and_then(serde_json::Value::as_str)
            .map(ToOwned::to_owned)?,
        _ => trimmed.to_owned(),
    };
    let path = path.trim().to_owned();
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use teeforge_core::design::DesignAction;

    use super::*;

    #[test]
    fn test_file_path_shapes() {
        assert_eq!(
            file_path_from_body("uploads/abc.png\n").as_deref(),
            Some("uploads/abc.png")
        );
        assert_eq!(
            file_path_from_body("\"uploads/abc.png\"").as_deref(),
            Some("uploads/abc.png")
        );
        assert_eq!(
            file_path_from_body(r#"{"filePath":"uploads/x.jpg"}"#).as_deref(),
            Some("uploads/x.jpg")
        );
        assert_eq!(file_path_from_body("   "), None);
        assert_eq!(file_path_from_body(r#"{"other":1}"#), None);
    }

    #[test]
    fn test_components_from_placement() {
        let placement = DesignPlacement::default()
            .apply(DesignAction::Up)
            .apply(DesignAction::Larger)
            .apply(DesignAction::RotateCounterClockwise);

        let position = serde_json::to_value(Position::from_placement(&placement)).unwrap();
        assert_eq!(position, json!({ "x": 0.0, "y": -15.0, "z": 0.0 }));

        let rotation = serde_json::to_value(Rotation::from_placement(&placement)).unwrap();
        assert_eq!(rotation, json!({ "angle": 345.0 }));

        let scale = Scale::from_placement(&placement);
        assert!((scale.value - 1.15).abs() < 1e-9);
    }

    #[test]
    fn test_component_ids_accept_either_field_name() {
        let rotation: Rotation = serde_json::from_value(json!({ "id": 4, "angle": 90 })).unwrap();
        assert_eq!(rotation.id(), Some(4));
        let scale: Scale = serde_json::from_value(json!({ "scaleId": 8, "value": 1.5 })).unwrap();
        assert_eq!(scale.id(), Some(8));
        let position: Position = serde_json::from_value(json!({ "x": 1, "y": 2 })).unwrap();
        assert_eq!(position.id(), None);
    }
}
