//! Request and response bodies specific to the backend's REST endpoints.
//!
//! Domain records shared with the rest of the app (users, customers,
//! payments) live in `teeforge_core`; the shapes here only matter on the wire.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use teeforge_core::account::User;
use teeforge_core::design::{GarmentColor, GarmentSize, GarmentView};
use teeforge_core::{DesignId, PlacementId, TShirtId};

use super::BackendError;
use super::design::{Position, Rotation, Scale};

/// Bearer token issued by `POST /auth/login`.
///
/// `Debug` output is redacted so tokens never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
}

/// A user record returned by login, plus the token that came with it.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: Option<BearerToken>,
}

impl AuthenticatedUser {
    /// Accepts either a user record with a top-level `token` field or an
    /// envelope of the form `{ "token": ..., "user": { ... } }`.
    pub(super) fn from_value(mut value: serde_json::Value) -> Result<Self, BackendError> {
        let token = value
            .as_object_mut()
            .and_then(|obj| obj.remove("token"))
            .and_then(|t| t.as_str().map(BearerToken::new))
            .filter(|t| !t.expose().is_empty());

        let record = if value.get("user").is_some_and(serde_json::Value::is_object) {
            value
                .get_mut("user")
                .map(serde_json::Value::take)
                .unwrap_or_default()
        } else {
            value
        };
        let user: User =
            serde_json::from_value(record).map_err(|e| BackendError::Parse(e.to_string()))?;

        Ok(Self { user, token })
    }
}

/// Body of `POST /design/create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest<'a> {
    pub file_path: &'a str,
}

/// A stored reference to uploaded artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRecord {
    #[serde(default, alias = "id")]
    pub design_id: Option<DesignId>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Body of `POST /placement-data/create`: the three saved component records.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementRequest<'a> {
    pub position: &'a Position,
    pub rotation: &'a Rotation,
    pub scale: &'a Scale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    #[serde(default, alias = "id")]
    pub placement_data_id: Option<PlacementId>,
}

/// Body of `POST /tshirt/create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TShirtRequest<'a> {
    pub design_id: DesignId,
    pub placement_data_id: PlacementId,
    pub name: &'a str,
    pub description: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub color: GarmentColor,
    pub size: GarmentSize,
    pub view: GarmentView,
}

/// A t-shirt order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TShirtRecord {
    #[serde(default, alias = "id")]
    pub tshirt_id: Option<TShirtId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use teeforge_core::UserRole;

    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = BearerToken::new("eyJhbGciOi.secret");
        assert_eq!(format!("{token:?}"), "BearerToken([REDACTED])");
        assert_eq!(token.expose(), "eyJhbGciOi.secret");
    }

    #[test]
    fn test_login_response_with_inline_token() {
        let body = json!({
            "userId": 4,
            "userName": "thandi",
            "firstName": "Thandi",
            "role": "CUSTOMER",
            "token": "t-123"
        });
        let signed_in = AuthenticatedUser::from_value(body).unwrap();
        assert_eq!(signed_in.user.role(), UserRole::Customer);
        assert_eq!(signed_in.token.unwrap().expose(), "t-123");
    }

    #[test]
    fn test_login_response_envelope() {
        let body = json!({
            "token": "t-456",
            "user": { "userId": 1, "userName": "root", "role": "ADMIN" }
        });
        let signed_in = AuthenticatedUser::from_value(body).unwrap();
        assert!(signed_in.user.is_admin());
        assert_eq!(signed_in.token.unwrap().expose(), "t-456");
    }

    #[test]
    fn test_login_response_without_token() {
        let body = json!({ "userId": 2, "userName": "emp", "role": "EMPLOYEE", "token": "" });
        let signed_in = AuthenticatedUser::from_value(body).unwrap();
        assert_eq!(signed_in.user.role(), UserRole::Employee);
        assert!(signed_in.token.is_none());
    }

    #[test]
    fn test_login_response_without_role_is_rejected() {
        let err = AuthenticatedUser::from_value(json!({ "userName": "ghost" })).unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn test_tshirt_request_body() {
        let body = serde_json::to_value(TShirtRequest {
            design_id: DesignId::new(3),
            placement_data_id: PlacementId::new(9),
            name: "Braai Club",
            description: "",
            price: Decimal::new(15_000, 2),
            color: GarmentColor::Navy,
            size: GarmentSize::Xl,
            view: GarmentView::Back,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "designId": 3,
                "placementDataId": 9,
                "name": "Braai Club",
                "description": "",
                "price": 150.0,
                "color": "navy",
                "size": "XL",
                "view": "back"
            })
        );
    }
}
