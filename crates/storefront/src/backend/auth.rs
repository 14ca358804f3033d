//! `/auth` endpoints.

use reqwest::Method;
use teeforge_core::UserRole;
use teeforge_core::account::Registration;
use tracing::instrument;

use super::{AuthenticatedUser, BackendClient, BackendError, LoginRequest};

impl BackendClient {
    /// Exchange a username and password for the user record and its token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` for rejected credentials (usually with a
    /// backend-supplied message) and `BackendError::Parse` when the response
    /// is not a user record.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, BackendError> {
        let url = self.url(&["auth", "login"])?;
        let body: serde_json::Value = self
            .send_json(
                self.request(Method::POST, url)
                    .json(&LoginRequest { user_name, password }),
            )
            .await?;
        AuthenticatedUser::from_value(body)
    }

    /// Create a customer account. The response is the created user record; a
    /// token is included only if the backend chooses to sign the user in.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` when the backend refuses the registration.
    #[instrument(skip(self, registration), fields(user_name = %registration.profile.user_name))]
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<AuthenticatedUser, BackendError> {
        let url = self.url(&["auth", "register"])?;
        let body: serde_json::Value = self
            .send_json(self.request(Method::POST, url).json(registration))
            .await?;
        AuthenticatedUser::from_value(with_default_role(body))
    }
}

/// Registration responses from some backends omit `role`; a self-registered
/// account is always a customer.
fn with_default_role(mut body: serde_json::Value) -> serde_json::Value {
    if let Some(obj) = body.as_object_mut() {
        if !obj.contains_key("user") {
            obj.entry("role")
                .or_insert_with(|| UserRole::Customer.as_str().into());
        }
    }
    body
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_missing_role_defaults_to_customer() {
        let body = with_default_role(json!({ "userId": 1, "userName": "new" }));
        assert_eq!(body["role"], "CUSTOMER");
        let body = with_default_role(json!({ "userName": "boss", "role": "ADMIN" }));
        assert_eq!(body["role"], "ADMIN");
    }

    #[test]
    fn test_envelope_is_left_alone() {
        let body = with_default_role(json!({ "user": { "userName": "x", "role": "ADMIN" } }));
        assert!(body.get("role").is_none());
    }
}
