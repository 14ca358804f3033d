//! Customer records: self-service under `/api/customer`, management under
//! `/api/admin/customers`.

use reqwest::Method;
use serde::Serialize;
use teeforge_core::account::Customer;
use teeforge_core::{UserId, UserRole};
use tracing::instrument;

use super::{BackendClient, BackendError};

/// Outgoing customer body. The backend expects the role on every write.
#[derive(Serialize)]
struct CustomerBody<'a> {
    #[serde(flatten)]
    customer: &'a Customer,
    role: UserRole,
}

impl<'a> From<&'a Customer> for CustomerBody<'a> {
    fn from(customer: &'a Customer) -> Self {
        Self {
            customer,
            role: UserRole::Customer,
        }
    }
}

impl BackendClient {
    // =========================================================================
    // Self-service
    // =========================================================================

    /// # Errors
    ///
    /// Returns error if the request fails or the customer does not exist.
    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: UserId) -> Result<Customer, BackendError> {
        let url = self.url(&["api", "customer", &id.to_string()])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// Save the signed-in customer's own profile.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the update.
    #[instrument(skip(self, customer), fields(user_id = ?customer.profile.user_id))]
    pub async fn update_customer(&self, customer: &Customer) -> Result<Customer, BackendError> {
        let url = self.url(&["api", "customer"])?;
        self.send_json(
            self.request(Method::PUT, url)
                .json(&CustomerBody::from(customer)),
        )
        .await
    }

    // =========================================================================
    // Admin console
    // =========================================================================

    /// Every customer. There is no pagination.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
        let url = self.url(&["api", "admin", "customers"])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails or the customer does not exist.
    #[instrument(skip(self))]
    pub async fn get_customer_as_admin(&self, id: UserId) -> Result<Customer, BackendError> {
        let url = self.url(&["api", "admin", "customers", &id.to_string()])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the record.
    #[instrument(skip(self, customer), fields(user_name = %customer.profile.user_name))]
    pub async fn create_customer(&self, customer: &Customer) -> Result<Customer, BackendError> {
        let url = self.url(&["api", "admin", "customers"])?;
        self.send_json(
            self.request(Method::POST, url)
                .json(&CustomerBody::from(customer)),
        )
        .await
    }

    /// Update a customer. The record's own `userId` identifies it; the path
    /// carries no id.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the record.
    #[instrument(skip(self, customer), fields(user_id = ?customer.profile.user_id))]
    pub async fn update_customer_as_admin(
        &self,
        customer: &Customer,
    ) -> Result<Customer, BackendError> {
        let url = self.url(&["api", "admin", "customers"])?;
        self.send_json(
            self.request(Method::PUT, url)
                .json(&CustomerBody::from(customer)),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: UserId) -> Result<(), BackendError> {
        let url = self.url(&["api", "admin", "customers", &id.to_string()])?;
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    /// Server-side search by name.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_customers(&self, name: &str) -> Result<Vec<Customer>, BackendError> {
        let mut url = self.url(&["api", "admin", "customers", "search"])?;
        url.query_pairs_mut().append_pair("name", name);
        self.send_json(self.request(Method::GET, url)).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn activate_customer(&self, id: UserId) -> Result<(), BackendError> {
        self.set_customer_active(id, "activate").await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn deactivate_customer(&self, id: UserId) -> Result<(), BackendError> {
        self.set_customer_active(id, "deactivate").await
    }

    async fn set_customer_active(&self, id: UserId, action: &str) -> Result<(), BackendError> {
        let url = self.url(&["api", "admin", "customers", &id.to_string(), action])?;
        self.send_empty(self.request(Method::PUT, url)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use teeforge_core::account::UserProfile;

    use super::*;

    #[test]
    fn test_customer_body_carries_role_and_password() {
        let customer = Customer {
            profile: UserProfile {
                user_name: "naledi".into(),
                ..UserProfile::default()
            },
            password: Some("pw".into()),
            ..Customer::default()
        };
        let json = serde_json::to_value(CustomerBody::from(&customer)).unwrap();
        assert_eq!(json["role"], "CUSTOMER");
        assert_eq!(json["userName"], "naledi");
        assert_eq!(json["password"], "pw");
        assert_eq!(json["customerDiscount"], 0.0);
    }
}
