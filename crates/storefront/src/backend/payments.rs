//! Checkout endpoints.

use reqwest::Method;
use teeforge_core::payment::{PaymentInfo, PaymentRecord, PaymentRequest};
use tracing::{instrument, warn};

use super::{BackendClient, BackendError};

impl BackendClient {
    /// Submit a payment for the current order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response has no payment id
    /// (`BackendError::Parse`).
    #[instrument(skip(self), fields(method = %request.payment_method, amount = %request.amount))]
    pub async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentRecord, BackendError> {
        let url = self.url(&["api", "payments"])?;
        self.send_json(self.request(Method::POST, url).json(request))
            .await
    }

    /// Bank and crypto details shown at checkout. Cached for 5 minutes;
    /// failures are not cached.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn payment_info(&self) -> Result<PaymentInfo, BackendError> {
        if let Some(info) = self.inner.payment_info.get(&()).await {
            return Ok(info);
        }
        let url = self.url(&["api", "payment-info"])?;
        let info: PaymentInfo = self
            .send_json(self.request(Method::GET, url))
            .await
            .inspect_err(|e| warn!(error = %e, "Payment info unavailable"))?;
        self.inner.payment_info.insert((), info.clone()).await;
        Ok(info)
    }
}
