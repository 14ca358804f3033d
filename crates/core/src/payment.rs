//! Checkout payments.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, PaymentId, PaymentMethod, PaymentStatus};

/// Body of `POST /api/payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

impl PaymentRequest {
    /// Payment for a cart total, rounded to cents, with the status implied by
    /// the chosen method.
    #[must_use]
    pub fn for_cart(total: Money, method: PaymentMethod) -> Self {
        Self {
            amount: total.rounded().amount(),
            payment_method: method,
            payment_status: method.initial_status(),
        }
    }
}

/// A payment as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(alias = "id")]
    pub payment_id: PaymentId,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub payment_date: Option<NaiveDateTime>,
}

/// Accepts `2025-03-01T10:15:00`, with or without fractional seconds, or a bare
/// date. Anything else reads as no date rather than failing the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }))
}

/// Where to send money for the non-cash methods, from `GET /api/payment-info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub branch_code: String,
    #[serde(default)]
    pub crypto_address: String,
}

/// What the shopper needs to do after placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInstructions<'a> {
    Bank {
        account_name: &'a str,
        account_number: &'a str,
        branch_code: &'a str,
    },
    Crypto {
        address: &'a str,
    },
    Cash,
}

impl PaymentInfo {
    #[must_use]
    pub fn instructions_for(&self, method: PaymentMethod) -> PaymentInstructions<'_> {
        match method {
            PaymentMethod::BankTransfer => PaymentInstructions::Bank {
                account_name: &self.account_name,
                account_number: &self.account_number,
                branch_code: &self.branch_code,
            },
            PaymentMethod::Cryptocurrency => PaymentInstructions::Crypto {
                address: &self.crypto_address,
            },
            PaymentMethod::Cash => PaymentInstructions::Cash,
        }
    }
}

/// Confirmation line shown once the backend has accepted a payment.
#[must_use]
pub fn confirmation_message(payment_id: PaymentId, method: PaymentMethod) -> String {
    format!("Payment created (id {payment_id}). Follow instructions for {method}.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cash_checkout_is_completed() {
        let total = Money::parse("299.99").unwrap();
        let request = PaymentRequest::for_cart(total, PaymentMethod::Cash);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["paymentStatus"], "COMPLETED");
        assert_eq!(body["paymentMethod"], "CASH");
        assert_eq!(body["amount"], json!(299.99));
    }

    #[test]
    fn test_bank_transfer_checkout_is_pending() {
        let total = Money::parse("299.99").unwrap();
        let request = PaymentRequest::for_cart(total, PaymentMethod::BankTransfer);
        assert_eq!(request.payment_status, PaymentStatus::Pending);
        assert_eq!(request.amount, Decimal::new(29_999, 2));
    }

    #[test]
    fn test_amount_rounded_to_cents() {
        let total = Money::parse("10.005").unwrap();
        let request = PaymentRequest::for_cart(total, PaymentMethod::Cryptocurrency);
        assert_eq!(request.amount, Decimal::new(1001, 2));
    }

    #[test]
    fn test_record_accepts_minimal_body() {
        let record: PaymentRecord = serde_json::from_value(json!({ "paymentId": 77 })).unwrap();
        assert_eq!(record.payment_id, PaymentId::new(77));
        let record: PaymentRecord =
            serde_json::from_value(json!({ "id": 78, "amount": 12.5, "paymentStatus": "PENDING" }))
                .unwrap();
        assert_eq!(record.payment_id, PaymentId::new(78));
        assert_eq!(record.payment_status, Some(PaymentStatus::Pending));

        let record: PaymentRecord =
            serde_json::from_value(json!({ "paymentId": 79, "paymentDate": "2025-03-01" }))
                .unwrap();
        assert_eq!(
            record.payment_date.unwrap().date(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        let record: PaymentRecord =
            serde_json::from_value(json!({ "paymentId": 80, "paymentDate": "soon" })).unwrap();
        assert_eq!(record.payment_date, None);
    }

    #[test]
    fn test_instructions_follow_method() {
        let info = PaymentInfo {
            account_name: "Teeforge (Pty) Ltd".into(),
            account_number: "123456789".into(),
            branch_code: "250655".into(),
            crypto_address: "bc1qexample".into(),
        };
        assert!(matches!(
            info.instructions_for(PaymentMethod::BankTransfer),
            PaymentInstructions::Bank { branch_code: "250655", .. }
        ));
        assert_eq!(
            info.instructions_for(PaymentMethod::Cryptocurrency),
            PaymentInstructions::Crypto { address: "bc1qexample" }
        );
        assert_eq!(info.instructions_for(PaymentMethod::Cash), PaymentInstructions::Cash);
    }

    #[test]
    fn test_confirmation_message() {
        assert_eq!(
            confirmation_message(PaymentId::new(12), PaymentMethod::BankTransfer),
            "Payment created (id 12). Follow instructions for BANK_TRANSFER."
        );
    }
}
