//! Role and status enums shared with the REST backend.
//!
//! All of these travel over the wire in `SCREAMING_SNAKE_CASE`, and the same
//! spelling is used in HTML form values.

use serde::{Deserialize, Serialize};

/// The role carried by every user record. Determines which pages a visitor
/// may reach: the admin console is limited to [`UserRole::Admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Customer,
    Employee,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Employee => "EMPLOYEE",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "EMPLOYEE" => Ok(Self::Employee),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// How a customer chooses to settle an order at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Cash,
    Cryptocurrency,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::BankTransfer, Self::Cash, Self::Cryptocurrency];

    /// Status a freshly submitted payment starts in. Cash is settled on the
    /// spot; everything else waits for the money to arrive.
    #[must_use]
    pub const fn initial_status(&self) -> PaymentStatus {
        match self {
            Self::Cash => PaymentStatus::Completed,
            Self::BankTransfer | Self::Cryptocurrency => PaymentStatus::Pending,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Cash => "CASH",
            Self::Cryptocurrency => "CRYPTOCURRENCY",
        }
    }

    /// Human-readable label for the checkout form.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BankTransfer => "Bank transfer / EFT",
            Self::Cash => "Cash on collection",
            Self::Cryptocurrency => "Cryptocurrency",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            "CASH" => Ok(Self::Cash),
            "CRYPTOCURRENCY" => Ok(Self::Cryptocurrency),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Settlement state of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_completes_immediately() {
        assert_eq!(PaymentMethod::Cash.initial_status(), PaymentStatus::Completed);
        assert_eq!(
            PaymentMethod::BankTransfer.initial_status(),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentMethod::Cryptocurrency.initial_status(),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_wire_names_match_display() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{method}\""));
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
    }

    #[test]
    fn test_user_role_parse() {
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("admin".parse::<UserRole>().is_err());
    }
}
