//! Account records exchanged with the REST backend.
//!
//! Every user shares a common [`UserProfile`] (names, address, contact). The
//! backend tags each record with a `role`, which [`User`] models as a closed
//! set of variants so role checks are exhaustive matches rather than string
//! comparisons.
//!
//! Passwords are write-only: they are sent when creating or updating a record
//! but never read back from a backend response.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AddressId, ContactId, Email, EmailError, UserId, UserRole};

/// Validation failures on account forms. These are caught before anything is
/// sent to the backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be a whole number")]
    NotANumber(&'static str),
    #[error("Customer discount must be a number")]
    InvalidDiscount,
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// A postal address. The numbered fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub building_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_box_number: Option<u32>,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub municipality: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// Email and phone number for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<ContactId>,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "phone")]
    pub phone_number: String,
}

/// Fields common to every kind of user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub contact: Contact,
}

impl UserProfile {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// A shopper. The record managed by the admin console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub customer_discount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Customer {
    /// Case-insensitive substring match over first name, last name,
    /// username and email. An empty filter matches every customer.
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        let needle = filter.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            &self.profile.first_name,
            &self.profile.last_name,
            &self.profile.user_name,
            &self.profile.contact.email,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Whether the account is active. Records without the flag count as active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(flatten)]
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub admin_level: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub permissions: String,
}

/// Any user the backend knows about, tagged by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum User {
    #[serde(alias = "customer")]
    Customer(Customer),
    #[serde(alias = "employee")]
    Employee(Employee),
    #[serde(alias = "admin")]
    Admin(Admin),
}

impl User {
    #[must_use]
    pub const fn role(&self) -> UserRole {
        match self {
            Self::Customer(_) => UserRole::Customer,
            Self::Employee(_) => UserRole::Employee,
            Self::Admin(_) => UserRole::Admin,
        }
    }

    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        match self {
            Self::Customer(c) => &c.profile,
            Self::Employee(e) => &e.profile,
            Self::Admin(a) => &a.profile,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<UserId> {
        self.profile().user_id
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    #[must_use]
    pub const fn as_customer(&self) -> Option<&Customer> {
        match self {
            Self::Customer(c) => Some(c),
            _ => None,
        }
    }

    /// Name shown in the navigation bar: the first name when known,
    /// otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let profile = self.profile();
        if profile.first_name.is_empty() {
            &profile.user_name
        } else {
            &profile.first_name
        }
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub password: String,
}

/// Whether a blank password on a customer form is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    /// New accounts must set a password.
    Required,
    /// Edits leave the stored password alone when the field is blank.
    KeepWhenBlank,
}

/// Flat form input shared by the registration, profile and admin customer
/// forms. Every field arrives as text; [`CustomerDraft::to_customer`] and
/// [`CustomerDraft::to_registration`] validate and convert it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDraft {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub building_name: String,
    #[serde(default)]
    pub unit_number: String,
    #[serde(default)]
    pub property_number: String,
    #[serde(default)]
    pub po_box_number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub municipality: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub customer_discount: String,
}

fn default_country() -> String {
    CustomerDraft::DEFAULT_COUNTRY.to_owned()
}

impl Default for CustomerDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            user_name: String::new(),
            password: String::new(),
            email: String::new(),
            phone_number: String::new(),
            building_name: String::new(),
            unit_number: String::new(),
            property_number: String::new(),
            po_box_number: String::new(),
            street: String::new(),
            municipality: String::new(),
            province: String::new(),
            postal_code: String::new(),
            country: default_country(),
            customer_discount: String::new(),
        }
    }
}

impl CustomerDraft {
    pub const DEFAULT_COUNTRY: &'static str = "South Africa";

    /// Pre-fill a form from an existing record. The password is never echoed.
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        let mut draft = Self::from_profile(&customer.profile);
        draft.customer_discount = customer.customer_discount.to_string();
        draft
    }

    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        let number = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            user_name: profile.user_name.clone(),
            password: String::new(),
            email: profile.contact.email.clone(),
            phone_number: profile.contact.phone_number.clone(),
            building_name: profile.address.building_name.clone(),
            unit_number: number(profile.address.unit_number),
            property_number: number(profile.address.property_number),
            po_box_number: number(profile.address.po_box_number),
            street: profile.address.street.clone(),
            municipality: profile.address.municipality.clone(),
            province: profile.address.province.clone(),
            postal_code: profile.address.postal_code.clone(),
            country: profile.address.country.clone(),
            customer_discount: String::new(),
        }
    }

    /// Validate the form and build a profile. Record ids (user, address,
    /// contact) are carried over from `existing` so updates target the same
    /// backend rows.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] in form order.
    pub fn to_profile(&self, existing: Option<&UserProfile>) -> Result<UserProfile, ValidationError> {
        let first_name = required(&self.first_name, "First name")?;
        let last_name = required(&self.last_name, "Last name")?;
        let user_name = required(&self.user_name, "Username")?;
        let email = Email::parse(&self.email)?;
        let phone_number = required(&self.phone_number, "Phone number")?;
        let street = required(&self.street, "Street")?;
        let municipality = required(&self.municipality, "Municipality")?;
        let province = required(&self.province, "Province")?;
        let postal_code = required(&self.postal_code, "Postal code")?;
        let country = required(&self.country, "Country")?;

        Ok(UserProfile {
            user_id: existing.and_then(|p| p.user_id),
            first_name,
            last_name,
            user_name,
            address: Address {
                address_id: existing.and_then(|p| p.address.address_id),
                building_name: self.building_name.trim().to_owned(),
                unit_number: optional_number(&self.unit_number, "Unit number")?,
                property_number: optional_number(&self.property_number, "Property number")?,
                po_box_number: optional_number(&self.po_box_number, "PO box number")?,
                street,
                municipality,
                province,
                postal_code,
                country,
            },
            contact: Contact {
                contact_id: existing.and_then(|p| p.contact.contact_id),
                email: email.into_inner(),
                phone_number,
            },
        })
    }

    /// Validate the form as a customer record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for missing required fields, a malformed
    /// email, non-numeric address numbers, or a missing password when
    /// `rule` is [`PasswordRule::Required`].
    pub fn to_customer(
        &self,
        rule: PasswordRule,
        existing: Option<&Customer>,
    ) -> Result<Customer, ValidationError> {
        let profile = self.to_profile(existing.map(|c| &c.profile))?;
        let password = match (rule, self.password.trim()) {
            (PasswordRule::Required, "") => return Err(ValidationError::Required("Password")),
            (PasswordRule::KeepWhenBlank, "") => None,
            (_, pw) => Some(pw.to_owned()),
        };
        let customer_discount = match self.customer_discount.trim() {
            "" => existing.map_or(Decimal::ZERO, |c| c.customer_discount),
            raw => raw
                .parse::<Decimal>()
                .map_err(|_| ValidationError::InvalidDiscount)?,
        };

        Ok(Customer {
            profile,
            customer_discount,
            active: existing.and_then(|c| c.active),
            password,
        })
    }

    /// Validate the form as a self-registration.
    ///
    /// # Errors
    ///
    /// Same rules as [`CustomerDraft::to_customer`] with a required password.
    pub fn to_registration(&self) -> Result<Registration, ValidationError> {
        let profile = self.to_profile(None)?;
        let password = required(&self.password, "Password")?;
        Ok(Registration { profile, password })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

fn optional_number(value: &str, field: &'static str) -> Result<Option<u32>, ValidationError> {
    match value.trim() {
        "" => Ok(None),
        raw => raw
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::NotANumber(field)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled_draft() -> CustomerDraft {
        CustomerDraft {
            first_name: "Lerato".into(),
            last_name: "Mokoena".into(),
            user_name: "lerato".into(),
            password: "hunter22".into(),
            email: "lerato@example.co.za".into(),
            phone_number: "0821234567".into(),
            street: "12 Long Street".into(),
            municipality: "Cape Town".into(),
            province: "Western Cape".into(),
            postal_code: "8001".into(),
            unit_number: "4".into(),
            ..CustomerDraft::default()
        }
    }

    #[test]
    fn test_user_deserializes_by_role_tag() {
        let body = json!({
            "userId": 5,
            "firstName": "Ayanda",
            "lastName": "Dube",
            "userName": "ayanda",
            "role": "ADMIN",
            "adminLevel": "SUPER",
            "department": "Ops",
            "permissions": "ALL",
            "contact": { "contactId": 9, "email": "a@b.co", "phoneNumber": "1" },
            "address": { "street": "1 Main", "country": "South Africa" }
        });
        let user: User = serde_json::from_value(body).unwrap();
        assert!(user.is_admin());
        assert_eq!(user.role(), UserRole::Admin);
        assert_eq!(user.id(), Some(UserId::new(5)));
        assert_eq!(user.profile().contact.contact_id, Some(ContactId::new(9)));
        match user {
            User::Admin(admin) => assert_eq!(admin.department, "Ops"),
            other => panic!("expected admin, got {other:?}"),
        }
    }

    #[test]
    fn test_customer_password_is_never_read_back() {
        let body = json!({
            "userId": 1,
            "role": "CUSTOMER",
            "userName": "x",
            "password": "$2a$10$hash",
            "customerDiscount": 0.1
        });
        let user: User = serde_json::from_value(body).unwrap();
        let customer = user.as_customer().unwrap();
        assert_eq!(customer.password, None);
        assert_eq!(customer.customer_discount, Decimal::new(1, 1));

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "CUSTOMER");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_lowercase_role_is_accepted() {
        let user: User =
            serde_json::from_value(json!({ "role": "customer", "userName": "y" })).unwrap();
        assert_eq!(user.role(), UserRole::Customer);
    }

    #[test]
    fn test_contact_accepts_phone_alias() {
        let contact: Contact =
            serde_json::from_value(json!({ "email": "e@x.io", "phone": "555" })).unwrap();
        assert_eq!(contact.phone_number, "555");
    }

    #[test]
    fn test_filter_matches_names_and_email_case_insensitively() {
        let customer = filled_draft()
            .to_customer(PasswordRule::Required, None)
            .unwrap();
        assert!(customer.matches("MOKO"));
        assert!(customer.matches("lerato@"));
        assert!(customer.matches(""));
        assert!(!customer.matches("durban"));
    }

    #[test]
    fn test_create_requires_password_but_update_keeps_it() {
        let mut draft = filled_draft();
        draft.password.clear();
        assert_eq!(
            draft.to_customer(PasswordRule::Required, None),
            Err(ValidationError::Required("Password"))
        );
        let customer = draft.to_customer(PasswordRule::KeepWhenBlank, None).unwrap();
        assert_eq!(customer.password, None);
    }

    #[test]
    fn test_update_preserves_record_ids() {
        let mut existing = filled_draft()
            .to_customer(PasswordRule::Required, None)
            .unwrap();
        existing.profile.user_id = Some(UserId::new(3));
        existing.profile.address.address_id = Some(AddressId::new(30));
        existing.profile.contact.contact_id = Some(ContactId::new(31));
        existing.active = Some(false);

        let mut draft = CustomerDraft::from_customer(&existing);
        draft.street = "99 Loop Street".into();
        let updated = draft
            .to_customer(PasswordRule::KeepWhenBlank, Some(&existing))
            .unwrap();
        assert_eq!(updated.profile.user_id, Some(UserId::new(3)));
        assert_eq!(updated.profile.address.address_id, Some(AddressId::new(30)));
        assert_eq!(updated.profile.contact.contact_id, Some(ContactId::new(31)));
        assert_eq!(updated.profile.address.street, "99 Loop Street");
        assert_eq!(updated.active, Some(false));
    }

    #[test]
    fn test_validation_reports_first_missing_field() {
        let mut draft = filled_draft();
        draft.municipality = "  ".into();
        draft.postal_code.clear();
        assert_eq!(
            draft.to_registration(),
            Err(ValidationError::Required("Municipality"))
        );

        let mut draft = filled_draft();
        draft.unit_number = "4B".into();
        assert_eq!(
            draft.to_registration(),
            Err(ValidationError::NotANumber("Unit number"))
        );

        let mut draft = filled_draft();
        draft.email = "not-an-email".into();
        assert!(matches!(
            draft.to_registration(),
            Err(ValidationError::Email(_))
        ));
    }

    #[test]
    fn test_registration_body_shape() {
        let registration = filled_draft().to_registration().unwrap();
        let json = serde_json::to_value(&registration).unwrap();
        assert_eq!(json["userName"], "lerato");
        assert_eq!(json["password"], "hunter22");
        assert_eq!(json["contact"]["phoneNumber"], "0821234567");
        assert_eq!(json["address"]["unitNumber"], 4);
        assert_eq!(json["address"]["country"], "South Africa");
        assert!(json.get("userId").is_none());
    }
}
