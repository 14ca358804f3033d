//! Customer management: list, search, detail, create, edit, delete and
//! activation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use teeforge_core::UserId;
use teeforge_core::account::{Customer, CustomerDraft, PasswordRule};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Notice, PageContext};
use crate::state::AppState;

/// Customer row for list and detail templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: Option<UserId>,
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub phone_number: String,
    pub location: String,
    pub discount: String,
    pub active: bool,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        let address = &customer.profile.address;
        let location = [&address.municipality, &address.province, &address.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            id: customer.profile.user_id,
            full_name: customer.profile.full_name(),
            user_name: customer.profile.user_name.clone(),
            email: customer.profile.contact.email.clone(),
            phone_number: customer.profile.contact.phone_number.clone(),
            location,
            discount: customer.customer_discount.to_string(),
            active: customer.is_active(),
        }
    }
}

/// Client-side filter over the loaded list.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
}

/// Backend search by name.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// Delete confirmation form. Only `confirm=yes` deletes.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    pub confirm: Option<String>,
}

impl DeleteForm {
    #[must_use]
    pub fn confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

/// Customers list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/customers/index.html")]
pub struct CustomersIndexTemplate {
    pub page: PageContext,
    pub customers: Vec<CustomerView>,
    pub total: usize,
    pub filter: String,
    pub search_name: String,
    pub load_failed: bool,
}

/// Customer detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/customers/show.html")]
pub struct CustomerShowTemplate {
    pub page: PageContext,
    pub customer: CustomerView,
    pub draft: CustomerDraft,
}

/// Shared create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/customers/form.html")]
pub struct CustomerFormTemplate {
    pub page: PageContext,
    pub form: CustomerDraft,
    pub action: String,
    pub title: String,
    pub is_new: bool,
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/customers/delete.html")]
pub struct CustomerDeleteTemplate {
    pub page: PageContext,
    pub customer: CustomerView,
}

fn customer_path(id: UserId) -> String {
    format!("/admin/customers/{id}")
}

/// List every customer, optionally narrowed by a substring filter.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let filter = query.filter.unwrap_or_default();

    let (customers, total, load_failed) =
        match admin.backend(state.backend()).list_customers().await {
            Ok(all) => {
                let total = all.len();
                let rows = all
                    .iter()
                    .filter(|c| c.matches(&filter))
                    .map(CustomerView::from)
                    .collect();
                (rows, total, false)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch customers");
                (Vec::new(), 0, true)
            }
        };

    Ok(CustomersIndexTemplate {
        page: PageContext::load(&session, Some(admin)).await,
        customers,
        total,
        filter,
        search_name: String::new(),
        load_failed,
    }
    .into_response())
}

/// Ask the backend for customers matching a name.
#[instrument(skip(state, session, admin))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<SearchQuery>,
) -> Result<Response> {
    let name = query.name.unwrap_or_default().trim().to_owned();
    if name.is_empty() {
        return Ok(Redirect::to("/admin/customers").into_response());
    }

    let (customers, load_failed) =
        match admin.backend(state.backend()).search_customers(&name).await {
            Ok(found) => (found.iter().map(CustomerView::from).collect::<Vec<_>>(), false),
            Err(e) => {
                tracing::error!(error = %e, "Customer search failed");
                (Vec::new(), true)
            }
        };

    Ok(CustomersIndexTemplate {
        page: PageContext::load(&session, Some(admin)).await,
        total: customers.len(),
        customers,
        filter: String::new(),
        search_name: name,
        load_failed,
    }
    .into_response())
}

/// Empty create form.
#[instrument(skip(session, admin))]
pub async fn new(session: Session, RequireAdmin(admin): RequireAdmin) -> Result<Response> {
    Ok(CustomerFormTemplate {
        page: PageContext::load(&session, Some(admin)).await,
        form: CustomerDraft::default(),
        action: "/admin/customers".to_string(),
        title: "New customer".to_string(),
        is_new: true,
    }
    .into_response())
}

/// Create a customer. A password is required.
#[instrument(skip(state, session, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(mut form): Form<CustomerDraft>,
) -> Result<Response> {
    let result = match form.to_customer(PasswordRule::Required, None) {
        Ok(customer) => admin
            .backend(state.backend())
            .create_customer(&customer)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Customer creation failed");
                e.user_message("Failed to create customer")
            }),
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(created) => {
            tracing::info!(user_name = %created.profile.user_name, "Customer created");
            Notice::success("Customer created").flash(&session).await?;
            Ok(Redirect::to("/admin/customers").into_response())
        }
        Err(message) => {
            form.password.clear();
            Ok(CustomerFormTemplate {
                page: PageContext::load(&session, Some(admin))
                    .await
                    .with_notice(Notice::error(message)),
                form,
                action: "/admin/customers".to_string(),
                title: "New customer".to_string(),
                is_new: true,
            }
            .into_response())
        }
    }
}

/// Customer detail.
#[instrument(skip(state, session, admin))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Response> {
    let customer = admin
        .backend(state.backend())
        .get_customer_as_admin(id)
        .await?;

    Ok(CustomerShowTemplate {
        page: PageContext::load(&session, Some(admin)).await,
        draft: CustomerDraft::from_customer(&customer),
        customer: CustomerView::from(&customer),
    }
    .into_response())
}

/// Edit form pre-filled from the backend record.
#[instrument(skip(state, session, admin))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Response> {
    let customer = admin
        .backend(state.backend())
        .get_customer_as_admin(id)
        .await?;

    Ok(CustomerFormTemplate {
        page: PageContext::load(&session, Some(admin)).await,
        form: CustomerDraft::from_customer(&customer),
        action: customer_path(id),
        title: format!("Edit {}", customer.profile.full_name()),
        is_new: false,
    }
    .into_response())
}

/// Save an edited customer. A blank password leaves the stored one alone.
#[instrument(skip(state, session, admin, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Form(mut form): Form<CustomerDraft>,
) -> Result<Response> {
    let backend = admin.backend(state.backend());
    let existing = backend.get_customer_as_admin(id).await?;

    let result = match form.to_customer(PasswordRule::KeepWhenBlank, Some(&existing)) {
        Ok(mut customer) => {
            customer.profile.user_id = Some(id);
            backend
                .update_customer_as_admin(&customer)
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, %id, "Customer update failed");
                    e.user_message("Failed to update customer")
                })
        }
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(_) => {
            Notice::success("Customer updated").flash(&session).await?;
            Ok(Redirect::to(&customer_path(id)).into_response())
        }
        Err(message) => {
            form.password.clear();
            Ok(CustomerFormTemplate {
                page: PageContext::load(&session, Some(admin))
                    .await
                    .with_notice(Notice::error(message)),
                form,
                action: customer_path(id),
                title: format!("Edit {}", existing.profile.full_name()),
                is_new: false,
            }
            .into_response())
        }
    }
}

/// Ask before deleting.
#[instrument(skip(state, session, admin))]
pub async fn confirm_delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Response> {
    let customer = admin
        .backend(state.backend())
        .get_customer_as_admin(id)
        .await?;

    Ok(CustomerDeleteTemplate {
        page: PageContext::load(&session, Some(admin)).await,
        customer: CustomerView::from(&customer),
    }
    .into_response())
}

/// Delete a customer. Without `confirm=yes` nothing is sent to the backend.
#[instrument(skip(state, session, admin, form))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<DeleteForm>,
) -> Result<Response> {
    if !form.confirmed() {
        Notice::info("Delete cancelled").flash(&session).await?;
        return Ok(Redirect::to("/admin/customers").into_response());
    }

    match admin.backend(state.backend()).delete_customer(id).await {
        Ok(()) => {
            tracing::info!(%id, "Customer deleted");
            Notice::success("Customer deleted").flash(&session).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, %id, "Customer delete failed");
            Notice::error(e.user_message("Failed to delete customer"))
                .flash(&session)
                .await?;
        }
    }

    Ok(Redirect::to("/admin/customers").into_response())
}

/// Re-enable a customer account.
#[instrument(skip(state, session, admin))]
pub async fn activate(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Response> {
    let notice = match admin.backend(state.backend()).activate_customer(id).await {
        Ok(()) => Notice::success("Customer activated"),
        Err(e) => Notice::error(e.user_message("Failed to activate customer")),
    };
    notice.flash(&session).await?;
    Ok(Redirect::to(&customer_path(id)).into_response())
}

/// Disable a customer account.
#[instrument(skip(state, session, admin))]
pub async fn deactivate(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Response> {
    let notice = match admin.backend(state.backend()).deactivate_customer(id).await {
        Ok(()) => Notice::success("Customer deactivated"),
        Err(e) => Notice::error(e.user_message("Failed to deactivate customer")),
    };
    notice.flash(&session).await?;
    Ok(Redirect::to(&customer_path(id)).into_response())
}

#[cfg(test)]
mod tests {
    use teeforge_core::account::{Address, UserProfile};

    use super::*;

    #[test]
    fn test_delete_requires_explicit_yes() {
        assert!(!DeleteForm::default().confirmed());
        assert!(!DeleteForm { confirm: Some("no".into()) }.confirmed());
        assert!(DeleteForm { confirm: Some("yes".into()) }.confirmed());
    }

    #[test]
    fn test_customer_view_location_skips_blanks() {
        let customer = Customer {
            profile: UserProfile {
                first_name: "Thandi".into(),
                last_name: "Nkosi".into(),
                address: Address {
                    municipality: "Durban".into(),
                    country: "South Africa".into(),
                    ..Address::default()
                },
                ..UserProfile::default()
            },
            active: Some(false),
            ..Customer::default()
        };

        let view = CustomerView::from(&customer);
        assert_eq!(view.full_name, "Thandi Nkosi");
        assert_eq!(view.location, "Durban, South Africa");
        assert!(!view.active);
    }
}
