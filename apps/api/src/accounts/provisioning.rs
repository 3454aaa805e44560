//! Registration: account creation, role assignment and the role-specific
//! profile record, all inside the caller's unit of work.
//!
//! Nothing here commits. If any step fails the caller drops the unit of work
//! and the half-built account disappears with it.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::accounts::manager::{AccountManager, NewAccount};
use crate::accounts::views::{load_account, AccountView};
use crate::errors::AppError;
use crate::models::organization::{NewOrganization, OrganizationDetails, OrganizationStatus};
use crate::models::user::{UserPatch, JOBSEEKER_ROLE, ORGANIZATION_ROLE};
use crate::store::UnitOfWork;

/// Roles an anonymous caller may pick for themselves.
pub const SELF_SERVICE_ROLES: [&str; 2] = [JOBSEEKER_ROLE, ORGANIZATION_ROLE];

/// Employee counts arrive as numbers from some clients and as text from form posts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EmployeeCount {
    Number(i32),
    Text(String),
}

impl EmployeeCount {
    pub fn parse(&self) -> Result<i32, AppError> {
        match self {
            EmployeeCount::Number(n) => Ok(*n),
            EmployeeCount::Text(s) => s.trim().parse().map_err(|_| {
                AppError::Validation(format!("totalEmployee must be a whole number, got '{s}'"))
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub phone_number: Option<String>,
    pub total_employee: Option<EmployeeCount>,
    pub industry_type: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub created_date: Option<NaiveDate>,
}

impl RegistrationRequest {
    fn organization_details(&self) -> Result<OrganizationDetails, AppError> {
        Ok(OrganizationDetails {
            phone_number: self.phone_number.clone(),
            total_employee: self.total_employee.as_ref().map(EmployeeCount::parse).transpose()?,
            industry_type: self.industry_type.clone(),
            address: self.address.clone(),
            description: self.description.clone(),
            created_date: self.created_date,
        })
    }

    /// The requested role, if it is one callers may assign themselves.
    fn self_service_role(&self) -> Option<&str> {
        let requested = self.role.as_deref()?.trim();
        if SELF_SERVICE_ROLES.contains(&requested) {
            Some(requested)
        } else {
            warn!("Ignoring requested role '{requested}' on registration");
            None
        }
    }
}

/// Creates the account and its role-specific profile, returning the
/// refetched account view.
pub async fn provision_account(
    accounts: &dyn AccountManager,
    uow: &mut dyn UnitOfWork,
    request: &RegistrationRequest,
) -> Result<AccountView, AppError> {
    // Parse before any write so a bad form never reaches storage.
    let details = request.organization_details()?;

    let user = accounts
        .create_account(
            uow,
            &NewAccount {
                username: request.username.clone(),
                email: request.email.clone(),
                password: request.password.clone(),
            },
        )
        .await?;

    let Some(role_name) = request.self_service_role() else {
        info!("Registered user {} with the default role", user.id);
        return load_account(uow, user.id).await;
    };

    let role = uow
        .find_role_by_name(role_name)
        .await
        .inspect_err(|e| error!("Role lookup failed during registration: {e}"))?
        .ok_or_else(|| AppError::Validation(format!("Unknown role '{role_name}'")))?;

    uow.update_user(
        user.id,
        &UserPatch {
            role_id: Some(role.id),
            ..UserPatch::default()
        },
    )
    .await
    .inspect_err(|e| error!("Assigning role '{role_name}' to {} failed: {e}", user.id))?;

    match role_name {
        JOBSEEKER_ROLE => {
            uow.insert_job_seeker(user.id)
                .await
                .inspect_err(|e| {
                    error!("Creating job seeker profile for {} failed: {e}", user.id)
                })?;
        }
        ORGANIZATION_ROLE => {
            uow.insert_organization(&NewOrganization {
                user_id: user.id,
                status: OrganizationStatus::OnReview,
                details,
            })
            .await
            .inspect_err(|e| error!("Creating organization profile for {} failed: {e}", user.id))?;
        }
        _ => {}
    }

    info!("Registered user {} as {role_name}", user.id);
    load_account(uow, user.id).await
}
