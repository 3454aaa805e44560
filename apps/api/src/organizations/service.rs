//! Organization updates and the approval-status notification that follows them.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::accounts::provisioning::EmployeeCount;
use crate::accounts::views::PublicUser;
use crate::errors::AppError;
use crate::jobs::views::OrganizationCard;
use crate::mailer::{Mailer, OutgoingEmail};
use crate::models::organization::{
    OrganizationDetails, OrganizationPatch, OrganizationRow, OrganizationStatus,
};
use crate::organizations::notify::compose_status_email;
use crate::store::{Records, Store};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInput {
    pub status: Option<OrganizationStatus>,
    pub phone_number: Option<String>,
    pub total_employee: Option<EmployeeCount>,
    pub industry_type: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub created_date: Option<NaiveDate>,
}

impl OrganizationInput {
    fn patch(&self) -> Result<OrganizationPatch, AppError> {
        Ok(OrganizationPatch {
            status: self.status,
            details: OrganizationDetails {
                phone_number: self.phone_number.clone(),
                total_employee: self.total_employee.as_ref().map(EmployeeCount::parse).transpose()?,
                industry_type: self.industry_type.clone(),
                address: self.address.clone(),
                description: self.description.clone(),
                created_date: self.created_date,
            },
        })
    }
}

/// Patches an organization, enforcing the approval state machine. The row stays
/// locked until the unit of work ends, so concurrent decisions are checked one
/// after the other.
pub async fn update_organization<R: Records + ?Sized>(
    records: &mut R,
    id: Uuid,
    input: &OrganizationInput,
) -> Result<OrganizationRow, AppError> {
    let patch = input.patch()?;
    let existing = records
        .lock_organization(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    if let Some(next) = input.status {
        if !existing.status.can_become(next) {
            return Err(AppError::Validation(format!(
                "Organization status cannot change from '{}' to '{next}'",
                existing.status
            )));
        }
    }

    records
        .update_organization(id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))
}

/// Sender addresses for outgoing mail.
#[derive(Debug, Clone)]
pub struct Sender<'a> {
    pub from: &'a str,
    pub reply_to: &'a str,
}

/// Commits the update, then emails the linked user the organization's current
/// approval status. A failed send is reported but the committed update stands.
pub async fn apply_organization_update(
    store: &dyn Store,
    mailer: &dyn Mailer,
    sender: Sender<'_>,
    id: Uuid,
    input: &OrganizationInput,
) -> Result<OrganizationCard, AppError> {
    let mut uow = store.begin().await?;
    let organization = update_organization(uow.as_mut(), id, input).await?;
    let user = uow.find_user(organization.user_id).await?;
    uow.commit().await?;

    info!(
        "Organization {} updated (status: {})",
        organization.id, organization.status
    );

    if let Some(user) = &user {
        let email = compose_status_email(organization.status);
        mailer
            .send(&OutgoingEmail {
                to: user.email.clone(),
                subject: email.subject,
                html: email.html,
                from: sender.from.to_string(),
                reply_to: sender.reply_to.to_string(),
            })
            .await
            .map_err(|e| {
                error!("Status email to organization {} failed: {e}", organization.id);
                AppError::Email(e.to_string())
            })?;
    }

    Ok(OrganizationCard {
        organization,
        user: user.as_ref().map(PublicUser::from),
    })
}
