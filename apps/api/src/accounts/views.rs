use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job_seeker::JobSeekerRow;
use crate::models::organization::OrganizationRow;
use crate::models::tag::{Tag, TagRelation};
use crate::models::user::{Role, UserRow};
use crate::store::Records;

/// Public identity fields, safe to embed in other records' views.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&UserRow> for PublicUser {
    fn from(user: &UserRow) -> Self {
        PublicUser {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSeekerProfile {
    #[serde(flatten)]
    pub profile: JobSeekerRow,
    pub skills: Vec<Tag>,
}

/// Outward shape of an account. Password hash and confirmation/reset
/// tokens have no field here, so they can never leak into a response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub confirmed: bool,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub role: Option<Role>,
    pub job_seeker: Option<JobSeekerProfile>,
    pub organization: Option<OrganizationRow>,
}

impl AccountView {
    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.name.as_str())
    }
}

/// Refetches an account with role, job-seeker profile and organization populated.
pub async fn load_account<R: Records + ?Sized>(
    records: &mut R,
    user_id: Uuid,
) -> Result<AccountView, AppError> {
    let user = records
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let role = records.find_role(user.role_id).await?;

    let job_seeker = match records.find_job_seeker_by_user(user.id).await? {
        Some(profile) => {
            let skills = records
                .linked_tags(TagRelation::JobSeekerSkills, profile.id)
                .await?;
            Some(JobSeekerProfile { profile, skills })
        }
        None => None,
    };

    let organization = records.find_organization_by_user(user.id).await?;

    Ok(AccountView {
        id: user.id,
        username: user.username,
        email: user.email,
        confirmed: user.confirmed,
        blocked: user.blocked,
        created_at: user.created_at,
        updated_at: user.updated_at,
        role,
        job_seeker,
        organization,
    })
}
