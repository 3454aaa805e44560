//! Account updates that cascade into the job-seeker profile.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::accounts::manager::{AccountChanges, AccountManager};
use crate::accounts::views::{load_account, AccountView};
use crate::errors::AppError;
use crate::models::job_seeker::JobSeekerPatch;
use crate::models::tag::TagRelation;
use crate::store::{Records, UnitOfWork};
use crate::tags::assign_tag_set;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub cv: Option<String>,
    pub about: Option<String>,
    pub dob: Option<NaiveDate>,
    pub skills: Option<Vec<String>>,
}

impl AccountUpdateRequest {
    fn account_changes(&self) -> AccountChanges {
        AccountChanges {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }

    fn profile_patch(&self) -> JobSeekerPatch {
        JobSeekerPatch {
            cv: self.cv.clone(),
            about: self.about.clone(),
            dob: self.dob,
        }
    }

    fn touches_profile(&self) -> bool {
        !self.profile_patch().is_empty() || self.skills.is_some()
    }
}

/// Applies the job-seeker half of an account update. Accounts without a
/// job-seeker profile are left alone.
pub async fn sync_job_seeker_profile<R: Records + ?Sized>(
    records: &mut R,
    user_id: Uuid,
    request: &AccountUpdateRequest,
) -> Result<(), AppError> {
    if !request.touches_profile() {
        return Ok(());
    }
    let Some(profile) = records.find_job_seeker_by_user(user_id).await? else {
        debug!("User {user_id} has no job seeker profile, skipping profile sync");
        return Ok(());
    };

    let patch = request.profile_patch();
    if !patch.is_empty() {
        records.update_job_seeker(profile.id, &patch).await?;
    }

    if let Some(skills) = &request.skills {
        assign_tag_set(records, TagRelation::JobSeekerSkills, profile.id, skills).await?;
    }

    info!("Synced job seeker profile {} for user {user_id}", profile.id);
    Ok(())
}

/// Updates the account, cascades into its profile and returns the refetched view.
pub async fn update_account_cascade(
    accounts: &dyn AccountManager,
    uow: &mut dyn UnitOfWork,
    user_id: Uuid,
    request: &AccountUpdateRequest,
) -> Result<AccountView, AppError> {
    accounts
        .update_account(uow, user_id, &request.account_changes())
        .await?;
    sync_job_seeker_profile(uow, user_id, request).await?;
    load_account(uow, user_id).await
}
