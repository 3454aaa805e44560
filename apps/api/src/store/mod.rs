//! Record storage seam.
//!
//! Workflows talk to storage only through [`Records`]. Every request that
//! writes opens one [`UnitOfWork`] via [`Store::begin`] and commits it once
//! the whole workflow has succeeded; dropping it uncommitted discards every
//! write made through it.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::category::{Category, CategoryDisplay};
use crate::models::job::{JobAppliedRow, JobPatch, JobRow, NewJob};
use crate::models::job_seeker::{JobSeekerPatch, JobSeekerRow};
use crate::models::organization::{NewOrganization, OrganizationPatch, OrganizationRow};
use crate::models::tag::{Tag, TagKind, TagRelation};
use crate::models::user::{NewUser, Role, UserPatch, UserRow};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("record vanished mid-request: {0}")]
    Missing(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Records: Send {
    /// Inserts the tag if no record carries `name` yet and returns the id of
    /// the single record that does. Atomic with respect to concurrent callers.
    async fn upsert_tag(&mut self, kind: TagKind, name: &str) -> StoreResult<Uuid>;
    /// Makes `tag_ids` (deduplicated, first position wins) the owner's exact link set.
    async fn replace_tag_links(
        &mut self,
        relation: TagRelation,
        owner_id: Uuid,
        tag_ids: &[Uuid],
    ) -> StoreResult<()>;
    async fn linked_tags(&mut self, relation: TagRelation, owner_id: Uuid) -> StoreResult<Vec<Tag>>;

    async fn find_category(&mut self, id: Uuid) -> StoreResult<Option<Category>>;
    async fn categories_with_job_counts(&mut self, limit: i64) -> StoreResult<Vec<CategoryDisplay>>;

    async fn find_job(&mut self, id: Uuid) -> StoreResult<Option<JobRow>>;
    async fn insert_job(&mut self, job: &NewJob) -> StoreResult<JobRow>;
    async fn update_job(&mut self, id: Uuid, patch: &JobPatch) -> StoreResult<Option<JobRow>>;
    async fn latest_jobs(&mut self, limit: i64) -> StoreResult<Vec<JobRow>>;
    async fn insert_application(
        &mut self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<JobAppliedRow>;

    async fn find_role(&mut self, id: Uuid) -> StoreResult<Option<Role>>;
    async fn find_role_by_name(&mut self, name: &str) -> StoreResult<Option<Role>>;

    /// Fails with [`StoreError::Conflict`] when the username or email is taken.
    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<UserRow>;
    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<UserRow>>;
    /// Matches either the email or the username.
    async fn find_user_by_identifier(&mut self, identifier: &str) -> StoreResult<Option<UserRow>>;
    async fn update_user(&mut self, id: Uuid, patch: &UserPatch) -> StoreResult<Option<UserRow>>;

    async fn insert_job_seeker(&mut self, user_id: Uuid) -> StoreResult<JobSeekerRow>;
    async fn find_job_seeker_by_user(&mut self, user_id: Uuid) -> StoreResult<Option<JobSeekerRow>>;
    async fn update_job_seeker(
        &mut self,
        id: Uuid,
        patch: &JobSeekerPatch,
    ) -> StoreResult<Option<JobSeekerRow>>;

    async fn insert_organization(&mut self, org: &NewOrganization) -> StoreResult<OrganizationRow>;
    async fn find_organization(&mut self, id: Uuid) -> StoreResult<Option<OrganizationRow>>;
    /// Reads the latest committed row and holds a write lock on it until the
    /// unit of work ends. Concurrent lockers of the same row queue up.
    async fn lock_organization(&mut self, id: Uuid) -> StoreResult<Option<OrganizationRow>>;
    async fn find_organization_by_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Option<OrganizationRow>>;
    async fn update_organization(
        &mut self,
        id: Uuid,
        patch: &OrganizationPatch,
    ) -> StoreResult<Option<OrganizationRow>>;
}

#[async_trait]
pub trait UnitOfWork: Records {
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}
