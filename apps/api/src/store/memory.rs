//! In-memory store for tests. A unit of work edits a private copy of the
//! tables and swaps it in on commit, so an uncommitted unit of work leaves
//! no trace, like a rolled-back transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{Records, Store, StoreError, StoreResult, UnitOfWork};
use crate::models::category::{Category, CategoryDisplay};
use crate::models::job::{JobAppliedRow, JobPatch, JobRow, NewJob};
use crate::models::job_seeker::{JobSeekerPatch, JobSeekerRow};
use crate::models::organization::{NewOrganization, OrganizationPatch, OrganizationRow};
use crate::models::tag::{Tag, TagKind, TagRelation};
use crate::models::user::{
    NewUser, Role, UserPatch, UserRow, ADMIN_ROLE, DEFAULT_ROLE, JOBSEEKER_ROLE,
    ORGANIZATION_ROLE,
};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub roles: Vec<Role>,
    pub users: Vec<UserRow>,
    pub categories: Vec<Category>,
    pub tags: HashMap<TagKind, Vec<Tag>>,
    pub links: HashMap<(TagRelation, Uuid), Vec<Uuid>>,
    pub jobs: Vec<JobRow>,
    pub applications: Vec<JobAppliedRow>,
    pub job_seekers: Vec<JobSeekerRow>,
    pub organizations: Vec<OrganizationRow>,
    /// Every name passed to `upsert_tag`, in call order.
    pub tag_upserts: Vec<String>,
}

impl Tables {
    pub fn tags_named(&self, kind: TagKind, name: &str) -> Vec<Tag> {
        self.tags
            .get(&kind)
            .map(|tags| tags.iter().filter(|t| t.name == name).cloned().collect())
            .unwrap_or_default()
    }

    pub fn linked_ids(&self, relation: TagRelation, owner_id: Uuid) -> Vec<Uuid> {
        self.links
            .get(&(relation, owner_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn role_name_of(&self, user_id: Uuid) -> Option<String> {
        let user = self.users.iter().find(|u| u.id == user_id)?;
        self.roles
            .iter()
            .find(|r| r.id == user.role_id)
            .map(|r| r.name.clone())
    }
}

type RowLocks = Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    failing: Arc<Mutex<Option<&'static str>>>,
    row_locks: RowLocks,
}

impl MemoryStore {
    /// A store seeded with the same roles the migrations create.
    pub fn new() -> Self {
        let store = MemoryStore::default();
        store.write(|t| {
            for name in [DEFAULT_ROLE, JOBSEEKER_ROLE, ORGANIZATION_ROLE, ADMIN_ROLE] {
                t.roles.push(Role {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                });
            }
        });
        store
    }

    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(&self.tables.lock().unwrap())
    }

    pub fn write<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        f(&mut self.tables.lock().unwrap())
    }

    /// Makes every later call of the named `Records` method fail.
    pub fn fail_on(&self, operation: &'static str) {
        *self.failing.lock().unwrap() = Some(operation);
    }

    pub fn seed_category(&self, name: &str) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            image: Some(format!("/uploads/{}.png", name.to_lowercase())),
        };
        self.write(|t| t.categories.push(category.clone()));
        category
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork {
            working: self.read(|t| t.clone()),
            shared: Arc::clone(&self.tables),
            failing: *self.failing.lock().unwrap(),
            row_locks: Arc::clone(&self.row_locks),
            held: Vec::new(),
        }))
    }
}

/// Row locks taken through `lock_organization` are held until commit or drop,
/// and a locked read sees the latest committed row, as in Postgres.
pub struct MemoryUnitOfWork {
    working: Tables,
    shared: Arc<Mutex<Tables>>,
    failing: Option<&'static str>,
    row_locks: RowLocks,
    held: Vec<tokio::sync::OwnedMutexGuard<()>>,
}

impl MemoryUnitOfWork {
    fn check(&self, operation: &'static str) -> StoreResult<()> {
        if self.failing == Some(operation) {
            return Err(StoreError::Database(sqlx::Error::Protocol(format!(
                "injected failure in {operation}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.check("commit")?;
        let MemoryUnitOfWork {
            working,
            shared,
            held,
            ..
        } = *self;
        *shared.lock().unwrap() = working;
        drop(held);
        Ok(())
    }
}

#[async_trait]
impl Records for MemoryUnitOfWork {
    async fn upsert_tag(&mut self, kind: TagKind, name: &str) -> StoreResult<Uuid> {
        self.check("upsert_tag")?;
        self.working.tag_upserts.push(name.to_string());
        let tags = self.working.tags.entry(kind).or_default();
        if let Some(existing) = tags.iter().find(|t| t.name == name) {
            return Ok(existing.id);
        }
        let id = Uuid::new_v4();
        tags.push(Tag {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn replace_tag_links(
        &mut self,
        relation: TagRelation,
        owner_id: Uuid,
        tag_ids: &[Uuid],
    ) -> StoreResult<()> {
        self.check("replace_tag_links")?;
        let mut distinct: Vec<Uuid> = Vec::with_capacity(tag_ids.len());
        for id in tag_ids {
            if !distinct.contains(id) {
                distinct.push(*id);
            }
        }
        self.working.links.insert((relation, owner_id), distinct);
        Ok(())
    }

    async fn linked_tags(
        &mut self,
        relation: TagRelation,
        owner_id: Uuid,
    ) -> StoreResult<Vec<Tag>> {
        let ids = self.working.linked_ids(relation, owner_id);
        let tags = self
            .working
            .tags
            .get(&relation.kind())
            .cloned()
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| tags.iter().find(|t| t.id == *id).cloned())
            .collect())
    }

    async fn find_category(&mut self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.working.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn categories_with_job_counts(
        &mut self,
        limit: i64,
    ) -> StoreResult<Vec<CategoryDisplay>> {
        let mut categories = self.working.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|c| CategoryDisplay {
                count: self
                    .working
                    .jobs
                    .iter()
                    .filter(|j| j.category_id == Some(c.id))
                    .count() as i64,
                id: c.id,
                name: c.name,
                image: c.image,
            })
            .collect())
    }

    async fn find_job(&mut self, id: Uuid) -> StoreResult<Option<JobRow>> {
        Ok(self.working.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn insert_job(&mut self, job: &NewJob) -> StoreResult<JobRow> {
        self.check("insert_job")?;
        let now = Utc::now();
        let row = JobRow {
            id: Uuid::new_v4(),
            title: job.title.clone(),
            description: job.description.clone(),
            expiration_date: job.expiration_date,
            category_id: job.category_id,
            organization_id: job.organization_id,
            created_at: now,
            updated_at: now,
        };
        self.working.jobs.push(row.clone());
        Ok(row)
    }

    async fn update_job(&mut self, id: Uuid, patch: &JobPatch) -> StoreResult<Option<JobRow>> {
        self.check("update_job")?;
        let Some(job) = self.working.jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            job.title = title.clone();
        }
        if let Some(description) = &patch.description {
            job.description = Some(description.clone());
        }
        if let Some(expiration_date) = patch.expiration_date {
            job.expiration_date = expiration_date;
        }
        if let Some(category_id) = patch.category_id {
            job.category_id = Some(category_id);
        }
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn latest_jobs(&mut self, limit: i64) -> StoreResult<Vec<JobRow>> {
        // Newest insert first among equal timestamps.
        let mut jobs: Vec<JobRow> = self.working.jobs.iter().rev().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit.max(0) as usize);
        Ok(jobs)
    }

    async fn insert_application(
        &mut self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<JobAppliedRow> {
        self.check("insert_application")?;
        let row = JobAppliedRow {
            id: Uuid::new_v4(),
            job_id,
            user_id,
            created_at: Utc::now(),
        };
        self.working.applications.push(row.clone());
        Ok(row)
    }

    async fn find_role(&mut self, id: Uuid) -> StoreResult<Option<Role>> {
        Ok(self.working.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_role_by_name(&mut self, name: &str) -> StoreResult<Option<Role>> {
        Ok(self.working.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<UserRow> {
        self.check("insert_user")?;
        let taken = self.working.users.iter().any(|u| {
            u.username == user.username || u.email.eq_ignore_ascii_case(&user.email)
        });
        if taken {
            return Err(StoreError::Conflict("username or email".to_string()));
        }
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            confirmation_token: None,
            reset_password_token: None,
            confirmed: true,
            blocked: false,
            role_id: user.role_id,
            created_at: now,
            updated_at: now,
        };
        self.working.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<UserRow>> {
        Ok(self.working.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_identifier(&mut self, identifier: &str) -> StoreResult<Option<UserRow>> {
        let users = &self.working.users;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(identifier))
            .or_else(|| users.iter().find(|u| u.username == identifier))
            .cloned())
    }

    async fn update_user(&mut self, id: Uuid, patch: &UserPatch) -> StoreResult<Option<UserRow>> {
        self.check("update_user")?;
        let taken = self.working.users.iter().any(|u| {
            u.id != id
                && (patch.username.as_deref() == Some(u.username.as_str())
                    || patch
                        .email
                        .as_deref()
                        .is_some_and(|e| e.eq_ignore_ascii_case(&u.email)))
        });
        if taken {
            return Err(StoreError::Conflict("username or email".to_string()));
        }
        let Some(user) = self.working.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = &patch.username {
            user.username = username.clone();
        }
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(hash) = &patch.password_hash {
            user.password_hash = hash.clone();
        }
        if let Some(role_id) = patch.role_id {
            user.role_id = role_id;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn insert_job_seeker(&mut self, user_id: Uuid) -> StoreResult<JobSeekerRow> {
        self.check("insert_job_seeker")?;
        let row = JobSeekerRow {
            id: Uuid::new_v4(),
            user_id,
            cv: String::new(),
            about: String::new(),
            dob: None,
        };
        self.working.job_seekers.push(row.clone());
        Ok(row)
    }

    async fn find_job_seeker_by_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Option<JobSeekerRow>> {
        Ok(self
            .working
            .job_seekers
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn update_job_seeker(
        &mut self,
        id: Uuid,
        patch: &JobSeekerPatch,
    ) -> StoreResult<Option<JobSeekerRow>> {
        self.check("update_job_seeker")?;
        let Some(seeker) = self.working.job_seekers.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(cv) = &patch.cv {
            seeker.cv = cv.clone();
        }
        if let Some(about) = &patch.about {
            seeker.about = about.clone();
        }
        if let Some(dob) = patch.dob {
            seeker.dob = Some(dob);
        }
        Ok(Some(seeker.clone()))
    }

    async fn insert_organization(&mut self, org: &NewOrganization) -> StoreResult<OrganizationRow> {
        self.check("insert_organization")?;
        let now = Utc::now();
        let details = org.details.clone();
        let row = OrganizationRow {
            id: Uuid::new_v4(),
            user_id: org.user_id,
            status: org.status,
            phone_number: details.phone_number,
            total_employee: details.total_employee,
            industry_type: details.industry_type,
            address: details.address,
            description: details.description,
            created_date: details.created_date,
            created_at: now,
            updated_at: now,
        };
        self.working.organizations.push(row.clone());
        Ok(row)
    }

    async fn find_organization(&mut self, id: Uuid) -> StoreResult<Option<OrganizationRow>> {
        Ok(self.working.organizations.iter().find(|o| o.id == id).cloned())
    }

    async fn lock_organization(&mut self, id: Uuid) -> StoreResult<Option<OrganizationRow>> {
        self.check("lock_organization")?;
        let lock = Arc::clone(self.row_locks.lock().unwrap().entry(id).or_default());
        self.held.push(lock.lock_owned().await);

        let committed = self
            .shared
            .lock()
            .unwrap()
            .organizations
            .iter()
            .find(|o| o.id == id)
            .cloned();
        if let Some(fresh) = committed {
            match self.working.organizations.iter_mut().find(|o| o.id == id) {
                Some(row) => *row = fresh,
                None => self.working.organizations.push(fresh),
            }
        }
        Ok(self.working.organizations.iter().find(|o| o.id == id).cloned())
    }

    async fn find_organization_by_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Option<OrganizationRow>> {
        Ok(self
            .working
            .organizations
            .iter()
            .find(|o| o.user_id == user_id)
            .cloned())
    }

    async fn update_organization(
        &mut self,
        id: Uuid,
        patch: &OrganizationPatch,
    ) -> StoreResult<Option<OrganizationRow>> {
        self.check("update_organization")?;
        let Some(org) = self.working.organizations.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        let details = patch.details.clone();
        if let Some(status) = patch.status {
            org.status = status;
        }
        if details.phone_number.is_some() {
            org.phone_number = details.phone_number;
        }
        if details.total_employee.is_some() {
            org.total_employee = details.total_employee;
        }
        if details.industry_type.is_some() {
            org.industry_type = details.industry_type;
        }
        if details.address.is_some() {
            org.address = details.address;
        }
        if details.description.is_some() {
            org.description = details.description;
        }
        if details.created_date.is_some() {
            org.created_date = details.created_date;
        }
        org.updated_at = Utc::now();
        Ok(Some(org.clone()))
    }
}
