use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{Records, Store, StoreError, StoreResult, UnitOfWork};
use crate::models::category::{Category, CategoryDisplay};
use crate::models::job::{JobAppliedRow, JobPatch, JobRow, NewJob};
use crate::models::job_seeker::{JobSeekerPatch, JobSeekerRow};
use crate::models::organization::{NewOrganization, OrganizationPatch, OrganizationRow};
use crate::models::tag::{Tag, TagKind, TagRelation};
use crate::models::user::{NewUser, Role, UserPatch, UserRow};

/// Postgres-backed store. Each unit of work is one database transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Rolls back on drop unless committed.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn unique_violation(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(what.to_string())
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl Records for PgUnitOfWork {
    async fn upsert_tag(&mut self, kind: TagKind, name: &str) -> StoreResult<Uuid> {
        // DO NOTHING leaves existing rows unlocked; a conflicting insert that
        // is still in flight is waited on by the unique index instead.
        let table = kind.table();
        let inserted: Option<Uuid> = sqlx::query_scalar(&format!(
            "INSERT INTO {table} (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id"
        ))
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        if let Some(id) = inserted {
            return Ok(id);
        }

        let existing: Uuid = sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE name = $1"))
            .bind(name)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(existing)
    }

    async fn replace_tag_links(
        &mut self,
        relation: TagRelation,
        owner_id: Uuid,
        tag_ids: &[Uuid],
    ) -> StoreResult<()> {
        let table = relation.link_table();
        let owner = relation.owner_column();
        let tag = relation.tag_column();

        sqlx::query(&format!("DELETE FROM {table} WHERE {owner} = $1"))
            .bind(owner_id)
            .execute(&mut *self.tx)
            .await?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(&format!(
            "INSERT INTO {table} ({owner}, {tag}, position) \
             SELECT $1, tag_id, MIN(ord)::int \
             FROM UNNEST($2::uuid[]) WITH ORDINALITY AS t(tag_id, ord) \
             GROUP BY tag_id"
        ))
        .bind(owner_id)
        .bind(tag_ids)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn linked_tags(
        &mut self,
        relation: TagRelation,
        owner_id: Uuid,
    ) -> StoreResult<Vec<Tag>> {
        let sql = format!(
            "SELECT t.id, t.name FROM {link} l \
             JOIN {tags} t ON t.id = l.{tag} \
             WHERE l.{owner} = $1 \
             ORDER BY l.position",
            link = relation.link_table(),
            tags = relation.kind().table(),
            tag = relation.tag_column(),
            owner = relation.owner_column(),
        );
        Ok(sqlx::query_as::<_, Tag>(&sql)
            .bind(owner_id)
            .fetch_all(&mut *self.tx)
            .await?)
    }

    async fn find_category(&mut self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT id, name, image FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?,
        )
    }

    async fn categories_with_job_counts(
        &mut self,
        limit: i64,
    ) -> StoreResult<Vec<CategoryDisplay>> {
        Ok(sqlx::query_as::<_, CategoryDisplay>(
            r#"
            SELECT c.id, c.name, c.image, COUNT(j.id) AS count
            FROM categories c
            LEFT JOIN jobs j ON j.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn find_job(&mut self, id: Uuid) -> StoreResult<Option<JobRow>> {
        Ok(sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn insert_job(&mut self, job: &NewJob) -> StoreResult<JobRow> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (title, description, expiration_date, category_id, organization_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(job.expiration_date)
        .bind(job.category_id)
        .bind(job.organization_id)
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn update_job(&mut self, id: Uuid, patch: &JobPatch) -> StoreResult<Option<JobRow>> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                expiration_date = COALESCE($4, expiration_date),
                category_id = COALESCE($5, category_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.expiration_date)
        .bind(patch.category_id)
        .fetch_optional(&mut *self.tx)
        .await?)
    }

    async fn latest_jobs(&mut self, limit: i64) -> StoreResult<Vec<JobRow>> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC LIMIT $1")
                .bind(limit)
                .fetch_all(&mut *self.tx)
                .await?,
        )
    }

    async fn insert_application(
        &mut self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<JobAppliedRow> {
        Ok(sqlx::query_as::<_, JobAppliedRow>(
            "INSERT INTO jobs_applied (job_id, user_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn find_role(&mut self, id: Uuid) -> StoreResult<Option<Role>> {
        Ok(sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn find_role_by_name(&mut self, name: &str) -> StoreResult<Option<Role>> {
        Ok(sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn insert_user(&mut self, user: &NewUser) -> StoreResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| unique_violation(e, "username or email"))
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?)
    }

    async fn find_user_by_identifier(&mut self, identifier: &str) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users WHERE lower(email) = lower($1) OR username = $1 \
             ORDER BY (lower(email) = lower($1)) DESC LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&mut *self.tx)
        .await?)
    }

    async fn update_user(&mut self, id: Uuid, patch: &UserPatch) -> StoreResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role_id = COALESCE($5, role_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.username)
        .bind(&patch.email)
        .bind(&patch.password_hash)
        .bind(patch.role_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| unique_violation(e, "username or email"))
    }

    async fn insert_job_seeker(&mut self, user_id: Uuid) -> StoreResult<JobSeekerRow> {
        Ok(sqlx::query_as::<_, JobSeekerRow>(
            "INSERT INTO job_seekers (user_id, cv, about) VALUES ($1, '', '') RETURNING *",
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn find_job_seeker_by_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Option<JobSeekerRow>> {
        Ok(
            sqlx::query_as::<_, JobSeekerRow>("SELECT * FROM job_seekers WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *self.tx)
                .await?,
        )
    }

    async fn update_job_seeker(
        &mut self,
        id: Uuid,
        patch: &JobSeekerPatch,
    ) -> StoreResult<Option<JobSeekerRow>> {
        Ok(sqlx::query_as::<_, JobSeekerRow>(
            r#"
            UPDATE job_seekers SET
                cv = COALESCE($2, cv),
                about = COALESCE($3, about),
                dob = COALESCE($4, dob)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.cv)
        .bind(&patch.about)
        .bind(patch.dob)
        .fetch_optional(&mut *self.tx)
        .await?)
    }

    async fn insert_organization(&mut self, org: &NewOrganization) -> StoreResult<OrganizationRow> {
        let details = &org.details;
        sqlx::query_as::<_, OrganizationRow>(
            r#"
            INSERT INTO organizations
                (user_id, status, phone_number, total_employee, industry_type,
                 address, description, created_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(org.user_id)
        .bind(org.status.as_str())
        .bind(&details.phone_number)
        .bind(details.total_employee)
        .bind(&details.industry_type)
        .bind(&details.address)
        .bind(&details.description)
        .bind(details.created_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| unique_violation(e, "organization profile for user"))
    }

    async fn find_organization(&mut self, id: Uuid) -> StoreResult<Option<OrganizationRow>> {
        Ok(
            sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?,
        )
    }

    async fn lock_organization(&mut self, id: Uuid) -> StoreResult<Option<OrganizationRow>> {
        Ok(sqlx::query_as::<_, OrganizationRow>(
            "SELECT * FROM organizations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?)
    }

    async fn find_organization_by_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Option<OrganizationRow>> {
        Ok(
            sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *self.tx)
                .await?,
        )
    }

    async fn update_organization(
        &mut self,
        id: Uuid,
        patch: &OrganizationPatch,
    ) -> StoreResult<Option<OrganizationRow>> {
        let details = &patch.details;
        Ok(sqlx::query_as::<_, OrganizationRow>(
            r#"
            UPDATE organizations SET
                status = COALESCE($2, status),
                phone_number = COALESCE($3, phone_number),
                total_employee = COALESCE($4, total_employee),
                industry_type = COALESCE($5, industry_type),
                address = COALESCE($6, address),
                description = COALESCE($7, description),
                created_date = COALESCE($8, created_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(&details.phone_number)
        .bind(details.total_employee)
        .bind(&details.industry_type)
        .bind(&details.address)
        .bind(&details.description)
        .bind(details.created_date)
        .fetch_optional(&mut *self.tx)
        .await?)
    }
}
