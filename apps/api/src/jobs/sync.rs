//! Job create/update orchestration.
//!
//! Skills and keywords arrive as free-text names and are resolved to shared
//! canonical records. Updates use full-replace relation semantics: whatever
//! the request carries (including nothing) becomes the job's exact tag set.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobPatch, JobRow, NewJob};
use crate::models::tag::TagRelation;
use crate::store::{Records, StoreError};
use crate::tags::assign_tag_set;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub category: Option<Uuid>,
    pub skills: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
}

impl JobInput {
    fn skill_names(&self) -> &[String] {
        self.skills.as_deref().unwrap_or(&[])
    }

    fn keyword_names(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or(&[])
    }
}

async fn ensure_category<R: Records + ?Sized>(
    records: &mut R,
    category_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(id) = category_id {
        if records.find_category(id).await?.is_none() {
            return Err(AppError::Validation("Invalid category".to_string()));
        }
    }
    Ok(())
}

fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(AppError::Validation(format!("{field} cannot be empty")))
        }
        other => Ok(other),
    }
}

/// Creates a job attributed to `organization_id`.
pub async fn create_job<R: Records + ?Sized>(
    records: &mut R,
    input: JobInput,
    organization_id: Option<Uuid>,
) -> Result<JobRow, AppError> {
    let title = non_blank(input.title.clone(), "title")?
        .ok_or_else(|| AppError::Validation("title is required".to_string()))?;
    let expiration_date = input
        .expiration_date
        .ok_or_else(|| AppError::Validation("expirationDate is required".to_string()))?;
    ensure_category(records, input.category).await?;

    let job = records
        .insert_job(&NewJob {
            title,
            description: input.description.clone(),
            expiration_date,
            category_id: input.category,
            organization_id,
        })
        .await?;

    assign_tag_set(records, TagRelation::JobSkills, job.id, input.skill_names()).await?;
    assign_tag_set(records, TagRelation::JobKeywords, job.id, input.keyword_names()).await?;

    info!("Created job {} '{}'", job.id, job.title);
    Ok(job)
}

/// Updates a job. When `acting_organization` is set, only that
/// organization's own jobs may be changed.
pub async fn update_job<R: Records + ?Sized>(
    records: &mut R,
    id: Uuid,
    input: JobInput,
    acting_organization: Option<Uuid>,
) -> Result<JobRow, AppError> {
    let existing = records
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    if let Some(org) = acting_organization {
        if existing.organization_id != Some(org) {
            return Err(AppError::Forbidden);
        }
    }

    ensure_category(records, input.category).await?;

    let patch = JobPatch {
        title: non_blank(input.title.clone(), "title")?,
        description: input.description.clone(),
        expiration_date: input.expiration_date,
        category_id: input.category,
    };
    let job = records
        .update_job(id, &patch)
        .await?
        .ok_or_else(|| StoreError::Missing(format!("job {id}")))?;

    // Absent and empty both clear the relation.
    assign_tag_set(records, TagRelation::JobSkills, job.id, input.skill_names()).await?;
    assign_tag_set(records, TagRelation::JobKeywords, job.id, input.keyword_names()).await?;

    info!("Updated job {}", job.id);
    Ok(job)
}
