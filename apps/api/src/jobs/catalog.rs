use serde::Serialize;

use crate::errors::AppError;
use crate::jobs::views::{load_job_detail, JobDetail};
use crate::models::category::CategoryDisplay;
use crate::store::Records;

pub const LATEST_JOBS_LIMIT: i64 = 8;
pub const CATEGORY_DISPLAY_LIMIT: i64 = 8;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestJobsAndCategories {
    pub latest_jobs: Vec<JobDetail>,
    pub category_display: Vec<CategoryDisplay>,
}

/// Landing-page feed: newest postings with relations, plus categories
/// annotated with how many jobs each holds.
pub async fn latest_jobs_and_categories<R: Records + ?Sized>(
    records: &mut R,
) -> Result<LatestJobsAndCategories, AppError> {
    let jobs = records.latest_jobs(LATEST_JOBS_LIMIT).await?;
    let mut latest_jobs = Vec::with_capacity(jobs.len());
    for job in jobs {
        latest_jobs.push(load_job_detail(records, job).await?);
    }

    let category_display = records
        .categories_with_job_counts(CATEGORY_DISPLAY_LIMIT)
        .await?;

    Ok(LatestJobsAndCategories {
        latest_jobs,
        category_display,
    })
}
