use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts::session::AuthUser;
use crate::errors::AppError;
use crate::jobs::applications::{apply_to_job, JobAppliedInput};
use crate::jobs::catalog::{latest_jobs_and_categories, LatestJobsAndCategories};
use crate::jobs::sync::{create_job, update_job, JobInput};
use crate::jobs::views::{load_job_detail, JobDetail};
use crate::models::job::JobAppliedRow;
use crate::models::user::{ADMIN_ROLE, ORGANIZATION_ROLE};
use crate::routes::Envelope;
use crate::state::AppState;
use crate::store::Records;

#[derive(Deserialize)]
pub struct ApplyRequest {
    pub data: Option<JobAppliedInput>,
}

/// The organization a job write is attributed to. Admins act on behalf of no
/// organization; an organization user must have a profile.
async fn acting_organization<R: Records + ?Sized>(
    records: &mut R,
    auth: &AuthUser,
) -> Result<Option<Uuid>, AppError> {
    auth.require_any(&[ORGANIZATION_ROLE, ADMIN_ROLE])?;
    if auth.has_role(ADMIN_ROLE) {
        return Ok(None);
    }
    let organization = records
        .find_organization_by_user(auth.id)
        .await?
        .ok_or(AppError::Forbidden)?;
    Ok(Some(organization.id))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<Envelope<JobInput>>,
) -> Result<(StatusCode, Json<Envelope<JobDetail>>), AppError> {
    let mut uow = state.store.begin().await?;
    let organization = acting_organization(uow.as_mut(), &auth).await?;
    let job = create_job(uow.as_mut(), req.data, organization).await?;
    let detail = load_job_detail(uow.as_mut(), job).await?;
    uow.commit().await?;
    Ok((StatusCode::CREATED, Json(Envelope { data: detail })))
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<Envelope<JobInput>>,
) -> Result<Json<Envelope<JobDetail>>, AppError> {
    let mut uow = state.store.begin().await?;
    let organization = acting_organization(uow.as_mut(), &auth).await?;
    let job = update_job(uow.as_mut(), id, req.data, organization).await?;
    let detail = load_job_detail(uow.as_mut(), job).await?;
    uow.commit().await?;
    Ok(Json(Envelope { data: detail }))
}

/// GET /api/jobs/latest-and-categories
pub async fn handle_latest_and_categories(
    State(state): State<AppState>,
) -> Result<Json<LatestJobsAndCategories>, AppError> {
    let mut uow = state.store.begin().await?;
    Ok(Json(latest_jobs_and_categories(uow.as_mut()).await?))
}

/// POST /api/jobs-applied
pub async fn handle_apply(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Envelope<JobAppliedRow>>), AppError> {
    let mut uow = state.store.begin().await?;
    let application = apply_to_job(uow.as_mut(), req.data, auth.id, Utc::now()).await?;
    uow.commit().await?;
    Ok((StatusCode::CREATED, Json(Envelope { data: application })))
}
