use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobAppliedRow;
use crate::store::Records;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobAppliedInput {
    pub job: Option<Uuid>,
}

/// Records `user_id`'s application to a job that is still open at `now`.
pub async fn apply_to_job<R: Records + ?Sized>(
    records: &mut R,
    input: Option<JobAppliedInput>,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<JobAppliedRow, AppError> {
    let job_id = input
        .and_then(|i| i.job)
        .ok_or_else(|| AppError::Validation("Job field is missing".to_string()))?;

    let job = records
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid job ID".to_string()))?;

    if job.is_expired_at(now) {
        return Err(AppError::Validation(
            "The expiration date for this job has already passed.".to_string(),
        ));
    }

    let application = records.insert_application(job.id, user_id).await?;
    info!("User {user_id} applied to job {}", job.id);
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::jobs::sync::{create_job, JobInput};
    use crate::store::memory::MemoryStore;
    use crate::store::Store;

    async fn job_expiring_in(store: &MemoryStore, offset: Duration) -> Uuid {
        let mut uow = store.begin().await.unwrap();
        let job = create_job(
            uow.as_mut(),
            JobInput {
                title: Some("Support Engineer".to_string()),
                expiration_date: Some(Utc::now() + offset),
                ..JobInput::default()
            },
            None,
        )
        .await
        .unwrap();
        uow.commit().await.unwrap();
        job.id
    }

    #[tokio::test]
    async fn test_expired_job_rejects_application() {
        let store = MemoryStore::new();
        let job = job_expiring_in(&store, Duration::days(-1)).await;

        let mut uow = store.begin().await.unwrap();
        let result = apply_to_job(
            uow.as_mut(),
            Some(JobAppliedInput { job: Some(job) }),
            Uuid::new_v4(),
            Utc::now(),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.read(|t| t.applications.is_empty()));
    }

    #[tokio::test]
    async fn test_open_job_accepts_one_application() {
        let store = MemoryStore::new();
        let job = job_expiring_in(&store, Duration::days(1)).await;
        let user = Uuid::new_v4();

        let mut uow = store.begin().await.unwrap();
        let application = apply_to_job(
            uow.as_mut(),
            Some(JobAppliedInput { job: Some(job) }),
            user,
            Utc::now(),
        )
        .await
        .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(application.job_id, job);
        assert_eq!(application.user_id, user);
        assert_eq!(store.read(|t| t.applications.len()), 1);
    }

    #[tokio::test]
    async fn test_missing_job_field() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        for input in [None, Some(JobAppliedInput::default())] {
            let result = apply_to_job(uow.as_mut(), input, Uuid::new_v4(), Utc::now()).await;
            assert!(
                matches!(result, Err(AppError::Validation(ref m)) if m == "Job field is missing")
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_job_is_rejected() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        let result = apply_to_job(
            uow.as_mut(),
            Some(JobAppliedInput {
                job: Some(Uuid::new_v4()),
            }),
            Uuid::new_v4(),
            Utc::now(),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(ref m)) if m == "Invalid job ID"));
    }
}
