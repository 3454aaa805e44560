use serde::Serialize;

use crate::accounts::views::PublicUser;
use crate::errors::AppError;
use crate::models::category::Category;
use crate::models::job::JobRow;
use crate::models::organization::OrganizationRow;
use crate::models::tag::{Tag, TagRelation};
use crate::store::Records;

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationCard {
    #[serde(flatten)]
    pub organization: OrganizationRow,
    pub user: Option<PublicUser>,
}

/// A job with its relations populated.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: JobRow,
    pub organization: Option<OrganizationCard>,
    pub category: Option<Category>,
    pub skills: Vec<Tag>,
    pub keywords: Vec<Tag>,
}

pub async fn load_job_detail<R: Records + ?Sized>(
    records: &mut R,
    job: JobRow,
) -> Result<JobDetail, AppError> {
    let organization = match job.organization_id {
        Some(id) => match records.find_organization(id).await? {
            Some(organization) => {
                let user = records
                    .find_user(organization.user_id)
                    .await?
                    .map(|u| PublicUser::from(&u));
                Some(OrganizationCard { organization, user })
            }
            None => None,
        },
        None => None,
    };

    let category = match job.category_id {
        Some(id) => records.find_category(id).await?,
        None => None,
    };

    let skills = records.linked_tags(TagRelation::JobSkills, job.id).await?;
    let keywords = records.linked_tags(TagRelation::JobKeywords, job.id).await?;

    Ok(JobDetail {
        job,
        organization,
        category,
        skills,
        keywords,
    })
}
