use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Admin-controlled approval state of an organization account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganizationStatus {
    #[serde(rename = "on review")]
    OnReview,
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "rejected")]
    Rejected,
}

#[derive(Debug, Error)]
#[error("unknown organization status '{0}'")]
pub struct UnknownStatus(pub String);

impl OrganizationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrganizationStatus::OnReview => "on review",
            OrganizationStatus::Accepted => "accepted",
            OrganizationStatus::Rejected => "rejected",
        }
    }

    /// on review → accepted | rejected; both outcomes are final.
    /// Restating the current status is always allowed.
    pub fn can_become(self, next: OrganizationStatus) -> bool {
        self == next || self == OrganizationStatus::OnReview
    }
}

impl fmt::Display for OrganizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganizationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on review" => Ok(OrganizationStatus::OnReview),
            "accepted" => Ok(OrganizationStatus::Accepted),
            "rejected" => Ok(OrganizationStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for OrganizationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: OrganizationStatus,
    pub phone_number: Option<String>,
    pub total_employee: Option<i32>,
    pub industry_type: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationDetails {
    pub phone_number: Option<String>,
    pub total_employee: Option<i32>,
    pub industry_type: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub created_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub user_id: Uuid,
    pub status: OrganizationStatus,
    pub details: OrganizationDetails,
}

/// Field-level organization changes; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct OrganizationPatch {
    pub status: Option<OrganizationStatus>,
    pub details: OrganizationDetails,
}
