use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cv: String,
    pub about: String,
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct JobSeekerPatch {
    pub cv: Option<String>,
    pub about: Option<String>,
    pub dob: Option<NaiveDate>,
}

impl JobSeekerPatch {
    pub fn is_empty(&self) -> bool {
        self.cv.is_none() && self.about.is_none() && self.dob.is_none()
    }
}
