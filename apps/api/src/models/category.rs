use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
}

/// A category annotated with the number of jobs filed under it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryDisplay {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub count: i64,
}
