use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A canonical skill or keyword record. `name` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Skill,
    Keyword,
}

impl TagKind {
    pub fn table(self) -> &'static str {
        match self {
            TagKind::Skill => "skills",
            TagKind::Keyword => "keywords",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TagKind::Skill => "skill",
            TagKind::Keyword => "keyword",
        }
    }
}

/// Every relation through which a record owns a set of tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRelation {
    JobSkills,
    JobKeywords,
    JobSeekerSkills,
}

impl TagRelation {
    pub fn kind(self) -> TagKind {
        match self {
            TagRelation::JobSkills | TagRelation::JobSeekerSkills => TagKind::Skill,
            TagRelation::JobKeywords => TagKind::Keyword,
        }
    }

    pub fn link_table(self) -> &'static str {
        match self {
            TagRelation::JobSkills => "job_skills",
            TagRelation::JobKeywords => "job_keywords",
            TagRelation::JobSeekerSkills => "job_seeker_skills",
        }
    }

    pub fn owner_column(self) -> &'static str {
        match self {
            TagRelation::JobSkills | TagRelation::JobKeywords => "job_id",
            TagRelation::JobSeekerSkills => "job_seeker_id",
        }
    }

    pub fn tag_column(self) -> &'static str {
        match self.kind() {
            TagKind::Skill => "skill_id",
            TagKind::Keyword => "keyword_id",
        }
    }
}
