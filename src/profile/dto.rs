use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profile::repo_types::{
    Education, ProfileDoc, ProfileRecord, Project, Skill, SocialLinks, WorkExperience,
};

/// Set-semantics patch: every field present here replaces the stored field
/// wholesale; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub about: Option<String>,
    pub skills: Option<Vec<Skill>>,
    pub education: Option<Vec<Education>>,
    pub work: Option<Vec<WorkExperience>>,
    pub projects: Option<Vec<Project>>,
    pub links: Option<SocialLinks>,
}

/// Full profile as returned to the client.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub profile: ProfileDoc,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ProfileRecord> for ProfileResponse {
    fn from(record: ProfileRecord) -> Self {
        Self {
            user_id: record.user_id,
            profile: record.data.0,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub profile: ProfileResponse,
}

#[derive(Debug, Deserialize)]
pub struct ProjectsQuery {
    pub skill: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Search hits grouped by the collection they came from.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub work: Vec<WorkExperience>,
    pub education: Vec<Education>,
}
