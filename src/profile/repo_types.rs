use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Enumerated skill level. Defaults to Intermediate when a document omits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub proficiency: Proficiency,
}

/// Start/end of an education or work entry. Either side may be open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub duration: DateRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub duration: DateRange,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub demo: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub links: ProjectLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub portfolio: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
}

/// The whole profile document as stored in the JSONB column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDoc {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub work: Vec<WorkExperience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub links: SocialLinks,
}

impl ProfileDoc {
    /// The document a fresh registration starts with.
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }
}

/// Profile row in the database: exactly one document per user.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    pub data: Json<ProfileDoc>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod doc_tests {
    use super::*;

    #[test]
    fn partial_document_parses_with_defaults() {
        let doc: ProfileDoc = serde_json::from_str(
            r#"{
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "skills": [{ "name": "Rust" }]
            }"#,
        )
        .expect("partial document should parse");

        assert_eq!(doc.skills.len(), 1);
        assert_eq!(doc.skills[0].proficiency, Proficiency::Intermediate);
        assert!(doc.title.is_none());
        assert!(doc.projects.is_empty());
        assert!(doc.links.github.is_none());
    }

    #[test]
    fn duration_accepts_open_ranges() {
        let edu: Education = serde_json::from_str(
            r#"{
                "institution": "Tech University",
                "degree": "BSc",
                "duration": { "start": "2015-09-01T00:00:00Z" }
            }"#,
        )
        .expect("open range should parse");

        assert!(edu.duration.start.is_some());
        assert!(edu.duration.end.is_none());
    }
}
