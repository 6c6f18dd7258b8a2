use crate::auth::services::is_valid_email;
use crate::profile::dto::{SearchResults, UpdateProfileRequest};
use crate::profile::repo_types::{ProfileDoc, Project};

/// Apply a set-semantics patch: each top-level field present in the patch
/// replaces the stored field wholesale. Lists are never merged element-wise.
pub fn apply_patch(doc: &mut ProfileDoc, patch: UpdateProfileRequest) {
    if let Some(name) = patch.name {
        doc.name = name;
    }
    if let Some(email) = patch.email {
        doc.email = email;
    }
    if let Some(title) = patch.title {
        doc.title = Some(title);
    }
    if let Some(about) = patch.about {
        doc.about = Some(about);
    }
    if let Some(skills) = patch.skills {
        doc.skills = skills;
    }
    if let Some(education) = patch.education {
        doc.education = education;
    }
    if let Some(work) = patch.work {
        doc.work = work;
    }
    if let Some(projects) = patch.projects {
        doc.projects = projects;
    }
    if let Some(links) = patch.links {
        doc.links = links;
    }
}

/// Trim all user-entered strings and lowercase the email before storage.
pub fn normalize(doc: &mut ProfileDoc) {
    fn trim(s: &mut String) {
        *s = s.trim().to_string();
    }
    fn trim_opt(s: &mut Option<String>) {
        if let Some(v) = s.as_mut() {
            trim(v);
        }
    }

    trim(&mut doc.name);
    doc.email = doc.email.trim().to_lowercase();
    trim_opt(&mut doc.title);
    trim_opt(&mut doc.about);
    for skill in &mut doc.skills {
        trim(&mut skill.name);
    }
    for edu in &mut doc.education {
        trim(&mut edu.institution);
        trim(&mut edu.degree);
        trim_opt(&mut edu.field);
    }
    for job in &mut doc.work {
        trim(&mut job.company);
        trim(&mut job.position);
        trim_opt(&mut job.description);
        for s in &mut job.skills {
            trim(s);
        }
    }
    for project in &mut doc.projects {
        trim(&mut project.title);
        trim(&mut project.description);
        for s in &mut project.skills {
            trim(s);
        }
    }
}

/// Required sub-fields must be non-empty after normalization.
pub fn validate(doc: &ProfileDoc) -> Result<(), String> {
    if doc.name.is_empty() {
        return Err("Name is required".into());
    }
    if !is_valid_email(&doc.email) {
        return Err("A valid email is required".into());
    }
    if doc.skills.iter().any(|s| s.name.is_empty()) {
        return Err("Skill name is required".into());
    }
    if doc
        .education
        .iter()
        .any(|e| e.institution.is_empty() || e.degree.is_empty())
    {
        return Err("Institution and degree are required".into());
    }
    if doc
        .work
        .iter()
        .any(|w| w.company.is_empty() || w.position.is_empty())
    {
        return Err("Company and position are required".into());
    }
    if doc
        .projects
        .iter()
        .any(|p| p.title.is_empty() || p.description.is_empty())
    {
        return Err("Project title and description are required".into());
    }
    Ok(())
}

/// Projects whose skill list contains `skill`, case-insensitively.
/// Exact match on the whole skill name, not a substring.
pub fn filter_projects_by_skill(projects: &[Project], skill: &str) -> Vec<Project> {
    let needle = skill.to_lowercase();
    projects
        .iter()
        .filter(|p| p.skills.iter().any(|s| s.to_lowercase() == needle))
        .cloned()
        .collect()
}

/// Case-insensitive substring search across the four collections, applied
/// independently to each; hits come back grouped by collection.
pub fn search(doc: &ProfileDoc, query: &str) -> SearchResults {
    let term = query.to_lowercase();
    let hit = |s: &str| s.to_lowercase().contains(&term);

    SearchResults {
        skills: doc
            .skills
            .iter()
            .filter(|s| hit(&s.name))
            .cloned()
            .collect(),
        projects: doc
            .projects
            .iter()
            .filter(|p| hit(&p.title) || hit(&p.description) || p.skills.iter().any(|s| hit(s)))
            .cloned()
            .collect(),
        work: doc
            .work
            .iter()
            .filter(|w| {
                hit(&w.company)
                    || hit(&w.position)
                    || w.description.as_deref().map(hit).unwrap_or(false)
                    || w.skills.iter().any(|s| hit(s))
            })
            .cloned()
            .collect(),
        education: doc
            .education
            .iter()
            .filter(|e| {
                hit(&e.institution)
                    || hit(&e.degree)
                    || e.field.as_deref().map(hit).unwrap_or(false)
            })
            .cloned()
            .collect(),
    }
}
