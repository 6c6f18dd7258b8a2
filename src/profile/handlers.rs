use axum::{
    extract::{Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::ApiError,
    profile::{
        dto::{
            ProfileResponse, ProjectsQuery, SearchQuery, SearchResults, UpdateProfileRequest,
            UpdateProfileResponse,
        },
        repo_types::{ProfileRecord, Project, Skill},
        services,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/projects", get(get_projects))
        .route("/profile/skills/top", get(get_top_skills))
        .route("/profile/search", get(search_profile))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/profile", put(update_profile))
}

async fn load_profile(state: &AppState, user_id: Uuid) -> Result<ProfileRecord, ApiError> {
    ProfileRecord::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let record = load_profile(&state, user_id).await?;
    Ok(Json(record.into()))
}

#[instrument(skip(state, patch))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let record = load_profile(&state, user_id).await?;

    let mut doc = record.data.0;
    services::apply_patch(&mut doc, patch);
    services::normalize(&mut doc);
    services::validate(&doc).map_err(ApiError::BadRequest)?;

    let updated = ProfileRecord::save(&state.db, user_id, &doc)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    info!(user_id = %user_id, "profile updated");
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".into(),
        profile: updated.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_projects(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ProjectsQuery>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let record = load_profile(&state, user_id).await?;

    let mut projects = record.data.0.projects;
    if let Some(skill) = q.skill.as_deref().filter(|s| !s.is_empty()) {
        projects = services::filter_projects_by_skill(&projects, skill);
    }
    Ok(Json(projects))
}

#[instrument(skip(state))]
pub async fn get_top_skills(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let record = load_profile(&state, user_id).await?;
    // Returned as stored; no ranking is applied.
    Ok(Json(record.data.0.skills))
}

#[instrument(skip(state))]
pub async fn search_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SearchQuery>,
) -> Result<Json<SearchResults>, ApiError> {
    let query = q.q.unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Query parameter is required".into()));
    }

    let record = load_profile(&state, user_id).await?;
    Ok(Json(services::search(&record.data.0, &query)))
}
