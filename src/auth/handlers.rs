use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, PublicUser, RegisterRequest},
        repo_types::User,
        services::{check_credentials, hash_password, is_valid_email, AuthUser, JwtKeys},
    },
    error::ApiError,
    profile::repo_types::ProfileRecord,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.name = payload.name.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }
    if payload.name.is_empty() {
        warn!("empty name");
        return Err(ApiError::BadRequest("Name is required".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::BadRequest("User already exists".into()));
    }

    let hash = hash_password(&payload.password)?;

    // User and profile are created together or not at all.
    let mut tx = state.db.begin().await?;
    let user = match User::create(&mut *tx, &payload.email, &hash).await {
        Ok(u) => u,
        Err(e) => {
            // Lost the race against a concurrent register with the same email.
            let duplicate = e
                .downcast_ref::<sqlx::Error>()
                .and_then(|e| e.as_database_error())
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if duplicate {
                warn!(email = %payload.email, "email already registered");
                return Err(ApiError::BadRequest("User already exists".into()));
            }
            return Err(ApiError::Internal(e));
        }
    };
    ProfileRecord::create(&mut *tx, user.id, &payload.name, &payload.email).await?;
    tx.commit().await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".into(),
            token,
            user: PublicUser {
                id: user.id,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    let user = check_credentials(
        User::find_by_email(&state.db, &payload.email).await?,
        &payload.password,
    )?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "token user no longer exists");
        ApiError::Unauthorized("User not found".into())
    })?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
    }))
}

#[cfg(test)]
mod me_tests {
    use super::*;

    #[test]
    fn me_response_serialization() {
        let response = MeResponse {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
            created_at: time::OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("id"));
        assert!(json.contains("created_at"));
    }

    #[test]
    fn auth_response_never_leaks_password_hash() {
        let response = AuthResponse {
            message: "Login successful".into(),
            token: "abc".into(),
            user: PublicUser {
                id: uuid::Uuid::new_v4(),
                email: "test@example.com".into(),
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("password"));
    }
}
