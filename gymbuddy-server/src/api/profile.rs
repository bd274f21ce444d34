use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{ApiError, ApiResult, JsonBody};
use crate::db::repositories::ProfileRepository;
use crate::middleware::AuthUser;
use crate::state::AppState;
use gymbuddy_types::{CreateProfileRequest, Profile, ProfileFields, Sport, UpdateProfileRequest};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SportChoice {
    pub slug: &'static str,
    pub label: &'static str,
}

fn profile_not_found() -> ApiError {
    ApiError::NotFound("Profile not found.".to_string())
}

fn ensure_display_name_free(
    repo: &ProfileRepository,
    display_name: &str,
    owner: Option<&Uuid>,
) -> ApiResult<()> {
    if repo.display_name_taken(display_name, owner)? {
        return Err(ApiError::BadRequest(
            "A profile with this display name already exists.".to_string(),
        ));
    }
    Ok(())
}

/// POST /profile/create/api/
pub async fn create_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<CreateProfileRequest>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    let repo = ProfileRepository::new(state.db.pool.clone());
    if repo.get(auth.id())?.is_some() {
        return Err(ApiError::BadRequest("Profile already exists.".to_string()));
    }

    let fields = payload.validate()?;
    ensure_display_name_free(&repo, &fields.display_name, None)?;

    let profile = repo.create(auth.id(), &fields)?;
    tracing::info!("Created profile '{}' for {}", profile.display_name, auth.user.username);
    Ok((StatusCode::CREATED, Json(profile)))
}

/// POST /profile/edit/api/
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    let repo = ProfileRepository::new(state.db.pool.clone());
    let current = repo.get(auth.id())?.ok_or_else(profile_not_found)?;

    let fields = payload.apply_to(&ProfileFields::from(&current))?;
    ensure_display_name_free(&repo, &fields.display_name, Some(auth.id()))?;

    let profile = repo
        .update(auth.id(), &fields)?
        .ok_or_else(profile_not_found)?;
    Ok(Json(profile))
}

/// POST /profile/delete/api/
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let repo = ProfileRepository::new(state.db.pool.clone());
    if !repo.delete(auth.id())? {
        return Err(profile_not_found());
    }

    Ok(Json(serde_json::json!({ "status": "success" })))
}

/// GET /profile/json/
pub async fn list_profiles(State(state): State<AppState>) -> ApiResult<Json<Vec<Profile>>> {
    let repo = ProfileRepository::new(state.db.pool.clone());
    Ok(Json(repo.list_all()?))
}

/// GET /profile/json/:user_id/
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Profile>> {
    let user_id = Uuid::parse_str(&user_id)
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;

    let repo = ProfileRepository::new(state.db.pool.clone());
    let profile = repo.get(&user_id)?.ok_or_else(profile_not_found)?;
    Ok(Json(profile))
}

/// GET /profile/api/sports/
pub async fn list_sports() -> Json<Vec<SportChoice>> {
    Json(
        Sport::ALL
            .iter()
            .map(|sport| SportChoice {
                slug: sport.slug(),
                label: sport.label(),
            })
            .collect(),
    )
}
