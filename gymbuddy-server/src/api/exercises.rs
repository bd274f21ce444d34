use axum::{
    extract::{Path, Query, State},
    Json,
};
use gymbuddy_types::Exercise;
use serde::{Deserialize, Serialize};

use super::{parse_id, ApiError, ApiResult};
use crate::db::repositories::ExerciseRepository;
use crate::equipment::{unique_labels, CategoryFilter};
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub muscle: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub muscles: Vec<String>,
    pub equipments: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteToggleResponse {
    pub exercise_id: i64,
    pub favorited: bool,
}

fn equipment_labels(repo: &ExerciseRepository) -> ApiResult<Vec<String>> {
    Ok(unique_labels(repo.raw_equipment()?))
}

/// GET /howto/api/list/?muscle=&equipment=
pub async fn list_exercises(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Exercise>>> {
    let muscle = query
        .muscle
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    let equipment = query.equipment.as_deref().and_then(CategoryFilter::parse);

    let repo = ExerciseRepository::new(state.db.pool.clone());
    let exercises = repo.list(muscle, equipment.as_ref())?;

    tracing::debug!(
        "Listed {} exercises (muscle={:?}, equipment={:?})",
        exercises.len(),
        muscle,
        equipment
    );
    Ok(Json(exercises))
}

/// GET /howto/api/detail/:id/
pub async fn get_exercise(
    State(state): State<AppState>,
    Path(exercise_id): Path<String>,
) -> ApiResult<Json<Exercise>> {
    let exercise_id = parse_id(&exercise_id, "exercise")?;

    let repo = ExerciseRepository::new(state.db.pool.clone());
    let exercise = repo
        .get_by_id(exercise_id)?
        .ok_or_else(|| ApiError::NotFound("Exercise not found.".to_string()))?;

    Ok(Json(exercise))
}

/// GET /howto/api/muscles/
pub async fn list_muscles(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let repo = ExerciseRepository::new(state.db.pool.clone());
    Ok(Json(repo.muscles()?))
}

/// GET /howto/api/equipments/
pub async fn list_equipments(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let repo = ExerciseRepository::new(state.db.pool.clone());
    Ok(Json(equipment_labels(&repo)?))
}

/// GET /howto/api/options/
pub async fn filter_options(State(state): State<AppState>) -> ApiResult<Json<FilterOptions>> {
    let repo = ExerciseRepository::new(state.db.pool.clone());
    Ok(Json(FilterOptions {
        muscles: repo.muscles()?,
        equipments: equipment_labels(&repo)?,
    }))
}

/// GET /howto/api/favorites/
pub async fn list_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<i64>>> {
    let repo = ExerciseRepository::new(state.db.pool.clone());
    Ok(Json(repo.favorite_ids(auth.id())?))
}

/// POST /howto/api/favorites/toggle/:id/
pub async fn toggle_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(exercise_id): Path<String>,
) -> ApiResult<Json<FavoriteToggleResponse>> {
    let exercise_id = parse_id(&exercise_id, "exercise")?;

    let repo = ExerciseRepository::new(state.db.pool.clone());
    if repo.get_by_id(exercise_id)?.is_none() {
        return Err(ApiError::NotFound("Exercise not found.".to_string()));
    }

    let favorited = repo.toggle_favorite(auth.id(), exercise_id)?;
    tracing::debug!(
        "User {} {} exercise {}",
        auth.user.username,
        if favorited { "favorited" } else { "unfavorited" },
        exercise_id
    );

    Ok(Json(FavoriteToggleResponse {
        exercise_id,
        favorited,
    }))
}
