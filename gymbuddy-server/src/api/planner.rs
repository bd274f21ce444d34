use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{NaiveDate, Utc};
use gymbuddy_types::{
    parse_date, AddPlanRequest, CompletePlanRequest, ExerciseSummary, PlanCreatedResponse,
    WorkoutLogResponse, WorkoutPlan,
};
use serde::{Deserialize, Serialize};

use super::{parse_id, ApiError, ApiResult, JsonBody};
use crate::db::repositories::{ExerciseRepository, PlanRepository};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::workout_log::{build_log, LogQuery};

/// Queries shorter than this return no results
const MIN_SEARCH_LEN: usize = 2;
const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub exercises: Vec<ExerciseSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlansForDateResponse {
    pub date: NaiveDate,
    pub plans: Vec<WorkoutPlan>,
}

fn plan_not_found() -> ApiError {
    ApiError::NotFound("Workout plan not found.".to_string())
}

/// GET /planner/search-exercises/?q=
pub async fn search_exercises(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let q = query.q.trim();
    if q.chars().count() < MIN_SEARCH_LEN {
        return Ok(Json(SearchResponse { exercises: vec![] }));
    }

    let repo = ExerciseRepository::new(state.db.pool.clone());
    let exercises = repo.search(q, MAX_SEARCH_RESULTS)?;
    Ok(Json(SearchResponse { exercises }))
}

/// POST /planner/api/add-plan/
pub async fn add_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<AddPlanRequest>,
) -> ApiResult<(StatusCode, Json<PlanCreatedResponse>)> {
    let new_plan = payload.validate()?;

    let exercises = ExerciseRepository::new(state.db.pool.clone());
    if exercises.get_by_id(new_plan.exercise_id)?.is_none() {
        return Err(ApiError::NotFound("Exercise not found.".to_string()));
    }

    let plans = PlanRepository::new(state.db.pool.clone());
    let plan = plans.create(auth.id(), &new_plan)?;

    tracing::info!(
        "User {} planned {} ({}x{}) for {}",
        auth.user.username,
        plan.exercise_name,
        plan.sets,
        plan.reps,
        plan.plan_date
    );
    Ok((StatusCode::CREATED, Json(PlanCreatedResponse::from(&plan))))
}

/// GET /planner/api/get-plans-for-date/?date=YYYY-MM-DD
pub async fn get_plans_for_date(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<PlansForDateResponse>> {
    let raw = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing date parameter.".to_string()))?;
    let date = parse_date(raw)?;

    let repo = PlanRepository::new(state.db.pool.clone());
    let plans = repo.list_for_date(auth.id(), date)?;
    Ok(Json(PlansForDateResponse { date, plans }))
}

/// GET /planner/log/load-form/:id/
pub async fn load_log_form(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plan_id): Path<String>,
) -> ApiResult<Json<WorkoutPlan>> {
    let plan_id = parse_id(&plan_id, "plan")?;

    let repo = PlanRepository::new(state.db.pool.clone());
    let plan = repo
        .get_for_user(plan_id, auth.id())?
        .ok_or_else(plan_not_found)?;
    Ok(Json(plan))
}

fn complete_plan(
    state: &AppState,
    auth: &AuthUser,
    plan_id: &str,
    request: &CompletePlanRequest,
) -> ApiResult<WorkoutPlan> {
    let plan_id = parse_id(plan_id, "plan")?;
    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let repo = PlanRepository::new(state.db.pool.clone());
    let plan = repo
        .complete(plan_id, auth.id(), Utc::now(), description)?
        .ok_or_else(plan_not_found)?;

    tracing::info!("User {} completed plan {}", auth.user.username, plan.id);
    Ok(plan)
}

/// POST /planner/log/complete/:id/ (form)
pub async fn complete_plan_form(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plan_id): Path<String>,
    Form(form): Form<CompletePlanRequest>,
) -> ApiResult<Response> {
    complete_plan(&state, &auth, &plan_id, &form)?;
    Ok(Redirect::to("/log/").into_response())
}

/// POST /planner/api/log/complete/:id/
pub async fn complete_plan_api(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plan_id): Path<String>,
    JsonBody(payload): JsonBody<CompletePlanRequest>,
) -> ApiResult<Json<WorkoutPlan>> {
    let plan = complete_plan(&state, &auth, &plan_id, &payload)?;
    Ok(Json(plan))
}

/// POST /planner/api/delete-plan/:id/
pub async fn delete_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plan_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let plan_id = parse_id(&plan_id, "plan")?;

    let repo = PlanRepository::new(state.db.pool.clone());
    if !repo.delete(plan_id, auth.id())? {
        return Err(plan_not_found());
    }

    Ok(Json(serde_json::json!({ "status": "success" })))
}

/// GET /planner/api/get-logs/?year=&month=&week_start=
///
/// Bad parameters never fail the request; they fall back to the current period.
pub async fn get_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<WorkoutLogResponse>> {
    let today = Utc::now().date_naive();
    let period = query.resolve(today);

    let repo = PlanRepository::new(state.db.pool.clone());
    let plans = repo.list_in_range(auth.id(), period.start, period.end)?;
    let plan_years = repo.plan_years(auth.id())?;

    Ok(Json(build_log(&period, plans, &plan_years, today)))
}
