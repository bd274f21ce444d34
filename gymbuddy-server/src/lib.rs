// Library exports for gymbuddy-server
// The migrate tools and the integration tests build on these modules

pub mod api;
pub mod config;
pub mod db;
pub mod equipment;
pub mod import;
pub mod middleware;
pub mod password;
pub mod session;
pub mod state;
pub mod workout_log;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::api::{auth, community, exercises, pages, planner, profile};
use crate::state::AppState;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    // Web pages that send anonymous visitors to the login form
    let login_required = Router::new()
        .route("/planner/", get(pages::planner))
        .route("/log/", get(pages::workout_log))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_login));

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(pages::index))
        // Authentication
        .route("/auth/api/register/", post(auth::api_register))
        .route("/auth/api/login/", post(auth::api_login))
        .route("/auth/api/logout/", post(auth::api_logout))
        .route("/auth/validate", get(auth::validate_session))
        .route("/auth/login/", get(auth::login_page).post(auth::login_form))
        .route("/auth/register/", get(auth::register_page).post(auth::register_form))
        .route("/auth/logout/", post(auth::logout_form))
        // Exercise catalog
        .route("/howto/", get(pages::howto))
        .route("/howto/detail/:id/", get(pages::howto_detail))
        .route("/howto/api/list/", get(exercises::list_exercises))
        .route("/howto/api/detail/:id/", get(exercises::get_exercise))
        .route("/howto/api/muscles/", get(exercises::list_muscles))
        .route("/howto/api/equipments/", get(exercises::list_equipments))
        .route("/howto/api/options/", get(exercises::filter_options))
        .route("/howto/api/favorites/", get(exercises::list_favorites))
        .route("/howto/api/favorites/toggle/:id/", post(exercises::toggle_favorite))
        // Planner and workout log
        .route("/planner/search-exercises/", get(planner::search_exercises))
        .route("/planner/api/add-plan/", post(planner::add_plan))
        .route("/planner/api/get-plans-for-date/", get(planner::get_plans_for_date))
        .route("/planner/api/get-logs/", get(planner::get_logs))
        .route("/planner/log/load-form/:id/", get(planner::load_log_form))
        .route("/planner/log/complete/:id/", post(planner::complete_plan_form))
        .route("/planner/api/log/complete/:id/", post(planner::complete_plan_api))
        .route("/planner/api/delete-plan/:id/", post(planner::delete_plan))
        // Community
        .route("/community/", get(pages::community))
        .route("/community/thread/:id/", get(pages::thread))
        .route("/community/api/threads/", get(community::list_threads))
        .route("/community/create_ajax/", post(community::create_thread))
        .route("/community/api/thread/:id/", get(community::get_thread))
        .route("/community/edit/:id/", post(community::update_thread))
        .route("/community/delete/:id/", post(community::delete_thread))
        .route("/community/thread/:id/reply/", post(community::create_reply))
        .route("/community/thread/:id/like/", post(community::like_thread))
        .route("/community/reply/:id/edit/", post(community::update_reply))
        .route("/community/reply/:id/delete/", post(community::delete_reply))
        .route("/community/reply/:id/like/", post(community::like_reply))
        // Profiles
        .route("/profile/create/api/", post(profile::create_profile))
        .route("/profile/edit/api/", post(profile::update_profile))
        .route("/profile/delete/api/", post(profile::delete_profile))
        .route("/profile/json/", get(profile::list_profiles))
        .route("/profile/json/:user_id/", get(profile::get_profile))
        .route("/profile/api/sports/", get(profile::list_sports))
        .merge(login_required)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
