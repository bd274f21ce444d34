use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use gymbuddy_types::{LoginRequest, LoginResponse, RegisterRequest, User, ValidationError};
use serde::{Deserialize, Serialize};

use super::{pages, ApiError, ApiResult, JsonBody};
use crate::db::repositories::UserRepository;
use crate::middleware::{AuthUser, SESSION_COOKIE};
use crate::password::{hash_password_with_iterations, verify_password};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Response for session validation
#[derive(Serialize)]
pub struct ValidateSessionResponse {
    pub user: User,
    pub valid: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .into()
}

fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").into()
}

/// Only same-site absolute paths are followed after login
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

fn register_user(state: &AppState, request: &RegisterRequest) -> ApiResult<User> {
    let (username, password) = request.validate()?;

    let repo = UserRepository::new(state.db.pool.clone());
    if repo.username_exists(&username)? {
        return Err(ApiError::BadRequest("Username already exists.".to_string()));
    }

    let password_hash = hash_password_with_iterations(&password, state.password_iterations);
    let user = repo.create(&username, &password_hash, false)?;
    tracing::info!("Registered user {}", user.username);
    Ok(user)
}

/// Check credentials and open a session. Returns the user and token.
fn login_user(state: &AppState, username: &str, password: &str) -> ApiResult<(User, String)> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::EmptyCredentials.into());
    }

    let repo = UserRepository::new(state.db.pool.clone());
    let (user, password_hash) = repo
        .get_credentials(username)?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(password, &password_hash) {
        tracing::warn!("Failed login attempt for {}", username);
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.session_manager.create_session(user.id)?;
    Ok((user, token))
}

// JSON API

/// POST /auth/api/register/
pub async fn api_register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let user = register_user(&state, &payload)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "username": user.username,
            "status": "success",
            "message": "Registration successful.",
        })),
    ))
}

/// POST /auth/api/login/
pub async fn api_login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let (user, session_token) = login_user(&state, &payload.username, &payload.password)?;

    let response = LoginResponse {
        username: user.username,
        status: true,
        message: "Login successful.".to_string(),
        session_token: session_token.clone(),
    };
    Ok((jar.add(session_cookie(session_token)), Json(response)))
}

/// POST /auth/api/logout/
pub async fn api_logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> ApiResult<(CookieJar, Json<serde_json::Value>)> {
    state.session_manager.delete_session(&auth.token)?;

    Ok((
        jar.remove(expired_session_cookie()),
        Json(serde_json::json!({
            "status": "success",
            "message": "Logged out successfully."
        })),
    ))
}

/// GET /auth/validate
pub async fn validate_session(auth: AuthUser) -> Json<ValidateSessionResponse> {
    Json(ValidateSessionResponse {
        user: auth.user,
        valid: true,
    })
}

// Web forms

/// GET /auth/login/
pub async fn login_page(Query(query): Query<NextQuery>) -> Html<String> {
    pages::login_page(None, safe_next(query.next.as_deref()))
}

/// POST /auth/login/
pub async fn login_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let next = safe_next(form.next.as_deref()).to_string();

    match login_user(&state, &form.username, &form.password) {
        Ok((_, token)) => Ok((jar.add(session_cookie(token)), Redirect::to(&next)).into_response()),
        Err(ApiError::InternalError(msg)) => Err(ApiError::InternalError(msg)),
        Err(ApiError::BadRequest(msg)) => Ok(pages::login_page(Some(&msg), &next).into_response()),
        Err(_) => Ok(pages::login_page(Some(INVALID_CREDENTIALS), &next).into_response()),
    }
}

/// GET /auth/register/
pub async fn register_page() -> Html<String> {
    pages::register_page(None, "")
}

/// POST /auth/register/
pub async fn register_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterRequest>,
) -> ApiResult<Response> {
    let user = match register_user(&state, &form) {
        Ok(user) => user,
        Err(ApiError::BadRequest(msg)) => {
            return Ok(pages::register_page(Some(&msg), form.username.trim()).into_response())
        }
        Err(err) => return Err(err),
    };

    let token = state.session_manager.create_session(user.id)?;
    Ok((jar.add(session_cookie(token)), Redirect::to("/")).into_response())
}

/// POST /auth/logout/
pub async fn logout_form(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.session_manager.delete_session(cookie.value())?;
    }

    Ok((jar.remove(expired_session_cookie()), Redirect::to("/auth/login/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/planner/")), "/planner/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
