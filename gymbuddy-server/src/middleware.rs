use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use gymbuddy_types::User;
use uuid::Uuid;

use crate::api::{ApiError, ApiResult};
use crate::db::repositories::UserRepository;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";
pub const SESSION_HEADER: &str = "X-Session-Token";

/// Session token from the `X-Session-Token` header, falling back to the
/// `sessionid` cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|v| !v.is_empty())
}

/// The user behind a valid session
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl AuthUser {
    pub fn id(&self) -> &Uuid {
        &self.user.id
    }

    /// Authors and superusers may edit or delete content
    pub fn can_modify(&self, author_id: &Uuid) -> bool {
        self.user.is_superuser || self.user.id == *author_id
    }
}

/// Resolve the requesting user from the request headers
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<AuthUser> {
    let token = session_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let user_id = state
        .get_authenticated_user_id_from_token(&token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))?;

    let user = UserRepository::new(state.db.pool.clone())
        .get_by_id(&user_id)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))?;

    Ok(AuthUser { user, token })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Already resolved by require_login
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        authenticate(state, &parts.headers)
    }
}

/// Login page URL that returns to `next` afterwards
pub fn login_redirect(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("/auth/login/?next={encoded}")
}

/// Middleware for web pages: anonymous visitors are redirected to the login page
pub async fn require_login(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate(&state, request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(ApiError::InternalError(msg)) => ApiError::InternalError(msg).into_response(),
        Err(_) => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string());
            tracing::debug!("Redirecting anonymous request for {} to login", target);
            Redirect::to(&login_redirect(&target)).into_response()
        }
    }
}
