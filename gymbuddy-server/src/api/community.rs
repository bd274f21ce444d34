use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gymbuddy_types::{
    CreateReplyRequest, LikeResponse, Reply, Thread, ThreadDetail, ThreadRequest,
    UpdateReplyRequest,
};

use super::{parse_id, ApiError, ApiResult, JsonBody};
use crate::db::repositories::{ReplyRepository, ThreadRepository};
use crate::middleware::AuthUser;
use crate::state::AppState;

fn thread_not_found() -> ApiError {
    ApiError::NotFound("Thread not found.".to_string())
}

fn reply_not_found() -> ApiError {
    ApiError::NotFound("Reply not found.".to_string())
}

fn success() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "success" }))
}

/// Load a thread the requester is allowed to modify
fn owned_thread(repo: &ThreadRepository, auth: &AuthUser, thread_id: i64) -> ApiResult<Thread> {
    let thread = repo.get(thread_id)?.ok_or_else(thread_not_found)?;
    if !auth.can_modify(&thread.author_id) {
        return Err(ApiError::Forbidden(
            "You do not have permission to modify this thread.".to_string(),
        ));
    }
    Ok(thread)
}

fn owned_reply(repo: &ReplyRepository, auth: &AuthUser, reply_id: i64) -> ApiResult<Reply> {
    let reply = repo.get(reply_id)?.ok_or_else(reply_not_found)?;
    if !auth.can_modify(&reply.author_id) {
        return Err(ApiError::Forbidden(
            "You do not have permission to modify this reply.".to_string(),
        ));
    }
    Ok(reply)
}

/// GET /community/api/threads/
pub async fn list_threads(State(state): State<AppState>) -> ApiResult<Json<Vec<Thread>>> {
    let repo = ThreadRepository::new(state.db.pool.clone());
    Ok(Json(repo.list()?))
}

/// POST /community/create_ajax/
pub async fn create_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<ThreadRequest>,
) -> ApiResult<(StatusCode, Json<Thread>)> {
    let (title, content) = payload.validate()?;

    let repo = ThreadRepository::new(state.db.pool.clone());
    let thread = repo.create(auth.id(), &title, &content)?;

    tracing::info!("User {} started thread {}", auth.user.username, thread.id);
    Ok((StatusCode::CREATED, Json(thread)))
}

/// GET /community/api/thread/:id/
pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadDetail>> {
    let thread_id = parse_id(&thread_id, "thread")?;

    let thread = ThreadRepository::new(state.db.pool.clone())
        .get(thread_id)?
        .ok_or_else(thread_not_found)?;
    let replies = ReplyRepository::new(state.db.pool.clone()).list_tree(thread_id)?;

    Ok(Json(ThreadDetail { thread, replies }))
}

/// POST /community/edit/:id/
pub async fn update_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(thread_id): Path<String>,
    JsonBody(payload): JsonBody<ThreadRequest>,
) -> ApiResult<Json<Thread>> {
    let thread_id = parse_id(&thread_id, "thread")?;

    let repo = ThreadRepository::new(state.db.pool.clone());
    owned_thread(&repo, &auth, thread_id)?;

    let (title, content) = payload.validate()?;
    let thread = repo
        .update(thread_id, &title, &content)?
        .ok_or_else(thread_not_found)?;
    Ok(Json(thread))
}

/// POST /community/delete/:id/
pub async fn delete_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let thread_id = parse_id(&thread_id, "thread")?;

    let repo = ThreadRepository::new(state.db.pool.clone());
    owned_thread(&repo, &auth, thread_id)?;

    if !repo.delete(thread_id)? {
        return Err(thread_not_found());
    }
    tracing::info!("User {} deleted thread {}", auth.user.username, thread_id);
    Ok(success())
}

/// POST /community/thread/:id/reply/
pub async fn create_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(thread_id): Path<String>,
    JsonBody(payload): JsonBody<CreateReplyRequest>,
) -> ApiResult<(StatusCode, Json<Reply>)> {
    let thread_id = parse_id(&thread_id, "thread")?;
    let content = payload.validate()?;

    if ThreadRepository::new(state.db.pool.clone())
        .get(thread_id)?
        .is_none()
    {
        return Err(thread_not_found());
    }

    let replies = ReplyRepository::new(state.db.pool.clone());
    if let Some(parent_id) = payload.parent_id {
        let parent = replies
            .get(parent_id)?
            .ok_or_else(|| ApiError::NotFound("Parent reply not found.".to_string()))?;
        if parent.thread_id != thread_id {
            tracing::warn!(
                "Reply to thread {} has parent {} from thread {}",
                thread_id,
                parent_id,
                parent.thread_id
            );
        }
    }

    let reply = replies.create(thread_id, auth.id(), payload.parent_id, &content)?;
    Ok((StatusCode::CREATED, Json(reply)))
}

/// POST /community/reply/:id/edit/
pub async fn update_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reply_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateReplyRequest>,
) -> ApiResult<Json<Reply>> {
    let reply_id = parse_id(&reply_id, "reply")?;

    let repo = ReplyRepository::new(state.db.pool.clone());
    owned_reply(&repo, &auth, reply_id)?;

    let content = payload.validate()?;
    let reply = repo.update(reply_id, &content)?.ok_or_else(reply_not_found)?;
    Ok(Json(reply))
}

/// POST /community/reply/:id/delete/
pub async fn delete_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reply_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let reply_id = parse_id(&reply_id, "reply")?;

    let repo = ReplyRepository::new(state.db.pool.clone());
    owned_reply(&repo, &auth, reply_id)?;

    if !repo.delete(reply_id)? {
        return Err(reply_not_found());
    }
    Ok(success())
}

/// POST /community/thread/:id/like/
pub async fn like_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<LikeResponse>> {
    let thread_id = parse_id(&thread_id, "thread")?;

    let repo = ThreadRepository::new(state.db.pool.clone());
    if repo.get(thread_id)?.is_none() {
        return Err(thread_not_found());
    }
    Ok(Json(repo.toggle_like(thread_id, auth.id())?))
}

/// POST /community/reply/:id/like/
pub async fn like_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reply_id): Path<String>,
) -> ApiResult<Json<LikeResponse>> {
    let reply_id = parse_id(&reply_id, "reply")?;

    let repo = ReplyRepository::new(state.db.pool.clone());
    if repo.get(reply_id)?.is_none() {
        return Err(reply_not_found());
    }
    Ok(Json(repo.toggle_like(reply_id, auth.id())?))
}
