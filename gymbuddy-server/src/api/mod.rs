pub mod auth;
pub mod community;
pub mod error;
pub mod exercises;
pub mod pages;
pub mod planner;
pub mod profile;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

pub use error::{ApiError, ApiResult};

/// JSON body extractor whose rejections use the API error shape
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!("Rejected JSON body: {}", rejection.body_text());
                Err(ApiError::BadRequest("Invalid JSON data.".to_string()))
            }
        }
    }
}

/// Parse a numeric path id
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", what)))
}
