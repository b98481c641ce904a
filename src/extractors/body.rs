//! Request-body extractor that keeps rejections inside the JSON error
//! envelope.

use crate::error::AppError;
use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde_json::Value;

/// Like `Json<Value>`, but malformed bodies and missing content types become
/// `AppError::BadRequest`, so every response carries the `{"error": ...}`
/// envelope with `Content-Type: application/json`.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}
