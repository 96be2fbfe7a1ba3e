use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// The caller's opaque user id, as injected by the authentication layer in
/// front of this service via the `X-User-Id` header. This extractor is the
/// only place that header is read.
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser(user_id.to_string()))
    }
}
