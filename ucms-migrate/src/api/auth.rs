//! Admin authorization middleware
//!
//! Applied to `/admin/*` only. With no admin token configured every request
//! passes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;
use ucms_common::api::verify_admin_token;

use crate::error::ApiError;
use crate::AppState;

/// Reject requests without a valid `Authorization: Bearer <token>`
pub async fn admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = verify_admin_token(header, expected) {
        warn!(path = %request.uri().path(), reason = %e, "Admin request rejected");
        return Err(ApiError::Unauthorized(e.to_string()));
    }

    Ok(next.run(request).await)
}
