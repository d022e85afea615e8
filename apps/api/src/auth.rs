//! API-key guard applied to every route.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects the request with 401 unless `x-api-key` matches the configured secret.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == state.config.api_key => Ok(next.run(request).await),
        _ => {
            warn!(
                "Rejected {} {}: invalid or missing API key",
                request.method(),
                request.uri().path()
            );
            Err(AppError::Unauthorized)
        }
    }
}
