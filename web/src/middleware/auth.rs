use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

use crate::AppState;

/// API-key middleware that returns 401 Unauthorized when the `x-api-key`
/// header does not match the configured metrics key.
///
/// When no key is configured the check is skipped, which keeps local
/// development and test setups working without extra configuration.
pub async fn require_api_key(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected_key) = app_state.config.metrics_api_key() else {
        return next.run(request).await;
    };

    let provided_key = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided_key == expected_key {
        next.run(request).await
    } else {
        warn!("Rejected metrics request with missing or invalid API key");
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}
