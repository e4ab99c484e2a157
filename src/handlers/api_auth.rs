//! Shared-secret authentication for the data endpoints.
//!
//! Behavior:
//! - Key configured: requires a matching `x-api-key` header
//! - Key not configured: every request is admitted

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::ErrorBody;
use crate::server::AppState;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware that guards `/qr`, `/status`, and `/send-message`.
///
/// The comparison is plain string equality, not constant-time.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = &state.api_key else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided == Some(expected.as_str()) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Unauthorized - Invalid API Key")),
        )
            .into_response()
    }
}
