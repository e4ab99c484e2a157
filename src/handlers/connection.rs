//! QR and status handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::{ErrorBody, QrResponse, StatusResponse};
use crate::server::AppState;
use crate::state::derive_status;

/// GET /qr
///
/// 404 while no pairing code is pending; the payload is cleared as soon as
/// the session authenticates or disconnects.
pub async fn get_qr(State(state): State<AppState>) -> Response {
    match state.connection.qr().await {
        Some(qr) => (StatusCode::OK, Json(QrResponse { qr })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("QR not available")),
        )
            .into_response(),
    }
}

/// GET /status
///
/// Never fails; a pending QR wins over a reported identity.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let qr = state.connection.qr().await;
    let identity = state.client.info().await;
    let (status, client_info) = derive_status(qr.as_deref(), identity);

    Json(StatusResponse {
        status,
        client_info,
    })
}
