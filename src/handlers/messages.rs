//! Message sending handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::{ErrorBody, SendMessageRequest, SendMessageResponse};
use crate::server::AppState;

/// POST /send-message
///
/// A bare phone number gets the configured chat suffix appended before the
/// send is delegated to the session client.
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let (number, message) = match (req.number.as_deref(), req.message.as_deref()) {
        (Some(number), Some(message)) if !number.is_empty() && !message.is_empty() => {
            (number, message)
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Number and message required")),
            )
                .into_response();
        }
    };

    let chat_id = if number.contains(&state.chat_suffix) {
        number.to_string()
    } else {
        format!("{number}{}", state.chat_suffix)
    };

    match state.client.send_text(&chat_id, message).await {
        Ok(sent) => (
            StatusCode::OK,
            Json(SendMessageResponse {
                success: true,
                message_id: sent.message_id,
                message: "Message sent successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(chat_id = %chat_id, error = %e, "Failed to send message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::with_details("Failed to send message", e.to_string())),
            )
                .into_response()
        }
    }
}
