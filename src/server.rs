use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::client::SessionClient;
use crate::handlers;
use crate::state::ConnectionState;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub connection: ConnectionState,
    pub client: Arc<dyn SessionClient>,
    /// Shared secret for the data endpoints; `None` disables the gate.
    pub api_key: Option<String>,
    /// Suffix appended to bare phone numbers before delivery.
    pub chat_suffix: String,
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState) -> Router {
    // Data routes - each sits behind the shared-secret gate
    let api = Router::new()
        .route("/qr", get(handlers::get_qr))
        .route("/status", get(handlers::get_status))
        .route("/send-message", post(handlers::send_message))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::require_api_key,
        ))
        .with_state(state);

    // Landing page is intentionally public
    Router::new()
        .route("/", get(handlers::landing))
        .merge(api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
