use crate::{api::AppState, config::database};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::error;

/// Liveness plus a round trip to the store.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match database::ping(state.db()).await {
        Ok(()) => Json(json!({
            "status": "ok",
            "service": "gym-ledger",
            "version": env!("CARGO_PKG_VERSION"),
            "database": "ok",
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "database": "unavailable" })),
            )
                .into_response()
        }
    }
}
