use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Returns a liveness message naming the service and its port.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": format!(
            "The {} service is healthy, running on port {}!",
            state.config.app_name, state.config.port
        ),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
