use crate::app::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

pub(super) async fn health_handler(State(state): State<AppState>) -> Response {
    let uptime = (chrono::Local::now() - state.started_at).num_seconds();
    Json(serde_json::json!({
        "status": "running",
        "version": crate::version::get_short_version(),
        "provider": state.synthesis.provider().to_string(),
        "uptime": uptime,
    }))
    .into_response()
}
