use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

mod error;
mod health;
pub mod middleware;
#[cfg(test)]
mod tests;
mod tts;

pub use error::ApiError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TtsRequest {
    pub text: String,
}

/// JSON body of every non-success response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-tts", post(tts::generate_tts))
        .route("/health", get(health::health_handler))
}
