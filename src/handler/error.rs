use super::ErrorBody;
use crate::synthesis::SynthesisError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Rejected(#[from] JsonRejection),
    #[error("text exceeds maximum length of {0} characters")]
    TextTooLong(usize),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Artifact(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(_) | ApiError::TextTooLong(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Synthesis(SynthesisError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Synthesis(_) | ApiError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if status.is_server_error() {
            error!(%status, detail = %detail, "speech request failed");
        } else {
            warn!(%status, detail = %detail, "speech request rejected");
        }
        (status, Json(ErrorBody { detail })).into_response()
    }
}
