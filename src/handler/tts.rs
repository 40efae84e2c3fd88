use super::{ApiError, TtsRequest};
use crate::app::AppState;
use crate::artifact::{Artifact, ARTIFACT_DISPOSITION};
use crate::synthesis::synthesize_with_timeout;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::path::Path;
use tracing::info;

/// `POST /generate-tts`: synthesize `text` and answer with the MP3 bytes.
pub(super) async fn generate_tts(
    State(state): State<AppState>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    let max_text_length = state.config.max_text_length;
    if request.text.chars().count() > max_text_length {
        return Err(ApiError::TextTooLong(max_text_length));
    }

    info!(text = %request.text, "generating speech");
    let audio = synthesize_with_timeout(
        state.synthesis.as_ref(),
        &request.text,
        &state.config.synthesis,
    )
    .await?;

    let artifact = Artifact::create(Path::new(&state.config.artifact_dir), &audio).await?;
    let (len, stream) = artifact.into_stream().await?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg")),
            (header::CONTENT_LENGTH, HeaderValue::from(len)),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static(ARTIFACT_DISPOSITION),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
