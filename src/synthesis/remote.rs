use async_trait::async_trait;
use reqwest::{header, Client as HttpClient};
use serde::Deserialize;
use tracing::warn;

use super::{SynthesisClient, SynthesisError, SynthesisOption, SynthesisResult, SynthesisType};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Delegates synthesis to the `/generate-tts` route of another tts-service.
#[derive(Debug, Clone)]
pub struct RemoteTtsClient {
    http_client: HttpClient,
}

impl RemoteTtsClient {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl SynthesisClient for RemoteTtsClient {
    fn provider(&self) -> SynthesisType {
        SynthesisType::Remote
    }

    async fn synthesize(&self, text: &str, option: &SynthesisOption) -> SynthesisResult<Vec<u8>> {
        let endpoint = option
            .endpoint
            .as_deref()
            .ok_or(SynthesisError::MissingEndpoint)?;
        let url = format!("{}/generate-tts", endpoint.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .header(header::USER_AGENT, crate::version::get_useragent())
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let cause = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody {
                    detail: serde_json::Value::String(detail),
                }) => detail,
                Ok(ErrorBody { detail }) => detail.to_string(),
                Err(_) => body,
            };
            warn!(%status, url = %url, cause = %cause, "remote tts-service failed");
            return Err(SynthesisError::Upstream { status, cause });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }
        Ok(audio.to_vec())
    }
}
