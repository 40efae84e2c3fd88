use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc, time::Duration};
use tracing::debug;

mod google;
mod remote;
pub mod tokenizer;
pub use google::GoogleTtsClient;
pub use remote::RemoteTtsClient;


#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisType {
    /// Google Translate speech endpoint
    #[default]
    Google,
    /// Another tts-service instance reached over HTTP
    Remote,
}

impl fmt::Display for SynthesisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisType::Google => write!(f, "google"),
            SynthesisType::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SynthesisOption {
    pub provider: SynthesisType,
    pub lang: String,
    /// Top level domain of the Google Translate host, e.g. `com` or `co.uk`
    pub tld: String,
    pub slow: bool,
    /// Base URL overriding the provider's default host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SynthesisOption {
    fn default() -> Self {
        Self {
            provider: SynthesisType::Google,
            lang: "en".to_string(),
            tld: "com".to_string(),
            slow: false,
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

impl SynthesisOption {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A zero timeout would fail every call before the engine is reached.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "synthesis `timeout_secs` must be at least 1"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("No text to speak")]
    NoText,
    #[error("No text to send to TTS API")]
    NoTokens,
    #[error("{status} from TTS API. Probable cause: {cause}")]
    Upstream { status: StatusCode, cause: String },
    #[error("Unable to find audio data in TTS API response")]
    MissingAudio,
    #[error("No audio data received from TTS service")]
    EmptyAudio,
    #[error("remote synthesis requires an endpoint")]
    MissingEndpoint,
    #[error("Failed to connect to TTS API: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid audio payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("speech synthesis timed out after {0:?}")]
    Timeout(Duration),
}

pub type SynthesisResult<T> = std::result::Result<T, SynthesisError>;

#[async_trait]
pub trait SynthesisClient: Send + Sync {
    fn provider(&self) -> SynthesisType;
    /// Returns the complete MP3 encoding of `text`.
    async fn synthesize(&self, text: &str, option: &SynthesisOption) -> SynthesisResult<Vec<u8>>;
}

pub fn create_client(
    option: &SynthesisOption,
    http_client: HttpClient,
) -> anyhow::Result<Arc<dyn SynthesisClient>> {
    option.validate()?;
    match option.provider {
        SynthesisType::Google => Ok(Arc::new(GoogleTtsClient::new(http_client))),
        SynthesisType::Remote => {
            if option.endpoint.is_none() {
                return Err(anyhow::anyhow!(
                    "synthesis provider `remote` needs `endpoint` to be set"
                ));
            }
            Ok(Arc::new(RemoteTtsClient::new(http_client)))
        }
    }
}

/// Runs one synthesis call bounded by `option.timeout()`.
pub async fn synthesize_with_timeout(
    client: &dyn SynthesisClient,
    text: &str,
    option: &SynthesisOption,
) -> SynthesisResult<Vec<u8>> {
    let timeout = option.timeout();
    let started_at = std::time::Instant::now();
    let result = match tokio::time::timeout(timeout, client.synthesize(text, option)).await {
        Ok(result) => result,
        Err(_) => Err(SynthesisError::Timeout(timeout)),
    };
    debug!(
        provider = %client.provider(),
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        ok = result.is_ok(),
        "synthesis finished"
    );
    result
}
