use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client as HttpClient, StatusCode};
use tracing::{debug, warn};

use super::tokenizer::tokenize;
use super::{SynthesisClient, SynthesisError, SynthesisOption, SynthesisResult, SynthesisType};
use async_trait::async_trait;

const BATCH_EXECUTE_PATH: &str = "/_/TranslateWebserverUi/data/batchexecute";
const TTS_RPC: &str = "jQ1olc";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/47.0.2526.106 Safari/537.36";

static AUDIO_PAYLOAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"jQ1olc","\[\\"(.*)\\"]"#).expect("audio payload pattern"));

/// Speech from the Google Translate web endpoint. Each chunk produced by the
/// tokenizer is one `batchexecute` call; the MP3 parts are concatenated.
#[derive(Debug, Clone)]
pub struct GoogleTtsClient {
    http_client: HttpClient,
}

impl GoogleTtsClient {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    fn endpoint_url(option: &SynthesisOption) -> String {
        match option.endpoint {
            Some(ref endpoint) => format!("{}{}", endpoint.trim_end_matches('/'), BATCH_EXECUTE_PATH),
            None => format!("https://translate.google.{}{}", option.tld, BATCH_EXECUTE_PATH),
        }
    }

    async fn synthesize_chunk(
        &self,
        url: &str,
        text: &str,
        option: &SynthesisOption,
    ) -> SynthesisResult<Vec<u8>> {
        let response = self
            .http_client
            .post(url)
            .header(header::REFERER, "http://translate.google.com/")
            .header(header::USER_AGENT, USER_AGENT)
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded;charset=utf-8",
            )
            .body(package_rpc(text, &option.lang, option.slow))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, url, "TTS API rejected request");
            return Err(SynthesisError::Upstream {
                status,
                cause: probable_cause(status, &option.tld).to_string(),
            });
        }

        let body = response.text().await?;
        extract_audio(&body)
    }
}

#[async_trait]
impl SynthesisClient for GoogleTtsClient {
    fn provider(&self) -> SynthesisType {
        SynthesisType::Google
    }

    async fn synthesize(&self, text: &str, option: &SynthesisOption) -> SynthesisResult<Vec<u8>> {
        if text.is_empty() {
            return Err(SynthesisError::NoText);
        }
        let chunks = tokenize(text);
        if chunks.is_empty() {
            return Err(SynthesisError::NoTokens);
        }

        let url = Self::endpoint_url(option);
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let part = self.synthesize_chunk(&url, chunk, option).await?;
            debug!(part = idx, bytes = part.len(), "synthesized chunk");
            audio.extend_from_slice(&part);
        }
        Ok(audio)
    }
}

/// Form body for one `batchexecute` speech call.
pub(crate) fn package_rpc(text: &str, lang: &str, slow: bool) -> String {
    let speed = if slow {
        serde_json::Value::Bool(true)
    } else {
        serde_json::Value::Null
    };
    let parameter = serde_json::json!([text, lang, speed, "null"]).to_string();
    let rpc = serde_json::json!([[[TTS_RPC, parameter, null, "generic"]]]).to_string();
    format!("f.req={}&", urlencoding::encode(&rpc))
}

fn extract_audio(body: &str) -> SynthesisResult<Vec<u8>> {
    let mut audio = Vec::new();
    let mut found = false;
    for line in body.lines().filter(|line| line.contains(TTS_RPC)) {
        let captures = AUDIO_PAYLOAD
            .captures(line)
            .ok_or(SynthesisError::MissingAudio)?;
        audio.extend(BASE64_STANDARD.decode(&captures[1])?);
        found = true;
    }
    if !found {
        return Err(SynthesisError::MissingAudio);
    }
    Ok(audio)
}

fn probable_cause(status: StatusCode, tld: &str) -> String {
    match status.as_u16() {
        403 => "Bad token or upstream API changes".to_string(),
        404 if tld != "com" => format!("Unsupported tld '{}'", tld),
        code if code >= 500 => "Upstream API error. Try again later.".to_string(),
        _ => "Unknown".to_string(),
    }
}
