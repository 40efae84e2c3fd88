use super::*;
use crate::handler::ErrorBody;
use crate::synthesis::SynthesisError;
use anyhow::Result;
use futures::future::join_all;
use reqwest::{header, StatusCode};

#[tokio::test]
async fn test_generate_tts_success() -> Result<()> {
    let mut engine = engine();
    engine
        .expect_synthesize()
        .withf(|text, option| text == "Hello world" && option.lang == "en")
        .times(1)
        .returning(|_, _| Ok(b"ID3\x04\x00hello-world".to_vec()));
    let server = start_server(Arc::new(engine), Config::default()).await;

    let response = reqwest::Client::new()
        .post(server.url("/generate-tts"))
        .json(&serde_json::json!({ "text": "Hello world" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"tts_output.mp3\""
    );
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "16");
    assert_eq!(response.bytes().await?.as_ref(), b"ID3\x04\x00hello-world");

    server.assert_no_artifacts().await;
    Ok(())
}

#[tokio::test]
async fn test_missing_text_is_rejected() -> Result<()> {
    let mut engine = engine();
    engine.expect_synthesize().never();
    let server = start_server(Arc::new(engine), Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/generate-tts"))
        .json(&serde_json::json!({ "message": "Hello world" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await?;
    assert!(body.detail.contains("text"));

    let response = client
        .post(server.url("/generate-tts"))
        .json(&serde_json::json!({ "text": 42 }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post(server.url("/generate-tts"))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{\"text\": ")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await?;
    assert!(!body.detail.is_empty());

    let response = client
        .post(server.url("/generate-tts"))
        .body("{\"text\": \"Hello world\"}")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await?;
    assert!(body.detail.contains("Content-Type"));
    Ok(())
}

#[tokio::test]
async fn test_engine_error_is_internal_error() -> Result<()> {
    let mut engine = engine();
    engine.expect_synthesize().times(1).returning(|_, _| {
        Err(SynthesisError::Upstream {
            status: StatusCode::FORBIDDEN,
            cause: "Bad token or upstream API changes".to_string(),
        })
    });
    let server = start_server(Arc::new(engine), Config::default()).await;

    let response = reqwest::Client::new()
        .post(server.url("/generate-tts"))
        .json(&serde_json::json!({ "text": "Hello world" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = response.json().await?;
    assert_eq!(
        body.detail,
        "403 Forbidden from TTS API. Probable cause: Bad token or upstream API changes"
    );
    server.assert_no_artifacts().await;
    Ok(())
}

#[tokio::test]
async fn test_artifact_write_failure_is_internal_error() -> Result<()> {
    let mut engine = engine();
    engine
        .expect_synthesize()
        .times(1)
        .returning(|_, _| Ok(b"ID3audio".to_vec()));
    let server = start_server(Arc::new(engine), Config::default()).await;
    // a regular file where the artifact directory should be
    std::fs::write(server.artifact_path(), b"not a directory")?;

    let response = reqwest::Client::new()
        .post(server.url("/generate-tts"))
        .json(&serde_json::json!({ "text": "Hello world" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = response.json().await?;
    assert!(!body.detail.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_synthesis_timeout() -> Result<()> {
    let mut config = Config::default();
    config.synthesis.timeout_secs = 1;
    let engine = SlowEngine {
        delay: Duration::from_secs(5),
    };
    let server = start_server(Arc::new(engine), config).await;

    let response = reqwest::Client::new()
        .post(server.url("/generate-tts"))
        .json(&serde_json::json!({ "text": "Hello world" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: ErrorBody = response.json().await?;
    assert_eq!(body.detail, "speech synthesis timed out after 1s");
    Ok(())
}

#[tokio::test]
async fn test_text_too_long() -> Result<()> {
    let mut config = Config::default();
    config.max_text_length = 10;
    let mut engine = engine();
    engine.expect_synthesize().never();
    let server = start_server(Arc::new(engine), config).await;

    let response = reqwest::Client::new()
        .post(server.url("/generate-tts"))
        .json(&serde_json::json!({ "text": "eleven char" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await?;
    assert_eq!(body.detail, "text exceeds maximum length of 10 characters");
    Ok(())
}

#[tokio::test]
async fn test_sequential_requests_return_own_audio() -> Result<()> {
    let mut engine = engine();
    engine
        .expect_synthesize()
        .times(2)
        .returning(|text, _| Ok(format!("mp3:{}", text).into_bytes()));
    let server = start_server(Arc::new(engine), Config::default()).await;
    let client = reqwest::Client::new();

    for text in ["first request", "second request"] {
        let response = client
            .post(server.url("/generate-tts"))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.bytes().await?, format!("mp3:{}", text).as_bytes());
    }

    server.assert_no_artifacts().await;
    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests_return_own_audio() -> Result<()> {
    let engine = SlowEngine {
        delay: Duration::from_millis(50),
    };
    let server = start_server(Arc::new(engine), Config::default()).await;
    let client = reqwest::Client::new();

    let requests = (0..16).map(|i| {
        let client = client.clone();
        let url = server.url("/generate-tts");
        async move {
            let text = format!("concurrent request number {}", i);
            let response = client
                .post(url)
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((text, status, body))
        }
    });

    for result in join_all(requests).await {
        let (text, status, body) = result?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, text.as_bytes());
    }

    server.assert_no_artifacts().await;
    Ok(())
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let server = start_server(Arc::new(engine()), Config::default()).await;

    let health: serde_json::Value = reqwest::get(server.url("/health")).await?.json().await?;
    assert_eq!(health["status"], "running");
    assert_eq!(health["provider"], "google");
    assert!(health["uptime"].as_i64().unwrap() >= 0);
    Ok(())
}
