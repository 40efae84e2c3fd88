use crate::app::{self, AppStateBuilder};
use crate::config::Config;
use crate::synthesis::{SynthesisClient, SynthesisOption, SynthesisResult, SynthesisType};
use async_trait::async_trait;
use mockall::mock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

mod tts_test;

mock! {
    pub Engine {}

    #[async_trait]
    impl SynthesisClient for Engine {
        fn provider(&self) -> SynthesisType;
        async fn synthesize(&self, text: &str, option: &SynthesisOption) -> SynthesisResult<Vec<u8>>;
    }
}

fn engine() -> MockEngine {
    let mut engine = MockEngine::new();
    engine.expect_provider().return_const(SynthesisType::Google);
    engine
}

/// Answers after `delay`, used to drive the synthesis timeout.
struct SlowEngine {
    delay: Duration,
}

#[async_trait]
impl SynthesisClient for SlowEngine {
    fn provider(&self) -> SynthesisType {
        SynthesisType::Google
    }

    async fn synthesize(&self, text: &str, _option: &SynthesisOption) -> SynthesisResult<Vec<u8>> {
        tokio::time::sleep(self.delay).await;
        Ok(text.as_bytes().to_vec())
    }
}

struct TestServer {
    base_url: String,
    token: CancellationToken,
    artifact_dir: tempfile::TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Directory the server writes artifacts to, created on the first request.
    fn artifact_path(&self) -> PathBuf {
        self.artifact_dir.path().join("artifacts")
    }

    /// Waits for the server to drop every response body it produced.
    async fn assert_no_artifacts(&self) {
        let path = self.artifact_path();
        for _ in 0..50 {
            let count = match std::fs::read_dir(&path) {
                Ok(entries) => entries.count(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
                Err(e) => panic!("read {}: {}", path.display(), e),
            };
            if count == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("artifacts left in {}", path.display());
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn start_server(client: Arc<dyn SynthesisClient>, mut config: Config) -> TestServer {
    let artifact_dir = tempfile::tempdir().unwrap();
    config.artifact_dir = artifact_dir
        .path()
        .join("artifacts")
        .to_string_lossy()
        .to_string();

    let token = CancellationToken::new();
    let state = AppStateBuilder::new()
        .config(config)
        .synthesis(client)
        .with_token(token.clone())
        .build()
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(app::serve(listener, state));

    TestServer {
        base_url: format!("http://{}", addr),
        token,
        artifact_dir,
    }
}
