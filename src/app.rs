use crate::config::Config;
use crate::handler::middleware::request_log::log_requests;
use crate::synthesis::{create_client, SynthesisClient};
use anyhow::Result;
use axum::{middleware, Router};
use chrono::{DateTime, Local};
use reqwest::Client as HttpClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

pub struct AppStateInner {
    pub config: Arc<Config>,
    pub synthesis: Arc<dyn SynthesisClient>,
    pub token: CancellationToken,
    pub started_at: DateTime<Local>,
}

pub type AppState = Arc<AppStateInner>;

#[derive(Default)]
pub struct AppStateBuilder {
    pub config: Option<Config>,
    pub synthesis: Option<Arc<dyn SynthesisClient>>,
    pub token: Option<CancellationToken>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the client that would otherwise be built from `config.synthesis`.
    pub fn synthesis(mut self, client: Arc<dyn SynthesisClient>) -> Self {
        self.synthesis = Some(client);
        self
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn build(self) -> Result<AppState> {
        let config = Arc::new(self.config.unwrap_or_default());
        config.synthesis.validate()?;
        let synthesis = match self.synthesis {
            Some(client) => client,
            None => create_client(&config.synthesis, HttpClient::builder().build()?)?,
        };
        info!(
            provider = %synthesis.provider(),
            lang = config.synthesis.lang.as_str(),
            artifact_dir = config.artifact_dir.as_str(),
            "synthesis configured"
        );

        Ok(Arc::new(AppStateInner {
            config,
            synthesis,
            token: self.token.unwrap_or_default(),
            started_at: Local::now(),
        }))
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::ORIGIN,
        ]);

    let skip_paths = Arc::new(state.config.access_log_skip.clone());
    crate::handler::router()
        .with_state(state)
        .layer(middleware::from_fn_with_state(skip_paths, log_requests))
        .layer(cors)
}

/// Serves the router on an already bound listener until the state's token is
/// cancelled.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let token = state.token.clone();
    let app = create_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(token.cancelled_owned())
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
    info!("Server shut down gracefully");
    Ok(())
}

pub async fn run(state: AppState) -> Result<()> {
    let addr: SocketAddr = state.config.http_addr.parse()?;
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            return Err(anyhow::anyhow!("Failed to bind to {}: {}", addr, e));
        }
    };
    info!("Listening on {}", addr);
    serve(listener, state).await
}
