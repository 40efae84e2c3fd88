use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header::CONTENT_LENGTH, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tracing::info;

const FORWARDED_HEADERS: [&str; 4] = [
    "x-client-ip",
    "x-forwarded-for",
    "x-real-ip",
    "cf-connecting-ip",
];

/// Best known address of the caller: the first proxy header that parses as an
/// ip, then the socket peer, then `-`.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    for name in FORWARDED_HEADERS {
        let candidate = headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .and_then(|ip| ip.parse::<std::net::IpAddr>().ok());
        if let Some(ip) = candidate {
            return ip.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn should_skip_logging(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        if let Some(prefix) = pattern.strip_suffix('*') {
            path.starts_with(prefix)
        } else {
            path == pattern
        }
    })
}

/// Logs basic request metadata once the downstream handler returns.
pub async fn log_requests(
    State(skip_paths): State<Arc<Vec<String>>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let started_at = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().to_string();
    let request_path = req.uri().path().to_string();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client_ip = client_ip(req.headers(), peer);

    let response = next.run(req).await;

    if !should_skip_logging(&request_path, skip_paths.as_slice()) {
        let body_len = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        info!(
            target: "http.access",
            method = method.as_str(),
            status = response.status().as_u16(),
            body_len,
            cost_ms = started_at.elapsed().as_secs_f64() * 1_000.0,
            uri = uri.as_str(),
            client_ip = client_ip.as_str(),
        );
    }

    response
}
