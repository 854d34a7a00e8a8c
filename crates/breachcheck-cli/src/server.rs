//! Offline proxy server using Axum.
//!
//! Sits in front of the site origin the way a service worker sits in front
//! of the page: GETs are answered by the [`OfflineCache`], everything else is
//! forwarded to the origin untouched.

use anyhow::Context;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use breachcheck_core::network::resolve_under;
use breachcheck_core::{BreachError, Intercept, OfflineCache, Served, ServedFrom};
use bytes::Bytes;
use reqwest::Url;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Reserved path for the proxy's own health report.
pub const HEALTH_PATH: &str = "/__breachcheck/health";

/// Response header telling where a GET was answered from.
pub const SOURCE_HEADER: &str = "x-breachcheck-source";

/// Requests handled at once before new ones wait.
const MAX_IN_FLIGHT: usize = 64;

/// Headers that describe one connection and must not be relayed.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::HOST,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Application state shared across handlers.
pub struct ProxyState {
    cache: OfflineCache,
    /// Client for pass-through requests.
    forward: reqwest::Client,
    origin: Url,
}

impl ProxyState {
    pub fn new(cache: OfflineCache, forward: reqwest::Client, origin: &str) -> anyhow::Result<Self> {
        let mut origin =
            Url::parse(origin).with_context(|| format!("Invalid origin '{}'", origin))?;
        if !origin.path().ends_with('/') {
            let path = format!("{}/", origin.path());
            origin.set_path(&path);
        }
        Ok(Self {
            cache,
            forward,
            origin,
        })
    }
}

/// Start the offline proxy.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(state: ProxyState, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route(HEALTH_PATH, get(handle_health))
        .fallback(handle_request)
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Offline proxy listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("Offline proxy stopped: {}", e);
        }
    });

    Ok(actual_addr)
}

async fn handle_health(State(state): State<Arc<ProxyState>>) -> Response {
    match state.cache.status() {
        Ok(status) => Json(json!({
            "status": "ok",
            "origin": state.origin.as_str(),
            "current_version": status.current.as_ref().map(|m| m.version.clone()),
            "cache": status,
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn handle_request(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    match state.cache.handle(&method, path).await {
        Ok(Intercept::Served(served)) => served_response(served),
        Ok(Intercept::PassThrough) => forward(&state, method, path, headers, body).await,
        Err(e) => {
            debug!("{} {} failed: {}", method, uri.path(), e);
            error_response(&e)
        }
    }
}

fn served_response(served: Served) -> Response {
    // Dropping the refresh handle detaches it; the refresh still completes.
    let Served { asset, from, .. } = served;
    let source = match from {
        ServedFrom::Cache => "cache",
        ServedFrom::Network => "network",
    };

    let mut builder = Response::builder()
        .status(StatusCode::from_u16(asset.status).unwrap_or(StatusCode::OK))
        .header(SOURCE_HEADER, source);
    if let Some(content_type) = &asset.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
    }

    match builder.body(Body::from(asset.body)) {
        Ok(response) => response,
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn forward(
    state: &ProxyState,
    method: Method,
    path: &str,
    mut headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = match resolve_under(&state.origin, path.trim_start_matches('/')) {
        Ok(url) => url,
        Err(e) => {
            warn!("Refusing to forward {}: {}", method, e);
            return error_response(&e);
        }
    };
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }

    debug!("Forwarding {} {}", method, url.path());
    let upstream = match state
        .forward
        .request(method, url)
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(upstream) => upstream,
        Err(e) => {
            warn!("Pass-through to origin failed: {}", e);
            return error_response(&BreachError::unavailable(path, e));
        }
    };

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    for name in &HOP_BY_HOP {
        response_headers.remove(name);
    }

    match upstream.bytes().await {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            *response.headers_mut() = response_headers;
            response
        }
        Err(e) => error_response(&BreachError::from(e)),
    }
}

/// Map a library error onto the proxy's reply; unavailable resources are 504.
fn error_response(err: &BreachError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
