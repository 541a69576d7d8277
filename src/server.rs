// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Relay server
//!
//! Accepts plain HTTP on a local address, rewrites each request onto the
//! upstream base URL and runs it through the [`Interceptor`].
//!
//! ## Endpoints
//! - `GET /__haavi/stats` - relay counters as JSON
//! - everything else - relayed upstream
//!
//! The bootstrap path is matched against the inbound path, before the
//! upstream base path is prepended.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request as ServerRequest, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response as ServerResponse};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::http::headers::{CONNECTION, HOP_BY_HOP, HOST};
use crate::http::{Request, Response};
use crate::network::Interceptor;

/// Path serving the relay counters
///
/// Answered by the relay itself, so an upstream resource at the same path
/// is not reachable through it.
pub const STATS_PATH: &str = "/__haavi/stats";

/// Largest inbound request body buffered for relaying
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

struct RelayState {
    upstream: Url,
    interceptor: Interceptor,
    max_body_bytes: usize,
}

/// HTTP front end routing inbound requests into the interceptor
pub struct RelayServer {
    addr: SocketAddr,
    state: Arc<RelayState>,
}

impl RelayServer {
    /// Create a server relaying to `upstream`
    pub fn new(addr: SocketAddr, upstream: Url, interceptor: Interceptor) -> Result<Self> {
        if upstream.cannot_be_a_base() || !matches!(upstream.scheme(), "http" | "https") {
            return Err(Error::config(format!("Unsupported upstream URL: {}", upstream)));
        }

        Ok(Self {
            addr,
            state: Arc::new(RelayState {
                upstream,
                interceptor,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            }),
        })
    }

    /// Build the router
    pub fn router(&self) -> Router {
        Router::new()
            .route(STATS_PATH, get(stats_handler))
            .fallback(relay_handler)
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until the process stops
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = self.router();

        info!(
            addr = %listener.local_addr()?,
            upstream = %self.state.upstream,
            "Relay listening"
        );

        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn stats_handler(State(state): State<Arc<RelayState>>) -> ServerResponse {
    Json(state.interceptor.stats()).into_response()
}

async fn relay_handler(State(state): State<Arc<RelayState>>, req: ServerRequest) -> ServerResponse {
    let (parts, body) = req.into_parts();

    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Rejected inbound body");
            return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response();
        }
    };

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(HOST);

    let url = upstream_url(&state.upstream, &parts.uri);
    let mut request = Request::from_url(parts.method, url).headers(headers);
    if !body.is_empty() {
        request = request.body(body);
    }

    match state
        .interceptor
        .intercept_inbound(parts.uri.path(), request)
        .await
    {
        Ok(response) => into_server_response(response),
        Err(e) => (StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
    }
}

fn into_server_response(response: Response) -> ServerResponse {
    let mut headers = response.headers;
    strip_hop_by_hop(&mut headers);

    let mut out = ServerResponse::new(Body::from(response.body));
    *out.status_mut() = response.status;
    *out.headers_mut() = headers;
    out
}

/// Map an inbound URI onto the upstream base, keeping path and query
fn upstream_url(base: &Url, uri: &Uri) -> Url {
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{}{}", prefix, uri.path()));
    url.set_query(uri.query());
    url
}

/// Drop connection-scoped headers, including any named by `Connection`
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    for name in listed {
        headers.remove(name.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ObserverHub;
    use axum::http::HeaderValue;

    #[test]
    fn test_upstream_url() {
        let base = Url::parse("http://upstream.test:9000").unwrap();
        let uri: Uri = "/api/data?x=1&y=2".parse().unwrap();
        assert_eq!(
            upstream_url(&base, &uri).as_str(),
            "http://upstream.test:9000/api/data?x=1&y=2"
        );
    }

    #[test]
    fn test_upstream_url_with_prefix() {
        let base = Url::parse("https://upstream.test/v1/").unwrap();
        let uri: Uri = "/users".parse().unwrap();
        assert_eq!(
            upstream_url(&base, &uri).as_str(),
            "https://upstream.test/v1/users"
        );
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive, X-Session"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("x-session", HeaderValue::from_static("abc"));
        headers.insert("accept", HeaderValue::from_static("*/*"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("accept").unwrap(), "*/*");
    }

    #[test]
    fn test_rejects_non_http_upstream() {
        let interceptor = Interceptor::from_config(
            &crate::config::RelayConfig::default(),
            Arc::new(ObserverHub::new()),
        )
        .unwrap();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let result = RelayServer::new(addr, Url::parse("mailto:a@b.test").unwrap(), interceptor);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
