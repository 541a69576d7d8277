// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::io::Write;
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use haavi::network::{CallbackObserver, ChannelObserver, Interceptor, ObserverHub};
use haavi::{Error, RelayConfig, RelayServer, Request};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn interceptor(hub: Arc<ObserverHub>) -> Interceptor {
    Interceptor::from_config(&RelayConfig::default(), hub).unwrap()
}

#[tokio::test]
async fn test_json_body_preview_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n{\"d\":4}",
                "application/json",
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let hub = Arc::new(ObserverHub::new());
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);

    let response = interceptor(hub)
        .intercept(Request::get(format!("{}/api/data", server.uri())).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text().unwrap(), "{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n{\"d\":4}");

    let message = messages.recv().await.unwrap();
    let exchange = message.exchange();
    assert_eq!(exchange.status, 200);
    assert_eq!(exchange.content_type, "application/json");
    assert_eq!(
        exchange.body_preview.as_deref(),
        Some("{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n... (truncated)")
    );
}

#[tokio::test]
async fn test_binary_body_returned_intact() {
    let png: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png.clone(), "image/png"))
        .mount(&server)
        .await;

    let hub = Arc::new(ObserverHub::new());
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);

    let response = interceptor(hub)
        .intercept(Request::get(format!("{}/logo.png", server.uri())).unwrap())
        .await
        .unwrap();

    assert_eq!(response.body.as_ref(), png.as_slice());
    assert_eq!(
        messages.recv().await.unwrap().exchange().body_preview.as_deref(),
        Some("[Binary content: image/png]")
    );
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
        .mount(&server)
        .await;

    let hub = Arc::new(ObserverHub::new());
    let response = interceptor(hub)
        .intercept(Request::get(format!("{}/old", server.uri())).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), Some("/new"));
}

#[tokio::test]
async fn test_connection_refused_is_propagated() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let hub = Arc::new(ObserverHub::new());
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);

    let err = interceptor(hub)
        .intercept(Request::get(format!("http://{}/api", addr)).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));

    let message = messages.recv().await.unwrap();
    let exchange = message.exchange();
    assert_eq!(exchange.status, 0);
    assert_eq!(exchange.status_text, "Network Error");
    assert_eq!(
        exchange.body_preview.as_deref(),
        Some(format!("[Fetch failed: {}]", err).as_str())
    );
}

#[tokio::test]
async fn test_failing_observer_isolated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
        .mount(&server)
        .await;

    let hub = Arc::new(ObserverHub::new());
    hub.register(CallbackObserver::new(|_| Err(Error::observer("detached"))));
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);

    let interceptor = interceptor(hub);
    let response = interceptor
        .intercept(Request::get(server.uri()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.text().unwrap(), "fine");
    assert!(messages.recv().await.is_some());
    assert_eq!(interceptor.stats().delivery_failures, 1);
}

#[tokio::test]
async fn test_relay_server_end_to_end() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/items"))
        .and(header("x-client", "tests"))
        .and(body_string("name=haavi"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("x-upstream", "yes")
                .set_body_raw("created", "text/plain"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let hub = Arc::new(ObserverHub::new());
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let relay =
        RelayServer::new(addr, Url::parse(&upstream.uri()).unwrap(), interceptor(hub)).unwrap();
    tokio::spawn(relay.serve(listener));

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/api/items", addr))
        .header("x-client", "tests")
        .body("name=haavi")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(response.headers().get("x-upstream").unwrap(), "yes");
    assert_eq!(response.text().await.unwrap(), "created");

    let message = messages.recv().await.unwrap();
    let exchange = message.exchange();
    assert_eq!(exchange.method, "POST");
    assert_eq!(exchange.url, format!("{}/api/items", upstream.uri()));
    assert_eq!(exchange.request_headers.get("x-client"), Some("tests"));
    assert_eq!(exchange.body_preview.as_deref(), Some("created"));

    let stats = client
        .get(format!("http://{}/__haavi/stats", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let stats: serde_json::Value = serde_json::from_str(&stats).unwrap();
    assert_eq!(stats["intercepted"], 1);
}

#[tokio::test]
async fn test_relay_server_bootstrap_bypass() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sw-proxy.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("self.skipWaiting();", "application/javascript"),
        )
        .mount(&upstream)
        .await;

    let hub = Arc::new(ObserverHub::new());
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let relay =
        RelayServer::new(addr, Url::parse(&upstream.uri()).unwrap(), interceptor(hub)).unwrap();
    tokio::spawn(relay.serve(listener));

    let body = reqwest::get(format!("http://{}/sw-proxy.js", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body, "self.skipWaiting();");
    assert!(messages.try_recv().is_err());
}

#[tokio::test]
async fn test_relay_server_unreachable_upstream() {
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let hub = Arc::new(ObserverHub::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let upstream = Url::parse(&format!("http://{}", dead_addr)).unwrap();
    let relay = RelayServer::new(addr, upstream, interceptor(hub)).unwrap();
    tokio::spawn(relay.serve(listener));

    let response = reqwest::get(format!("http://{}/anything", addr)).await.unwrap();
    assert_eq!(response.status().as_u16(), 502);
}

async fn spawn_relay(upstream: &str, hub: Arc<ObserverHub>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let relay = RelayServer::new(addr, Url::parse(upstream).unwrap(), interceptor(hub)).unwrap();
    tokio::spawn(relay.serve(listener));
    addr
}

#[tokio::test]
async fn test_relay_server_gzip_body_preview() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"line one\nline two\n").unwrap();
    let compressed = encoder.finish().unwrap();

    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .and(header("accept-encoding", "gzip, br"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_raw(compressed.clone(), "text/html"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let hub = Arc::new(ObserverHub::new());
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);
    let addr = spawn_relay(&upstream.uri(), hub).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/index.html", addr))
        .header("accept-encoding", "gzip, br")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers().get("content-encoding").unwrap(), "gzip");
    assert_eq!(response.bytes().await.unwrap().as_ref(), compressed.as_slice());

    let message = messages.recv().await.unwrap();
    let exchange = message.exchange();
    assert_eq!(exchange.response_headers.get("content-encoding"), Some("gzip"));
    assert_eq!(exchange.body_preview.as_deref(), Some("line one\nline two\n"));
}

#[tokio::test]
async fn test_relay_server_bootstrap_bypass_under_prefix() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sw-proxy.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("self.skipWaiting();", "application/javascript"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let hub = Arc::new(ObserverHub::new());
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);
    let addr = spawn_relay(&format!("{}/v1/", upstream.uri()), hub).await;

    let body = reqwest::get(format!("http://{}/sw-proxy.js", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body, "self.skipWaiting();");
    assert!(messages.try_recv().is_err());
}

#[tokio::test]
async fn test_default_accept_is_sent_but_not_captured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept", "*/*"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let hub = Arc::new(ObserverHub::new());
    let (observer, mut messages) = ChannelObserver::new();
    hub.register(observer);

    let response = interceptor(hub)
        .intercept(Request::get(server.uri()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status_code(), 204);

    let message = messages.recv().await.unwrap();
    assert_eq!(message.exchange().request_headers.get("accept"), None);
}
