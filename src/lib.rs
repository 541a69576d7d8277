// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Haavi - Transparent Interception Relay
//!
//! Sits between a client and the network, forwards every request untouched
//! and broadcasts a bounded summary of each request/response pair to any
//! number of observers.
//!
//! ## Features
//!
//! - Transparent: the caller gets the upstream response byte for byte
//! - Bounded previews: first lines of text bodies, binary bodies never read
//! - Failure summaries: network errors are published, then propagated
//! - Isolated fan-out: a broken observer never affects the others
//! - Relay server: put the interceptor in front of any HTTP upstream
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use haavi::network::{ChannelObserver, Interceptor, ObserverHub};
//! use haavi::{Request, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = Arc::new(ObserverHub::new());
//!     let (observer, mut messages) = ChannelObserver::new();
//!     hub.register(observer);
//!
//!     let interceptor = Interceptor::from_config(&RelayConfig::default(), hub)?;
//!     let response = interceptor.intercept(Request::get("https://example.com")?).await?;
//!
//!     let message = messages.recv().await.expect("one exchange per request");
//!     println!("{} -> {:?}", response.status, message.exchange().body_preview);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod network;
pub mod server;

// Re-exports for convenience

// Configuration
pub use config::{PreviewConfig, RelayConfig, DEFAULT_BOOTSTRAP_PATH};

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{HttpClient, HttpClientConfig, Request, Response};

// Interception
pub use network::{
    EligibilityFilter, HeaderList, InterceptedExchange, Interceptor, RelayMessage, Transport,
};

// Observers
pub use network::{
    CallbackObserver, ChannelObserver, JsonLinesObserver, LogObserver, Observer, ObserverHub,
    ObserverRegistry,
};

// Server
pub use server::RelayServer;

/// Haavi version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
