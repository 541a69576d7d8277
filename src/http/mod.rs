// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for the Haavi relay
//!
//! Buffered request/response types and the reqwest-backed upstream client.

mod client;
mod encoding;
mod request;
mod response;

pub use client::{HttpClient, HttpClientConfig};
pub use encoding::{content_codings, decode_body, DecodedBody};
pub use request::Request;
pub use response::Response;

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const CONTENT_ENCODING: &str = "content-encoding";
    pub const HOST: &str = "host";
    pub const CONNECTION: &str = "connection";
    pub const KEEP_ALIVE: &str = "keep-alive";
    pub const PROXY_AUTHENTICATE: &str = "proxy-authenticate";
    pub const PROXY_AUTHORIZATION: &str = "proxy-authorization";
    pub const TE: &str = "te";
    pub const TRAILER: &str = "trailer";
    pub const TRANSFER_ENCODING: &str = "transfer-encoding";
    pub const UPGRADE: &str = "upgrade";

    /// Connection-scoped headers that a relay must not forward
    pub const HOP_BY_HOP: &[&str] = &[
        CONNECTION,
        KEEP_ALIVE,
        PROXY_AUTHENTICATE,
        PROXY_AUTHORIZATION,
        TE,
        TRAILER,
        TRANSFER_ENCODING,
        UPGRADE,
    ];
}
