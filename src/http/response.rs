// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response type

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use url::Url;

use super::headers::CONTENT_TYPE;
use crate::error::{Error, Result};

/// HTTP response representation
///
/// The body is fully buffered. Cloning shares the buffer, so reading a
/// duplicate never disturbs the copy returned to the caller.
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Reason phrase
    ///
    /// reqwest does not expose the phrase the upstream sent, so this is the
    /// canonical reason for the code, empty for non-standard codes.
    pub status_text: String,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL
    pub url: Url,
}

impl Response {
    /// Create a new response, deriving the reason phrase from the status
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, url: Url) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
            url,
        }
    }

    /// Override the reason phrase
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text, failing on invalid UTF-8
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Body(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get content type
    ///
    /// Repeated values are joined with `", "` and non-ASCII bytes decoded
    /// lossily, matching how response headers are captured.
    pub fn content_type(&self) -> Option<String> {
        let values: Vec<_> = self
            .headers
            .get_all(CONTENT_TYPE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Get body length
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}
