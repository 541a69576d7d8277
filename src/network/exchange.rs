// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Intercepted exchange and the message envelope sent to observers

use std::fmt;

use reqwest::header::HeaderMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status reported when the upstream could not be reached
pub const NETWORK_ERROR_STATUS: u16 = 0;

/// Status text reported when the upstream could not be reached
pub const NETWORK_ERROR_STATUS_TEXT: &str = "Network Error";

/// Single header name/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered header mapping
///
/// Each name appears once, in order of first appearance. Repeated headers
/// are merged into one comma-separated value. Serializes as a JSON object
/// that keeps this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<HeaderEntry>);

impl HeaderList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture every header in the map's iteration order
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let entries = headers
            .keys()
            .map(|name| {
                let value = headers
                    .get_all(name)
                    .iter()
                    .map(|v| String::from_utf8_lossy(v.as_bytes()))
                    .collect::<Vec<_>>()
                    .join(", ");
                HeaderEntry::new(name.as_str(), value)
            })
            .collect();
        Self(entries)
    }

    /// Add a header, merging into an existing entry of the same name
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.value.push_str(", ");
                entry.value.push_str(&value);
            }
            None => self.0.push(HeaderEntry { name, value }),
        }
    }

    /// Look up a header by exact name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }

    /// Iterate entries in order
    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for HeaderList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HeaderList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeaderListVisitor;

        impl<'de> Visitor<'de> for HeaderListVisitor {
            type Value = HeaderList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut list = HeaderList::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    list.push(name, value);
                }
                Ok(list)
            }
        }

        deserializer.deserialize_map(HeaderListVisitor)
    }
}

/// Summary of one intercepted request/response pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptedExchange {
    /// Absolute target URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Status code, 0 when no response was received
    pub status: u16,
    /// Reason phrase, or "Network Error"
    pub status_text: String,
    pub request_headers: HeaderList,
    pub response_headers: HeaderList,
    /// Raw content-type, empty if absent
    pub content_type: String,
    /// Bounded preview or diagnostic placeholder
    pub body_preview: Option<String>,
}

impl InterceptedExchange {
    /// Build the summary published when the upstream call fails
    pub fn network_failure(
        url: impl Into<String>,
        method: impl Into<String>,
        request_headers: HeaderList,
        message: impl fmt::Display,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            status: NETWORK_ERROR_STATUS,
            status_text: NETWORK_ERROR_STATUS_TEXT.to_string(),
            request_headers,
            response_headers: HeaderList::new(),
            content_type: String::new(),
            body_preview: Some(format!("[Fetch failed: {}]", message)),
        }
    }

    /// Check if this exchange records a network failure
    pub fn is_network_failure(&self) -> bool {
        self.status == NETWORK_ERROR_STATUS
    }
}

/// Message envelope delivered to observers
///
/// The `type` discriminator lets observers sharing a channel tell these
/// messages apart from anything else they receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RelayMessage {
    Intercepted(InterceptedExchange),
}

impl RelayMessage {
    /// Borrow the carried exchange
    pub fn exchange(&self) -> &InterceptedExchange {
        match self {
            RelayMessage::Intercepted(exchange) => exchange,
        }
    }
}

impl From<InterceptedExchange> for RelayMessage {
    fn from(exchange: InterceptedExchange) -> Self {
        RelayMessage::Intercepted(exchange)
    }
}
