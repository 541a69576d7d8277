// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Relay and preview configuration

use std::time::Duration;

use crate::http::HttpClientConfig;

/// Path of the relay's own bootstrap resource, never intercepted
pub const DEFAULT_BOOTSTRAP_PATH: &str = "/sw-proxy.js";

/// Body preview bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Maximum number of leading lines kept
    pub max_lines: usize,
    /// Maximum number of characters kept after line selection
    pub max_chars: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_lines: 3,
            max_chars: 1000,
        }
    }
}

impl PreviewConfig {
    /// Create a new preview config
    pub fn new() -> Self {
        Self::default()
    }

    /// The original 500-character bound
    pub fn baseline() -> Self {
        Self {
            max_chars: 500,
            ..Default::default()
        }
    }

    /// Set max lines
    pub fn max_lines(mut self, lines: usize) -> Self {
        self.max_lines = lines;
        self
    }

    /// Set max characters
    pub fn max_chars(mut self, chars: usize) -> Self {
        self.max_chars = chars;
        self
    }
}

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Body preview bounds
    pub preview: PreviewConfig,
    /// Path excluded from interception
    pub bootstrap_path: String,
    /// Upstream HTTP client settings
    pub client: HttpClientConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            preview: PreviewConfig::default(),
            bootstrap_path: DEFAULT_BOOTSTRAP_PATH.to_string(),
            client: HttpClientConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Create a new relay config
    pub fn new() -> Self {
        Self::default()
    }

    /// Config matching the original 500-character preview
    pub fn baseline() -> Self {
        Self {
            preview: PreviewConfig::baseline(),
            ..Default::default()
        }
    }

    /// Set preview bounds
    pub fn preview(mut self, preview: PreviewConfig) -> Self {
        self.preview = preview;
        self
    }

    /// Set the bootstrap path
    pub fn bootstrap_path(mut self, path: impl Into<String>) -> Self {
        self.bootstrap_path = path.into();
        self
    }

    /// Set upstream timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client.timeout = timeout;
        self
    }

    /// Accept invalid upstream certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.client.accept_invalid_certs = accept;
        self
    }

    /// Set upstream client settings
    pub fn client(mut self, client: HttpClientConfig) -> Self {
        self.client = client;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config() {
        let config = RelayConfig::new()
            .bootstrap_path("/relay.js")
            .timeout(Duration::from_secs(5));

        assert_eq!(config.bootstrap_path, "/relay.js");
        assert_eq!(config.client.timeout, Duration::from_secs(5));
        assert_eq!(config.preview.max_chars, 1000);
    }

    #[test]
    fn test_baseline_preview() {
        let config = RelayConfig::baseline();
        assert_eq!(config.preview.max_chars, 500);
        assert_eq!(config.preview.max_lines, 3);
        assert_eq!(config.bootstrap_path, DEFAULT_BOOTSTRAP_PATH);
    }
}
