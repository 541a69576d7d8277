// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Eligibility filter

use url::Url;

use crate::config::DEFAULT_BOOTSTRAP_PATH;

/// Decides which requests enter the interception pipeline
///
/// Requests for the relay's own bootstrap resource are never intercepted,
/// otherwise loading the interceptor would intercept itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityFilter {
    bootstrap_path: String,
}

impl EligibilityFilter {
    pub fn new(bootstrap_path: impl Into<String>) -> Self {
        Self {
            bootstrap_path: bootstrap_path.into(),
        }
    }

    /// Check whether a request for `url` should be intercepted
    pub fn is_eligible(&self, url: &Url) -> bool {
        self.is_eligible_path(url.path())
    }

    /// Check a bare request path, query excluded
    pub fn is_eligible_path(&self, path: &str) -> bool {
        path != self.bootstrap_path
    }

    pub fn bootstrap_path(&self) -> &str {
        &self.bootstrap_path
    }
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BOOTSTRAP_PATH)
    }
}
