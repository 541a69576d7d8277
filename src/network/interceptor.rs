// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interception pipeline
//!
//! filter -> capture request -> fetch duplicate -> capture response ->
//! preview -> fan out -> hand back the untouched response (or the
//! original error).

use std::sync::Arc;

use super::exchange::{HeaderList, InterceptedExchange, RelayMessage};
use super::filter::EligibilityFilter;
use super::observer::{fan_out, ObserverRegistry};
use super::preview::body_preview;
use super::stats::{RelayStats, StatsReport};
use super::transport::Transport;
use crate::config::{PreviewConfig, RelayConfig};
use crate::error::Result;
use crate::http::{HttpClient, Request, Response};

/// Transparent interceptor publishing a summary of every exchange
///
/// Holds no exchange after publishing it. Cheap to clone; clones share
/// the transport, registry and counters.
#[derive(Clone)]
pub struct Interceptor {
    transport: Arc<dyn Transport>,
    registry: Arc<dyn ObserverRegistry>,
    filter: EligibilityFilter,
    preview: PreviewConfig,
    stats: Arc<RelayStats>,
}

impl Interceptor {
    /// Create an interceptor with default filter and preview bounds
    pub fn new(transport: Arc<dyn Transport>, registry: Arc<dyn ObserverRegistry>) -> Self {
        Self {
            transport,
            registry,
            filter: EligibilityFilter::default(),
            preview: PreviewConfig::default(),
            stats: Arc::new(RelayStats::new()),
        }
    }

    /// Create an interceptor backed by an `HttpClient` built from `config`
    pub fn from_config(config: &RelayConfig, registry: Arc<dyn ObserverRegistry>) -> Result<Self> {
        let client = HttpClient::with_config(config.client.clone())?;
        Ok(Self::new(Arc::new(client), registry)
            .filter(EligibilityFilter::new(config.bootstrap_path.clone()))
            .preview(config.preview))
    }

    /// Set the eligibility filter
    pub fn filter(mut self, filter: EligibilityFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set preview bounds
    pub fn preview(mut self, preview: PreviewConfig) -> Self {
        self.preview = preview;
        self
    }

    /// Run one request through the pipeline
    ///
    /// Returns exactly what the transport returned. A transport error is
    /// published as a failure summary first, then returned unchanged.
    pub async fn intercept(&self, request: Request) -> Result<Response> {
        let eligible = self.filter.is_eligible(&request.url);
        self.dispatch(request, eligible).await
    }

    /// Run a rewritten request through the pipeline
    ///
    /// Eligibility is decided on `inbound_path`, the path the client asked
    /// for, rather than on the upstream URL it was mapped to.
    pub async fn intercept_inbound(
        &self,
        inbound_path: &str,
        request: Request,
    ) -> Result<Response> {
        let eligible = self.filter.is_eligible_path(inbound_path);
        self.dispatch(request, eligible).await
    }

    async fn dispatch(&self, request: Request, eligible: bool) -> Result<Response> {
        if !eligible {
            self.stats.record_bypassed();
            return self.transport.fetch(request).await;
        }
        self.stats.record_intercepted();

        let request_headers = HeaderList::from_header_map(&request.headers);
        let duplicate = request.clone();

        match self.transport.fetch(duplicate).await {
            Ok(response) => {
                let inspection = response.clone();
                let exchange = self.summarize(&request, request_headers, &inspection);
                self.publish(exchange);
                Ok(response)
            }
            Err(e) => {
                self.stats.record_network_failure();
                tracing::debug!(url = %request.url, error = %e, "Upstream fetch failed");
                self.publish(InterceptedExchange::network_failure(
                    request.url.as_str(),
                    request.method.as_str(),
                    request_headers,
                    &e,
                ));
                Err(e)
            }
        }
    }

    /// Snapshot of the relay counters
    pub fn stats(&self) -> StatsReport {
        self.stats.snapshot()
    }

    fn summarize(
        &self,
        request: &Request,
        request_headers: HeaderList,
        inspection: &Response,
    ) -> InterceptedExchange {
        let content_type = inspection.content_type().unwrap_or_default();
        let preview = body_preview(inspection, &content_type, &self.preview);

        InterceptedExchange {
            url: request.url.to_string(),
            method: request.method.to_string(),
            status: inspection.status_code(),
            status_text: inspection.status_text.clone(),
            request_headers,
            response_headers: HeaderList::from_header_map(&inspection.headers),
            content_type,
            body_preview: Some(preview),
        }
    }

    fn publish(&self, exchange: InterceptedExchange) {
        tracing::debug!(
            method = %exchange.method,
            url = %exchange.url,
            status = exchange.status,
            "Publishing exchange"
        );

        let message = RelayMessage::from(exchange);
        let observers = self.registry.list_all();
        let outcome = fan_out(&observers, &message);
        self.stats.record_fan_out(outcome.delivered, outcome.failed);
    }
}
