// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Relay counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Running totals for one interceptor
#[derive(Debug)]
pub struct RelayStats {
    intercepted: AtomicU64,
    bypassed: AtomicU64,
    network_failures: AtomicU64,
    deliveries: AtomicU64,
    delivery_failures: AtomicU64,
    started: Instant,
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsReport {
    pub uptime_secs: u64,
    /// Requests that went through the pipeline
    pub intercepted: u64,
    /// Requests passed straight through by the eligibility filter
    pub bypassed: u64,
    pub network_failures: u64,
    pub deliveries: u64,
    pub delivery_failures: u64,
}

impl Default for RelayStats {
    fn default() -> Self {
        Self {
            intercepted: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
            network_failures: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            started: Instant::now(),
        }
    }
}

impl RelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_intercepted(&self) {
        self.intercepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bypassed(&self) {
        self.bypassed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_failure(&self) {
        self.network_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one fan-out
    pub fn record_fan_out(&self, delivered: usize, failed: usize) {
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        self.delivery_failures
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsReport {
        StatsReport {
            uptime_secs: self.started.elapsed().as_secs(),
            intercepted: self.intercepted.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}
