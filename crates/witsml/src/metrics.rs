// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Prometheus metrics for WITSML Store calls.
//!
//! Collectors are registered into a registry supplied by the caller, so
//! several clients (or tests) never collide on a global registry.
//!
//! # Metrics Overview
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `witsml_request_duration_seconds` | Histogram | host, method, object_type, result_code |
//! | `witsml_requests_active` | Gauge | host, method, object_type |
//! | `witsml_requests_total` | Counter | host, method, object_type, result_code |
//! | `witsml_request_retries_total` | Counter | host, method |
//!
//! `result_code` is the signed server result code, or the error category
//! (`transport`, `timeout`, `cancelled` ...) when no code was returned. The
//! active gauge has no `result_code` label because the code is unknown while
//! the call is in flight.

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry};

use crate::error::{ConfigurationError, WitsmlResult};

/// Histogram buckets in seconds. Store calls range from milliseconds to
/// minutes for large log reads.
pub const DURATION_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0];

/// Collectors for one client.
#[derive(Clone)]
pub struct WitsmlMetrics {
    duration: HistogramVec,
    active: IntGaugeVec,
    total: IntCounterVec,
    retries: IntCounterVec,
}

impl WitsmlMetrics {
    /// Creates the collectors and registers them.
    pub fn new(registry: &Registry) -> WitsmlResult<Self> {
        Self::build(registry).map_err(|e| ConfigurationError::invalid_value("metrics", e.to_string()).into())
    }

    /// Creates collectors bound to a private registry.
    pub fn unregistered() -> WitsmlResult<Self> {
        Self::new(&Registry::new())
    }

    fn build(registry: &Registry) -> Result<Self, prometheus::Error> {
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "witsml_request_duration_seconds",
                "Duration of WITSML Store calls in seconds, retries included",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["host", "method", "object_type", "result_code"],
        )?;
        let active = IntGaugeVec::new(
            Opts::new("witsml_requests_active", "WITSML Store calls in flight"),
            &["host", "method", "object_type"],
        )?;
        let total = IntCounterVec::new(
            Opts::new("witsml_requests_total", "Completed WITSML Store calls"),
            &["host", "method", "object_type", "result_code"],
        )?;
        let retries = IntCounterVec::new(
            Opts::new("witsml_request_retries_total", "Retried WITSML Store attempts"),
            &["host", "method"],
        )?;

        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(active.clone()))?;
        registry.register(Box::new(total.clone()))?;
        registry.register(Box::new(retries.clone()))?;

        Ok(Self {
            duration,
            active,
            total,
            retries,
        })
    }

    /// Marks a call as started. The returned guard marks it finished when
    /// dropped, including when the owning future is cancelled.
    pub fn start_active(&self, host: &str, method: &str, object_type: &str) -> ActiveGuard {
        let gauge = self.active.with_label_values(&[host, method, object_type]);
        gauge.inc();
        ActiveGuard { gauge }
    }

    /// Records a completed call.
    pub fn observe(
        &self,
        host: &str,
        method: &str,
        object_type: &str,
        result_code: &str,
        seconds: f64,
    ) {
        let labels = [host, method, object_type, result_code];
        self.duration.with_label_values(&labels).observe(seconds);
        self.total.with_label_values(&labels).inc();
    }

    /// Records a retry.
    pub fn record_retry(&self, host: &str, method: &str) {
        self.retries.with_label_values(&[host, method]).inc();
    }

    /// Current in-flight count.
    pub fn active_requests(&self, host: &str, method: &str, object_type: &str) -> i64 {
        self.active.with_label_values(&[host, method, object_type]).get()
    }

    /// Completed call count for one result code.
    pub fn request_count(&self, host: &str, method: &str, object_type: &str, result_code: &str) -> u64 {
        self.total
            .with_label_values(&[host, method, object_type, result_code])
            .get()
    }

    /// Retry count.
    pub fn retry_count(&self, host: &str, method: &str) -> u64 {
        self.retries.with_label_values(&[host, method]).get()
    }
}

impl std::fmt::Debug for WitsmlMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WitsmlMetrics").finish_non_exhaustive()
    }
}

/// Decrements the active gauge on drop.
pub struct ActiveGuard {
    gauge: prometheus::IntGauge,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

// =============================================================================
// Tests
// =============================================================================
