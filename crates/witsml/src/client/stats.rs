// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-client call outcome counters.
//!
//! Counts Store calls by how they ended, following the result code classes
//! of the Store API. The Prometheus collectors carry the same information
//! per label set; these counters give a cheap in-process view of one client.

use std::sync::atomic::{AtomicU64, Ordering};

use super::executor::{ResultClass, ResultEnvelope};
use crate::error::{WitsmlError, WitsmlResult};

/// Outcome counters of one client.
#[derive(Debug, Default)]
pub struct ClientStats {
    with_data: AtomicU64,
    empty: AtomicU64,
    partial: AtomicU64,
    rejected: AtomicU64,
    timeouts: AtomicU64,
    transport_failures: AtomicU64,
    cancelled: AtomicU64,
    local_failures: AtomicU64,
    retries: AtomicU64,
}

/// A point-in-time copy of [`ClientStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Positive result codes, partial results included.
    pub with_data: u64,
    /// Result code 0.
    pub empty: u64,
    /// Result code 2 (server truncated the reply).
    pub partial: u64,
    /// Negative result codes.
    pub rejected: u64,
    /// No reply before the deadline.
    pub timeouts: u64,
    /// Connection, HTTP and SOAP failures.
    pub transport_failures: u64,
    /// Abandoned by the caller.
    pub cancelled: u64,
    /// Failures raised locally (codec, request building).
    pub local_failures: u64,
    /// Retried attempts.
    pub retries: u64,
}

impl StatsSnapshot {
    /// Calls that reached an outcome.
    pub fn total(&self) -> u64 {
        self.with_data
            + self.empty
            + self.rejected
            + self.timeouts
            + self.transport_failures
            + self.cancelled
            + self.local_failures
    }

    /// Calls answered with a non-negative result code.
    pub fn succeeded(&self) -> u64 {
        self.with_data + self.empty
    }
}

impl ClientStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one call.
    pub fn record(&self, outcome: &WitsmlResult<ResultEnvelope>) {
        let counter = match outcome {
            Ok(envelope) => {
                if envelope.is_partial() {
                    self.partial.fetch_add(1, Ordering::Relaxed);
                }
                match envelope.class() {
                    ResultClass::SuccessWithData => &self.with_data,
                    ResultClass::SuccessEmpty => &self.empty,
                    ResultClass::Error(_) => &self.rejected,
                }
            }
            Err(WitsmlError::Server(_)) => &self.rejected,
            Err(WitsmlError::Timeout(_)) => &self.timeouts,
            Err(WitsmlError::Transport(_)) => &self.transport_failures,
            Err(WitsmlError::Cancelled { .. }) => &self.cancelled,
            Err(_) => &self.local_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a retried attempt.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            with_data: load(&self.with_data),
            empty: load(&self.empty),
            partial: load(&self.partial),
            rejected: load(&self.rejected),
            timeouts: load(&self.timeouts),
            transport_failures: load(&self.transport_failures),
            cancelled: load(&self.cancelled),
            local_failures: load(&self.local_failures),
            retries: load(&self.retries),
        }
    }

    /// Calls that reached an outcome.
    pub fn total_requests(&self) -> u64 {
        self.snapshot().total()
    }

    /// Retried attempts.
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}
