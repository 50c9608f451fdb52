// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Instrumented request execution with deadline, cancellation and retry.
//!
//! ```text
//! execute(request, deadline)
//!   ├─ active gauge +1 (guard)
//!   ├─ attempt ──► transport.send ─┬─ Ok(reply)
//!   │     ▲                        └─ Err(e)
//!   │     │   read-only && transient && attempts left && time left
//!   │     └── backoff sleep (clamped to deadline, cancellable)
//!   ├─ duration / total metrics
//!   └─ active gauge -1 (guard drop, also on cancellation)
//! ```
//!
//! Mutations are sent exactly once, whatever the error.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::retry::RetryConfig;
use super::transport::{WireReply, WireRequest, WitsmlTransport};
use super::ClientStats;
use crate::error::{TimeoutError, WitsmlError, WitsmlResult};
use crate::metrics::WitsmlMetrics;
use crate::types::{ObjectType, StoreMethod, WireEnum};

// =============================================================================
// Deadline
// =============================================================================

/// Caller deadline and cancellation token for one operation.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Option<Instant>,
    cancel: CancellationToken,
}

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
            cancel: CancellationToken::new(),
        }
    }

    /// No deadline; only cancellation stops the operation.
    pub fn none() -> Self {
        Self {
            at: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an existing cancellation token.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A deadline no later than `timeout` from now, sharing this token.
    pub fn narrowed(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        Self {
            at: Some(self.at.map_or(candidate, |at| at.min(candidate))),
            cancel: self.cancel.clone(),
        }
    }

    /// Remaining time, or `None` without deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Returns `true` once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.remaining().map_or(false, |r| r.is_zero())
    }

    /// The cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns `true` if the caller cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels the operation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

// =============================================================================
// ResultEnvelope
// =============================================================================

/// Classification of a result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    /// Positive code.
    SuccessWithData,
    /// Zero.
    SuccessEmpty,
    /// Negative code.
    Error(i32),
}

impl ResultClass {
    /// Classifies a result code.
    pub fn from_code(code: i32) -> Self {
        match code {
            c if c > 0 => Self::SuccessWithData,
            0 => Self::SuccessEmpty,
            c => Self::Error(c),
        }
    }
}

/// Result of a successful Store call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    /// Method that produced the result.
    pub method: StoreMethod,
    /// Object type of the call.
    pub object_type: Option<ObjectType>,
    /// Signed result code.
    pub result_code: i32,
    /// Returned document.
    pub xml: Option<String>,
    /// Supplementary message.
    pub message: Option<String>,
    /// Attempts made (1 without retry).
    pub attempts: u32,
    /// Time spent, retries included.
    pub elapsed: Duration,
}

impl ResultEnvelope {
    /// Classification of the result code.
    pub fn class(&self) -> ResultClass {
        ResultClass::from_code(self.result_code)
    }

    /// Result code 2: the server truncated the response (partial success).
    pub fn is_partial(&self) -> bool {
        self.result_code == 2
    }

    /// Returned document, or an empty string.
    pub fn xml_or_empty(&self) -> &str {
        self.xml.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Sends requests through a transport with retry and instrumentation.
pub struct Executor<T: WitsmlTransport> {
    transport: T,
    retry: RetryConfig,
    metrics: WitsmlMetrics,
    stats: ClientStats,
}

impl<T: WitsmlTransport> Executor<T> {
    /// Creates an executor.
    pub fn new(transport: T, retry: RetryConfig, metrics: WitsmlMetrics) -> Self {
        Self {
            transport,
            retry,
            metrics,
            stats: ClientStats::new(),
        }
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// The metrics collectors.
    pub fn metrics(&self) -> &WitsmlMetrics {
        &self.metrics
    }

    /// Call statistics.
    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    /// Splits into transport and metrics, dropping the statistics.
    pub fn into_parts(self) -> (T, WitsmlMetrics) {
        (self.transport, self.metrics)
    }

    /// Executes one Store call.
    ///
    /// Negative result codes fail with `ServerRejected` carrying the code and
    /// supplementary message.
    pub async fn execute(
        &self,
        request: &WireRequest,
        deadline: &Deadline,
    ) -> WitsmlResult<ResultEnvelope> {
        let method = request.method.to_wire();
        let object_type = request.object_label();
        let host = self.transport.host();

        let _active = self.metrics.start_active(host, method, object_type);
        let started = Instant::now();

        let (outcome, attempts) = self.run_attempts(request, deadline, started).await;
        let elapsed = started.elapsed();

        let outcome = outcome.and_then(|reply| {
            if reply.result_code < 0 {
                Err(WitsmlError::server_rejected(reply.result_code, reply.message))
            } else {
                Ok(ResultEnvelope {
                    method: request.method,
                    object_type: request.object_type,
                    result_code: reply.result_code,
                    xml: reply.payload,
                    message: reply.message,
                    attempts,
                    elapsed,
                })
            }
        });

        let label = match &outcome {
            Ok(envelope) => envelope.result_code.to_string(),
            Err(error) => error.metric_label(),
        };
        self.metrics
            .observe(host, method, object_type, &label, elapsed.as_secs_f64());
        self.stats.record(&outcome);

        match &outcome {
            Ok(envelope) => {
                tracing::debug!(
                    host,
                    method,
                    object_type,
                    result_code = envelope.result_code,
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "WITSML request completed"
                );
            }
            Err(error) => {
                if let Some(code) = error.result_code() {
                    tracing::warn!(
                        host,
                        method,
                        object_type,
                        result_code = code,
                        error = %error,
                        "WITSML request rejected"
                    );
                } else {
                    error.log(method);
                }
            }
        }

        outcome
    }

    async fn run_attempts(
        &self,
        request: &WireRequest,
        deadline: &Deadline,
        started: Instant,
    ) -> (WitsmlResult<WireReply>, u32) {
        let read_only = request.method.is_read_only();
        let max_attempts = if read_only { self.retry.max_attempts() } else { 1 };
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let error = match self.attempt(request, deadline, started).await {
                Ok(reply) => return (Ok(reply), attempt),
                Err(error) => error,
            };

            if !read_only
                || !error.is_retryable()
                || attempt >= max_attempts
                || deadline.is_expired()
            {
                return (Err(error), attempt);
            }

            let mut delay = self.retry.strategy.delay(attempt - 1);
            if let Some(remaining) = deadline.remaining() {
                delay = delay.min(remaining);
            }

            tracing::debug!(
                attempt,
                max_retries = self.retry.max_retries,
                delay_ms = delay.as_millis() as u64,
                method = request.method.to_wire(),
                error = %error,
                "Retrying WITSML request"
            );
            self.metrics
                .record_retry(self.transport.host(), request.method.to_wire());
            self.stats.record_retry();

            tokio::select! {
                biased;
                _ = deadline.token().cancelled() => {
                    return (Err(WitsmlError::cancelled(request.method.to_wire())), attempt);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn attempt(
        &self,
        request: &WireRequest,
        deadline: &Deadline,
        started: Instant,
    ) -> WitsmlResult<WireReply> {
        let method = request.method.to_wire();
        let exchange = async {
            match deadline.remaining() {
                Some(remaining) if remaining.is_zero() => {
                    Err(TimeoutError::new(method, started.elapsed()).into())
                }
                Some(remaining) => {
                    match tokio::time::timeout(remaining, self.transport.send(request)).await {
                        Ok(result) => result,
                        Err(_) => Err(TimeoutError::new(method, started.elapsed()).into()),
                    }
                }
                None => self.transport.send(request).await,
            }
        };

        tokio::select! {
            biased;
            _ = deadline.token().cancelled() => Err(WitsmlError::cancelled(method)),
            result = exchange => result,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Scripted {
        replies: Mutex<VecDeque<WitsmlResult<WireReply>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(replies: Vec<WitsmlResult<WireReply>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl WitsmlTransport for Scripted {
        async fn send(&self, _request: &WireRequest) -> WitsmlResult<WireReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(WireReply::new(1, None)))
        }

        fn host(&self) -> &str {
            "scripted"
        }
    }

    fn reset() -> WitsmlResult<WireReply> {
        Err(TransportError::connection_reset("reset").into())
    }

    fn executor(replies: Vec<WitsmlResult<WireReply>>) -> Executor<Scripted> {
        Executor::new(
            Scripted::new(replies),
            RetryConfig::fixed(3, Duration::from_millis(1)),
            WitsmlMetrics::unregistered().unwrap(),
        )
    }

    fn read() -> WireRequest {
        WireRequest::data(StoreMethod::GetFromStore, ObjectType::Well, "<wells/>".into(), "")
    }

    #[tokio::test]
    async fn test_read_retried_then_succeeds() {
        let exec = executor(vec![reset(), reset(), Ok(WireReply::new(1, Some("<wells/>".into())))]);
        let envelope = exec.execute(&read(), &Deadline::none()).await.unwrap();
        assert_eq!(envelope.attempts, 3);
        assert_eq!(envelope.class(), ResultClass::SuccessWithData);
        assert_eq!(exec.transport().calls.load(Ordering::SeqCst), 3);
        assert_eq!(exec.metrics().retry_count("scripted", "WMLS_GetFromStore"), 2);
        assert_eq!(exec.metrics().active_requests("scripted", "WMLS_GetFromStore", "well"), 0);
    }

    #[tokio::test]
    async fn test_mutation_never_retried() {
        let exec = executor(vec![reset(), Ok(WireReply::new(1, None))]);
        let request = WireRequest::data(StoreMethod::AddToStore, ObjectType::Well, "<wells/>".into(), "");
        let err = exec.execute(&request, &Deadline::none()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(exec.transport().calls.load(Ordering::SeqCst), 1);
        assert_eq!(exec.metrics().retry_count("scripted", "WMLS_AddToStore"), 0);
    }

    #[tokio::test]
    async fn test_negative_code_is_rejected_without_retry() {
        let exec = executor(vec![Ok(WireReply::new(-425, None).with_message("bad query"))]);
        let err = exec.execute(&read(), &Deadline::none()).await.unwrap_err();
        assert_eq!(err.result_code(), Some(-425));
        assert_eq!(exec.transport().calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            exec.metrics().request_count("scripted", "WMLS_GetFromStore", "well", "-425"),
            1
        );
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let exec = executor(vec![reset(), reset(), reset(), reset(), reset()]);
        let err = exec.execute(&read(), &Deadline::none()).await.unwrap_err();
        assert_eq!(err.category(), "transport");
        assert_eq!(exec.transport().calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let exec = executor(vec![]);
        let deadline = Deadline::none();
        deadline.cancel();
        let err = exec.execute(&read(), &deadline).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(exec.metrics().active_requests("scripted", "WMLS_GetFromStore", "well"), 0);
    }

    #[test]
    fn test_result_class() {
        assert_eq!(ResultClass::from_code(1), ResultClass::SuccessWithData);
        assert_eq!(ResultClass::from_code(0), ResultClass::SuccessEmpty);
        assert_eq!(ResultClass::from_code(-1), ResultClass::Error(-1));
    }
}
