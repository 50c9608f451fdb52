// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Capability negotiation.
//!
//! ```text
//!  Unnegotiated ──► Negotiating ──┬──► Negotiated(version)
//!        ▲                        ├──► Failed (no common version, terminal)
//!        └────────────────────────┘    transport failure
//! ```
//!
//! Reads of the settled state take a `parking_lot` read lock. The first
//! callers serialize on an async gate so exactly one `WMLS_GetCap` is in
//! flight; the others wake up to the cached outcome. Callers that queued
//! behind a failed exchange get its error; only later callers start a new
//! exchange.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex as SyncMutex, RwLock};
use tokio::sync::Mutex;

use super::executor::{Deadline, Executor};
use super::transport::{WireRequest, WitsmlTransport};
use crate::codec;
use crate::error::{CodecError, WitsmlError, WitsmlResult};
use crate::types::{
    select_version, ClientCapabilities, NegotiatedCapabilities, ServerCapabilities, StoreMethod,
};

/// Observable negotiation state.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationState {
    /// No successful exchange yet.
    Unnegotiated,
    /// An exchange is in flight.
    Negotiating,
    /// Capabilities agreed.
    Negotiated(Arc<NegotiatedCapabilities>),
    /// No common schema version. Terminal for this client.
    Failed {
        /// Versions offered by the client.
        client_versions: Vec<String>,
        /// Versions advertised by the server.
        server_versions: Vec<String>,
    },
}

impl NegotiationState {
    /// Short state name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unnegotiated => "unnegotiated",
            Self::Negotiating => "negotiating",
            Self::Negotiated(_) => "negotiated",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Single-flight capability negotiator.
pub struct Negotiator {
    client: ClientCapabilities,
    state: RwLock<NegotiationState>,
    gate: Mutex<()>,
    /// Number of exchanges that ended in a retryable failure.
    failures: AtomicU64,
    last_failure: SyncMutex<Option<WitsmlError>>,
}

impl Negotiator {
    /// Creates a negotiator for the client capabilities.
    pub fn new(client: ClientCapabilities) -> Self {
        Self {
            client,
            state: RwLock::new(NegotiationState::Unnegotiated),
            gate: Mutex::new(()),
            failures: AtomicU64::new(0),
            last_failure: SyncMutex::new(None),
        }
    }

    /// Client capabilities.
    pub fn client(&self) -> &ClientCapabilities {
        &self.client
    }

    /// Current state.
    pub fn state(&self) -> NegotiationState {
        self.state.read().clone()
    }

    /// Settled outcome without waiting: `Ok(Some)` when negotiated,
    /// `Err(IncompatibleServer)` when failed, `Ok(None)` otherwise.
    pub fn cached(&self) -> WitsmlResult<Option<Arc<NegotiatedCapabilities>>> {
        match &*self.state.read() {
            NegotiationState::Negotiated(caps) => Ok(Some(Arc::clone(caps))),
            NegotiationState::Failed {
                client_versions,
                server_versions,
            } => Err(WitsmlError::incompatible_server(
                client_versions.clone(),
                server_versions.clone(),
            )),
            NegotiationState::Unnegotiated | NegotiationState::Negotiating => Ok(None),
        }
    }

    /// Returns the negotiated capabilities, running the exchange if needed.
    pub async fn negotiate<T: WitsmlTransport>(
        &self,
        executor: &Executor<T>,
        deadline: &Deadline,
    ) -> WitsmlResult<Arc<NegotiatedCapabilities>> {
        if let Some(caps) = self.cached()? {
            return Ok(caps);
        }

        let seen = self.failures.load(Ordering::Acquire);
        let _gate = self.gate.lock().await;
        if let Some(caps) = self.cached()? {
            return Ok(caps);
        }
        if self.failures.load(Ordering::Acquire) != seen {
            if let Some(error) = self.last_failure.lock().clone() {
                return Err(error);
            }
        }
        // A `Negotiating` state left behind by a dropped caller is simply
        // overwritten here.
        *self.state.write() = NegotiationState::Negotiating;

        match self.exchange(executor, deadline).await {
            Ok(caps) => {
                let caps = Arc::new(caps);
                tracing::info!(
                    host = executor.transport().host(),
                    version = caps.version(),
                    server = caps.server.name.as_deref().unwrap_or("unknown"),
                    "WITSML capabilities negotiated"
                );
                *self.state.write() = NegotiationState::Negotiated(Arc::clone(&caps));
                Ok(caps)
            }
            Err(WitsmlError::Server(crate::error::ServerError::Incompatible {
                client_versions,
                server_versions,
            })) => {
                tracing::error!(
                    host = executor.transport().host(),
                    client = ?client_versions,
                    server = ?server_versions,
                    "No common WITSML schema version"
                );
                *self.state.write() = NegotiationState::Failed {
                    client_versions: client_versions.clone(),
                    server_versions: server_versions.clone(),
                };
                Err(WitsmlError::incompatible_server(client_versions, server_versions))
            }
            Err(error) => {
                *self.state.write() = NegotiationState::Unnegotiated;
                // The caller's own cancellation is not an outcome of the
                // exchange; waiters run their own.
                if !error.is_cancelled() {
                    *self.last_failure.lock() = Some(error.clone());
                    self.failures.fetch_add(1, Ordering::Release);
                }
                Err(error)
            }
        }
    }

    async fn exchange<T: WitsmlTransport>(
        &self,
        executor: &Executor<T>,
        deadline: &Deadline,
    ) -> WitsmlResult<NegotiatedCapabilities> {
        let caps_xml = codec::encode(&self.client)?;
        let preferred = self.client.schema_versions.first().cloned().unwrap_or_default();

        let request = WireRequest::get_cap(caps_xml.clone(), format!("dataVersion={}", preferred));
        let envelope = match executor.execute(&request, deadline).await {
            Ok(envelope) => envelope,
            // Some stores reject a dataVersion they do not know; ask for the
            // default capabilities instead.
            Err(error) if error.result_code().is_some() => {
                tracing::debug!(error = %error, "GetCap with dataVersion rejected, retrying without");
                executor
                    .execute(&WireRequest::get_cap(caps_xml, ""), deadline)
                    .await?
            }
            Err(error) => return Err(error),
        };

        let payload = envelope
            .xml
            .ok_or_else(|| CodecError::malformed("CapabilitiesOut", "empty capabilities document"))?;
        let mut server: ServerCapabilities = codec::decode(&payload)?;

        if server.schema_versions.is_empty() {
            let version = executor
                .execute(&WireRequest::new(StoreMethod::GetVersion), deadline)
                .await?;
            server.schema_versions = version
                .xml
                .unwrap_or_default()
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
        }

        match select_version(&self.client.schema_versions, &server.schema_versions) {
            Some(version) => Ok(NegotiatedCapabilities {
                client: self.client.clone(),
                server,
                version,
            }),
            None => Err(WitsmlError::incompatible_server(
                self.client.schema_versions.clone(),
                server.schema_versions,
            )),
        }
    }
}

impl std::fmt::Debug for Negotiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Negotiator")
            .field("client_versions", &self.client.schema_versions)
            .field("state", &self.state.read().name())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::retry::RetryConfig;
    use crate::client::transport::WireReply;
    use crate::error::TransportError;
    use crate::metrics::WitsmlMetrics;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct CapServer {
        versions: &'static str,
        fail_first: bool,
        calls: AtomicU32,
    }

    #[async_trait]
    impl WitsmlTransport for CapServer {
        async fn send(&self, request: &WireRequest) -> WitsmlResult<WireReply> {
            assert_eq!(request.method, StoreMethod::GetCap);
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail_first && n == 0 {
                return Err(TransportError::Fault {
                    code: "soap:Server".into(),
                    reason: "warming up".into(),
                }
                .into());
            }
            let xml = format!(
                "<capServers><capServer apiVers=\"1.4.1\"><schemaVersion>{}</schemaVersion></capServer></capServers>",
                self.versions
            );
            Ok(WireReply::new(1, Some(xml)))
        }

        fn host(&self) -> &str {
            "caps"
        }
    }

    fn setup(versions: &'static str, fail_first: bool) -> (Negotiator, Executor<CapServer>) {
        let negotiator = Negotiator::new(ClientCapabilities::new("t", "t", ["1.3.1.1", "1.4.1.1"]));
        let executor = Executor::new(
            CapServer {
                versions,
                fail_first,
                calls: AtomicU32::new(0),
            },
            RetryConfig::no_retry(),
            WitsmlMetrics::unregistered().unwrap(),
        );
        (negotiator, executor)
    }

    #[tokio::test]
    async fn test_selects_highest_common_version() {
        let (negotiator, executor) = setup("1.3.1.1,1.4.1.1", false);
        let caps = negotiator.negotiate(&executor, &Deadline::none()).await.unwrap();
        assert_eq!(caps.version(), "1.4.1.1");
        assert_eq!(negotiator.state().name(), "negotiated");
    }

    #[tokio::test]
    async fn test_incompatible_is_terminal() {
        let (negotiator, executor) = setup("2.0", false);
        let err = negotiator.negotiate(&executor, &Deadline::none()).await.unwrap_err();
        assert!(err.is_incompatible_server());
        let again = negotiator.negotiate(&executor, &Deadline::none()).await.unwrap_err();
        assert!(again.is_incompatible_server());
        assert_eq!(executor.transport().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_allows_retry() {
        let (negotiator, executor) = setup("1.4.1.1", true);
        assert!(negotiator.negotiate(&executor, &Deadline::none()).await.is_err());
        assert_eq!(negotiator.state(), NegotiationState::Unnegotiated);
        let caps = negotiator.negotiate(&executor, &Deadline::none()).await.unwrap();
        assert_eq!(caps.version(), "1.4.1.1");
    }

    #[tokio::test]
    async fn test_waiters_share_failed_exchange() {
        let (negotiator, executor) = setup("1.4.1.1", true);
        let deadline = Deadline::none();
        let (a, b, c) = tokio::join!(
            negotiator.negotiate(&executor, &deadline),
            negotiator.negotiate(&executor, &deadline),
            negotiator.negotiate(&executor, &deadline),
        );
        assert!(a.is_err() && b.is_err() && c.is_err());
        assert_eq!(executor.transport().calls.load(Ordering::SeqCst), 1);

        // A caller arriving after the failure starts a fresh exchange.
        let caps = negotiator.negotiate(&executor, &deadline).await.unwrap();
        assert_eq!(caps.version(), "1.4.1.1");
        assert_eq!(executor.transport().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_exchange() {
        let (negotiator, executor) = setup("1.4.1.1", false);
        let deadline = Deadline::none();
        let (a, b, c) = tokio::join!(
            negotiator.negotiate(&executor, &deadline),
            negotiator.negotiate(&executor, &deadline),
            negotiator.negotiate(&executor, &deadline),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(executor.transport().calls.load(Ordering::SeqCst), 1);
    }
}
