// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! [`MockWitsmlServer`] answers Store calls in-process:
//!
//! - `WMLS_GetCap` / `WMLS_GetVersion` from configurable capabilities
//! - `WMLS_GetFromStore` for wells and logs, honouring `returnElements`,
//!   `maxReturnNodes` and the log index window of the query
//! - mutations accepted and recorded
//!
//! Failures can be scripted per method, every request is recorded, and an
//! optional delay is applied before each reply.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use witsml::client::{OptionsIn, WireReply, WireRequest, WitsmlTransport};
use witsml::codec;
use witsml::error::{TransportError, WitsmlResult};
use witsml::types::{Log, LogData, ServerCapabilities, StoreMethod, Well};

/// Schema version used in replies when the query carries none.
const DEFAULT_VERSION: &str = "1.4.1.1";

// =============================================================================
// MockLog
// =============================================================================

/// A depth-indexed log held by the mock store.
#[derive(Debug, Clone)]
pub struct MockLog {
    /// Header returned for header-only reads.
    pub header: Log,
    /// Column mnemonics of data replies.
    pub mnemonics: Vec<String>,
    /// Column units of data replies.
    pub units: Vec<String>,
    /// Rows, index first, increasing.
    pub rows: Vec<String>,
}

impl MockLog {
    /// Rows inside `[start, end]`, at most `limit` of them.
    fn window(&self, start: Option<f64>, end: Option<f64>, limit: Option<usize>) -> Vec<String> {
        let rows = self.rows.iter().filter(|row| {
            let Some(index) = codec::parse_f64(LogData::row_index(row)) else {
                return false;
            };
            start.map_or(true, |s| index >= s) && end.map_or(true, |e| index <= e)
        });
        match limit {
            Some(limit) => rows.take(limit).cloned().collect(),
            None => rows.cloned().collect(),
        }
    }
}

// =============================================================================
// Failures
// =============================================================================

/// A scripted failure.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Connection dropped before a reply (transient).
    ConnectionReset,
    /// SOAP fault (not transient).
    Fault(String),
    /// Negative result code with a message.
    Rejected(i32, String),
}

impl MockFailure {
    fn into_result(self) -> WitsmlResult<WireReply> {
        match self {
            Self::ConnectionReset => Err(TransportError::connection_reset("mock connection reset").into()),
            Self::Fault(reason) => Err(TransportError::Fault {
                code: "soap:Server".into(),
                reason,
            }
            .into()),
            Self::Rejected(code, message) => Ok(WireReply::new(code, None).with_message(message)),
        }
    }
}

// =============================================================================
// MockWitsmlServer
// =============================================================================

/// In-process WITSML store.
#[derive(Debug)]
pub struct MockWitsmlServer {
    host: String,
    capabilities: Mutex<ServerCapabilities>,
    wells: Mutex<Vec<Well>>,
    logs: Mutex<HashMap<String, MockLog>>,
    /// Row cap applied by the server itself; truncated replies report code 2.
    server_row_cap: Mutex<Option<usize>>,
    failures: Mutex<VecDeque<(StoreMethod, MockFailure)>>,
    delay: Mutex<Duration>,
    requests: Mutex<Vec<WireRequest>>,
}

impl MockWitsmlServer {
    /// Creates a store advertising the given capabilities.
    pub fn new(capabilities: ServerCapabilities) -> Self {
        Self {
            host: "mock-store".to_string(),
            capabilities: Mutex::new(capabilities),
            wells: Mutex::new(Vec::new()),
            logs: Mutex::new(HashMap::new()),
            server_row_cap: Mutex::new(None),
            failures: Mutex::new(VecDeque::new()),
            delay: Mutex::new(Duration::ZERO),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Host label reported to the client.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Adds a well.
    pub fn add_well(&self, well: Well) {
        self.wells.lock().push(well);
    }

    /// Adds a log, keyed by its uid.
    pub fn add_log(&self, log: MockLog) {
        let uid = log.header.identity.uid.clone().unwrap_or_default();
        self.logs.lock().insert(uid, log);
    }

    /// Changes the data columns of a stored log without touching its header.
    pub fn set_data_columns(&self, uid: &str, mnemonics: &[&str], units: &[&str]) {
        if let Some(log) = self.logs.lock().get_mut(uid) {
            log.mnemonics = mnemonics.iter().map(|s| s.to_string()).collect();
            log.units = units.iter().map(|s| s.to_string()).collect();
        }
    }

    /// Caps every data reply at `rows`, reporting truncation with code 2.
    pub fn set_server_row_cap(&self, rows: Option<usize>) {
        *self.server_row_cap.lock() = rows;
    }

    /// Fails the next `count` calls of `method`.
    pub fn fail_next(&self, method: StoreMethod, count: usize, failure: MockFailure) {
        let mut failures = self.failures.lock();
        for _ in 0..count {
            failures.push_back((method, failure.clone()));
        }
    }

    /// Delays every reply.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Number of calls of a method, failed ones included.
    pub fn call_count(&self, method: StoreMethod) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    /// Every request of a method, oldest first.
    pub fn requests_for(&self, method: StoreMethod) -> Vec<WireRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Data-only log reads, oldest first.
    pub fn data_reads(&self) -> Vec<WireRequest> {
        self.requests_for(StoreMethod::GetFromStore)
            .into_iter()
            .filter(|r| {
                OptionsIn::parse(&r.options)
                    .map(|o| o.get("returnElements") == Some("data-only"))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Forgets recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    fn take_failure(&self, method: StoreMethod) -> Option<MockFailure> {
        let mut failures = self.failures.lock();
        let position = failures.iter().position(|(m, _)| *m == method)?;
        failures.remove(position).map(|(_, failure)| failure)
    }

    fn reply(&self, request: &WireRequest) -> WitsmlResult<WireReply> {
        match request.method {
            StoreMethod::GetCap => {
                let xml = codec::encode(&*self.capabilities.lock())?;
                Ok(WireReply::new(1, Some(xml)))
            }
            StoreMethod::GetVersion => {
                let versions = self.capabilities.lock().schema_versions.join(",");
                Ok(WireReply::new(1, Some(versions)))
            }
            StoreMethod::GetBaseMsg => {
                let code = request.return_value_in.unwrap_or_default();
                Ok(WireReply::new(1, Some(format!("Base message {}", code))))
            }
            StoreMethod::GetFromStore => self.get_from_store(request),
            StoreMethod::AddToStore => {
                if let Some(xml) = &request.query {
                    if xml.contains("<wells") {
                        let wells: Vec<Well> = codec::decode_collection(xml)?;
                        self.wells.lock().extend(wells);
                    }
                }
                Ok(WireReply::new(1, None))
            }
            StoreMethod::UpdateInStore | StoreMethod::DeleteFromStore => Ok(WireReply::new(1, None)),
        }
    }

    fn get_from_store(&self, request: &WireRequest) -> WitsmlResult<WireReply> {
        let query = request.query.clone().unwrap_or_default();
        let options = OptionsIn::parse(&request.options)?;
        let parsed = ParsedQuery::parse(&query);
        let version = parsed.version.as_deref().unwrap_or(DEFAULT_VERSION);

        match parsed.root.as_str() {
            "wells" => {
                let wells: Vec<Well> = self
                    .wells
                    .lock()
                    .iter()
                    .filter(|w| parsed.uid.is_none() || w.identity.uid == parsed.uid)
                    .cloned()
                    .collect();
                let code = if wells.is_empty() { 0 } else { 1 };
                Ok(WireReply::new(code, Some(codec::encode_collection(&wells, version)?)))
            }
            "logs" => self.get_log(&parsed, &options, version),
            _ => Ok(WireReply::new(0, None)),
        }
    }

    fn get_log(&self, query: &ParsedQuery, options: &OptionsIn, version: &str) -> WitsmlResult<WireReply> {
        let logs = self.logs.lock();
        let Some(log) = query.uid.as_deref().and_then(|uid| logs.get(uid)) else {
            return Ok(WireReply::new(0, Some(codec::encode_collection::<Log>(&[], version)?)));
        };

        let return_elements = options.get("returnElements").unwrap_or("all");
        let max_nodes = options
            .get("maxReturnNodes")
            .and_then(|v| v.parse::<usize>().ok());
        let server_cap = *self.server_row_cap.lock();
        let limit = match (max_nodes, server_cap) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        let mut code = 1;
        let mut reply = match return_elements {
            "header-only" => log.header.clone(),
            "data-only" => Log {
                identity: log.header.identity.clone(),
                ..Default::default()
            },
            _ => log.header.clone(),
        };

        if return_elements != "header-only" {
            let available = log.window(query.start, query.end, None).len();
            let rows = log.window(query.start, query.end, limit);
            if let Some(cap) = server_cap {
                if available > cap && max_nodes.map_or(true, |m| m > cap) {
                    code = 2;
                }
            }
            reply.data = Some(LogData {
                mnemonic_list: log.mnemonics.clone(),
                unit_list: log.units.clone(),
                rows,
            });
        }

        Ok(WireReply::new(code, Some(codec::encode_collection(&[reply], version)?)))
    }
}

#[async_trait]
impl WitsmlTransport for MockWitsmlServer {
    async fn send(&self, request: &WireRequest) -> WitsmlResult<WireReply> {
        self.requests.lock().push(request.clone());

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = self.take_failure(request.method) {
            tracing::debug!(method = %request.method, failure = ?failure, "Mock store injecting failure");
            return failure.into_result();
        }
        tracing::trace!(method = %request.method, options = %request.options, "Mock store call");
        self.reply(request)
    }

    fn host(&self) -> &str {
        &self.host
    }
}

// =============================================================================
// Query parsing
// =============================================================================

/// The parts of a query document the mock looks at.
#[derive(Debug, Default)]
struct ParsedQuery {
    root: String,
    version: Option<String>,
    uid: Option<String>,
    start: Option<f64>,
    end: Option<f64>,
}

impl ParsedQuery {
    fn parse(xml: &str) -> Self {
        let Ok(doc) = roxmltree::Document::parse(xml) else {
            return Self::default();
        };
        let root = doc.root_element();
        let object = root.children().find(|n| n.is_element());
        let number = |name: &str| {
            object
                .and_then(|o| o.children().find(|n| n.has_tag_name(name)))
                .and_then(|n| n.text())
                .and_then(codec::parse_f64)
        };
        Self {
            root: root.tag_name().name().to_string(),
            version: root.attribute("version").map(str::to_string),
            uid: object
                .and_then(|o| o.attribute("uid"))
                .filter(|uid| !uid.is_empty())
                .map(str::to_string),
            start: number("startIndex"),
            end: number("endIndex"),
        }
    }
}
