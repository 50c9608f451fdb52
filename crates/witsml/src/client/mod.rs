// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! WITSML Store client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        WitsmlClient                             │
//! │     capabilities / query / get_objects / mutations / logs       │
//! └─────────────────────────────────────────────────────────────────┘
//!        │                    │                        │
//!        ▼                    ▼                        ▼
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────────────┐
//! │  Negotiator  │   │  RequestBuilder  │   │  Paginator/LogStream│
//! │ (single GetCap)  │ (templates, opts)│   │  (growing objects)  │
//! └──────────────┘   └──────────────────┘   └─────────────────────┘
//!        │                    │                        │
//!        └────────────────────┼────────────────────────┘
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Executor (retry, deadline, metrics)             │
//! └─────────────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              WitsmlTransport  ──  SoapTransport (reqwest)       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use witsml::client::{OptionsIn, QueryTemplate, WitsmlClient};
//! use witsml::config::load_config;
//! use witsml::types::{ObjectIdentity, Well};
//!
//! let config = load_config("witsml.yaml")?;
//! let client = WitsmlClient::from_config(config, &prometheus::Registry::new())?;
//!
//! let caps = client.capabilities().await?;
//! println!("negotiated {}", caps.version());
//!
//! let wells: Vec<Well> = client
//!     .get_objects(QueryTemplate::all().request_all(["name", "field"]), OptionsIn::new())
//!     .await?;
//! ```

mod executor;
mod negotiator;
mod paginator;
mod request;
mod retry;
mod soap;
mod stats;
mod transport;

pub use executor::{Deadline, Executor, ResultClass, ResultEnvelope};
pub use negotiator::{NegotiationState, Negotiator};
pub use paginator::{
    decode_header, LogChunk, LogCursor, LogRange, LogStream, Paginator, StructureFingerprint,
};
pub use request::{
    FieldKind, FilterValue, IndexWindow, ObjectTemplate, OptionsIn, QueryDescriptor,
    QueryTemplate, RequestBuilder, TemplateField, TemplateRegistry,
};
pub use retry::{ExponentialBackoff, RetryConfig, RetryStrategy};
pub use soap::{build_envelope, parse_envelope, SoapTransport, MESSAGE_NAMESPACE};
pub use stats::{ClientStats, StatsSnapshot};
pub use transport::{WireReply, WireRequest, WitsmlTransport};

use std::sync::Arc;
use std::time::Duration;

use prometheus::Registry;

use crate::codec::{self, WitsmlDataObject};
use crate::config::{ClientConfig, PaginationConfig};
use crate::error::{CodecError, WitsmlResult};
use crate::metrics::WitsmlMetrics;
use crate::types::{
    ClientCapabilities, Log, NegotiatedCapabilities, ObjectIdentity, ObjectType, ReturnElements,
    StoreMethod,
};

// =============================================================================
// WitsmlClient
// =============================================================================

/// High-level WITSML Store client.
///
/// Every data call negotiates capabilities first (once per client), then
/// writes its documents in the negotiated schema version.
pub struct WitsmlClient<T: WitsmlTransport> {
    executor: Executor<T>,
    negotiator: Negotiator,
    builder: RequestBuilder,
    pagination: PaginationConfig,
    request_timeout: Duration,
}

impl WitsmlClient<SoapTransport> {
    /// Creates a SOAP client from a configuration, registering its metrics
    /// into `registry`.
    pub fn from_config(config: ClientConfig, registry: &Registry) -> WitsmlResult<Self> {
        config.validate()?;
        let transport = SoapTransport::new(
            config.server.clone(),
            config.request_timeout,
            config.connect_timeout,
        )?;
        let metrics = WitsmlMetrics::new(registry)?;
        Ok(Self::new(transport, &config, metrics))
    }
}

impl<T: WitsmlTransport> WitsmlClient<T> {
    /// Creates a client on a transport.
    pub fn new(transport: T, config: &ClientConfig, metrics: WitsmlMetrics) -> Self {
        let identity = &config.client;
        let mut client_caps = ClientCapabilities::new(
            identity.name.clone(),
            identity.description.clone(),
            identity.schema_versions.iter().cloned(),
        );
        client_caps.vendor = identity.vendor.clone();

        Self {
            executor: Executor::new(transport, config.retry.to_retry_config(), metrics),
            negotiator: Negotiator::new(client_caps),
            builder: RequestBuilder::new(
                TemplateRegistry::standard(),
                config.option_extensions.clone(),
            ),
            pagination: config.pagination.clone(),
            request_timeout: config.request_timeout,
        }
    }

    /// Replaces the template registry.
    pub fn with_templates(mut self, registry: TemplateRegistry) -> Self {
        self.builder = RequestBuilder::new(registry, self.builder.extensions().to_vec());
        self
    }

    /// Replaces the retry configuration.
    pub fn with_retry(self, retry: RetryConfig) -> Self {
        let Self {
            executor,
            negotiator,
            builder,
            pagination,
            request_timeout,
        } = self;
        let (transport, metrics) = executor.into_parts();
        Self {
            executor: Executor::new(transport, retry, metrics),
            negotiator,
            builder,
            pagination,
            request_timeout,
        }
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        self.executor.transport()
    }

    /// Call statistics.
    pub fn stats(&self) -> &ClientStats {
        self.executor.stats()
    }

    /// Metrics collectors.
    pub fn metrics(&self) -> &WitsmlMetrics {
        self.executor.metrics()
    }

    /// Request builder.
    pub fn request_builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Negotiation state.
    pub fn negotiation_state(&self) -> NegotiationState {
        self.negotiator.state()
    }

    /// A deadline of one request timeout from now.
    pub fn default_deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Negotiated capabilities, running `WMLS_GetCap` on first use.
    pub async fn capabilities(&self) -> WitsmlResult<Arc<NegotiatedCapabilities>> {
        self.capabilities_with(&self.default_deadline()).await
    }

    /// [`capabilities`](Self::capabilities) with a caller deadline.
    pub async fn capabilities_with(
        &self,
        deadline: &Deadline,
    ) -> WitsmlResult<Arc<NegotiatedCapabilities>> {
        self.negotiator
            .negotiate(&self.executor, &deadline.narrowed(self.request_timeout))
            .await
    }

    /// Data schema versions reported by `WMLS_GetVersion`.
    pub async fn server_version(&self) -> WitsmlResult<Vec<String>> {
        let envelope = self
            .executor
            .execute(&WireRequest::new(StoreMethod::GetVersion), &self.default_deadline())
            .await?;
        Ok(envelope
            .xml_or_empty()
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect())
    }

    /// Text of a result code from `WMLS_GetBaseMsg`.
    pub async fn base_message(&self, code: i16) -> WitsmlResult<String> {
        let envelope = self
            .executor
            .execute(&WireRequest::get_base_msg(code), &self.default_deadline())
            .await?;
        Ok(envelope.xml.unwrap_or_default())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Runs `WMLS_GetFromStore` and returns the raw result.
    pub async fn query(
        &self,
        object_type: ObjectType,
        template: QueryTemplate,
        options: OptionsIn,
    ) -> WitsmlResult<ResultEnvelope> {
        let descriptor = QueryDescriptor::new(object_type, template, options);
        self.query_with(&descriptor, &self.default_deadline()).await
    }

    /// Runs a prepared query with a caller deadline.
    pub async fn query_with(
        &self,
        descriptor: &QueryDescriptor,
        deadline: &Deadline,
    ) -> WitsmlResult<ResultEnvelope> {
        let caps = self.capabilities_with(deadline).await?;
        let request = self
            .builder
            .build(descriptor, caps.version())?
            .with_capabilities(Some(self.capabilities_in()?));
        self.executor
            .execute(&request, &deadline.narrowed(self.request_timeout))
            .await
    }

    /// Queries and decodes objects of a typed shape.
    pub async fn get_objects<O: WitsmlDataObject>(
        &self,
        template: QueryTemplate,
        options: OptionsIn,
    ) -> WitsmlResult<Vec<O>> {
        let envelope = self.query(O::OBJECT_TYPE, template, options).await?;
        codec::decode_collection(envelope.xml_or_empty())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// `WMLS_AddToStore` for typed objects. Sent once, never retried.
    pub async fn add_to_store<O: WitsmlDataObject>(&self, objects: &[O]) -> WitsmlResult<ResultEnvelope> {
        self.mutate(StoreMethod::AddToStore, objects).await
    }

    /// `WMLS_UpdateInStore` for typed objects. Sent once, never retried.
    pub async fn update_in_store<O: WitsmlDataObject>(
        &self,
        objects: &[O],
    ) -> WitsmlResult<ResultEnvelope> {
        self.mutate(StoreMethod::UpdateInStore, objects).await
    }

    /// `WMLS_DeleteFromStore` for one object. Sent once, never retried.
    pub async fn delete_from_store(
        &self,
        object_type: ObjectType,
        identity: ObjectIdentity,
        options: OptionsIn,
    ) -> WitsmlResult<ResultEnvelope> {
        let deadline = self.default_deadline();
        let caps = self.capabilities_with(&deadline).await?;
        let descriptor = QueryDescriptor::new(object_type, QueryTemplate::new(identity), options);
        let query = self.builder.build_query(&descriptor, caps.version())?;
        let options = self.builder.build_options(&descriptor.options)?;
        let request = WireRequest::data(StoreMethod::DeleteFromStore, object_type, query, options)
            .with_capabilities(Some(self.capabilities_in()?));
        self.executor.execute(&request, &deadline).await
    }

    async fn mutate<O: WitsmlDataObject>(
        &self,
        method: StoreMethod,
        objects: &[O],
    ) -> WitsmlResult<ResultEnvelope> {
        if objects.is_empty() {
            return Err(CodecError::malformed(O::OBJECT_TYPE.plural(), "no objects to send").into());
        }
        let deadline = self.default_deadline();
        let caps = self.capabilities_with(&deadline).await?;
        let xml = codec::encode_collection(objects, caps.version())?;
        let request = WireRequest::data(method, O::OBJECT_TYPE, xml, "")
            .with_capabilities(Some(self.capabilities_in()?));
        self.executor.execute(&request, &deadline).await
    }

    // =========================================================================
    // Growing objects
    // =========================================================================

    /// Reads the header of a log (`returnElements=header-only`).
    pub async fn log_header(&self, identity: &ObjectIdentity, deadline: &Deadline) -> WitsmlResult<Log> {
        let descriptor = QueryDescriptor::new(
            ObjectType::Log,
            QueryTemplate::new(identity.clone()),
            OptionsIn::new().return_elements(ReturnElements::HeaderOnly),
        );
        let envelope = self.query_with(&descriptor, deadline).await?;
        decode_header(&envelope, identity)
    }

    /// Streams a log chunk by chunk.
    ///
    /// The header is read first; data reads then follow lazily as the stream
    /// is polled. Cancelling `deadline`'s token ends the stream.
    pub async fn stream_log(
        &self,
        identity: &ObjectIdentity,
        range: LogRange,
        deadline: Deadline,
    ) -> WitsmlResult<LogStream<'_, T>> {
        let header = self.log_header(identity, &deadline).await?;
        let cursor = LogCursor::from_header(&header, range)?;
        self.resume_log(cursor, deadline).await
    }

    /// Continues a log read from a cursor snapshot.
    pub async fn resume_log(
        &self,
        cursor: LogCursor,
        deadline: Deadline,
    ) -> WitsmlResult<LogStream<'_, T>> {
        let caps = self.capabilities_with(&deadline).await?;
        let cap = Paginator::effective_cap(
            self.pagination.max_rows_per_request,
            caps.max_data_nodes(ObjectType::Log),
        );
        tracing::debug!(
            identity = %cursor.identity,
            row_cap = cap,
            rows_read = cursor.rows_read,
            "Starting log stream"
        );
        Ok(LogStream::new(
            &self.executor,
            &self.builder,
            caps.version().to_string(),
            Some(self.capabilities_in()?),
            deadline,
            self.request_timeout,
            Paginator::new(cursor, cap),
        ))
    }

    /// Reads a whole log range into memory.
    ///
    /// Fails with `ResultTooLarge` past the configured row or byte bound.
    pub async fn read_log(&self, identity: &ObjectIdentity, range: LogRange) -> WitsmlResult<Log> {
        self.read_log_with(identity, range, Deadline::none()).await
    }

    /// [`read_log`](Self::read_log) with a caller deadline.
    pub async fn read_log_with(
        &self,
        identity: &ObjectIdentity,
        range: LogRange,
        deadline: Deadline,
    ) -> WitsmlResult<Log> {
        let header = self.log_header(identity, &deadline).await?;
        let cursor = LogCursor::from_header(&header, range)?;
        let stream = self.resume_log(cursor, deadline).await?;
        stream.collect_into(header, &self.pagination).await
    }

    fn capabilities_in(&self) -> WitsmlResult<String> {
        codec::encode(self.negotiator.client())
    }
}

impl<T: WitsmlTransport> std::fmt::Debug for WitsmlClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WitsmlClient")
            .field("host", &self.executor.transport().host())
            .field("negotiator", &self.negotiator)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
