// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Abstract transport layer for WITSML Store calls.
//!
//! This module defines the [`WitsmlTransport`] trait: one request in, one
//! reply out. Retry, deadlines and instrumentation live above it in the
//! executor, so an implementation performs exactly one exchange per call.

use async_trait::async_trait;

use crate::error::WitsmlResult;
use crate::types::{ObjectType, StoreMethod};

// =============================================================================
// WireRequest
// =============================================================================

/// One Store API call, ready to be put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    /// Store method.
    pub method: StoreMethod,
    /// `WMLtypeIn` for the data methods.
    pub object_type: Option<ObjectType>,
    /// `QueryIn` / `XMLin` document.
    pub query: Option<String>,
    /// `OptionsIn` string.
    pub options: String,
    /// `CapabilitiesIn` document.
    pub capabilities: Option<String>,
    /// `ReturnValueIn` for `WMLS_GetBaseMsg`.
    pub return_value_in: Option<i16>,
}

impl WireRequest {
    /// Creates a request with empty parameters.
    pub fn new(method: StoreMethod) -> Self {
        Self {
            method,
            object_type: None,
            query: None,
            options: String::new(),
            capabilities: None,
            return_value_in: None,
        }
    }

    /// `WMLS_GetCap` carrying the client capabilities.
    pub fn get_cap(capabilities: String, options: impl Into<String>) -> Self {
        Self {
            capabilities: Some(capabilities),
            options: options.into(),
            ..Self::new(StoreMethod::GetCap)
        }
    }

    /// A data method call.
    pub fn data(
        method: StoreMethod,
        object_type: ObjectType,
        query: String,
        options: impl Into<String>,
    ) -> Self {
        Self {
            object_type: Some(object_type),
            query: Some(query),
            options: options.into(),
            ..Self::new(method)
        }
    }

    /// `WMLS_GetBaseMsg` for a result code.
    pub fn get_base_msg(code: i16) -> Self {
        Self {
            return_value_in: Some(code),
            ..Self::new(StoreMethod::GetBaseMsg)
        }
    }

    /// Sets the `CapabilitiesIn` document.
    pub fn with_capabilities(mut self, capabilities: Option<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Object type label for logs and metrics.
    pub fn object_label(&self) -> &'static str {
        use crate::types::WireEnum;
        self.object_type.map(|t| t.to_wire()).unwrap_or("none")
    }
}

// =============================================================================
// WireReply
// =============================================================================

/// Raw reply of one Store call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireReply {
    /// `Result`. `WMLS_GetVersion` and `WMLS_GetBaseMsg` report `1`.
    pub result_code: i32,
    /// `XMLout` / `CapabilitiesOut`, or the string result of the
    /// text-returning methods.
    pub payload: Option<String>,
    /// `SuppMsgOut`.
    pub message: Option<String>,
}

impl WireReply {
    /// Creates a reply with a result code and payload.
    pub fn new(result_code: i32, payload: Option<String>) -> Self {
        Self {
            result_code,
            payload,
            message: None,
        }
    }

    /// Sets the supplementary message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// =============================================================================
// WitsmlTransport Trait
// =============================================================================

/// Abstract transport for WITSML Store calls.
///
/// # Implementors
///
/// - [`SoapTransport`](super::soap::SoapTransport): SOAP 1.1 over HTTP(S)
///
/// Implementations must be `Send + Sync`; the client shares one transport
/// between concurrent callers.
///
/// # Errors
///
/// Failures where no reply bytes were received must be reported as
/// `TransportError::ConnectionFailed` or `TransportError::ConnectionReset`:
/// only those are treated as transient.
#[async_trait]
pub trait WitsmlTransport: Send + Sync {
    /// Performs one exchange.
    async fn send(&self, request: &WireRequest) -> WitsmlResult<WireReply>;

    /// Host label used in metrics.
    fn host(&self) -> &str;
}

#[async_trait]
impl<T: WitsmlTransport + ?Sized> WitsmlTransport for std::sync::Arc<T> {
    async fn send(&self, request: &WireRequest) -> WitsmlResult<WireReply> {
        (**self).send(request).await
    }

    fn host(&self) -> &str {
        (**self).host()
    }
}
