// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # witsml
//!
//! Client for the WITSML 1.3.1/1.4.1 Store API (SOAP over HTTP).
//!
//! This crate provides:
//!
//! - **Capability negotiation**: one `WMLS_GetCap` per client, shared by
//!   concurrent callers, picking the highest common schema version
//! - **Typed codec**: wells, wellbores and logs to and from the `1series`
//!   XML schema, with measures, datums and wire enumerations
//! - **Query building**: per-object templates, filters, requested fields and
//!   validated `OptionsIn` strings
//! - **Execution**: deadlines, cancellation, retry of read-only calls and
//!   Prometheus instrumentation
//! - **Growing objects**: chunked log reads with restartable cursors
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        WitsmlClient                             │
//! └─────────────────────────────────────────────────────────────────┘
//!          │               │                 │               │
//!          ▼               ▼                 ▼               ▼
//!    Negotiator     RequestBuilder      LogStream         codec
//!          │               │                 │
//!          └───────────────┴────────┬────────┘
//!                                   ▼
//!                      Executor ── WitsmlMetrics
//!                                   │
//!                                   ▼
//!                 WitsmlTransport ── SoapTransport
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use witsml::client::{LogRange, WitsmlClient};
//! use witsml::config::ClientConfig;
//! use witsml::profile::ServerProfile;
//! use witsml::types::ObjectIdentity;
//!
//! let config = ClientConfig::builder()
//!     .server(
//!         ServerProfile::new("rig-7", "https://store.example.com/witsml/store")
//!             .with_credentials("reader", "secret"),
//!     )
//!     .build()?;
//! let client = WitsmlClient::from_config(config, &prometheus::Registry::new())?;
//!
//! let log = client
//!     .read_log(&ObjectIdentity::child("w1", "wb1", "gr-log"), LogRange::all())
//!     .await?;
//! println!("{} rows", log.row_count());
//! ```
//!
//! ### Error Handling
//!
//! ```rust,ignore
//! use witsml::error::WitsmlResult;
//!
//! fn report(result: WitsmlResult<()>) {
//!     if let Err(error) = result {
//!         if let Some(code) = error.result_code() {
//!             println!("server rejected the call with {}", code);
//!         }
//!         for hint in error.recovery_hints() {
//!             println!("Hint: {}", hint);
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod profile;
pub mod types;

// =============================================================================
// Re-exports - Error Module
// =============================================================================

pub use error::{
    // Main error type
    WitsmlError,
    WitsmlResult,
    // Error categories
    CodecError,
    ConfigurationError,
    PaginationError,
    RequestError,
    ServerError,
    TimeoutError,
    TransportError,
    // Error metadata
    ErrorCode,
    ErrorSeverity,
};

// =============================================================================
// Re-exports - Types Module
// =============================================================================

pub use types::{
    // Enumerations
    LogIndexDirection,
    LogIndexType,
    ObjectType,
    OptionKey,
    ReturnElements,
    StoreMethod,
    WireEnum,
    // Values and objects
    Log,
    LogCurveInfo,
    LogData,
    LogIndex,
    Measure,
    ObjectIdentity,
    Well,
    Wellbore,
    // Capabilities
    ClientCapabilities,
    NegotiatedCapabilities,
    ServerCapabilities,
};

// =============================================================================
// Re-exports - Client Module
// =============================================================================

pub use client::{
    // Client
    WitsmlClient,
    ClientStats,
    StatsSnapshot,
    Deadline,
    ResultEnvelope,
    // Queries
    OptionsIn,
    QueryTemplate,
    // Growing objects
    LogChunk,
    LogCursor,
    LogRange,
    LogStream,
    // Transport
    SoapTransport,
    WireReply,
    WireRequest,
    WitsmlTransport,
    // Retry
    RetryConfig,
    RetryStrategy,
    ExponentialBackoff,
};

pub use config::{ClientConfig, ConfigLoader};
pub use metrics::WitsmlMetrics;
pub use profile::{ProfileStore, ServerProfile};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
