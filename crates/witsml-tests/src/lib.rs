// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # WITSML Integration Tests
//!
//! End-to-end tests of the `witsml` client against an in-process mock
//! store.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Pre-built logs, wells, capabilities and configurations
//!   - `mocks`: [`MockWitsmlServer`](common::mocks::MockWitsmlServer), a
//!     scriptable `WitsmlTransport`
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p witsml-tests
//!
//! # Run specific test suite
//! cargo test -p witsml-tests --test integration_client
//! cargo test -p witsml-tests --test integration_paginator
//! cargo test -p witsml-tests --test integration_codec
//! cargo test -p witsml-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Client Tests (`integration_client.rs`)
//! - Capability negotiation and version selection
//! - Retry of reads, single-shot mutations
//! - Metrics and statistics
//!
//! ### Paginator Tests (`integration_paginator.rs`)
//! - Chunked log reads and row caps
//! - Cursor snapshots, resume and invalidation
//! - Cancellation and result bounds
//!
//! ### Codec Tests (`integration_codec.rs`)
//! - Object documents, measures and enumerations
//! - SOAP envelopes
//!
//! ### Config Tests (`integration_config.rs`)
//! - YAML and TOML files
//! - Environment overrides

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
}
