// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built capabilities, objects and configurations.

use std::sync::Arc;
use std::time::Duration;

use witsml::client::WitsmlClient;
use witsml::config::{ClientConfig, PaginationConfig, RetrySettings};
use witsml::metrics::WitsmlMetrics;
use witsml::profile::ServerProfile;
use witsml::types::{
    DataObjectCapability, FunctionCapability, Log, LogCurveInfo, LogIndexDirection, LogIndexType,
    Measure, ObjectIdentity, ServerCapabilities, StoreMethod, Well,
};

use super::mocks::{MockLog, MockWitsmlServer};

// =============================================================================
// Capability Fixtures
// =============================================================================

/// Server capability documents.
pub struct CapabilityFixtures;

impl CapabilityFixtures {
    /// A server supporting the given schema versions and every function.
    pub fn server(versions: &[&str]) -> ServerCapabilities {
        ServerCapabilities {
            api_version: Some("1.4.1".to_string()),
            name: Some("Mock Store".to_string()),
            vendor: Some("Sylvex".to_string()),
            version: Some("1.0".to_string()),
            description: None,
            schema_versions: versions.iter().map(|v| v.to_string()).collect(),
            max_request_latest_values: None,
            functions: Vec::new(),
        }
    }

    /// A 1.4.1.1 server advertising `maxDataNodes` for log reads.
    pub fn with_log_cap(max_data_nodes: u32) -> ServerCapabilities {
        let mut caps = Self::server(&["1.3.1.1", "1.4.1.1"]);
        caps.functions = vec![FunctionCapability {
            name: StoreMethod::GetFromStore.to_string(),
            data_objects: vec![
                DataObjectCapability {
                    name: "well".to_string(),
                    max_data_nodes: None,
                    max_data_points: None,
                },
                DataObjectCapability {
                    name: "log".to_string(),
                    max_data_nodes: Some(max_data_nodes),
                    max_data_points: None,
                },
            ],
        }];
        caps
    }
}

// =============================================================================
// Object Fixtures
// =============================================================================

/// Wells, wellbores and logs.
pub struct ObjectFixtures;

impl ObjectFixtures {
    /// A well with a few header fields.
    pub fn well(uid: &str) -> Well {
        Well {
            identity: ObjectIdentity::well(uid),
            name: Some(format!("Well {}", uid)),
            field: Some("Johan Sverdrup".to_string()),
            country: Some("Norway".to_string()),
            operator: Some("Sylvex".to_string()),
            time_zone: Some("+01:00".to_string()),
            status_well: Some("drilling".to_string()),
            ground_elevation: Some(Measure::new(32.5, "m")),
        }
    }

    /// Identity of the fixture log `uid`.
    pub fn log_identity(uid: &str) -> ObjectIdentity {
        ObjectIdentity::child("w-1", "wb-1", uid)
    }

    /// Header of a depth log with rows `0..rows` (one metre apart).
    pub fn depth_log_header(uid: &str, rows: usize) -> Log {
        Log {
            identity: Self::log_identity(uid),
            name_well: Some("Well w-1".to_string()),
            name_wellbore: Some("Wellbore wb-1".to_string()),
            name: Some(format!("Log {}", uid)),
            index_type: Some(LogIndexType::MeasuredDepth),
            direction: Some(LogIndexDirection::Increasing),
            index_curve: Some("DEPTH".to_string()),
            start_index: Some(Measure::new(0.0, "m")),
            end_index: Some(Measure::new(rows.saturating_sub(1) as f64, "m")),
            curves: vec![
                LogCurveInfo::new("DEPTH", Some("m")),
                LogCurveInfo::new("GR", Some("gAPI")),
                LogCurveInfo::new("ROP", Some("m/h")),
            ],
            ..Default::default()
        }
    }

    /// A depth log held by the mock store.
    pub fn depth_log(uid: &str, rows: usize) -> MockLog {
        MockLog {
            header: Self::depth_log_header(uid, rows),
            mnemonics: vec!["DEPTH".into(), "GR".into(), "ROP".into()],
            units: vec!["m".into(), "gAPI".into(), "m/h".into()],
            rows: (0..rows)
                .map(|i| format!("{},{},{}", i, 40 + i % 60, 12 + i % 7))
                .collect(),
        }
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Client configurations.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Profile of the mock store.
    pub fn profile() -> ServerProfile {
        ServerProfile::new("mock", "https://mock-store.test/witsml/store")
            .with_credentials("reader", "secret")
    }

    /// Retry without jitter and with millisecond delays.
    pub fn fast_retry(max_retries: u32) -> RetrySettings {
        RetrySettings {
            max_retries,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
            jitter: 0.0,
        }
    }

    /// Client configuration with fast retries and a row cap.
    pub fn client_config(max_rows_per_request: u32) -> ClientConfig {
        ClientConfig::builder()
            .server(Self::profile())
            .request_timeout(Duration::from_secs(5))
            .retry(Self::fast_retry(3))
            .pagination(PaginationConfig {
                max_rows_per_request,
                ..Default::default()
            })
            .build()
            .expect("fixture config is valid")
    }

    /// YAML document for a full configuration.
    pub fn yaml() -> &'static str {
        r#"
server:
  id: rig-7
  name: Rig 7 store
  url: https://store.example.com/witsml/store
  username: reader
  password: secret
client:
  name: drilling-monitor
  schema_versions: ["1.3.1.1", "1.4.1.1"]
request_timeout: 45s
connect_timeout: 5s
retry:
  max_retries: 5
  initial_delay: 100ms
  max_delay: 2s
pagination:
  max_rows_per_request: 500
  max_total_rows: 200000
option_extensions:
  - vendorCompression
logging:
  level: debug
  format: json
"#
    }

    /// TOML document for a minimal configuration.
    pub fn toml() -> &'static str {
        r#"
request_timeout = "20s"

[server]
id = "lab"
url = "http://localhost:8080/witsml"

[pagination]
max_rows_per_request = 250
"#
    }
}

// =============================================================================
// Client helpers
// =============================================================================

/// A client on a shared mock store, with unregistered metrics.
pub fn mock_client(
    server: Arc<MockWitsmlServer>,
    config: &ClientConfig,
) -> WitsmlClient<Arc<MockWitsmlServer>> {
    let metrics = WitsmlMetrics::unregistered().expect("metrics");
    WitsmlClient::new(server, config, metrics)
}
