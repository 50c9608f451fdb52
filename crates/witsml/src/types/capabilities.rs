// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client and server capability documents and version selection.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::enums::{ObjectType, StoreMethod};

/// API version of the capability documents.
pub const API_VERSION: &str = "1.4.1";

// =============================================================================
// ClientCapabilities
// =============================================================================

/// What the client tells the server about itself (`capClient`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCapabilities {
    /// Client product name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Vendor.
    #[serde(default)]
    pub vendor: Option<String>,
    /// Client software version.
    #[serde(default)]
    pub version: Option<String>,
    /// Supported data schema versions, highest first.
    pub schema_versions: Vec<String>,
}

impl ClientCapabilities {
    /// Creates client capabilities. Versions are ordered highest first.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema_versions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut versions: Vec<String> = schema_versions.into_iter().map(Into::into).collect();
        sort_versions_desc(&mut versions);
        Self {
            name: name.into(),
            description: description.into(),
            vendor: None,
            version: Some(crate::VERSION.to_string()),
            schema_versions: versions,
        }
    }
}

// =============================================================================
// ServerCapabilities
// =============================================================================

/// What the server advertises (`capServer`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// API version of the document.
    pub api_version: Option<String>,
    /// Server product name.
    pub name: Option<String>,
    /// Vendor.
    pub vendor: Option<String>,
    /// Server software version.
    pub version: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Supported data schema versions.
    pub schema_versions: Vec<String>,
    /// Maximum number of latest values per curve.
    pub max_request_latest_values: Option<u32>,
    /// Supported functions.
    pub functions: Vec<FunctionCapability>,
}

impl ServerCapabilities {
    /// Finds the function entry for a method.
    pub fn function(&self, method: StoreMethod) -> Option<&FunctionCapability> {
        self.functions.iter().find(|f| f.name == method.to_string())
    }

    /// Returns `true` if the server advertises the method for the object type.
    ///
    /// A server that lists no functions at all is treated as supporting
    /// everything.
    pub fn supports(&self, method: StoreMethod, object_type: ObjectType) -> bool {
        if self.functions.is_empty() {
            return true;
        }
        self.function(method)
            .map(|f| f.data_object(object_type).is_some() || f.data_objects.is_empty())
            .unwrap_or(false)
    }

    /// `maxDataNodes` for the method and object type, when advertised.
    pub fn max_data_nodes(&self, method: StoreMethod, object_type: ObjectType) -> Option<u32> {
        self.function(method)?.data_object(object_type)?.max_data_nodes
    }

    /// `maxDataPoints` for the method and object type, when advertised.
    pub fn max_data_points(&self, method: StoreMethod, object_type: ObjectType) -> Option<u32> {
        self.function(method)?.data_object(object_type)?.max_data_points
    }
}

/// A function entry of `capServer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCapability {
    /// Method name (`WMLS_GetFromStore`).
    pub name: String,
    /// Data objects the method accepts.
    pub data_objects: Vec<DataObjectCapability>,
}

impl FunctionCapability {
    /// Finds a data object entry.
    pub fn data_object(&self, object_type: ObjectType) -> Option<&DataObjectCapability> {
        self.data_objects
            .iter()
            .find(|d| d.name == object_type.to_string())
    }
}

/// A data object entry of a `capServer` function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataObjectCapability {
    /// Object type literal.
    pub name: String,
    /// Maximum data nodes (rows) per response.
    pub max_data_nodes: Option<u32>,
    /// Maximum data points (values) per response.
    pub max_data_points: Option<u32>,
}

// =============================================================================
// NegotiatedCapabilities
// =============================================================================

/// Outcome of a successful capability exchange. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiatedCapabilities {
    /// Client side.
    pub client: ClientCapabilities,
    /// Server side.
    pub server: ServerCapabilities,
    /// Selected data schema version.
    pub version: String,
}

impl NegotiatedCapabilities {
    /// Selected data schema version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Row cap advertised by the server for growing-object reads.
    pub fn max_data_nodes(&self, object_type: ObjectType) -> Option<u32> {
        self.server
            .max_data_nodes(StoreMethod::GetFromStore, object_type)
    }
}

// =============================================================================
// Version selection
// =============================================================================

fn version_parts(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0))
        .collect()
}

/// Compares dotted version strings numerically (`1.10` > `1.9`).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (pa, pb) = (version_parts(a), version_parts(b));
    let len = pa.len().max(pb.len());
    for i in 0..len {
        let (x, y) = (pa.get(i).copied().unwrap_or(0), pb.get(i).copied().unwrap_or(0));
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Sorts versions highest first and removes duplicates.
pub fn sort_versions_desc(versions: &mut Vec<String>) {
    versions.retain(|v| !v.trim().is_empty());
    for v in versions.iter_mut() {
        *v = v.trim().to_string();
    }
    versions.sort_by(|a, b| compare_versions(b, a));
    versions.dedup();
}

/// Picks the first client version (highest preferred) the server supports.
pub fn select_version(client: &[String], server: &[String]) -> Option<String> {
    client
        .iter()
        .find(|cv| server.iter().any(|sv| sv.trim() == cv.as_str()))
        .cloned()
}

// =============================================================================
// Tests
// =============================================================================
