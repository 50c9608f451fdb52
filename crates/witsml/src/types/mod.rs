// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! WITSML domain types.
//!
//! - [`enums`]: wire enumerations and their mapping tables
//! - [`measure`]: value + uom + datum
//! - [`objects`]: identities and typed data objects
//! - [`capabilities`]: capClient/capServer documents and version selection

pub mod capabilities;
pub mod enums;
pub mod measure;
pub mod objects;

pub use capabilities::{
    compare_versions, select_version, ClientCapabilities, DataObjectCapability,
    FunctionCapability, NegotiatedCapabilities, ServerCapabilities, API_VERSION,
};
pub use enums::{
    EnumEntry, LogDataType, LogIndexDirection, LogIndexType, ObjectType, OptionKey,
    ReturnElements, StoreMethod, WireEnum, SOAP_ACTION_BASE,
};
pub use measure::{Measure, MeasureValue};
pub use objects::{LogCurveInfo, LogData, LogIndex, Log, ObjectIdentity, Well, Wellbore};
