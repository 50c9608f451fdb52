// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bidirectional mapping between WITSML enumeration literals and Rust enums.
//!
//! Every mapped enum carries a static table declared next to it by the
//! [`wire_enum!`] macro. Lookups are exact and case-sensitive: `"Header-Only"`
//! is not `"header-only"`.
//!
//! ```
//! use witsml::types::{ReturnElements, WireEnum};
//!
//! let re = ReturnElements::from_wire("header-only").unwrap();
//! assert_eq!(re, ReturnElements::HeaderOnly);
//! assert_eq!(re.to_wire(), "header-only");
//! assert!(ReturnElements::from_wire("headers-only").is_err());
//! ```

use std::fmt;

use crate::error::{CodecError, WitsmlError};

// =============================================================================
// EnumEntry / WireEnum
// =============================================================================

/// One row of an enum mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumEntry<E: 'static> {
    /// Rust value.
    pub value: E,
    /// Literal used on the wire.
    pub wire: &'static str,
    /// Rust variant name.
    pub name: &'static str,
    /// Human-readable label, when one is declared.
    pub label: Option<&'static str>,
}

/// An enum with a static wire mapping table.
pub trait WireEnum: Copy + PartialEq + fmt::Debug + 'static {
    /// Type name used in error messages.
    const TYPE_NAME: &'static str;

    /// Returns the mapping table.
    fn table() -> &'static [EnumEntry<Self>];

    /// Returns the wire literal.
    fn to_wire(&self) -> &'static str;

    /// Looks up a wire literal.
    fn from_wire(literal: &str) -> Result<Self, WitsmlError> {
        Self::table()
            .iter()
            .find(|entry| entry.wire == literal)
            .map(|entry| entry.value)
            .ok_or_else(|| CodecError::unknown_literal(literal, Self::TYPE_NAME).into())
    }

    /// Returns the human label, or the variant name when no label exists.
    fn describe(&self) -> &'static str {
        Self::table()
            .iter()
            .find(|entry| entry.value == *self)
            .map(|entry| entry.label.unwrap_or(entry.name))
            .unwrap_or(Self::TYPE_NAME)
    }

    /// Returns every declared value in table order.
    fn all() -> Vec<Self> {
        Self::table().iter().map(|entry| entry.value).collect()
    }
}

/// Declares an enum together with its wire mapping table.
///
/// Each variant is written as `Variant => "wire literal"` with an optional
/// trailing label: `Variant => "wire", "Label"`.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal $(, $label:literal)?
            );+ $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            const TABLE: &'static [$crate::types::EnumEntry<$name>] = &[
                $(
                    $crate::types::EnumEntry {
                        value: $name::$variant,
                        wire: $wire,
                        name: stringify!($variant),
                        label: $crate::wire_enum!(@label $($label)?),
                    },
                )+
            ];
        }

        impl $crate::types::WireEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn table() -> &'static [$crate::types::EnumEntry<Self>] {
                Self::TABLE
            }

            fn to_wire(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::types::WireEnum::to_wire(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::WitsmlError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                <Self as $crate::types::WireEnum>::from_wire(s)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::types::WireEnum::to_wire(self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
                let literal = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::types::WireEnum>::from_wire(&literal).map_err(::serde::de::Error::custom)
            }
        }
    };
    (@label) => { None };
    (@label $label:literal) => { Some($label) };
}

// =============================================================================
// ObjectType
// =============================================================================

wire_enum! {
    /// WITSML data object types.
    pub enum ObjectType {
        /// Well.
        Well => "well", "Well";
        /// Wellbore.
        Wellbore => "wellbore", "Wellbore";
        /// Log (growing).
        Log => "log", "Log";
        /// Trajectory (growing).
        Trajectory => "trajectory", "Trajectory";
        /// Mud log (growing).
        MudLog => "mudLog", "Mud Log";
        /// Rig.
        Rig => "rig", "Rig";
        /// Risk.
        Risk => "risk", "Risk";
        /// Message.
        Message => "message", "Message";
        /// BHA run.
        BhaRun => "bhaRun", "BHA Run";
        /// Tubular.
        Tubular => "tubular", "Tubular";
        /// Wellbore geometry.
        WbGeometry => "wbGeometry", "Wellbore Geometry";
        /// Formation marker.
        FormationMarker => "formationMarker", "Formation Marker";
        /// Change log.
        ChangeLog => "changeLog", "Change Log";
        /// Attachment.
        Attachment => "attachment", "Attachment";
    }
}

impl ObjectType {
    /// Returns the plural root element name (`wells`, `trajectorys` ...).
    pub fn plural(&self) -> String {
        format!("{}s", self.to_wire())
    }

    /// Returns `true` for growing objects read incrementally.
    pub fn is_growing(&self) -> bool {
        matches!(self, Self::Log | Self::Trajectory | Self::MudLog)
    }

    /// Number of parent uid attributes (`uidWell`, `uidWellbore`) the object
    /// carries.
    pub fn parent_depth(&self) -> usize {
        match self {
            Self::Well => 0,
            Self::Wellbore => 1,
            _ => 2,
        }
    }
}

// =============================================================================
// ReturnElements
// =============================================================================

wire_enum! {
    /// Values of the `returnElements` option.
    pub enum ReturnElements {
        /// Every element.
        All => "all";
        /// Identity attributes and names only.
        IdOnly => "id-only";
        /// Growing-object header without data.
        HeaderOnly => "header-only";
        /// Growing-object data without header.
        DataOnly => "data-only";
        /// Trajectory station locations only.
        StationLocationOnly => "station-location-only";
        /// Latest change only (changeLog).
        LatestChangeOnly => "latest-change-only";
        /// Elements present in the query template.
        Requested => "requested";
    }
}

impl Default for ReturnElements {
    fn default() -> Self {
        Self::Requested
    }
}

// =============================================================================
// StoreMethod
// =============================================================================

/// Base of the SOAPAction header value.
pub const SOAP_ACTION_BASE: &str = "http://www.witsml.org/action/120/Store.";

wire_enum! {
    /// WITSML Store API methods.
    pub enum StoreMethod {
        /// Capability exchange.
        GetCap => "WMLS_GetCap", "Get Capabilities";
        /// Data schema versions supported by the server.
        GetVersion => "WMLS_GetVersion", "Get Version";
        /// Text of a result code.
        GetBaseMsg => "WMLS_GetBaseMsg", "Get Base Message";
        /// Query.
        GetFromStore => "WMLS_GetFromStore", "Get From Store";
        /// Insert.
        AddToStore => "WMLS_AddToStore", "Add To Store";
        /// Update.
        UpdateInStore => "WMLS_UpdateInStore", "Update In Store";
        /// Delete.
        DeleteFromStore => "WMLS_DeleteFromStore", "Delete From Store";
    }
}

impl StoreMethod {
    /// Returns `true` for methods that never modify the store.
    ///
    /// Only these methods are eligible for automatic retry.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::GetCap | Self::GetVersion | Self::GetBaseMsg | Self::GetFromStore
        )
    }

    /// Returns the `SOAPAction` header value.
    pub fn soap_action(&self) -> String {
        format!("{}{}", SOAP_ACTION_BASE, self.to_wire())
    }

    /// Returns `true` for the four data methods taking `WMLtypeIn`.
    pub fn is_data_method(&self) -> bool {
        matches!(
            self,
            Self::GetFromStore | Self::AddToStore | Self::UpdateInStore | Self::DeleteFromStore
        )
    }

    /// Name of the request parameter carrying the XML document.
    pub fn query_param(&self) -> Option<&'static str> {
        match self {
            Self::GetFromStore | Self::DeleteFromStore => Some("QueryIn"),
            Self::AddToStore | Self::UpdateInStore => Some("XMLin"),
            Self::GetCap | Self::GetVersion | Self::GetBaseMsg => None,
        }
    }

    /// Returns `true` when the response carries an `XMLout` document.
    pub fn returns_xml(&self) -> bool {
        matches!(self, Self::GetFromStore)
    }

    /// Returns `true` when the result is a string rather than a result code.
    pub fn returns_text(&self) -> bool {
        matches!(self, Self::GetVersion | Self::GetBaseMsg)
    }
}

// =============================================================================
// Log enums
// =============================================================================

wire_enum! {
    /// Kind of index of a log.
    pub enum LogIndexType {
        /// Timestamp.
        DateTime => "date time", "Date Time";
        /// Elapsed time.
        ElapsedTime => "elapsed time", "Elapsed Time";
        /// Generic length.
        Length => "length", "Length";
        /// Measured depth.
        MeasuredDepth => "measured depth", "Measured Depth";
        /// True vertical depth.
        VerticalDepth => "vertical depth", "Vertical Depth";
        /// Other.
        Other => "other";
        /// Unknown.
        Unknown => "unknown";
    }
}

impl LogIndexType {
    /// Returns `true` when index values are timestamps.
    pub fn is_time(&self) -> bool {
        matches!(self, Self::DateTime)
    }
}

wire_enum! {
    /// Ordering of log index values.
    pub enum LogIndexDirection {
        /// Values grow.
        Increasing => "increasing", "Increasing";
        /// Values shrink.
        Decreasing => "decreasing", "Decreasing";
    }
}

impl Default for LogIndexDirection {
    fn default() -> Self {
        Self::Increasing
    }
}

wire_enum! {
    /// Data type of a log curve.
    pub enum LogDataType {
        /// Timestamp.
        DateTime => "date time", "Date Time";
        /// Floating point.
        Double => "double", "Double";
        /// Integer.
        Long => "long", "Long";
        /// Free text.
        Text => "string", "String";
        /// Unknown.
        Unknown => "unknown";
    }
}

// =============================================================================
// OptionKey
// =============================================================================

wire_enum! {
    /// Standard OptionsIn keywords.
    pub enum OptionKey {
        /// `returnElements`.
        ReturnElements => "returnElements";
        /// `maxReturnNodes`.
        MaxReturnNodes => "maxReturnNodes";
        /// `requestLatestValues`.
        RequestLatestValues => "requestLatestValues";
        /// `requestObjectSelectionCapability`.
        RequestObjectSelectionCapability => "requestObjectSelectionCapability";
        /// `requestPrivateGroupOnly`.
        RequestPrivateGroupOnly => "requestPrivateGroupOnly";
        /// `dataVersion`.
        DataVersion => "dataVersion";
        /// `compressionMethod`.
        CompressionMethod => "compressionMethod";
        /// `cascadedDelete`.
        CascadedDelete => "cascadedDelete";
    }
}

// =============================================================================
// Tests
// =============================================================================
