// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed WITSML data objects.
//!
//! Only the shapes the client reads itself are mapped: [`Well`],
//! [`Wellbore`] and [`Log`]. Other object types travel as raw XML inside the
//! result envelope.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use super::enums::{LogDataType, LogIndexDirection, LogIndexType, ObjectType};
use super::measure::Measure;
use crate::error::{CodecError, WitsmlResult};

// =============================================================================
// ObjectIdentity
// =============================================================================

/// Identity of a data object: its uid and the uids of its parents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectIdentity {
    /// `uidWell`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid_well: Option<String>,
    /// `uidWellbore`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid_wellbore: Option<String>,
    /// `uid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl ObjectIdentity {
    /// Identity of a well.
    pub fn well(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            ..Default::default()
        }
    }

    /// Identity of a wellbore.
    pub fn wellbore(uid_well: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            uid_well: Some(uid_well.into()),
            uid_wellbore: None,
            uid: Some(uid.into()),
        }
    }

    /// Identity of an object below a wellbore.
    pub fn child(
        uid_well: impl Into<String>,
        uid_wellbore: impl Into<String>,
        uid: impl Into<String>,
    ) -> Self {
        Self {
            uid_well: Some(uid_well.into()),
            uid_wellbore: Some(uid_wellbore.into()),
            uid: Some(uid.into()),
        }
    }

    /// Returns the identity attributes in document order for an object type.
    pub fn attributes(&self, object_type: ObjectType) -> Vec<(&'static str, &str)> {
        let depth = object_type.parent_depth();
        let mut attrs = Vec::with_capacity(3);
        if depth >= 1 {
            if let Some(uid) = &self.uid_well {
                attrs.push(("uidWell", uid.as_str()));
            }
        }
        if depth >= 2 {
            if let Some(uid) = &self.uid_wellbore {
                attrs.push(("uidWellbore", uid.as_str()));
            }
        }
        if let Some(uid) = &self.uid {
            attrs.push(("uid", uid.as_str()));
        }
        attrs
    }
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.uid_well, &self.uid_wellbore, &self.uid]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        f.write_str(&parts.join("/"))
    }
}

// =============================================================================
// Well / Wellbore
// =============================================================================

/// A well.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Well {
    /// Identity.
    pub identity: ObjectIdentity,
    /// Human-readable name.
    pub name: Option<String>,
    /// Field name.
    pub field: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Operator.
    pub operator: Option<String>,
    /// Time zone offset (`-06:00`).
    pub time_zone: Option<String>,
    /// POSC well status.
    pub status_well: Option<String>,
    /// Ground level elevation.
    pub ground_elevation: Option<Measure>,
}

/// A wellbore.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wellbore {
    /// Identity.
    pub identity: ObjectIdentity,
    /// Parent well name.
    pub name_well: Option<String>,
    /// Human-readable name.
    pub name: Option<String>,
    /// Operator wellbore number.
    pub number: Option<String>,
    /// Type of wellbore.
    pub type_wellbore: Option<String>,
    /// Whether the wellbore is currently active.
    pub is_active: Option<bool>,
    /// Current measured depth.
    pub md_current: Option<Measure>,
}

// =============================================================================
// Log
// =============================================================================

/// A log: header, curve descriptions and data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Log {
    /// Identity.
    pub identity: ObjectIdentity,
    /// Parent well name.
    pub name_well: Option<String>,
    /// Parent wellbore name.
    pub name_wellbore: Option<String>,
    /// Human-readable name.
    pub name: Option<String>,
    /// Kind of index.
    pub index_type: Option<LogIndexType>,
    /// Index ordering.
    pub direction: Option<LogIndexDirection>,
    /// Mnemonic of the index curve.
    pub index_curve: Option<String>,
    /// First depth index.
    pub start_index: Option<Measure>,
    /// Last depth index.
    pub end_index: Option<Measure>,
    /// First time index.
    pub start_date_time_index: Option<String>,
    /// Last time index.
    pub end_date_time_index: Option<String>,
    /// Curve descriptions.
    pub curves: Vec<LogCurveInfo>,
    /// Data rows.
    pub data: Option<LogData>,
}

impl Log {
    /// Returns the effective index direction (increasing when absent).
    pub fn direction(&self) -> LogIndexDirection {
        self.direction.unwrap_or_default()
    }

    /// Returns the effective index type.
    pub fn index_type(&self) -> LogIndexType {
        self.index_type.unwrap_or(LogIndexType::Unknown)
    }

    /// Returns the index range advertised by the header, if any.
    pub fn index_range(&self) -> WitsmlResult<(Option<LogIndex>, Option<LogIndex>)> {
        if self.index_type().is_time() {
            let start = self
                .start_date_time_index
                .as_deref()
                .map(LogIndex::parse_time)
                .transpose()?;
            let end = self
                .end_date_time_index
                .as_deref()
                .map(LogIndex::parse_time)
                .transpose()?;
            Ok((start, end))
        } else {
            let start = self
                .start_index
                .as_ref()
                .and_then(|m| m.value.as_f64())
                .map(LogIndex::Depth);
            let end = self
                .end_index
                .as_ref()
                .and_then(|m| m.value.as_f64())
                .map(LogIndex::Depth);
            Ok((start, end))
        }
    }

    /// Returns the unit of the depth index, if any.
    pub fn index_uom(&self) -> Option<&str> {
        self.start_index
            .as_ref()
            .or(self.end_index.as_ref())
            .and_then(|m| m.uom.as_deref())
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.rows.len())
    }

    /// Finds a curve by mnemonic.
    pub fn curve(&self, mnemonic: &str) -> Option<&LogCurveInfo> {
        self.curves.iter().find(|c| c.mnemonic == mnemonic)
    }
}

/// Description of one log curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogCurveInfo {
    /// Curve uid.
    pub uid: Option<String>,
    /// Mnemonic.
    pub mnemonic: String,
    /// Unit.
    pub unit: Option<String>,
    /// Null value marker.
    pub null_value: Option<String>,
    /// Data type of the values.
    pub type_log_data: Option<LogDataType>,
    /// Free-text description.
    pub curve_description: Option<String>,
}

impl LogCurveInfo {
    /// Creates a curve description.
    pub fn new(mnemonic: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            uid: None,
            mnemonic: mnemonic.into(),
            unit: unit.map(str::to_string),
            ..Default::default()
        }
    }
}

/// Data rows of a log.
///
/// Rows are kept as the comma-separated text the server returned; the first
/// value of each row is the index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogData {
    /// Column mnemonics.
    pub mnemonic_list: Vec<String>,
    /// Column units.
    pub unit_list: Vec<String>,
    /// Rows.
    pub rows: Vec<String>,
}

impl LogData {
    /// Returns the raw index value of a row.
    pub fn row_index(row: &str) -> &str {
        row.split(',').next().unwrap_or("").trim()
    }

    /// Splits a row into values.
    pub fn row_values(row: &str) -> Vec<&str> {
        row.split(',').map(str::trim).collect()
    }

    /// Approximate in-memory size of the rows in bytes.
    pub fn byte_size(&self) -> usize {
        self.rows.iter().map(String::len).sum()
    }
}

// =============================================================================
// LogIndex
// =============================================================================

/// A position in a log index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LogIndex {
    /// Depth (or other numeric) index.
    Depth(f64),
    /// Time index.
    Time(DateTime<FixedOffset>),
}

impl LogIndex {
    /// Parses a row index value for the given index type.
    pub fn parse(text: &str, index_type: LogIndexType) -> WitsmlResult<Self> {
        if index_type.is_time() {
            Self::parse_time(text)
        } else {
            let value = crate::codec::parse_f64(text)
                .ok_or_else(|| CodecError::malformed("logData", format!("invalid index '{}'", text)))?;
            Ok(Self::Depth(value))
        }
    }

    /// Parses an ISO 8601 timestamp. A missing offset is taken as UTC.
    pub fn parse_time(text: &str) -> WitsmlResult<Self> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::Time(dt));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Self::Time(naive.and_utc().fixed_offset()))
            .map_err(|e| CodecError::malformed("dateTime", format!("'{}': {}", text, e)).into())
    }

    /// Wire text of the index.
    pub fn to_wire_text(&self) -> String {
        match self {
            Self::Depth(v) => crate::codec::format_f64(*v),
            Self::Time(t) => t.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }

    /// Returns `true` for time indexes.
    pub fn is_time(&self) -> bool {
        matches!(self, Self::Time(_))
    }

    /// Compares two indexes along the log direction.
    ///
    /// `Greater` means `self` comes after `other` in reading order.
    /// Mixed kinds compare as `None`.
    pub fn cmp_along(&self, other: &Self, direction: LogIndexDirection) -> Option<Ordering> {
        let natural = match (self, other) {
            (Self::Depth(a), Self::Depth(b)) => a.partial_cmp(b),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }?;
        Some(match direction {
            LogIndexDirection::Increasing => natural,
            LogIndexDirection::Decreasing => natural.reverse(),
        })
    }

    /// Returns `true` if `self` comes strictly after `other`.
    pub fn is_after(&self, other: &Self, direction: LogIndexDirection) -> bool {
        self.cmp_along(other, direction) == Some(Ordering::Greater)
    }
}

impl fmt::Display for LogIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire_text())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_attributes_follow_depth() {
        let id = ObjectIdentity::child("w1", "wb1", "log1");
        assert_eq!(
            id.attributes(ObjectType::Log),
            vec![("uidWell", "w1"), ("uidWellbore", "wb1"), ("uid", "log1")]
        );
        assert_eq!(id.attributes(ObjectType::Well), vec![("uid", "log1")]);
        assert_eq!(id.to_string(), "w1/wb1/log1");
    }

    #[test]
    fn test_log_index_ordering() {
        let a = LogIndex::Depth(100.0);
        let b = LogIndex::Depth(200.0);
        assert!(b.is_after(&a, LogIndexDirection::Increasing));
        assert!(a.is_after(&b, LogIndexDirection::Decreasing));
        assert!(!a.is_after(&a, LogIndexDirection::Increasing));
    }

    #[test]
    fn test_time_index_parse() {
        let with_offset = LogIndex::parse_time("2024-03-01T10:00:00.000Z").unwrap();
        let naive = LogIndex::parse_time("2024-03-01T10:00:00").unwrap();
        assert_eq!(with_offset, naive);
        assert!(LogIndex::parse_time("yesterday").is_err());

        let later = LogIndex::parse("2024-03-01T10:00:05Z", LogIndexType::DateTime).unwrap();
        assert!(later.is_after(&naive, LogIndexDirection::Increasing));
    }

    #[test]
    fn test_log_data_helpers() {
        assert_eq!(LogData::row_index(" 1000.5, 3.2,7"), "1000.5");
        assert_eq!(LogData::row_values("1,2, 3"), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_index_range_from_header() {
        let log = Log {
            index_type: Some(LogIndexType::MeasuredDepth),
            start_index: Some(Measure::new(0.0, "m")),
            end_index: Some(Measure::new(9999.0, "m")),
            ..Default::default()
        };
        let (start, end) = log.index_range().unwrap();
        assert_eq!(start, Some(LogIndex::Depth(0.0)));
        assert_eq!(end, Some(LogIndex::Depth(9999.0)));
        assert_eq!(log.index_uom(), Some("m"));
    }
}
