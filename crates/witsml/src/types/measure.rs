// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Measures: a value with a unit of measure and an optional datum.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::parse_f64;
use crate::error::{CodecError, WitsmlResult};

// =============================================================================
// MeasureValue
// =============================================================================

/// Value part of a measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureValue {
    /// A quantity.
    Number(f64),
    /// A textual value (enumerations, free text). Never empty, never
    /// number-like and without surrounding whitespace; such text reads
    /// back as a different value.
    Text(String),
    /// No value. Used by request templates to ask for the element.
    Empty,
}

impl MeasureValue {
    /// Returns the numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` if this is a quantity.
    pub fn is_quantity(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
            Self::Empty => Ok(()),
        }
    }
}

// =============================================================================
// Measure
// =============================================================================

/// A value with unit of measure and optional datum reference.
///
/// Equality is structural. A quantity must carry a `uom`; only the
/// request-only [`Measure::placeholder`] may omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// The value.
    pub value: MeasureValue,
    /// Unit of measure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    /// Datum the value is referenced to (`KB`, `SL` ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,
}

impl Measure {
    /// Creates a quantity measure.
    pub fn new(value: f64, uom: impl Into<String>) -> Self {
        Self {
            value: MeasureValue::Number(value),
            uom: Some(uom.into()),
            datum: None,
        }
    }

    /// Creates a textual measure. See [`MeasureValue::Text`] for the text
    /// accepted by [`Measure::validate`].
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: MeasureValue::Text(value.into()),
            uom: None,
            datum: None,
        }
    }

    /// Creates an empty measure used to request the element in a query.
    pub fn placeholder() -> Self {
        Self {
            value: MeasureValue::Empty,
            uom: None,
            datum: None,
        }
    }

    /// Sets the datum.
    pub fn with_datum(mut self, datum: impl Into<String>) -> Self {
        self.datum = Some(datum.into());
        self
    }

    /// Returns `true` for a request-only placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.value, MeasureValue::Empty)
    }

    /// Checks that the measure decodes back to itself: a quantity carries a
    /// `uom`, a text value is not empty, padded or number-like.
    pub fn validate(&self, element: &str) -> WitsmlResult<()> {
        let invalid = |reason: &str| -> WitsmlResult<()> {
            Err(CodecError::InvalidMeasure {
                element: element.to_string(),
                reason: reason.to_string(),
            }
            .into())
        };
        match &self.value {
            MeasureValue::Number(_) if self.uom.as_deref().map_or(true, str::is_empty) => {
                invalid("quantity without uom")
            }
            MeasureValue::Text(text) if text.trim().is_empty() => invalid("empty text value"),
            MeasureValue::Text(text) if text.trim() != text => {
                invalid("text value with surrounding whitespace")
            }
            MeasureValue::Text(text) if parse_f64(text).is_some() => {
                invalid("number-like text value, use a quantity")
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(uom) = &self.uom {
            write!(f, " {}", uom)?;
        }
        if let Some(datum) = &self.datum {
            write!(f, " ({})", datum)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
