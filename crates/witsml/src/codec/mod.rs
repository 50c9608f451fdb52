// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! XML codec for WITSML documents.
//!
//! Encoding goes through [`XmlWriter`] (quick-xml), decoding through
//! `roxmltree` navigation helpers in [`reader`].
//!
//! # Rules
//!
//! - No XML declaration; attributes precede child elements; fields are
//!   written in schema order.
//! - `None` fields are omitted, `Some("")` fields become empty elements so
//!   request templates can ask for them.
//! - Unknown elements are ignored when decoding. A missing required field is
//!   a `MalformedResponse` naming the element.
//! - Textual infinities decode to the finite `f64` extremes and infinite
//!   values encode as those extremes.
//!
//! ```
//! use witsml::codec;
//! use witsml::types::Measure;
//!
//! let xml = codec::encode_measure("mdCurrent", &Measure::new(f64::INFINITY, "m")).unwrap();
//! let back = codec::decode_measure(&xml).unwrap();
//! assert_eq!(back.value.as_f64(), Some(f64::MAX));
//! ```

pub mod objects;
pub mod reader;
pub mod writer;

use roxmltree::Node;

use crate::error::{CodecError, WitsmlResult};
use crate::types::{Log, Measure, ObjectIdentity, ObjectType, Well, Wellbore, WireEnum};

pub use writer::XmlWriter;

/// Namespace of WITSML 1.x data objects.
pub const SCHEMA_NAMESPACE: &str = "http://www.witsml.org/schemas/1series";

/// Namespace of the 1.4.1 capability documents.
pub const API_NAMESPACE: &str = "http://www.witsml.org/api/141";

// =============================================================================
// Traits
// =============================================================================

/// A value that writes itself as one XML element.
pub trait ToXml {
    /// Writes the element.
    fn write_xml(&self, writer: &mut XmlWriter) -> WitsmlResult<()>;
}

/// A value decoded from one XML element.
pub trait FromXml: Sized {
    /// Local name of the element.
    const ELEMENT: &'static str;

    /// Decodes from the element node.
    fn from_node(node: Node<'_, '_>) -> WitsmlResult<Self>;
}

/// A WITSML data object with a typed mapping.
pub trait WitsmlDataObject: ToXml + FromXml {
    /// Object type.
    const OBJECT_TYPE: ObjectType;

    /// Identity of the object.
    fn identity(&self) -> &ObjectIdentity;
}

// =============================================================================
// Numbers
// =============================================================================

/// Formats a double for the wire.
///
/// Infinite values are written as `f64::MAX` / `f64::MIN`.
pub fn format_f64(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let value = if value == f64::INFINITY {
        f64::MAX
    } else if value == f64::NEG_INFINITY {
        f64::MIN
    } else {
        value
    };
    let magnitude = value.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-6) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

/// Parses a wire double.
///
/// `INF`, `+INF`, `Infinity` and out-of-range literals clamp to the finite
/// extremes.
pub fn parse_f64(text: &str) -> Option<f64> {
    let value = text.trim().parse::<f64>().ok()?;
    Some(if value == f64::INFINITY {
        f64::MAX
    } else if value == f64::NEG_INFINITY {
        f64::MIN
    } else {
        value
    })
}

// =============================================================================
// Single values
// =============================================================================

/// Encodes a value as a standalone element.
pub fn encode<T: ToXml>(value: &T) -> WitsmlResult<String> {
    let mut writer = XmlWriter::new();
    value.write_xml(&mut writer)?;
    writer.finish()
}

/// Decodes a value from a document whose root is the value's element, or a
/// collection containing it (the first match is returned).
pub fn decode<T: FromXml>(xml: &str) -> WitsmlResult<T> {
    let doc = reader::parse_document(xml)?;
    let root = doc.root_element();
    if reader::is_element(&root, T::ELEMENT) {
        return T::from_node(root);
    }
    match reader::child(root, T::ELEMENT) {
        Some(node) => T::from_node(node),
        None => Err(CodecError::malformed(
            root.tag_name().name(),
            format!("expected <{}>", T::ELEMENT),
        )
        .into()),
    }
}

/// Encodes a standalone measure element.
pub fn encode_measure(element: &str, measure: &Measure) -> WitsmlResult<String> {
    let mut writer = XmlWriter::new();
    writer.measure(element, measure)?;
    writer.finish()
}

/// Decodes a standalone measure element.
pub fn decode_measure(xml: &str) -> WitsmlResult<Measure> {
    let doc = reader::parse_document(xml)?;
    Ok(reader::measure_of(doc.root_element()))
}

// =============================================================================
// Collections
// =============================================================================

/// Encodes objects under their plural root (`<wells version=...>`).
pub fn encode_collection<T: WitsmlDataObject>(items: &[T], version: &str) -> WitsmlResult<String> {
    let mut writer = XmlWriter::new();
    let root = T::OBJECT_TYPE.plural();
    writer.start(&root, &[("xmlns", SCHEMA_NAMESPACE), ("version", version)])?;
    for item in items {
        item.write_xml(&mut writer)?;
    }
    writer.end(&root)?;
    writer.finish()
}

/// Decodes every object of a plural-root document.
///
/// An empty payload decodes as an empty collection.
pub fn decode_collection<T: WitsmlDataObject>(xml: &str) -> WitsmlResult<Vec<T>> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc = reader::parse_document(xml)?;
    let root = doc.root_element();
    let plural = T::OBJECT_TYPE.plural();
    if !reader::is_element(&root, &plural) {
        return Err(CodecError::malformed(
            root.tag_name().name(),
            format!("expected plural root <{}>", plural),
        )
        .into());
    }
    reader::children(root, T::ELEMENT)
        .map(T::from_node)
        .collect()
}

// =============================================================================
// Dynamic shapes
// =============================================================================

/// A decoded object of a dynamically chosen type.
#[derive(Debug, Clone, PartialEq)]
pub enum WitsmlObject {
    /// A well.
    Well(Well),
    /// A wellbore.
    Wellbore(Wellbore),
    /// A log.
    Log(Log),
}

impl WitsmlObject {
    /// Object type of the value.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Well(_) => ObjectType::Well,
            Self::Wellbore(_) => ObjectType::Wellbore,
            Self::Log(_) => ObjectType::Log,
        }
    }

    /// Identity of the value.
    pub fn identity(&self) -> &ObjectIdentity {
        match self {
            Self::Well(v) => &v.identity,
            Self::Wellbore(v) => &v.identity,
            Self::Log(v) => &v.identity,
        }
    }
}

/// Decodes a result payload for an object type chosen at runtime.
///
/// Types without a typed mapping fail with `UnsupportedShape`.
pub fn decode_object(xml: &str, object_type: ObjectType) -> WitsmlResult<Vec<WitsmlObject>> {
    match object_type {
        ObjectType::Well => Ok(decode_collection::<Well>(xml)?
            .into_iter()
            .map(WitsmlObject::Well)
            .collect()),
        ObjectType::Wellbore => Ok(decode_collection::<Wellbore>(xml)?
            .into_iter()
            .map(WitsmlObject::Wellbore)
            .collect()),
        ObjectType::Log => Ok(decode_collection::<Log>(xml)?
            .into_iter()
            .map(WitsmlObject::Log)
            .collect()),
        other => Err(CodecError::unsupported_shape(other.to_wire()).into()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WitsmlError;

    #[test]
    fn test_infinity_encodes_finite_extreme() {
        let text = format_f64(f64::INFINITY);
        assert!(!text.to_ascii_lowercase().contains("inf"));
        assert_eq!(text.parse::<f64>().unwrap(), f64::MAX);
        assert_eq!(format_f64(f64::NEG_INFINITY).parse::<f64>().unwrap(), f64::MIN);
    }

    #[test]
    fn test_textual_infinity_clamps() {
        for literal in ["INF", "+INF", "Infinity", "inf", "1e999"] {
            assert_eq!(parse_f64(literal), Some(f64::MAX), "{}", literal);
        }
        assert_eq!(parse_f64("-INF"), Some(f64::MIN));
        assert_eq!(parse_f64("-1e999"), Some(f64::MIN));
        assert_eq!(parse_f64("abc"), None);
    }

    #[test]
    fn test_plain_numbers_keep_short_form() {
        assert_eq!(format_f64(1000.0), "1000");
        assert_eq!(format_f64(12.5), "12.5");
        assert_eq!(format_f64(-0.25), "-0.25");
    }

    #[test]
    fn test_measure_round_trip() {
        let m = Measure::new(123.25, "ft").with_datum("KB");
        let xml = encode_measure("mdCurrent", &m).unwrap();
        assert_eq!(xml, r#"<mdCurrent uom="ft" datum="KB">123.25</mdCurrent>"#);
        assert_eq!(decode_measure(&xml).unwrap(), m);
    }

    #[test]
    fn test_measure_text_round_trip() {
        for m in [
            Measure::text("unknown"),
            Measure::text("10 m").with_datum("KB"),
            Measure {
                uom: Some("m".to_string()),
                ..Measure::text("not measured")
            },
        ] {
            let xml = encode_measure("x", &m).unwrap();
            assert_eq!(decode_measure(&xml).unwrap(), m);
        }
    }

    #[test]
    fn test_number_like_text_is_not_encoded() {
        let m = Measure {
            uom: Some("m".to_string()),
            ..Measure::text("10")
        };
        let err = encode_measure("x", &m).unwrap_err();
        assert!(matches!(err, WitsmlError::Codec(CodecError::InvalidMeasure { .. })));
        assert!(encode_measure("x", &Measure::new(10.0, "m")).is_ok());
    }

    #[test]
    fn test_unsupported_shape() {
        let err = decode_object("<rigs/>", ObjectType::Rig).unwrap_err();
        assert!(err.to_string().contains("rig"));
    }

    #[test]
    fn test_empty_payload_is_empty_collection() {
        assert!(decode_collection::<Well>("").unwrap().is_empty());
    }
}
