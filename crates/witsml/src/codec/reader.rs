// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tolerant navigation helpers over `roxmltree` documents.
//!
//! Elements are matched by local name so prefixed and default-namespace
//! payloads decode the same way. Unknown elements are skipped.

use roxmltree::{Document, Node};

use crate::error::{CodecError, WitsmlResult};
use crate::types::{Measure, MeasureValue, WireEnum};

use super::parse_f64;

/// Parses a document, mapping parse failures to `MalformedResponse`.
pub fn parse_document(xml: &str) -> WitsmlResult<Document<'_>> {
    Document::parse(xml).map_err(|e| CodecError::malformed("document", e.to_string()).into())
}

/// Returns `true` if the node is an element with the given local name.
pub fn is_element(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// First child element with the given local name.
pub fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| is_element(n, name))
}

/// All child elements with the given local name.
pub fn children<'a, 'i: 'a>(
    node: Node<'a, 'i>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children().filter(move |n| is_element(n, name))
}

/// Trimmed text content of a node (empty string for empty elements).
pub fn text_of(node: Node<'_, '_>) -> String {
    node.text().map(|t| t.trim().to_string()).unwrap_or_default()
}

/// Text of a child element.
pub fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name).map(text_of)
}

/// Text of a required child element.
pub fn required_child_text(node: Node<'_, '_>, name: &str) -> WitsmlResult<String> {
    child_text(node, name)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            CodecError::malformed(node.tag_name().name(), format!("missing required <{}>", name))
                .into()
        })
}

/// Attribute value.
pub fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

/// Required attribute value.
pub fn required_attr(node: Node<'_, '_>, name: &str) -> WitsmlResult<String> {
    attr(node, name).ok_or_else(|| {
        CodecError::malformed(node.tag_name().name(), format!("missing required @{}", name)).into()
    })
}

/// Enum value of a child element. Empty text decodes as absent.
pub fn child_enum<E: WireEnum>(node: Node<'_, '_>, name: &str) -> WitsmlResult<Option<E>> {
    match child_text(node, name) {
        Some(text) if !text.is_empty() => E::from_wire(&text).map(Some),
        _ => Ok(None),
    }
}

/// Boolean value of a child element.
pub fn child_bool(node: Node<'_, '_>, name: &str) -> WitsmlResult<Option<bool>> {
    match child_text(node, name).as_deref() {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(CodecError::malformed(name, format!("invalid boolean '{}'", other)).into()),
    }
}

/// Unsigned integer attribute.
pub fn attr_u32(node: Node<'_, '_>, name: &str) -> WitsmlResult<Option<u32>> {
    match node.attribute(name) {
        None => Ok(None),
        Some(text) => text
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| CodecError::malformed(node.tag_name().name(), format!("invalid @{} '{}'", name, text)).into()),
    }
}

/// Decodes a measure element.
///
/// Numeric text becomes a quantity, other text is kept verbatim, empty text
/// yields an empty value.
pub fn measure_of(node: Node<'_, '_>) -> Measure {
    let text = text_of(node);
    let value = if text.is_empty() {
        MeasureValue::Empty
    } else {
        match parse_f64(&text) {
            Some(v) => MeasureValue::Number(v),
            None => MeasureValue::Text(text),
        }
    };
    Measure {
        value,
        uom: attr(node, "uom"),
        datum: attr(node, "datum"),
    }
}

/// Measure of a child element.
pub fn child_measure(node: Node<'_, '_>, name: &str) -> Option<Measure> {
    child(node, name).map(measure_of)
}
