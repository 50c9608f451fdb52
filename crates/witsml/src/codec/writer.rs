// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Streaming XML writer on top of `quick-xml`.
//!
//! Output never carries an XML declaration: WITSML query strings are embedded
//! as text in SOAP parameters and several servers reject a nested
//! declaration.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{CodecError, WitsmlResult};
use crate::types::{Measure, MeasureValue, WireEnum};

use super::format_f64;

/// XML writer used by every encoder in this crate.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> WitsmlResult<()> {
        self.inner.write_event(event).map_err(CodecError::encode)?;
        Ok(())
    }

    /// Opens an element with attributes.
    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> WitsmlResult<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.write(Event::Start(start))
    }

    /// Closes an element.
    pub fn end(&mut self, name: &str) -> WitsmlResult<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Writes a self-closing element.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> WitsmlResult<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.write(Event::Empty(start))
    }

    /// Writes escaped character data.
    pub fn text(&mut self, value: &str) -> WitsmlResult<()> {
        self.write(Event::Text(BytesText::new(value)))
    }

    /// Writes `<name attrs>value</name>`, or `<name attrs/>` for an empty value.
    pub fn element(&mut self, name: &str, attrs: &[(&str, &str)], value: &str) -> WitsmlResult<()> {
        if value.is_empty() {
            return self.empty(name, attrs);
        }
        self.start(name, attrs)?;
        self.text(value)?;
        self.end(name)
    }

    /// Writes a text element when the value is present.
    pub fn opt_element(&mut self, name: &str, value: Option<&str>) -> WitsmlResult<()> {
        match value {
            Some(v) => self.element(name, &[], v),
            None => Ok(()),
        }
    }

    /// Writes an enum element when the value is present.
    pub fn opt_enum<E: WireEnum>(&mut self, name: &str, value: Option<E>) -> WitsmlResult<()> {
        self.opt_element(name, value.map(|v| v.to_wire()))
    }

    /// Writes a boolean element when the value is present.
    pub fn opt_bool(&mut self, name: &str, value: Option<bool>) -> WitsmlResult<()> {
        self.opt_element(name, value.map(|v| if v { "true" } else { "false" }))
    }

    /// Writes a measure element (`uom` and `datum` attributes).
    ///
    /// Fails with `InvalidMeasure` for a quantity without unit.
    pub fn measure(&mut self, name: &str, measure: &Measure) -> WitsmlResult<()> {
        measure.validate(name)?;
        let mut attrs: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(uom) = measure.uom.as_deref() {
            attrs.push(("uom", uom));
        }
        if let Some(datum) = measure.datum.as_deref() {
            attrs.push(("datum", datum));
        }
        let text = match &measure.value {
            MeasureValue::Number(v) => format_f64(*v),
            MeasureValue::Text(s) => s.clone(),
            MeasureValue::Empty => String::new(),
        };
        self.element(name, &attrs, &text)
    }

    /// Writes a measure element when present.
    pub fn opt_measure(&mut self, name: &str, measure: Option<&Measure>) -> WitsmlResult<()> {
        match measure {
            Some(m) => self.measure(name, m),
            None => Ok(()),
        }
    }

    /// Returns the document text.
    pub fn finish(self) -> WitsmlResult<String> {
        String::from_utf8(self.inner.into_inner())
            .map_err(|e| CodecError::encode(e).into())
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_before_children_and_no_declaration() {
        let mut w = XmlWriter::new();
        w.start("well", &[("uid", "w-1")]).unwrap();
        w.element("name", &[], "A & B").unwrap();
        w.element("field", &[], "").unwrap();
        w.end("well").unwrap();
        let xml = w.finish().unwrap();
        assert_eq!(xml, r#"<well uid="w-1"><name>A &amp; B</name><field/></well>"#);
    }

    #[test]
    fn test_measure_requires_uom() {
        let mut w = XmlWriter::new();
        let mut m = Measure::new(1.0, "m");
        m.uom = None;
        assert!(w.measure("mdCurrent", &m).is_err());
        assert!(w.measure("mdCurrent", &Measure::placeholder()).is_ok());
    }
}
