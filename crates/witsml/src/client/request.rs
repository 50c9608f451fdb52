// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Query construction.
//!
//! A query document is the registered skeleton of its object type, filled
//! with the caller's identity, filter values, requested-field placeholders
//! and (for growing objects) the cursor's index window:
//!
//! ```text
//! <logs xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1">
//!   <log uidWell="w1" uidWellbore="wb1" uid="l1">
//!     <name/>                          requested field
//!     <startIndex uom="m">1200</startIndex>   cursor window
//!   </log>
//! </logs>
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::codec::{format_f64, XmlWriter, SCHEMA_NAMESPACE};
use crate::error::{PaginationError, RequestError, WitsmlResult};
use crate::types::{
    LogIndex, Measure, ObjectIdentity, ObjectType, OptionKey, ReturnElements, StoreMethod,
    WireEnum,
};

use super::transport::WireRequest;

// =============================================================================
// Templates
// =============================================================================

/// How a template field is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain text element.
    Text,
    /// Measure element (`uom` attribute).
    Measure,
    /// Container element; requested as an empty element.
    Group,
}

/// One field of an object skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateField {
    /// Element name.
    pub name: &'static str,
    /// Kind.
    pub kind: FieldKind,
}

const fn text(name: &'static str) -> TemplateField {
    TemplateField {
        name,
        kind: FieldKind::Text,
    }
}

const fn measure(name: &'static str) -> TemplateField {
    TemplateField {
        name,
        kind: FieldKind::Measure,
    }
}

const fn group(name: &'static str) -> TemplateField {
    TemplateField {
        name,
        kind: FieldKind::Group,
    }
}

const WELL_FIELDS: &[TemplateField] = &[
    text("name"),
    text("numLicense"),
    text("field"),
    text("country"),
    text("state"),
    text("county"),
    text("region"),
    text("timeZone"),
    text("operator"),
    text("statusWell"),
    text("purposeWell"),
    text("dTimSpud"),
    group("wellDatum"),
    measure("groundElevation"),
    group("wellLocation"),
    group("commonData"),
];

const WELLBORE_FIELDS: &[TemplateField] = &[
    text("nameWell"),
    text("name"),
    group("parentWellbore"),
    text("number"),
    text("statusWellbore"),
    text("isActive"),
    text("purposeWellbore"),
    text("typeWellbore"),
    text("shape"),
    text("dTimKickoff"),
    measure("mdCurrent"),
    measure("tvdCurrent"),
    group("commonData"),
];

const LOG_FIELDS: &[TemplateField] = &[
    text("nameWell"),
    text("nameWellbore"),
    text("name"),
    text("objectGrowing"),
    text("serviceCompany"),
    text("runNumber"),
    text("creationDate"),
    text("description"),
    text("indexType"),
    measure("startIndex"),
    measure("endIndex"),
    measure("stepIncrement"),
    text("startDateTimeIndex"),
    text("endDateTimeIndex"),
    text("direction"),
    text("indexCurve"),
    text("nullValue"),
    group("logCurveInfo"),
    group("logData"),
    group("commonData"),
];

const TRAJECTORY_FIELDS: &[TemplateField] = &[
    text("nameWell"),
    text("nameWellbore"),
    text("name"),
    text("objectGrowing"),
    text("dTimTrajStart"),
    text("dTimTrajEnd"),
    measure("mdMn"),
    measure("mdMx"),
    text("serviceCompany"),
    text("aziRef"),
    group("trajectoryStation"),
    group("commonData"),
];

const MUD_LOG_FIELDS: &[TemplateField] = &[
    text("nameWell"),
    text("nameWellbore"),
    text("name"),
    text("objectGrowing"),
    text("mudLogCompany"),
    text("mudLogEngineers"),
    measure("startMd"),
    measure("endMd"),
    group("geologyInterval"),
    group("commonData"),
];

const RIG_FIELDS: &[TemplateField] = &[
    text("nameWell"),
    text("nameWellbore"),
    text("name"),
    text("owner"),
    text("typeRig"),
    text("manufacturer"),
    text("yearEntService"),
    text("classRig"),
    text("approvals"),
    text("registration"),
    text("telNumber"),
    text("faxNumber"),
    text("emailAddress"),
    group("commonData"),
];

/// Skeleton of one object type: its fields in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTemplate {
    /// Object type.
    pub object_type: ObjectType,
    /// Fields in schema order.
    pub fields: Vec<TemplateField>,
}

impl ObjectTemplate {
    /// Creates a template.
    pub fn new(object_type: ObjectType, fields: impl Into<Vec<TemplateField>>) -> Self {
        Self {
            object_type,
            fields: fields.into(),
        }
    }

    /// Finds a field.
    pub fn field(&self, name: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Registered skeletons by object type.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<ObjectType, ObjectTemplate>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the skeletons of well, wellbore, log, trajectory, mudLog
    /// and rig.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(ObjectTemplate::new(ObjectType::Well, WELL_FIELDS));
        registry.register(ObjectTemplate::new(ObjectType::Wellbore, WELLBORE_FIELDS));
        registry.register(ObjectTemplate::new(ObjectType::Log, LOG_FIELDS));
        registry.register(ObjectTemplate::new(ObjectType::Trajectory, TRAJECTORY_FIELDS));
        registry.register(ObjectTemplate::new(ObjectType::MudLog, MUD_LOG_FIELDS));
        registry.register(ObjectTemplate::new(ObjectType::Rig, RIG_FIELDS));
        registry
    }

    /// Adds or replaces a template.
    pub fn register(&mut self, template: ObjectTemplate) {
        self.templates.insert(template.object_type, template);
    }

    /// Looks up the template of an object type.
    pub fn get(&self, object_type: ObjectType) -> WitsmlResult<&ObjectTemplate> {
        self.templates.get(&object_type).ok_or_else(|| {
            RequestError::invalid_template(object_type.to_wire(), "no template registered").into()
        })
    }

    /// Object types with a template.
    pub fn object_types(&self) -> Vec<ObjectType> {
        let mut types: Vec<ObjectType> = self.templates.keys().copied().collect();
        types.sort_by_key(|t| t.to_wire());
        types
    }
}

// =============================================================================
// QueryTemplate
// =============================================================================

/// Value of a filter field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Text.
    Text(String),
    /// Measure.
    Measure(Measure),
}

/// What the caller asks for: identity, filters and requested fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryTemplate {
    /// Identity attributes. Absent uids match every object.
    pub identity: ObjectIdentity,
    /// Field filters in caller order.
    pub filters: Vec<(String, FilterValue)>,
    /// Fields to return.
    pub requested: Vec<String>,
}

impl QueryTemplate {
    /// A template for the given identity.
    pub fn new(identity: ObjectIdentity) -> Self {
        Self {
            identity,
            ..Default::default()
        }
    }

    /// A template matching every object.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a text filter.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), FilterValue::Text(value.into())));
        self
    }

    /// Adds a measure filter.
    pub fn filter_measure(mut self, field: impl Into<String>, value: Measure) -> Self {
        self.filters.push((field.into(), FilterValue::Measure(value)));
        self
    }

    /// Requests a field.
    pub fn request(mut self, field: impl Into<String>) -> Self {
        self.requested.push(field.into());
        self
    }

    /// Requests several fields.
    pub fn request_all<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested.extend(fields.into_iter().map(Into::into));
        self
    }
}

// =============================================================================
// OptionsIn
// =============================================================================

/// An `OptionsIn` string: ordered `key=value` pairs joined by `;`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsIn {
    entries: Vec<(String, String)>,
}

impl OptionsIn {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an options string. Only syntax is checked here; see
    /// [`OptionsIn::validate`].
    pub fn parse(text: &str) -> WitsmlResult<Self> {
        let mut entries = Vec::new();
        for segment in text.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                RequestError::invalid_options(segment, "expected key=value")
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(RequestError::invalid_options(segment, "empty key").into());
            }
            entries.push((key.to_string(), value.trim().to_string()));
        }
        Ok(Self { entries })
    }

    /// Sets a key, keeping its original position when already present.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`OptionsIn::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `returnElements`.
    pub fn return_elements(self, value: ReturnElements) -> Self {
        self.with(OptionKey::ReturnElements.to_wire(), value.to_wire())
    }

    /// Sets `maxReturnNodes`.
    pub fn max_return_nodes(self, value: u32) -> Self {
        self.with(OptionKey::MaxReturnNodes.to_wire(), value.to_string())
    }

    /// Value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Entries in order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Returns `true` without entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks keys and values.
    ///
    /// Keys outside the standard set must appear in `extensions`; their
    /// values pass through unchecked.
    pub fn validate(&self, extensions: &[String]) -> WitsmlResult<()> {
        for (key, value) in &self.entries {
            match OptionKey::from_wire(key) {
                Ok(option) => validate_value(option, key, value)?,
                Err(_) if extensions.iter().any(|e| e == key) => {}
                Err(_) => {
                    return Err(RequestError::invalid_options(key.as_str(), "unknown option").into())
                }
            }
        }
        Ok(())
    }
}

fn validate_value(option: OptionKey, key: &str, value: &str) -> WitsmlResult<()> {
    let invalid = |reason: String| -> WitsmlResult<()> {
        Err(RequestError::invalid_options(key, reason).into())
    };
    match option {
        OptionKey::ReturnElements => {
            if ReturnElements::from_wire(value).is_err() {
                return invalid(format!("'{}' is not a returnElements value", value));
            }
        }
        OptionKey::MaxReturnNodes | OptionKey::RequestLatestValues => match value.parse::<u32>() {
            Ok(n) if n > 0 => {}
            _ => return invalid(format!("'{}' is not a positive integer", value)),
        },
        OptionKey::RequestObjectSelectionCapability => {
            if value != "none" && value != "true" {
                return invalid(format!("'{}' must be 'none' or 'true'", value));
            }
        }
        OptionKey::RequestPrivateGroupOnly | OptionKey::CascadedDelete => {
            if value != "true" && value != "false" {
                return invalid(format!("'{}' must be 'true' or 'false'", value));
            }
        }
        OptionKey::DataVersion => {
            let valid = !value.is_empty()
                && value
                    .split('.')
                    .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
            if !valid {
                return invalid(format!("'{}' is not a schema version", value));
            }
        }
        OptionKey::CompressionMethod => {
            if value != "none" && value != "gzip" {
                return invalid(format!("'{}' must be 'none' or 'gzip'", value));
            }
        }
    }
    Ok(())
}

impl fmt::Display for OptionsIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for OptionsIn {
    type Err = crate::error::WitsmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =============================================================================
// QueryDescriptor
// =============================================================================

/// Index window of a growing-object read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexWindow {
    /// Inclusive start.
    pub start: Option<LogIndex>,
    /// Inclusive end.
    pub end: Option<LogIndex>,
    /// Unit of depth indexes.
    pub uom: Option<String>,
}

/// Everything needed for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    /// Object type.
    pub object_type: ObjectType,
    /// Caller template.
    pub template: QueryTemplate,
    /// Options.
    pub options: OptionsIn,
    /// Growing-object window.
    pub window: Option<IndexWindow>,
}

impl QueryDescriptor {
    /// Creates a descriptor.
    pub fn new(object_type: ObjectType, template: QueryTemplate, options: OptionsIn) -> Self {
        Self {
            object_type,
            template,
            options,
            window: None,
        }
    }

    /// Sets the index window.
    pub fn with_window(mut self, window: IndexWindow) -> Self {
        self.window = Some(window);
        self
    }
}

// =============================================================================
// RequestBuilder
// =============================================================================

/// Builds query documents and validated option strings.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    registry: TemplateRegistry,
    extensions: Vec<String>,
}

impl RequestBuilder {
    /// Creates a builder.
    pub fn new(registry: TemplateRegistry, extensions: Vec<String>) -> Self {
        Self {
            registry,
            extensions,
        }
    }

    /// Template registry.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Server-specific option keys accepted verbatim.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Builds the query document.
    pub fn build_query(&self, descriptor: &QueryDescriptor, version: &str) -> WitsmlResult<String> {
        let object_type = descriptor.object_type;
        let template = self.registry.get(object_type)?;
        let query = &descriptor.template;

        for (name, _) in &query.filters {
            if template.field(name).is_none() {
                return Err(RequestError::invalid_template(
                    object_type.to_wire(),
                    format!("filter field '{}' is not in the template", name),
                )
                .into());
            }
        }
        for name in &query.requested {
            if template.field(name).is_none() {
                return Err(RequestError::invalid_template(
                    object_type.to_wire(),
                    format!("requested field '{}' is not in the template", name),
                )
                .into());
            }
        }

        let window = match &descriptor.window {
            Some(window) => window_fields(object_type, window)?,
            None => Vec::new(),
        };
        for (name, _) in &window {
            if template.field(name).is_none() {
                return Err(RequestError::invalid_template(
                    object_type.to_wire(),
                    format!("index window field '{}' is not in the template", name),
                )
                .into());
            }
        }

        let plural = object_type.plural();
        let element = object_type.to_wire();
        let mut w = XmlWriter::new();
        w.start(&plural, &[("xmlns", SCHEMA_NAMESPACE), ("version", version)])?;
        w.start(element, &query.identity.attributes(object_type))?;

        for field in &template.fields {
            if let Some((_, value)) = window.iter().find(|(name, _)| *name == field.name) {
                write_window_field(&mut w, field.name, value, descriptor.window.as_ref())?;
                continue;
            }
            if let Some((_, value)) = query.filters.iter().find(|(name, _)| name == field.name) {
                match value {
                    FilterValue::Text(text) => w.element(field.name, &[], text)?,
                    FilterValue::Measure(m) => w.measure(field.name, m)?,
                }
                continue;
            }
            if query.requested.iter().any(|name| name == field.name) {
                w.empty(field.name, &[])?;
            }
        }

        w.end(element)?;
        w.end(&plural)?;
        w.finish()
    }

    /// Validates the options of a descriptor and renders them.
    pub fn build_options(&self, options: &OptionsIn) -> WitsmlResult<String> {
        options.validate(&self.extensions)?;
        Ok(options.to_string())
    }

    /// Builds a complete `WMLS_GetFromStore` request.
    ///
    /// Index windows and `returnElements=data-only` are only valid for
    /// growing objects.
    pub fn build(&self, descriptor: &QueryDescriptor, version: &str) -> WitsmlResult<WireRequest> {
        let data_only = descriptor.options.get(OptionKey::ReturnElements.to_wire())
            == Some(ReturnElements::DataOnly.to_wire());
        if (data_only || descriptor.window.is_some()) && !descriptor.object_type.is_growing() {
            return Err(PaginationError::NotGrowing {
                object_type: descriptor.object_type.to_wire().to_string(),
            }
            .into());
        }
        let options = self.build_options(&descriptor.options)?;
        let query = self.build_query(descriptor, version)?;
        Ok(WireRequest::data(
            StoreMethod::GetFromStore,
            descriptor.object_type,
            query,
            options,
        ))
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(TemplateRegistry::standard(), Vec::new())
    }
}

/// Range elements of a growing object: logs are windowed on their index,
/// trajectories and mud logs on measured depth only.
fn window_fields(
    object_type: ObjectType,
    window: &IndexWindow,
) -> WitsmlResult<Vec<(&'static str, LogIndex)>> {
    let names = |index: &LogIndex| -> WitsmlResult<(&'static str, &'static str)> {
        match (object_type, index.is_time()) {
            (ObjectType::Log, false) => Ok(("startIndex", "endIndex")),
            (ObjectType::Log, true) => Ok(("startDateTimeIndex", "endDateTimeIndex")),
            (ObjectType::Trajectory, false) => Ok(("mdMn", "mdMx")),
            (ObjectType::MudLog, false) => Ok(("startMd", "endMd")),
            _ => Err(RequestError::invalid_template(
                object_type.to_wire(),
                format!("no index window for a {} range", if index.is_time() { "time" } else { "depth" }),
            )
            .into()),
        }
    };

    let mut fields = Vec::with_capacity(2);
    if let Some(start) = window.start {
        fields.push((names(&start)?.0, start));
    }
    if let Some(end) = window.end {
        fields.push((names(&end)?.1, end));
    }
    Ok(fields)
}

fn write_window_field(
    w: &mut XmlWriter,
    name: &str,
    value: &LogIndex,
    window: Option<&IndexWindow>,
) -> WitsmlResult<()> {
    match value {
        LogIndex::Depth(v) => {
            let uom = window.and_then(|win| win.uom.as_deref());
            let attrs: Vec<(&str, &str)> = uom.map(|u| ("uom", u)).into_iter().collect();
            w.element(name, &attrs, &format_f64(*v))
        }
        LogIndex::Time(_) => w.element(name, &[], &value.to_wire_text()),
    }
}

// =============================================================================
// Tests
// =============================================================================
