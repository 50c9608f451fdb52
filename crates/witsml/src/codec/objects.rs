// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Element mappings of the typed shapes.

use roxmltree::Node;

use super::reader::{
    attr, attr_u32, child, child_bool, child_enum, child_measure, child_text, children,
    required_attr, required_child_text, text_of,
};
use super::{FromXml, ToXml, WitsmlDataObject, XmlWriter, API_NAMESPACE};
use crate::error::WitsmlResult;
use crate::types::{
    ClientCapabilities, DataObjectCapability, FunctionCapability, Log, LogCurveInfo, LogData,
    ObjectIdentity, ObjectType, ServerCapabilities, Well, Wellbore, API_VERSION,
};

fn identity_of(node: Node<'_, '_>) -> WitsmlResult<ObjectIdentity> {
    Ok(ObjectIdentity {
        uid_well: attr(node, "uidWell"),
        uid_wellbore: attr(node, "uidWellbore"),
        uid: Some(required_attr(node, "uid")?),
    })
}

// =============================================================================
// Well
// =============================================================================

impl ToXml for Well {
    fn write_xml(&self, w: &mut XmlWriter) -> WitsmlResult<()> {
        w.start("well", &self.identity.attributes(ObjectType::Well))?;
        w.opt_element("name", self.name.as_deref())?;
        w.opt_element("field", self.field.as_deref())?;
        w.opt_element("country", self.country.as_deref())?;
        w.opt_element("timeZone", self.time_zone.as_deref())?;
        w.opt_element("operator", self.operator.as_deref())?;
        w.opt_element("statusWell", self.status_well.as_deref())?;
        w.opt_measure("groundElevation", self.ground_elevation.as_ref())?;
        w.end("well")
    }
}

impl FromXml for Well {
    const ELEMENT: &'static str = "well";

    fn from_node(node: Node<'_, '_>) -> WitsmlResult<Self> {
        Ok(Self {
            identity: identity_of(node)?,
            name: child_text(node, "name"),
            field: child_text(node, "field"),
            country: child_text(node, "country"),
            operator: child_text(node, "operator"),
            time_zone: child_text(node, "timeZone"),
            status_well: child_text(node, "statusWell"),
            ground_elevation: child_measure(node, "groundElevation"),
        })
    }
}

impl WitsmlDataObject for Well {
    const OBJECT_TYPE: ObjectType = ObjectType::Well;

    fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }
}

// =============================================================================
// Wellbore
// =============================================================================

impl ToXml for Wellbore {
    fn write_xml(&self, w: &mut XmlWriter) -> WitsmlResult<()> {
        w.start("wellbore", &self.identity.attributes(ObjectType::Wellbore))?;
        w.opt_element("nameWell", self.name_well.as_deref())?;
        w.opt_element("name", self.name.as_deref())?;
        w.opt_element("number", self.number.as_deref())?;
        w.opt_bool("isActive", self.is_active)?;
        w.opt_element("typeWellbore", self.type_wellbore.as_deref())?;
        w.opt_measure("mdCurrent", self.md_current.as_ref())?;
        w.end("wellbore")
    }
}

impl FromXml for Wellbore {
    const ELEMENT: &'static str = "wellbore";

    fn from_node(node: Node<'_, '_>) -> WitsmlResult<Self> {
        Ok(Self {
            identity: identity_of(node)?,
            name_well: child_text(node, "nameWell"),
            name: child_text(node, "name"),
            number: child_text(node, "number"),
            type_wellbore: child_text(node, "typeWellbore"),
            is_active: child_bool(node, "isActive")?,
            md_current: child_measure(node, "mdCurrent"),
        })
    }
}

impl WitsmlDataObject for Wellbore {
    const OBJECT_TYPE: ObjectType = ObjectType::Wellbore;

    fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }
}

// =============================================================================
// Log
// =============================================================================

impl ToXml for LogCurveInfo {
    fn write_xml(&self, w: &mut XmlWriter) -> WitsmlResult<()> {
        let attrs: Vec<(&str, &str)> = self.uid.as_deref().map(|u| ("uid", u)).into_iter().collect();
        w.start("logCurveInfo", &attrs)?;
        w.element("mnemonic", &[], &self.mnemonic)?;
        w.opt_element("unit", self.unit.as_deref())?;
        w.opt_element("nullValue", self.null_value.as_deref())?;
        w.opt_element("curveDescription", self.curve_description.as_deref())?;
        w.opt_enum("typeLogData", self.type_log_data)?;
        w.end("logCurveInfo")
    }
}

impl FromXml for LogCurveInfo {
    const ELEMENT: &'static str = "logCurveInfo";

    fn from_node(node: Node<'_, '_>) -> WitsmlResult<Self> {
        Ok(Self {
            uid: attr(node, "uid"),
            mnemonic: required_child_text(node, "mnemonic")?,
            unit: child_text(node, "unit"),
            null_value: child_text(node, "nullValue"),
            type_log_data: child_enum(node, "typeLogData")?,
            curve_description: child_text(node, "curveDescription"),
        })
    }
}

impl ToXml for LogData {
    fn write_xml(&self, w: &mut XmlWriter) -> WitsmlResult<()> {
        w.start("logData", &[])?;
        w.element("mnemonicList", &[], &self.mnemonic_list.join(","))?;
        w.element("unitList", &[], &self.unit_list.join(","))?;
        for row in &self.rows {
            w.element("data", &[], row)?;
        }
        w.end("logData")
    }
}

fn split_list(text: Option<String>) -> Vec<String> {
    match text {
        Some(t) if !t.is_empty() => t.split(',').map(|s| s.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

impl FromXml for LogData {
    const ELEMENT: &'static str = "logData";

    fn from_node(node: Node<'_, '_>) -> WitsmlResult<Self> {
        Ok(Self {
            mnemonic_list: split_list(child_text(node, "mnemonicList")),
            unit_list: split_list(child_text(node, "unitList")),
            rows: children(node, "data")
                .map(text_of)
                .filter(|row| !row.is_empty())
                .collect(),
        })
    }
}

impl ToXml for Log {
    fn write_xml(&self, w: &mut XmlWriter) -> WitsmlResult<()> {
        w.start("log", &self.identity.attributes(ObjectType::Log))?;
        w.opt_element("nameWell", self.name_well.as_deref())?;
        w.opt_element("nameWellbore", self.name_wellbore.as_deref())?;
        w.opt_element("name", self.name.as_deref())?;
        w.opt_enum("indexType", self.index_type)?;
        w.opt_measure("startIndex", self.start_index.as_ref())?;
        w.opt_measure("endIndex", self.end_index.as_ref())?;
        w.opt_element("startDateTimeIndex", self.start_date_time_index.as_deref())?;
        w.opt_element("endDateTimeIndex", self.end_date_time_index.as_deref())?;
        w.opt_enum("direction", self.direction)?;
        w.opt_element("indexCurve", self.index_curve.as_deref())?;
        for curve in &self.curves {
            curve.write_xml(w)?;
        }
        if let Some(data) = &self.data {
            data.write_xml(w)?;
        }
        w.end("log")
    }
}

impl FromXml for Log {
    const ELEMENT: &'static str = "log";

    fn from_node(node: Node<'_, '_>) -> WitsmlResult<Self> {
        Ok(Self {
            identity: identity_of(node)?,
            name_well: child_text(node, "nameWell"),
            name_wellbore: child_text(node, "nameWellbore"),
            name: child_text(node, "name"),
            index_type: child_enum(node, "indexType")?,
            direction: child_enum(node, "direction")?,
            index_curve: child_text(node, "indexCurve"),
            start_index: child_measure(node, "startIndex"),
            end_index: child_measure(node, "endIndex"),
            start_date_time_index: child_text(node, "startDateTimeIndex"),
            end_date_time_index: child_text(node, "endDateTimeIndex"),
            curves: children(node, "logCurveInfo")
                .map(LogCurveInfo::from_node)
                .collect::<WitsmlResult<Vec<_>>>()?,
            data: child(node, "logData").map(LogData::from_node).transpose()?,
        })
    }
}

impl WitsmlDataObject for Log {
    const OBJECT_TYPE: ObjectType = ObjectType::Log;

    fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }
}

// =============================================================================
// Capabilities
// =============================================================================

impl ToXml for ClientCapabilities {
    fn write_xml(&self, w: &mut XmlWriter) -> WitsmlResult<()> {
        w.start(
            "capClients",
            &[("xmlns", API_NAMESPACE), ("version", API_VERSION)],
        )?;
        w.start("capClient", &[("apiVers", API_VERSION)])?;
        w.element("description", &[], &self.description)?;
        w.element("name", &[], &self.name)?;
        w.opt_element("vendor", self.vendor.as_deref())?;
        w.opt_element("version", self.version.as_deref())?;
        w.element("schemaVersion", &[], &self.schema_versions.join(","))?;
        w.end("capClient")?;
        w.end("capClients")
    }
}

fn schema_versions_of(node: Node<'_, '_>) -> Vec<String> {
    children(node, "schemaVersion")
        .flat_map(|n| split_list(Some(text_of(n))))
        .filter(|v| !v.is_empty())
        .collect()
}

impl FromXml for ClientCapabilities {
    const ELEMENT: &'static str = "capClient";

    fn from_node(node: Node<'_, '_>) -> WitsmlResult<Self> {
        Ok(Self {
            name: child_text(node, "name").unwrap_or_default(),
            description: child_text(node, "description").unwrap_or_default(),
            vendor: child_text(node, "vendor"),
            version: child_text(node, "version"),
            schema_versions: schema_versions_of(node),
        })
    }
}

impl ToXml for ServerCapabilities {
    fn write_xml(&self, w: &mut XmlWriter) -> WitsmlResult<()> {
        let api = self.api_version.as_deref().unwrap_or(API_VERSION);
        w.start("capServers", &[("xmlns", API_NAMESPACE), ("version", api)])?;
        w.start("capServer", &[("apiVers", api)])?;
        w.opt_element("name", self.name.as_deref())?;
        w.opt_element("vendor", self.vendor.as_deref())?;
        w.opt_element("version", self.version.as_deref())?;
        w.opt_element("description", self.description.as_deref())?;
        w.element("schemaVersion", &[], &self.schema_versions.join(","))?;
        if let Some(max) = self.max_request_latest_values {
            w.element("maxRequestLatestValues", &[], &max.to_string())?;
        }
        for function in &self.functions {
            w.start("function", &[("name", function.name.as_str())])?;
            for object in &function.data_objects {
                let nodes = object.max_data_nodes.map(|v| v.to_string());
                let points = object.max_data_points.map(|v| v.to_string());
                let mut attrs: Vec<(&str, &str)> = Vec::new();
                if let Some(n) = nodes.as_deref() {
                    attrs.push(("maxDataNodes", n));
                }
                if let Some(p) = points.as_deref() {
                    attrs.push(("maxDataPoints", p));
                }
                w.element("dataObject", &attrs, &object.name)?;
            }
            w.end("function")?;
        }
        w.end("capServer")?;
        w.end("capServers")
    }
}

impl FromXml for ServerCapabilities {
    const ELEMENT: &'static str = "capServer";

    fn from_node(node: Node<'_, '_>) -> WitsmlResult<Self> {
        let functions = children(node, "function")
            .map(|f| {
                let data_objects = children(f, "dataObject")
                    .map(|d| {
                        Ok(DataObjectCapability {
                            name: text_of(d),
                            max_data_nodes: attr_u32(d, "maxDataNodes")?,
                            max_data_points: attr_u32(d, "maxDataPoints")?,
                        })
                    })
                    .collect::<WitsmlResult<Vec<_>>>()?;
                Ok(FunctionCapability {
                    name: required_attr(f, "name")?,
                    data_objects,
                })
            })
            .collect::<WitsmlResult<Vec<_>>>()?;

        Ok(Self {
            api_version: attr(node, "apiVers"),
            name: child_text(node, "name"),
            vendor: child_text(node, "vendor"),
            version: child_text(node, "version"),
            description: child_text(node, "description"),
            schema_versions: schema_versions_of(node),
            max_request_latest_values: child_text(node, "maxRequestLatestValues")
                .and_then(|t| t.parse().ok()),
            functions,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
