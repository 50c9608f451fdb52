// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Codec Integration Tests
//!
//! - `test_objects_*`: object documents as servers send them
//! - `test_soap_*`: request and response envelopes end to end
//! - `test_capabilities_*`: capability documents

use witsml::client::{
    build_envelope, parse_envelope, OptionsIn, QueryDescriptor, QueryTemplate, RequestBuilder,
    WireRequest, MESSAGE_NAMESPACE,
};
use witsml::codec::{self, WitsmlObject};
use witsml::error::{CodecError, WitsmlError};
use witsml::types::{
    ClientCapabilities, LogIndexType, Measure, ObjectIdentity, ObjectType, ServerCapabilities,
    StoreMethod, Well, Wellbore,
};

use witsml_tests::common::{CapabilityFixtures, ObjectFixtures};

fn escape(xml: &str) -> String {
    xml.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_objects_vendor_document_with_prefixes() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<witsml:wellbores xmlns:witsml="http://www.witsml.org/schemas/1series" version="1.4.1.1">
  <witsml:wellbore uidWell="w-1" uid="wb-1">
    <witsml:nameWell>Well w-1</witsml:nameWell>
    <witsml:name>Main bore</witsml:name>
    <witsml:isActive>true</witsml:isActive>
    <witsml:mdCurrent uom="m" datum="KB">2450.5</witsml:mdCurrent>
    <witsml:commonData><witsml:dTimLastChange>2024-03-01T10:00:00Z</witsml:dTimLastChange></witsml:commonData>
  </witsml:wellbore>
</witsml:wellbores>"#;

    let objects = codec::decode_object(xml, ObjectType::Wellbore).unwrap();
    assert_eq!(objects.len(), 1);
    let WitsmlObject::Wellbore(wellbore) = &objects[0] else {
        panic!("expected a wellbore");
    };
    assert_eq!(wellbore.identity, ObjectIdentity::wellbore("w-1", "wb-1"));
    assert_eq!(wellbore.is_active, Some(true));
    assert_eq!(
        wellbore.md_current,
        Some(Measure::new(2450.5, "m").with_datum("KB"))
    );
}

#[test]
fn test_objects_well_survives_encode_decode() {
    let well = ObjectFixtures::well("w-9");
    let xml = codec::encode_collection(&[well.clone()], "1.4.1.1").unwrap();
    assert!(xml.starts_with(r#"<wells xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1">"#));

    let decoded: Vec<Well> = codec::decode_collection(&xml).unwrap();
    assert_eq!(decoded, vec![well]);
}

#[test]
fn test_objects_quantity_without_unit_is_not_encoded() {
    let mut wellbore = Wellbore {
        identity: ObjectIdentity::wellbore("w-1", "wb-1"),
        ..Default::default()
    };
    wellbore.md_current = Some(Measure {
        uom: None,
        ..Measure::new(100.0, "m")
    });

    let err = codec::encode_collection(&[wellbore], "1.4.1.1").unwrap_err();
    assert!(matches!(err, WitsmlError::Codec(CodecError::InvalidMeasure { .. })));
}

#[test]
fn test_objects_unknown_enum_literal_is_rejected() {
    let xml = r#"<logs xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1">
  <log uidWell="w-1" uidWellbore="wb-1" uid="l-1"><indexType>furlongs</indexType></log>
</logs>"#;

    let err = codec::decode_collection::<witsml::types::Log>(xml).unwrap_err();
    assert!(err.to_string().contains("furlongs"));
}

#[test]
fn test_objects_log_header_fields() {
    let header = ObjectFixtures::depth_log_header("l-1", 100);
    let xml = codec::encode_collection(&[header], "1.4.1.1").unwrap();
    let logs: Vec<witsml::types::Log> = codec::decode_collection(&xml).unwrap();

    let log = &logs[0];
    assert_eq!(log.index_type(), LogIndexType::MeasuredDepth);
    assert_eq!(log.index_uom(), Some("m"));
    assert_eq!(log.curve("GR").and_then(|c| c.unit.as_deref()), Some("gAPI"));
}

// =============================================================================
// SOAP
// =============================================================================

#[test]
fn test_soap_query_survives_envelope() {
    let builder = RequestBuilder::default();
    let descriptor = QueryDescriptor::new(
        ObjectType::Well,
        QueryTemplate::all()
            .filter("name", "A&B <north>")
            .request("field"),
        OptionsIn::new().with("returnElements", "requested"),
    );
    let request = builder.build(&descriptor, "1.4.1.1").unwrap();
    let envelope = build_envelope(&request).unwrap();

    let doc = roxmltree::Document::parse(&envelope).unwrap();
    let call = doc
        .descendants()
        .find(|n| n.has_tag_name((MESSAGE_NAMESPACE, "WMLS_GetFromStore")))
        .expect("call element");
    let param = |name: &str| {
        call.children()
            .find(|n| n.has_tag_name(name))
            .and_then(|n| n.text())
            .unwrap_or_default()
            .to_string()
    };

    assert_eq!(param("WMLtypeIn"), "well");
    assert_eq!(param("QueryIn"), request.query.clone().unwrap());
    assert_eq!(param("OptionsIn"), "returnElements=requested");
    assert!(param("QueryIn").contains("<name>A&amp;B &lt;north&gt;</name>"));
}

#[test]
fn test_soap_response_payload_decodes() {
    let logs = codec::encode_collection(&[ObjectFixtures::depth_log_header("l-1", 10)], "1.4.1.1").unwrap();
    let body = format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>"#,
            r#"<ns:WMLS_GetFromStoreResponse xmlns:ns="{}">"#,
            "<Result>1</Result><XMLout>{}</XMLout><SuppMsgOut></SuppMsgOut>",
            "</ns:WMLS_GetFromStoreResponse></soap:Body></soap:Envelope>"
        ),
        MESSAGE_NAMESPACE,
        escape(&logs)
    );

    let reply = parse_envelope(StoreMethod::GetFromStore, &body).unwrap();
    assert_eq!(reply.result_code, 1);
    assert_eq!(reply.message, None);

    let decoded: Vec<witsml::types::Log> =
        codec::decode_collection(reply.payload.as_deref().unwrap()).unwrap();
    assert_eq!(decoded[0].identity, ObjectFixtures::log_identity("l-1"));
    assert_eq!(decoded[0].curves.len(), 3);
}

#[test]
fn test_soap_negative_result_keeps_message() {
    let body = format!(
        concat!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>"#,
            r#"<ns:WMLS_AddToStoreResponse xmlns:ns="{}">"#,
            "<Result>-405</Result><SuppMsgOut>Object already exists</SuppMsgOut>",
            "</ns:WMLS_AddToStoreResponse></soap:Body></soap:Envelope>"
        ),
        MESSAGE_NAMESPACE
    );

    let reply = parse_envelope(StoreMethod::AddToStore, &body).unwrap();
    assert_eq!(reply.result_code, -405);
    assert_eq!(reply.message.as_deref(), Some("Object already exists"));
    assert_eq!(reply.payload, None);
}

#[test]
fn test_soap_get_base_msg_request() {
    let envelope = build_envelope(&WireRequest::get_base_msg(-401)).unwrap();
    assert!(envelope.contains("WMLS_GetBaseMsg"));
    assert!(envelope.contains(">-401</ReturnValueIn>"));
}

// =============================================================================
// Capabilities
// =============================================================================

#[test]
fn test_capabilities_server_document() {
    let caps = CapabilityFixtures::with_log_cap(5000);
    let xml = codec::encode(&caps).unwrap();
    let decoded: ServerCapabilities = codec::decode(&xml).unwrap();

    assert_eq!(decoded.schema_versions, vec!["1.3.1.1", "1.4.1.1"]);
    assert_eq!(decoded.max_data_nodes(StoreMethod::GetFromStore, ObjectType::Log), Some(5000));
    assert_eq!(decoded.max_data_nodes(StoreMethod::GetFromStore, ObjectType::Well), None);
    assert!(decoded.supports(StoreMethod::GetFromStore, ObjectType::Log));
    assert!(!decoded.supports(StoreMethod::AddToStore, ObjectType::Log));
}

#[test]
fn test_capabilities_client_document() {
    let caps = ClientCapabilities::new("drilling-monitor", "Rig floor client", ["1.3.1.1", "1.4.1.1"]);
    let xml = codec::encode(&caps).unwrap();

    assert!(xml.starts_with("<capClients"));
    assert!(xml.contains("<schemaVersion>1.4.1.1,1.3.1.1</schemaVersion>"));
    let decoded: ClientCapabilities = codec::decode(&xml).unwrap();
    assert_eq!(decoded.schema_versions, caps.schema_versions);
}
