// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! SOAP 1.1 transport over HTTP(S).
//!
//! Requests are RPC/encoded WMLS calls in the `message/120` namespace with the
//! matching `SOAPAction` header. The embedded query document travels as
//! escaped text of its parameter element.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use super::transport::{WireReply, WireRequest, WitsmlTransport};
use crate::codec::reader::{child, is_element, parse_document, text_of};
use crate::codec::XmlWriter;
use crate::error::{
    CodecError, ConfigurationError, TimeoutError, TransportError, WitsmlError, WitsmlResult,
};
use crate::profile::ServerProfile;
use crate::types::{StoreMethod, WireEnum};

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENV_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.1 encoding style.
pub const SOAP_ENCODING: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// WITSML Store message namespace.
pub const MESSAGE_NAMESPACE: &str = "http://www.witsml.org/message/120";

// =============================================================================
// Envelope
// =============================================================================

/// Builds the SOAP envelope of a request.
pub fn build_envelope(request: &WireRequest) -> WitsmlResult<String> {
    let method = request.method.to_wire();
    let op = format!("ns:{}", method);
    let mut w = XmlWriter::new();

    w.start(
        "soap:Envelope",
        &[
            ("xmlns:soap", SOAP_ENV_NAMESPACE),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ("xmlns:xsd", "http://www.w3.org/2001/XMLSchema"),
        ],
    )?;
    w.start("soap:Body", &[])?;
    w.start(
        &op,
        &[
            ("xmlns:ns", MESSAGE_NAMESPACE),
            ("soap:encodingStyle", SOAP_ENCODING),
        ],
    )?;

    let string_type = [("xsi:type", "xsd:string")];
    match request.method {
        // GetCap carries no CapabilitiesIn in the 1.4.1 WSDL.
        StoreMethod::GetCap => {
            w.element("OptionsIn", &string_type, &request.options)?;
        }
        StoreMethod::GetVersion => {}
        StoreMethod::GetBaseMsg => {
            let code = request.return_value_in.unwrap_or_default().to_string();
            w.element("ReturnValueIn", &[("xsi:type", "xsd:short")], &code)?;
        }
        data_method => {
            let object_type = request.object_type.map(|t| t.to_wire()).unwrap_or_default();
            w.element("WMLtypeIn", &string_type, object_type)?;
            if let Some(param) = data_method.query_param() {
                w.element(param, &string_type, request.query.as_deref().unwrap_or(""))?;
            }
            w.element("OptionsIn", &string_type, &request.options)?;
            w.element(
                "CapabilitiesIn",
                &string_type,
                request.capabilities.as_deref().unwrap_or(""),
            )?;
        }
    }
    w.end(&op)?;
    w.end("soap:Body")?;
    w.end("soap:Envelope")?;
    w.finish()
}

/// Parses a SOAP response envelope.
///
/// Faults become `TransportError::Fault`.
pub fn parse_envelope(method: StoreMethod, body: &str) -> WitsmlResult<WireReply> {
    let doc = parse_document(body)
        .map_err(|e| TransportError::envelope(format!("unparsable response: {}", e)))?;
    let root = doc.root_element();
    if !is_element(&root, "Envelope") {
        return Err(TransportError::envelope(format!(
            "expected Envelope, found <{}>",
            root.tag_name().name()
        ))
        .into());
    }
    let body_node = child(root, "Body").ok_or_else(|| TransportError::envelope("missing Body"))?;
    let payload = body_node
        .children()
        .find(|n| n.is_element())
        .ok_or_else(|| TransportError::envelope("empty Body"))?;

    if is_element(&payload, "Fault") {
        let code = child(payload, "faultcode").map(text_of).unwrap_or_default();
        let reason = child(payload, "faultstring").map(text_of).unwrap_or_default();
        return Err(TransportError::Fault { code, reason }.into());
    }

    let param = |name: &str| child(payload, name).map(text_of);

    let result = param("Result").ok_or_else(|| {
        CodecError::malformed(payload.tag_name().name(), "missing required <Result>")
    })?;
    let message = param("SuppMsgOut").filter(|m| !m.is_empty());

    if method.returns_text() {
        return Ok(WireReply {
            result_code: 1,
            payload: Some(result),
            message,
        });
    }

    let result_code = result.trim().parse::<i32>().map_err(|_| {
        CodecError::malformed("Result", format!("invalid result code '{}'", result))
    })?;
    let payload_text = match method {
        StoreMethod::GetCap => param("CapabilitiesOut"),
        StoreMethod::GetFromStore => param("XMLout"),
        _ => None,
    }
    .filter(|p| !p.is_empty());

    Ok(WireReply {
        result_code,
        payload: payload_text,
        message,
    })
}

// =============================================================================
// SoapTransport
// =============================================================================

/// SOAP transport on `reqwest`.
pub struct SoapTransport {
    http: reqwest::Client,
    profile: ServerProfile,
    host: String,
}

impl SoapTransport {
    /// Creates a transport for a server profile.
    pub fn new(
        profile: ServerProfile,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> WitsmlResult<Self> {
        let host = profile.host()?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .user_agent(format!("{}/{}", crate::NAME, crate::VERSION))
            .build()
            .map_err(|e| ConfigurationError::invalid_value("transport", e.to_string()))?;
        Ok(Self {
            http,
            profile,
            host,
        })
    }

    /// Returns the server profile.
    pub fn profile(&self) -> &ServerProfile {
        &self.profile
    }

    fn headers(method: StoreMethod) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/xml; charset=utf-8"),
        );
        if let Ok(action) = HeaderValue::from_str(&format!("\"{}\"", method.soap_action())) {
            headers.insert(HeaderName::from_static("soapaction"), action);
        }
        headers
    }

    /// Failures while sending and waiting for the status line. Nothing of
    /// the reply has arrived yet, so timeouts and resets stay transient.
    fn map_send_error(
        &self,
        method: StoreMethod,
        error: reqwest::Error,
        elapsed: Duration,
    ) -> WitsmlError {
        if error.is_timeout() {
            TimeoutError::new(method.to_wire(), elapsed).into()
        } else if error.is_connect() {
            TransportError::connection_failed(self.profile.url.as_str(), error.to_string()).into()
        } else if error.is_decode() {
            TransportError::envelope(error.to_string()).into()
        } else {
            TransportError::connection_reset(error.to_string()).into()
        }
    }

    /// Failures while reading the body. The server has started answering,
    /// so the call is not retried.
    fn map_body_error(method: StoreMethod, error: reqwest::Error, elapsed: Duration) -> WitsmlError {
        TransportError::envelope(format!(
            "{} reply cut off after {:?}: {}",
            method.to_wire(),
            elapsed,
            error
        ))
        .into()
    }
}

#[async_trait]
impl WitsmlTransport for SoapTransport {
    async fn send(&self, request: &WireRequest) -> WitsmlResult<WireReply> {
        let envelope = build_envelope(request)?;
        let started = std::time::Instant::now();

        let mut builder = self
            .http
            .post(self.profile.url.as_str())
            .headers(Self::headers(request.method))
            .body(envelope);
        if let Some(username) = self.profile.username.as_deref() {
            builder = builder.basic_auth(username, self.profile.password.as_deref());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(request.method, e, started.elapsed()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::map_body_error(request.method, e, started.elapsed()))?;

        tracing::trace!(
            method = request.method.to_wire(),
            status = status.as_u16(),
            bytes = body.len(),
            "SOAP response received"
        );

        match parse_envelope(request.method, &body) {
            Ok(reply) => Ok(reply),
            Err(error) if status.is_success() => Err(error),
            Err(error @ WitsmlError::Transport(TransportError::Fault { .. })) => {
                Err(error)
            }
            Err(_) => Err(TransportError::Http {
                status: status.as_u16(),
                endpoint: self.profile.url.clone(),
            }
            .into()),
        }
    }

    fn host(&self) -> &str {
        &self.host
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectType;

    #[test]
    fn test_envelope_escapes_query() {
        let request = WireRequest::data(
            StoreMethod::GetFromStore,
            ObjectType::Well,
            r#"<wells xmlns="http://www.witsml.org/schemas/1series" version="1.4.1.1"><well uid="w1"/></wells>"#
                .to_string(),
            "returnElements=all",
        );
        let xml = build_envelope(&request).unwrap();
        assert!(xml.contains("<ns:WMLS_GetFromStore"));
        assert!(xml.contains("<WMLtypeIn xsi:type=\"xsd:string\">well</WMLtypeIn>"));
        assert!(xml.contains("&lt;wells"));
        assert!(xml.contains("<OptionsIn xsi:type=\"xsd:string\">returnElements=all</OptionsIn>"));
    }

    #[test]
    fn test_get_cap_has_only_options() {
        let request = WireRequest::get_cap("<capClients/>".into(), "dataVersion=1.4.1.1");
        let xml = build_envelope(&request).unwrap();
        assert!(xml.contains("dataVersion=1.4.1.1"));
        assert!(!xml.contains("CapabilitiesIn"));
        assert!(!xml.contains("WMLtypeIn"));
    }

    #[test]
    fn test_parse_get_from_store_response() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <ns:WMLS_GetFromStoreResponse xmlns:ns="http://www.witsml.org/message/120">
      <Result>1</Result>
      <XMLout>&lt;wells/&gt;</XMLout>
      <SuppMsgOut>ok</SuppMsgOut>
    </ns:WMLS_GetFromStoreResponse>
  </soap:Body>
</soap:Envelope>"#;
        let reply = parse_envelope(StoreMethod::GetFromStore, body).unwrap();
        assert_eq!(reply.result_code, 1);
        assert_eq!(reply.payload.as_deref(), Some("<wells/>"));
        assert_eq!(reply.message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_parse_fault() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring>boom</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;
        let err = parse_envelope(StoreMethod::GetFromStore, body).unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert!(!err.is_retryable());
    }

    /// A store that answers `head` (if any) and then stalls or hangs up.
    async fn scripted_store(head: Option<&'static [u8]>, hang_up: bool) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            if let Some(head) = head {
                socket.write_all(head).await.unwrap();
            }
            if !hang_up {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        });
        format!("http://{}/witsml/store", addr)
    }

    const PARTIAL_REPLY: &[u8] =
        b"HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: 1000\r\n\r\n<soap:Envelope";

    fn transport(url: String, timeout: Duration) -> SoapTransport {
        SoapTransport::new(ServerProfile::new("local", url), timeout, Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn test_timeout_before_reply_is_transient() {
        let url = scripted_store(None, false).await;
        let err = transport(url, Duration::from_millis(200))
            .send(&WireRequest::new(StoreMethod::GetVersion))
            .await
            .unwrap_err();
        assert!(matches!(err, WitsmlError::Timeout(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_timeout_during_body_is_not_transient() {
        let url = scripted_store(Some(PARTIAL_REPLY), false).await;
        let err = transport(url, Duration::from_millis(200))
            .send(&WireRequest::new(StoreMethod::GetVersion))
            .await
            .unwrap_err();
        assert!(matches!(err, WitsmlError::Transport(TransportError::Envelope { .. })));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_hang_up_during_body_is_not_transient() {
        let url = scripted_store(Some(PARTIAL_REPLY), true).await;
        let err = transport(url, Duration::from_secs(5))
            .send(&WireRequest::new(StoreMethod::GetVersion))
            .await
            .unwrap_err();
        assert!(matches!(err, WitsmlError::Transport(TransportError::Envelope { .. })));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_parse_text_result() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><ns:WMLS_GetVersionResponse xmlns:ns="http://www.witsml.org/message/120"><Result>1.3.1.1,1.4.1.1</Result></ns:WMLS_GetVersionResponse></soap:Body></soap:Envelope>"#;
        let reply = parse_envelope(StoreMethod::GetVersion, body).unwrap();
        assert_eq!(reply.result_code, 1);
        assert_eq!(reply.payload.as_deref(), Some("1.3.1.1,1.4.1.1"));
    }
}
