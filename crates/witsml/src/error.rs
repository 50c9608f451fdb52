// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! WITSML client error types with diagnostics.
//!
//! Errors are grouped by the layer that produced them so callers can branch
//! on the category while still reaching the exact server result code, the
//! attempted enum literal or the object identity that failed.
//!
//! # Error Categories
//!
//! ```text
//! WitsmlError
//! ├── Transport     - HTTP/SOAP connectivity failures
//! ├── Timeout       - Deadline elapsed before a reply arrived
//! ├── Server        - Negative result codes, incompatible servers
//! ├── Request       - Invalid templates and OptionsIn strings
//! ├── Codec         - Malformed payloads, unsupported shapes, enum literals
//! ├── Pagination    - Growing-object cursor failures
//! ├── Configuration - Invalid client settings
//! └── Cancelled     - Caller cancelled the operation
//! ```
//!
//! # Examples
//!
//! ```
//! use witsml::error::{WitsmlError, TransportError};
//!
//! let error = WitsmlError::transport(TransportError::connection_failed(
//!     "https://store.example.com/witsml",
//!     "connection refused",
//! ));
//!
//! assert!(error.is_retryable());
//! assert_eq!(error.category(), "transport");
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

// =============================================================================
// WitsmlError - Main Error Type
// =============================================================================

/// The main error type for WITSML client operations.
#[derive(Debug, Clone, Error)]
pub enum WitsmlError {
    /// Connectivity and SOAP-level failures.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// No reply before the deadline.
    #[error("{0}")]
    Timeout(#[from] TimeoutError),

    /// The server answered, but refused or is unusable.
    #[error("{0}")]
    Server(#[from] ServerError),

    /// The request could not be built.
    #[error("{0}")]
    Request(#[from] RequestError),

    /// Payload encoding/decoding failures.
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// Growing-object read failures.
    #[error("{0}")]
    Pagination(#[from] PaginationError),

    /// Client configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The caller cancelled the operation.
    #[error("Operation cancelled: {operation}")]
    Cancelled {
        /// Operation that was abandoned.
        operation: String,
    },
}

impl WitsmlError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a transport error.
    #[inline]
    pub fn transport(error: TransportError) -> Self {
        Self::Transport(error)
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(error: TimeoutError) -> Self {
        Self::Timeout(error)
    }

    /// Creates a server error.
    #[inline]
    pub fn server(error: ServerError) -> Self {
        Self::Server(error)
    }

    /// Creates a request error.
    #[inline]
    pub fn request(error: RequestError) -> Self {
        Self::Request(error)
    }

    /// Creates a codec error.
    #[inline]
    pub fn codec(error: CodecError) -> Self {
        Self::Codec(error)
    }

    /// Creates a pagination error.
    #[inline]
    pub fn pagination(error: PaginationError) -> Self {
        Self::Pagination(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// Creates a cancellation error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    // =========================================================================
    // Convenience Factory Methods
    // =========================================================================

    /// Creates a `ServerRejected` error preserving the server result code.
    pub fn server_rejected(code: i32, message: Option<String>) -> Self {
        Self::Server(ServerError::Rejected { code, message })
    }

    /// Creates an `IncompatibleServer` error.
    pub fn incompatible_server(client_versions: Vec<String>, server_versions: Vec<String>) -> Self {
        Self::Server(ServerError::Incompatible {
            client_versions,
            server_versions,
        })
    }

    /// Creates a `MalformedResponse` error.
    pub fn malformed(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Codec(CodecError::malformed(element, reason))
    }

    /// Creates an `InvalidTemplate` error.
    pub fn invalid_template(object_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request(RequestError::invalid_template(object_type, reason))
    }

    /// Creates an `InvalidOptions` error.
    pub fn invalid_options(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request(RequestError::invalid_options(key, reason))
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if this error is a transient failure that a read-only
    /// request may be re-issued after.
    ///
    /// Whether a retry actually happens also depends on the method; mutations
    /// are never retried regardless of this flag.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_transient(),
            Self::Timeout(_) => true,
            Self::Server(_)
            | Self::Request(_)
            | Self::Codec(_)
            | Self::Pagination(_)
            | Self::Configuration(_)
            | Self::Cancelled { .. } => false,
        }
    }

    /// Returns the server result code when the server rejected the request.
    pub fn result_code(&self) -> Option<i32> {
        match self {
            Self::Server(ServerError::Rejected { code, .. }) => Some(*code),
            _ => None,
        }
    }

    /// Returns `true` for the terminal `IncompatibleServer` failure.
    pub fn is_incompatible_server(&self) -> bool {
        matches!(self, Self::Server(ServerError::Incompatible { .. }))
    }

    /// Returns `true` if the caller cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the label used for the `result_code` metric dimension.
    ///
    /// Server rejections keep their numeric code; local failures use their
    /// category name.
    pub fn metric_label(&self) -> String {
        match self.result_code() {
            Some(code) => code.to_string(),
            None => self.category().to_string(),
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Transport(e) => e.severity(),
            Self::Timeout(_) => ErrorSeverity::Warning,
            Self::Server(e) => e.severity(),
            Self::Request(_) => ErrorSeverity::Error,
            Self::Codec(_) => ErrorSeverity::Error,
            Self::Pagination(_) => ErrorSeverity::Warning,
            Self::Configuration(_) => ErrorSeverity::Critical,
            Self::Cancelled { .. } => ErrorSeverity::Info,
        }
    }

    /// Returns the error category for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Server(_) => "server",
            Self::Request(_) => "request",
            Self::Codec(_) => "codec",
            Self::Pagination(_) => "pagination",
            Self::Configuration(_) => "configuration",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Transport(e) => e.error_code(),
            Self::Timeout(_) => ErrorCode::new(2, 1),
            Self::Server(e) => e.error_code(),
            Self::Request(e) => e.error_code(),
            Self::Codec(e) => e.error_code(),
            Self::Pagination(e) => e.error_code(),
            Self::Configuration(_) => ErrorCode::new(7, 1),
            Self::Cancelled { .. } => ErrorCode::new(8, 1),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Transport(e) => e.recovery_hints(),
            Self::Timeout(_) => vec![
                "Increase the request deadline",
                "Narrow the query or lower maxReturnNodes",
            ],
            Self::Server(e) => e.recovery_hints(),
            Self::Request(e) => e.recovery_hints(),
            Self::Codec(e) => e.recovery_hints(),
            Self::Pagination(e) => e.recovery_hints(),
            Self::Configuration(_) => vec!["Check the client configuration file"],
            Self::Cancelled { .. } => vec![],
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let code = self.error_code();

        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
        }
    }
}

// =============================================================================
// TransportError
// =============================================================================

/// HTTP and SOAP transport failures.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The TCP/TLS connection could not be established.
    #[error("Connection to {endpoint} failed: {message}")]
    ConnectionFailed {
        /// Target endpoint.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// The connection was reset before a reply was received.
    #[error("Connection reset before a reply was received: {message}")]
    ConnectionReset {
        /// Error message.
        message: String,
    },

    /// Non-success HTTP status without a SOAP body.
    #[error("HTTP {status} from {endpoint}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Target endpoint.
        endpoint: String,
    },

    /// The server answered with a SOAP fault.
    #[error("SOAP fault {code}: {reason}")]
    Fault {
        /// `faultcode` text.
        code: String,
        /// `faultstring` text.
        reason: String,
    },

    /// The reply was not a usable SOAP envelope.
    #[error("Invalid SOAP envelope: {message}")]
    Envelope {
        /// Error message.
        message: String,
    },
}

impl TransportError {
    /// Creates a connection failure.
    pub fn connection_failed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a connection reset.
    pub fn connection_reset(message: impl Into<String>) -> Self {
        Self::ConnectionReset {
            message: message.into(),
        }
    }

    /// Creates a SOAP envelope error.
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope {
            message: message.into(),
        }
    }

    /// Returns `true` when no reply bytes were received.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::ConnectionReset { .. }
        )
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConnectionFailed { .. } | Self::ConnectionReset { .. } => ErrorSeverity::Warning,
            Self::Http { status, .. } if *status == 401 || *status == 403 => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConnectionFailed { .. } => ErrorCode::new(1, 1),
            Self::ConnectionReset { .. } => ErrorCode::new(1, 2),
            Self::Http { .. } => ErrorCode::new(1, 3),
            Self::Fault { .. } => ErrorCode::new(1, 4),
            Self::Envelope { .. } => ErrorCode::new(1, 5),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::ConnectionFailed { .. } => vec![
                "Verify the store URL in the server profile",
                "Check network connectivity and TLS settings",
            ],
            Self::ConnectionReset { .. } => vec!["The request can be retried if it was a read"],
            Self::Http { status, .. } if *status == 401 => {
                vec!["Check the username and password of the server profile"]
            }
            Self::Http { .. } => vec!["Check that the URL points at the WITSML Store endpoint"],
            Self::Fault { .. } => vec!["Inspect the fault reason reported by the server"],
            Self::Envelope { .. } => vec!["The endpoint may not be a WITSML SOAP service"],
        }
    }
}

// =============================================================================
// TimeoutError
// =============================================================================

/// No reply was received in time.
#[derive(Debug, Clone, Error)]
#[error("{method} timed out after {elapsed:?}")]
pub struct TimeoutError {
    /// Store method that timed out.
    pub method: String,
    /// Time spent before giving up.
    pub elapsed: Duration,
}

impl TimeoutError {
    /// Creates a new timeout error.
    pub fn new(method: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            method: method.into(),
            elapsed,
        }
    }
}

// =============================================================================
// ServerError
// =============================================================================

/// The server answered but the result is a failure.
#[derive(Debug, Clone, Error)]
pub enum ServerError {
    /// Negative result code.
    #[error("Server rejected the request with result code {code}{}", format_message(.message))]
    Rejected {
        /// Original result code.
        code: i32,
        /// Supplementary message (`SuppMsgOut`).
        message: Option<String>,
    },

    /// No schema version is supported by both sides.
    #[error(
        "Incompatible server: client supports [{}], server supports [{}]",
        .client_versions.join(", "),
        .server_versions.join(", ")
    )]
    Incompatible {
        /// Versions offered by the client.
        client_versions: Vec<String>,
        /// Versions advertised by the server.
        server_versions: Vec<String>,
    },
}

fn format_message(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {}", m),
        _ => String::new(),
    }
}

impl ServerError {
    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Rejected { .. } => ErrorSeverity::Warning,
            Self::Incompatible { .. } => ErrorSeverity::Critical,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Rejected { .. } => ErrorCode::new(3, 1),
            Self::Incompatible { .. } => ErrorCode::new(3, 2),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Rejected { .. } => vec![
                "Look up the result code with WMLS_GetBaseMsg",
                "Check the query template against the server's data schema",
            ],
            Self::Incompatible { .. } => vec![
                "Add a schema version supported by the server to the client configuration",
                "Create a new client after changing the configuration",
            ],
        }
    }
}

// =============================================================================
// RequestError
// =============================================================================

/// The request could not be assembled.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// No template, or a field outside the template.
    #[error("Invalid template for '{object_type}': {reason}")]
    InvalidTemplate {
        /// Object type of the query.
        object_type: String,
        /// Why the template was rejected.
        reason: String,
    },

    /// Unknown key or invalid value in the OptionsIn string.
    #[error("Invalid OptionsIn entry '{key}': {reason}")]
    InvalidOptions {
        /// Offending key.
        key: String,
        /// Why the option was rejected.
        reason: String,
    },
}

impl RequestError {
    /// Creates an `InvalidTemplate` error.
    pub fn invalid_template(object_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            object_type: object_type.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidOptions` error.
    pub fn invalid_options(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidTemplate { .. } => ErrorCode::new(4, 1),
            Self::InvalidOptions { .. } => ErrorCode::new(4, 2),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidTemplate { .. } => {
                vec!["Register a template for the object type or remove unknown fields"]
            }
            Self::InvalidOptions { .. } => vec![
                "Use a standard OptionsIn keyword",
                "Declare server-specific keywords in option_extensions",
            ],
        }
    }
}

// =============================================================================
// CodecError
// =============================================================================

/// XML and enum mapping failures.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Unparsable XML or a missing required field.
    #[error("Malformed response at <{element}>: {reason}")]
    MalformedResponse {
        /// Element being decoded.
        element: String,
        /// What was wrong.
        reason: String,
    },

    /// The requested shape has no codec mapping.
    #[error("No codec mapping for shape '{shape}'")]
    UnsupportedShape {
        /// Requested shape.
        shape: String,
    },

    /// A wire literal has no enum mapping.
    #[error("Unknown literal '{literal}' for {type_name}")]
    UnknownEnumLiteral {
        /// The literal that was looked up.
        literal: String,
        /// Target enum type.
        type_name: &'static str,
    },

    /// A measure that cannot be written as given.
    #[error("Invalid measure <{element}>: {reason}")]
    InvalidMeasure {
        /// Element holding the measure.
        element: String,
        /// What was wrong.
        reason: String,
    },

    /// XML writer failure.
    #[error("Failed to encode XML: {message}")]
    Encode {
        /// Error message.
        message: String,
    },
}

impl CodecError {
    /// Creates a `MalformedResponse` error.
    pub fn malformed(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            element: element.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `UnsupportedShape` error.
    pub fn unsupported_shape(shape: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            shape: shape.into(),
        }
    }

    /// Creates an `UnknownEnumLiteral` error.
    pub fn unknown_literal(literal: impl Into<String>, type_name: &'static str) -> Self {
        Self::UnknownEnumLiteral {
            literal: literal.into(),
            type_name,
        }
    }

    /// Creates an encode error.
    pub fn encode(message: impl fmt::Display) -> Self {
        Self::Encode {
            message: message.to_string(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MalformedResponse { .. } => ErrorCode::new(5, 1),
            Self::UnsupportedShape { .. } => ErrorCode::new(5, 2),
            Self::UnknownEnumLiteral { .. } => ErrorCode::new(5, 3),
            Self::InvalidMeasure { .. } => ErrorCode::new(5, 4),
            Self::Encode { .. } => ErrorCode::new(5, 5),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::MalformedResponse { .. } => {
                vec!["The server payload does not match the expected data schema version"]
            }
            Self::UnsupportedShape { .. } => {
                vec!["Use the raw XML of the result envelope for this object type"]
            }
            Self::UnknownEnumLiteral { .. } => vec!["The server uses a non-standard enumeration value"],
            Self::InvalidMeasure { .. } => vec![
                "Set a uom or use a request-only placeholder",
                "Store numeric values as MeasureValue::Number",
            ],
            Self::Encode { .. } => vec![],
        }
    }
}

// =============================================================================
// PaginationError
// =============================================================================

/// Growing-object read failures.
#[derive(Debug, Clone, Error)]
pub enum PaginationError {
    /// The object's structure changed between chunks.
    #[error("Cursor invalidated for {identity}: structure changed ({detail})")]
    CursorInvalidated {
        /// Object identity (`uidWell/uidWellbore/uid`).
        identity: String,
        /// What changed.
        detail: String,
    },

    /// The materialised result exceeded the configured bound.
    #[error("Result for {identity} exceeds the {limit_name} limit of {limit}")]
    ResultTooLarge {
        /// Object identity.
        identity: String,
        /// Which bound (`rows` or `bytes`).
        limit_name: &'static str,
        /// Bound value.
        limit: u64,
    },

    /// Incremental reads were requested for a non-growing object.
    #[error("Object type '{object_type}' is not a growing object")]
    NotGrowing {
        /// Object type.
        object_type: String,
    },
}

impl PaginationError {
    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::CursorInvalidated { .. } => ErrorCode::new(6, 1),
            Self::ResultTooLarge { .. } => ErrorCode::new(6, 2),
            Self::NotGrowing { .. } => ErrorCode::new(6, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::CursorInvalidated { .. } => vec!["Restart the read from the beginning"],
            Self::ResultTooLarge { .. } => vec![
                "Stream the object instead of materialising it",
                "Narrow the index range",
            ],
            Self::NotGrowing { .. } => vec!["Use a regular query for this object type"],
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Client configuration errors.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// A required field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// A field has an invalid value.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Why it is invalid.
        reason: String,
    },

    /// The configuration source could not be loaded.
    #[error("Failed to load configuration from {source_name}: {message}")]
    Load {
        /// File path or source description.
        source_name: String,
        /// Error message.
        message: String,
    },
}

impl ConfigurationError {
    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a load error.
    pub fn load(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Load {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Severity level of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Expected outcome, nothing to act on.
    Info,
    /// Recoverable or caller-correctable.
    Warning,
    /// Operation failed.
    Error,
    /// The client cannot make progress without intervention.
    Critical,
}

impl ErrorSeverity {
    /// Converts to a tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::DEBUG,
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the severity as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Stable error code, rendered as `WM-CCNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category number.
    pub category: u8,
    /// Code within the category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }

    /// Returns the code packed into a u16.
    pub fn as_u16(&self) -> u16 {
        ((self.category as u16) << 8) | self.code as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WM-{:02}{:02}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// A Result type with WitsmlError.
pub type WitsmlResult<T> = Result<T, WitsmlError>;

// =============================================================================
// Tests
// =============================================================================
