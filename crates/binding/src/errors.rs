//! Error types for route registration and calls.
//!
//! [`ConfigurationError`] can only surface while a route table is being built
//! or a client is being assembled. [`CallError`] is what every installed
//! method returns on failure; of its variants only
//! [`CallError::PlatformApi`] carries information reported by the remote
//! service.

use thiserror::Error;

use crate::{HttpVerb, MethodName, PlatformName};

// ---------------------------------------------------------------------------
// Registration-time errors
// ---------------------------------------------------------------------------

/// A route table or client could not be assembled.
///
/// Fatal for adapter setup; no partially built table is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A path template is empty or malformed.
    #[error("invalid path template '{template}': {reason}")]
    InvalidTemplate {
        template: String,
        reason: String,
    },

    /// A route declares an empty method name.
    #[error("route {verb} {template} has an empty method name")]
    EmptyMethodName { template: String, verb: HttpVerb },

    /// A declarative table names a verb outside the supported set.
    #[error("route '{template}' uses unsupported verb '{verb}'")]
    UnknownVerb { template: String, verb: String },

    /// The same (template, verb) pair is declared twice.
    #[error("route {verb} {template} is declared more than once")]
    DuplicateRoute { template: String, verb: HttpVerb },

    /// A declarative table repeats a path template key.
    #[error("path template '{template}' appears more than once in the route table")]
    DuplicateTemplate { template: String },

    /// Two routes install the same method name.
    #[error(
        "method '{method}' is already bound to {existing_verb} {existing_template}; \
         cannot rebind it to {verb} {template}"
    )]
    DuplicateMethod {
        method: MethodName,
        existing_template: String,
        existing_verb: HttpVerb,
        template: String,
        verb: HttpVerb,
    },

    /// The declarative table is not shaped as `{ template: { VERB: name } }`.
    #[error("malformed route table: {message}")]
    MalformedTable { message: String },

    /// Adapter or transport settings are unusable (bad base URL, header, ...).
    #[error("Configuration error: {message}")]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Call-time errors
// ---------------------------------------------------------------------------

/// The transport failed, or delivered a response with no structured
/// platform error in it.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, TLS, reset, ...).
    #[error("connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The transport's timeout elapsed.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The request could not be expressed on the wire (bad URL, bad MIME type, ...).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The response status signals failure and the body carries no
    /// structured platform error.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// A successful response is not the envelope the platform promises.
    #[error("malformed response envelope (HTTP {status}): {body}")]
    MalformedEnvelope { status: u16, body: String },

    /// A successful response body could not be decoded as JSON.
    #[error("undecodable response body (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    pub fn connection(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the HTTP status if the failure came with a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. }
            | Self::MalformedEnvelope { status, .. }
            | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A structured failure reported by the remote platform.
///
/// Displays as `"<Platform> API error <code>. <description>"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{platform} API error {code}. {description}")]
pub struct PlatformApiError {
    pub platform: PlatformName,
    pub code: i64,
    pub description: String,
}

/// The caller's arguments do not fit the route. Raised before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("missing path parameter '{placeholder}' for {template}")]
    MissingPathParameter {
        placeholder: String,
        template: String,
    },

    #[error("too many arguments for {template}: {unused} positional argument(s) left over")]
    TooManyArguments { template: String, unused: usize },

    /// The value would not stay inside its path segment (`""`, `.` or `..`).
    #[error("path parameter '{placeholder}' for {template} cannot be {value:?}")]
    InvalidPathParameter {
        placeholder: String,
        template: String,
        value: String,
    },

    #[error("{verb} {template} cannot carry this payload: {reason}")]
    UnsupportedPayload {
        template: String,
        verb: HttpVerb,
        reason: String,
    },

    #[error("payload could not be serialised: {message}")]
    Serialize { message: String },
}

/// Every way an installed method can fail.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    PlatformApi(#[from] PlatformApiError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// No route installs a method of this name.
    #[error("unknown method '{0}'")]
    UnknownMethod(String),

    /// A successful result did not match the type the caller asked for.
    #[error("result of '{method}' does not match the expected type: {source}")]
    Decode {
        method: MethodName,
        #[source]
        source: serde_json::Error,
    },
}

impl CallError {
    /// Returns the platform error, if the remote service reported one.
    pub fn platform_error(&self) -> Option<&PlatformApiError> {
        match self {
            Self::PlatformApi(e) => Some(e),
            _ => None,
        }
    }
}
