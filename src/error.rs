//! Error types for the dispatch path and the route compiler.
//!
//! Three families live here:
//!
//! - [`HttpError`] - the value a handler raises to pick a response status
//! - [`ChainError`] - what the failure handler receives when a chain fails
//! - [`RouteError`] - returned by `Router::mount` when a template cannot be compiled
//!
//! Handlers themselves return `anyhow::Result`, so any error type converts into a
//! failure. The status is recovered by looking for an [`HttpError`] inside the
//! `anyhow::Error`; everything else is a 500.

use http::{Method, StatusCode};
use serde_json::Value;
use std::fmt;

/// Message used when `panic` is called with something that is not an error.
pub const INVALID_PANIC_MESSAGE: &str = "panic argument must be an error value";

/// An error carrying the HTTP status it should be rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Create an error with an explicit status and message
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create an error whose message is the canonical reason phrase of `status`
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("unknown"))
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::from_status(StatusCode::NOT_FOUND)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for HttpError {}

/// Why a request chain terminated through the failure path.
#[derive(Debug)]
pub enum ChainError {
    /// A handler returned `Err` or panicked while running
    HandlerThrown(anyhow::Error),
    /// A handler called `panic` with an error value
    PanicInvoked(anyhow::Error),
    /// A handler called `panic` with something that is not an error
    ///
    /// Carries the offending value when there was one.
    InvalidPanicArgument(Option<Value>),
}

impl ChainError {
    /// Status the failure should be rendered with
    ///
    /// The status of the first [`HttpError`] found in the error, otherwise 500.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ChainError::HandlerThrown(err) | ChainError::PanicInvoked(err) => err
                .downcast_ref::<HttpError>()
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, HttpError::status),
            ChainError::InvalidPanicArgument(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message for the failure
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ChainError::HandlerThrown(err) | ChainError::PanicInvoked(err) => {
                match err.downcast_ref::<HttpError>() {
                    Some(http) => http.message().to_string(),
                    None => err.to_string(),
                }
            }
            ChainError::InvalidPanicArgument(_) => INVALID_PANIC_MESSAGE.to_string(),
        }
    }

    /// Short name of the failure kind, used as a log field
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ChainError::HandlerThrown(_) => "handler_thrown",
            ChainError::PanicInvoked(_) => "panic_invoked",
            ChainError::InvalidPanicArgument(_) => "invalid_panic_argument",
        }
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::HandlerThrown(err) => write!(f, "handler failed: {err:#}"),
            ChainError::PanicInvoked(err) => write!(f, "handler signalled failure: {err:#}"),
            ChainError::InvalidPanicArgument(Some(value)) => {
                write!(f, "{INVALID_PANIC_MESSAGE} (got {value})")
            }
            ChainError::InvalidPanicArgument(None) => write!(f, "{INVALID_PANIC_MESSAGE}"),
        }
    }
}

impl std::error::Error for ChainError {}

/// Argument accepted by `Context::panic`.
///
/// Error values become [`ChainError::PanicInvoked`]; anything else is normalized
/// to [`ChainError::InvalidPanicArgument`].
#[derive(Debug)]
pub enum PanicArg {
    Error(anyhow::Error),
    Invalid(Option<Value>),
}

impl From<anyhow::Error> for PanicArg {
    fn from(err: anyhow::Error) -> Self {
        PanicArg::Error(err)
    }
}

impl From<HttpError> for PanicArg {
    fn from(err: HttpError) -> Self {
        PanicArg::Error(err.into())
    }
}

impl From<Value> for PanicArg {
    fn from(value: Value) -> Self {
        PanicArg::Invalid(Some(value))
    }
}

impl From<&str> for PanicArg {
    fn from(value: &str) -> Self {
        PanicArg::Invalid(Some(Value::String(value.to_string())))
    }
}

impl From<String> for PanicArg {
    fn from(value: String) -> Self {
        PanicArg::Invalid(Some(Value::String(value)))
    }
}

impl From<()> for PanicArg {
    fn from((): ()) -> Self {
        PanicArg::Invalid(None)
    }
}

impl From<PanicArg> for ChainError {
    fn from(arg: PanicArg) -> Self {
        match arg {
            PanicArg::Error(err) => ChainError::PanicInvoked(err),
            PanicArg::Invalid(value) => ChainError::InvalidPanicArgument(value),
        }
    }
}

/// Route template compilation error
///
/// Returned by `Router::mount` when an entity cannot be turned into a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The entity was declared without any handler
    NoHandlers {
        /// Method of the offending entity
        method: Method,
        /// Full template of the offending entity
        template: String,
    },
    /// A wildcard is followed by further segments
    MisplacedWildcard {
        template: String,
    },
    /// A parameter name is empty or contains characters other than `[A-Za-z0-9_]`
    InvalidParamName {
        template: String,
        segment: String,
    },
    /// The generated pattern was rejected by the regex engine
    InvalidPattern {
        template: String,
        reason: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NoHandlers { method, template } => {
                write!(f, "route {method} {template} has no handlers")
            }
            RouteError::MisplacedWildcard { template } => write!(
                f,
                "route template '{template}': a wildcard must be the last segment"
            ),
            RouteError::InvalidParamName { template, segment } => write!(
                f,
                "route template '{template}': invalid parameter segment '{segment}'"
            ),
            RouteError::InvalidPattern { template, reason } => {
                write!(f, "route template '{template}' produced an invalid pattern: {reason}")
            }
        }
    }
}

impl std::error::Error for RouteError {}
