//! Transport-agnostic failure payload shared by services and adapters.
//!
//! Handled rejections (login required, not the owner, missing record) are
//! not errors; they travel as [`crate::domain::Outcome::Rejected`]. This type
//! covers everything that ends a request abnormally.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Stable machine-readable failure category, serialised in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed body or failed field validation.
    InvalidRequest,
    /// Missing or wrong credentials.
    Unauthorized,
    Forbidden,
    NotFound,
    /// Geocoding or media attachment failed.
    EnrichmentFailed,
    /// A backing store could not be reached.
    ServiceUnavailable,
    InternalError,
}

impl ErrorCode {
    /// Wire name of the code, as it appears in JSON bodies and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::EnrichmentFailed => "enrichment_failed",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

/// Domain error payload.
///
/// Captures the current [`TraceId`] on construction so adapters can correlate
/// the failure with request logs.
///
/// # Examples
/// ```
/// use wanderlust::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "missing");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error tagged with the in-scope trace identifier.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier, when one was in scope.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured detail for clients, such as per-field validation errors.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use wanderlust::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "title" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// True for failures whose detail must not reach clients.
    pub fn is_internal(&self) -> bool {
        self.code == ErrorCode::InternalError
    }
}

macro_rules! error_constructors {
    ($($name:ident => $code:ident),+ $(,)?) => {
        impl Error {
            $(
                #[doc = concat!("Build an [`ErrorCode::", stringify!($code), "`] error.")]
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorCode::$code, message)
                }
            )+
        }
    };
}

error_constructors! {
    invalid_request => InvalidRequest,
    unauthorized => Unauthorized,
    forbidden => Forbidden,
    not_found => NotFound,
    enrichment_failed => EnrichmentFailed,
    service_unavailable => ServiceUnavailable,
    internal => InternalError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for Error {}
