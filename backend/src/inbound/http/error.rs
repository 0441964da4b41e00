//! HTTP mapping for domain errors.
//!
//! Handled rejections never reach this module; they are turned into
//! redirects by the handlers. What arrives here is rendered as a JSON
//! `Error` body with a status derived from its code.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message shown for unmatched routes.
pub const MSG_PAGE_NOT_FOUND: &str = "Page Not Found";
/// Message shown instead of any internal failure detail.
pub const MSG_GENERIC_FAILURE: &str = "Something went wrong";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::EnrichmentFailed => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if !error.is_internal() {
        return error.clone();
    }
    let redacted = Error::internal(MSG_GENERIC_FAILURE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            error!(trace_id = ?self.trace_id(), message = self.message(), "request failed");
        } else {
            debug!(code = self.code().as_str(), message = self.message(), "request refused");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(MSG_GENERIC_FAILURE)
    }
}

/// `JsonConfig` error handler turning unreadable bodies into
/// `invalid_request` errors.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected request body");
    Error::invalid_request(format!("request body is not valid JSON: {err}")).into()
}

/// Default service for unmatched routes.
pub async fn page_not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    warn!(method = %req.method(), path = req.path(), "no route matched");
    Err(Error::not_found(MSG_PAGE_NOT_FOUND))
}
