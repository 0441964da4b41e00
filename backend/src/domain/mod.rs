//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed listing, review, and user entities, the
//! validation shapes that produce them, and the guarded request pipeline that
//! every mutation runs through. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Listing, Review, User: persisted entities.
//! - ListingInput, ReviewInput: raw request shapes and their `Schema`.
//! - Pipeline, Verdict, Outcome, Rejection: request pipeline vocabulary.
//! - OwnershipGuard, AuthorshipGuard: per-record authorization.
//! - ListingService, UserAccountService: driving port implementations.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod guards;
pub mod identifier;
pub mod listing;
pub mod listing_service;
pub mod pipeline;
pub mod ports;
pub mod review;
mod storage_errors;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::account_service::{MSG_BAD_CREDENTIALS, UserAccountService};
pub use self::auth::{
    AuthContext, LoginCredentials, LoginValidationError, PASSWORD_MIN, PasswordDigest,
    PasswordDigestError, SignupDetails, SignupValidationError,
};
pub use self::error::{Error, ErrorCode};
pub use self::guards::{AuthorshipGuard, OwnershipGuard};
pub use self::identifier::{InvalidIdentifier, ListingId, ReviewId};
pub use self::listing::{
    Geometry, GeometryKind, Listing, ListingChanges, ListingDetails, ListingDraft, ListingFilter,
    ListingValidationError, MediaRef, Price, ReviewDetails, UploadHandle,
};
pub use self::listing_service::ListingService;
pub use self::pipeline::{
    Halt, MSG_LISTING_MISSING, MSG_LOGIN_REQUIRED, MSG_NOT_AUTHOR, MSG_NOT_OWNER,
    MSG_REVIEW_MISSING, Operation, Outcome, Pipeline, RedirectTarget, Rejection, RejectionKind,
    Stage, Verdict, require_principal, settle,
};
pub use self::review::{RATING_MAX, RATING_MIN, Rating, RatingOutOfRange, Review, ReviewDraft};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, USERNAME_MAX, USERNAME_MIN, User, UserId, UserValidationError, Username,
};
pub use self::validation::{
    FieldError, FieldErrorCode, ListingInput, Payload, ReviewInput, Schema, ValidationErrors,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use wanderlust::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
