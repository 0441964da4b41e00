//! Request pipeline driver for mutating listing and review operations.
//!
//! Every mutating request walks an ordered sequence of [`Stage`]s. Guards and
//! validators report a tagged [`Verdict`]; the driver short-circuits on the
//! first `Deny` or `Invalid` so later stages, and in particular
//! [`Stage::Persisting`], never run for a rejected request.
//!
//! Stages only move forward. Entering a stage at or before the current one is
//! an internal error.

use std::fmt;

use tracing::{debug, info};

use super::{AuthContext, Error, ListingId, UserId, ValidationErrors};

/// Flash shown when a protected operation is attempted anonymously.
pub const MSG_LOGIN_REQUIRED: &str = "you must be logged in!";
/// Flash shown when a principal tries to mutate someone else's listing.
pub const MSG_NOT_OWNER: &str = "You are not the owner of this listing";
/// Flash shown when a principal tries to delete someone else's review.
pub const MSG_NOT_AUTHOR: &str = "You are not the author of this review";
/// Flash shown when the addressed listing is absent.
pub const MSG_LISTING_MISSING: &str = "Listing you requested for does not exist!";
/// Flash shown when the addressed review is absent.
pub const MSG_REVIEW_MISSING: &str = "Review you requested for does not exist!";

/// Ordered pipeline stages. Declaration order is execution order; an
/// operation skips the stages it does not need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Resolve the principal from the request's [`AuthContext`].
    Authenticating,
    /// Load the listing and compare its owner with the principal.
    AuthorizingOwnership,
    /// Load the review and compare its author with the principal.
    AuthorizingAuthorship,
    /// Decode the body and check it against its schema.
    Validating,
    /// Resolve the listing location to coordinates.
    Enriching,
    /// Confirm the uploaded image with the media host.
    AttachingMedia,
    /// The only stage that writes to storage.
    Persisting,
    /// Terminal; reached only by runs that were not halted.
    Done,
}

impl Stage {
    /// Snake-case label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authenticating => "authenticating",
            Self::AuthorizingOwnership => "authorizing_ownership",
            Self::AuthorizingAuthorship => "authorizing_authorship",
            Self::Validating => "validating",
            Self::Enriching => "enriching",
            Self::AttachingMedia => "attaching_media",
            Self::Persisting => "persisting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations driven through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /listings/new`: authenticate only.
    NewListingForm,
    /// `POST /listings`: authenticate, validate, geocode, attach, persist.
    CreateListing,
    /// `GET /listings/{id}/edit`: authenticate, check ownership.
    EditListingForm,
    /// `PUT /listings/{id}`: authenticate, check ownership, validate, attach,
    /// persist.
    UpdateListing,
    /// `DELETE /listings/{id}`: authenticate, check ownership, persist.
    DeleteListing,
    /// `POST /listings/{id}/reviews`: authenticate, validate, persist.
    CreateReview,
    /// `DELETE /listings/{id}/reviews/{review_id}`: authenticate, check
    /// authorship, persist.
    DeleteReview,
}

impl Operation {
    /// Snake-case label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewListingForm => "new_listing_form",
            Self::CreateListing => "create_listing",
            Self::EditListingForm => "edit_listing_form",
            Self::UpdateListing => "update_listing",
            Self::DeleteListing => "delete_listing",
            Self::CreateReview => "create_review",
            Self::DeleteReview => "delete_review",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request was turned away without touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// No principal; the caller is sent to log in.
    Unauthenticated,
    /// The principal does not own the addressed listing.
    NotOwner,
    /// The principal did not write the addressed review.
    NotAuthor,
    /// The addressed listing or review does not exist, or its id is malformed.
    Missing,
}

/// Where the caller should be sent after a rejection or success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    /// `/login`
    Login,
    /// `/listings`
    Listings,
    /// `/listings/{id}`
    Listing(ListingId),
}

impl RedirectTarget {
    /// Request path for the target.
    ///
    /// # Examples
    /// ```
    /// use wanderlust::domain::RedirectTarget;
    ///
    /// assert_eq!(RedirectTarget::Login.path(), "/login");
    /// assert_eq!(RedirectTarget::Listings.path(), "/listings");
    /// ```
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_owned(),
            Self::Listings => "/listings".to_owned(),
            Self::Listing(id) => format!("/listings/{id}"),
        }
    }
}

/// A handled refusal: a user-visible message plus a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,
    /// Flash text shown after the redirect.
    pub message: &'static str,
    pub redirect: RedirectTarget,
    /// Path to resume after logging in; only set for `Unauthenticated`.
    pub return_to: Option<String>,
}

impl Rejection {
    /// Send an anonymous caller to `/login`, remembering `requested_path` so
    /// a successful login resumes there.
    ///
    /// # Examples
    /// ```
    /// use wanderlust::domain::{RedirectTarget, Rejection, RejectionKind};
    ///
    /// let rejection = Rejection::unauthenticated("/listings/new");
    /// assert_eq!(rejection.kind, RejectionKind::Unauthenticated);
    /// assert_eq!(rejection.redirect, RedirectTarget::Login);
    /// assert_eq!(rejection.return_to.as_deref(), Some("/listings/new"));
    /// ```
    pub fn unauthenticated(requested_path: impl Into<String>) -> Self {
        Self {
            kind: RejectionKind::Unauthenticated,
            message: MSG_LOGIN_REQUIRED,
            redirect: RedirectTarget::Login,
            return_to: Some(requested_path.into()),
        }
    }

    /// Refuse a listing mutation by someone other than its owner; the caller
    /// lands back on the listing.
    pub fn not_owner(listing: ListingId) -> Self {
        Self {
            kind: RejectionKind::NotOwner,
            message: MSG_NOT_OWNER,
            redirect: RedirectTarget::Listing(listing),
            return_to: None,
        }
    }

    /// Refuse a review deletion by someone other than its author.
    pub fn not_author(listing: ListingId) -> Self {
        Self {
            kind: RejectionKind::NotAuthor,
            message: MSG_NOT_AUTHOR,
            redirect: RedirectTarget::Listing(listing),
            return_to: None,
        }
    }

    /// The listing is absent; the caller returns to the index.
    pub fn listing_missing() -> Self {
        Self {
            kind: RejectionKind::Missing,
            message: MSG_LISTING_MISSING,
            redirect: RedirectTarget::Listings,
            return_to: None,
        }
    }

    /// The review is absent or belongs to another listing; the caller
    /// returns to `listing`.
    pub fn review_missing(listing: ListingId) -> Self {
        Self {
            kind: RejectionKind::Missing,
            message: MSG_REVIEW_MISSING,
            redirect: RedirectTarget::Listing(listing),
            return_to: None,
        }
    }
}

/// Result of a single guard or validator step.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<T = ()> {
    /// Continue with the produced value.
    Allow(T),
    /// Handled refusal; surfaces as a redirect with a flash.
    Deny(Rejection),
    /// Payload failed validation; surfaces as `invalid_request`.
    Invalid(ValidationErrors),
}

impl<T> From<Result<T, ValidationErrors>> for Verdict<T> {
    fn from(value: Result<T, ValidationErrors>) -> Self {
        match value {
            Ok(value) => Self::Allow(value),
            Err(errors) => Self::Invalid(errors),
        }
    }
}

/// Why a pipeline stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// A guard or the authentication step said no.
    Rejected(Rejection),
    /// Validation or an adapter failed.
    Failed(Error),
}

impl From<Error> for Halt {
    fn from(value: Error) -> Self {
        Self::Failed(value)
    }
}

/// Final result of a pipeline run that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Done(value) => Outcome::Done(f(value)),
            Self::Rejected(rejection) => Outcome::Rejected(rejection),
        }
    }
}

/// Collapse a halted run into an outcome, keeping hard failures as errors.
pub fn settle<T>(result: Result<T, Halt>) -> Result<Outcome<T>, Error> {
    match result {
        Ok(value) => Ok(Outcome::Done(value)),
        Err(Halt::Rejected(rejection)) => Ok(Outcome::Rejected(rejection)),
        Err(Halt::Failed(error)) => Err(error),
    }
}

/// Resolve the acting principal or deny the request.
pub fn require_principal(auth: &AuthContext) -> Verdict<UserId> {
    match auth.current_principal() {
        Some(principal) => Verdict::Allow(principal.clone()),
        None => Verdict::Deny(Rejection::unauthenticated(auth.requested_path())),
    }
}

/// Tracks stage progression for one request.
///
/// # Examples
/// ```
/// use wanderlust::domain::{Operation, Pipeline, Stage};
///
/// let mut pipeline = Pipeline::start(Operation::CreateListing);
/// assert!(pipeline.enter(Stage::Authenticating).is_ok());
/// assert!(pipeline.enter(Stage::Validating).is_ok());
/// assert!(pipeline.enter(Stage::Authenticating).is_err());
/// ```
#[derive(Debug)]
pub struct Pipeline {
    operation: Operation,
    stage: Option<Stage>,
}

impl Pipeline {
    /// Begin a run for `operation` with no stage entered yet.
    pub fn start(operation: Operation) -> Self {
        Self {
            operation,
            stage: None,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Move to `stage`, which must come strictly after the current one.
    pub fn enter(&mut self, stage: Stage) -> Result<(), Halt> {
        if let Some(current) = self.stage.filter(|current| stage <= *current) {
            return Err(Halt::Failed(Error::internal(format!(
                "{} pipeline cannot move from {current} back to {stage}",
                self.operation
            ))));
        }
        debug!(operation = %self.operation, stage = %stage, "pipeline stage entered");
        self.stage = Some(stage);
        Ok(())
    }

    /// Unwrap an `Allow` or halt the run on `Deny`/`Invalid`.
    pub fn admit<T>(&self, verdict: Verdict<T>) -> Result<T, Halt> {
        match verdict {
            Verdict::Allow(value) => Ok(value),
            Verdict::Deny(rejection) => {
                info!(
                    operation = %self.operation,
                    stage = ?self.stage,
                    kind = ?rejection.kind,
                    "pipeline request rejected"
                );
                Err(Halt::Rejected(rejection))
            }
            Verdict::Invalid(errors) => {
                info!(
                    operation = %self.operation,
                    stage = ?self.stage,
                    errors = errors.errors().len(),
                    "pipeline payload invalid"
                );
                Err(Halt::Failed(errors.into()))
            }
        }
    }

    /// Enter [`Stage::Authenticating`] and resolve the principal.
    pub fn authenticate(&mut self, auth: &AuthContext) -> Result<UserId, Halt> {
        self.enter(Stage::Authenticating)?;
        self.admit(require_principal(auth))
    }

    /// Enter [`Stage::Done`] and hand back `value`.
    pub fn finish<T>(mut self, value: T) -> Result<T, Halt> {
        self.enter(Stage::Done)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, ListingInput, Schema};
    use rstest::rstest;

    #[rstest]
    fn stages_cannot_be_re_entered() {
        let mut pipeline = Pipeline::start(Operation::UpdateListing);
        pipeline.enter(Stage::Authenticating).expect("first stage");
        pipeline
            .enter(Stage::AuthorizingOwnership)
            .expect("second stage");
        let halt = pipeline
            .enter(Stage::AuthorizingOwnership)
            .expect_err("re-entry");
        let Halt::Failed(error) = halt else {
            panic!("expected failure, got {halt:?}");
        };
        assert_eq!(error.code(), ErrorCode::InternalError);
        assert_eq!(pipeline.stage(), Some(Stage::AuthorizingOwnership));
    }

    #[rstest]
    fn anonymous_callers_are_sent_to_login_with_return_path() {
        let mut pipeline = Pipeline::start(Operation::CreateListing);
        let auth = AuthContext::anonymous("/listings/new");
        let halt = pipeline.authenticate(&auth).expect_err("anonymous");
        assert_eq!(
            halt,
            Halt::Rejected(Rejection::unauthenticated("/listings/new"))
        );
    }

    #[rstest]
    fn authenticated_callers_yield_principal() {
        let mut pipeline = Pipeline::start(Operation::CreateReview);
        let principal = UserId::random();
        let auth = AuthContext::authenticated(principal.clone(), "/listings");
        assert_eq!(pipeline.authenticate(&auth), Ok(principal));
    }

    #[rstest]
    fn invalid_verdict_becomes_invalid_request() {
        let pipeline = Pipeline::start(Operation::CreateListing);
        let verdict: Verdict<_> = ListingInput::default().validate().into();
        let Err(Halt::Failed(error)) = pipeline.admit(verdict) else {
            panic!("expected invalid request");
        };
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn settle_separates_rejections_from_failures() {
        let rejected: Result<(), Halt> = Err(Halt::Rejected(Rejection::listing_missing()));
        assert_eq!(
            settle(rejected),
            Ok(Outcome::Rejected(Rejection::listing_missing()))
        );

        let failed: Result<(), Halt> = Err(Halt::Failed(Error::service_unavailable("db")));
        assert!(settle(failed).is_err());
    }

    #[rstest]
    #[case(RedirectTarget::Login, "/login")]
    #[case(RedirectTarget::Listings, "/listings")]
    #[case(
        RedirectTarget::Listing(ListingId::from_uuid(uuid::Uuid::nil())),
        "/listings/00000000-0000-0000-0000-000000000000"
    )]
    fn redirect_paths(#[case] target: RedirectTarget, #[case] expected: &str) {
        assert_eq!(target.path(), expected);
    }
}
