//! Driving port for listing mutations.

use async_trait::async_trait;

use crate::domain::{
    AuthContext, Error, Listing, ListingId, ListingInput, Outcome, Payload, UploadHandle,
};

/// Payload for create and update: raw fields plus an optional uploaded file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingSubmission {
    pub input: ListingInput,
    pub upload: Option<UploadHandle>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Validate, geocode, attach media, and store a new listing.
    ///
    /// A malformed body is reported only after authentication.
    async fn create(
        &self,
        auth: &AuthContext,
        submission: Payload<ListingSubmission>,
    ) -> Result<Outcome<Listing>, Error>;

    /// Replace the listing's fields; the image changes only if a file is sent.
    ///
    /// A malformed body is reported only after the ownership check.
    async fn update(
        &self,
        auth: &AuthContext,
        id: &ListingId,
        submission: Payload<ListingSubmission>,
    ) -> Result<Outcome<Listing>, Error>;

    /// Remove the listing and its reviews.
    async fn delete(&self, auth: &AuthContext, id: &ListingId)
    -> Result<Outcome<ListingId>, Error>;
}
