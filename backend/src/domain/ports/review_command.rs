//! Driving port for review mutations.

use async_trait::async_trait;

use crate::domain::{
    AuthContext, Error, ListingId, Outcome, Payload, Review, ReviewId, ReviewInput,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// Store a review by the caller and append it to the listing.
    async fn create_review(
        &self,
        auth: &AuthContext,
        listing: &ListingId,
        input: Payload<ReviewInput>,
    ) -> Result<Outcome<Review>, Error>;

    /// Detach the review from the listing and remove it; author only.
    async fn delete_review(
        &self,
        auth: &AuthContext,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<Outcome<ReviewId>, Error>;
}
