//! Driven port for listing persistence.

use async_trait::async_trait;

use crate::domain::{
    Listing, ListingChanges, ListingDetails, ListingFilter, ListingId, ReviewId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by listing repository adapters.
    pub enum ListingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "listing repository query failed: {message}",
    }
}

/// Storage operations over listings.
///
/// Absent ids are reported as `Ok(None)` or as a silent no-op, never as an
/// error. Each call is atomic for the single record it touches; there is no
/// transaction spanning calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Listings matching `filter`, oldest first.
    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>, ListingRepositoryError>;

    async fn find_by_id(&self, id: &ListingId)
    -> Result<Option<Listing>, ListingRepositoryError>;

    /// Listing with its owner and its reviews (each with author) expanded.
    async fn find_with_relations(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingDetails>, ListingRepositoryError>;

    async fn insert(&self, listing: &Listing) -> Result<ListingId, ListingRepositoryError>;

    async fn update_fields(
        &self,
        id: &ListingId,
        changes: &ListingChanges,
    ) -> Result<(), ListingRepositoryError>;

    async fn delete_by_id(&self, id: &ListingId) -> Result<(), ListingRepositoryError>;

    /// Append `review` to the listing's ordered review references.
    async fn push_review(
        &self,
        id: &ListingId,
        review: &ReviewId,
    ) -> Result<(), ListingRepositoryError>;

    /// Remove every reference to `review` from the listing.
    async fn pull_review(
        &self,
        id: &ListingId,
        review: &ReviewId,
    ) -> Result<(), ListingRepositoryError>;
}
