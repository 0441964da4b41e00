//! Driving port for read-only listing use-cases.

use async_trait::async_trait;

use crate::domain::{
    AuthContext, Error, Listing, ListingDetails, ListingFilter, ListingId, Outcome,
};

/// Listing plus the reduced-width image preview shown while editing.
#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    pub listing: Listing,
    pub preview_url: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingQuery: Send + Sync {
    /// All listings passing `filter`.
    async fn index(&self, filter: &ListingFilter) -> Result<Vec<Listing>, Error>;

    /// Expanded listing; a missing id is a handled rejection.
    async fn show(&self, id: &ListingId) -> Result<Outcome<ListingDetails>, Error>;

    /// Gate for the create form; only authentication is checked.
    async fn new_form(&self, auth: &AuthContext) -> Result<Outcome<()>, Error>;

    /// Current listing values for its owner to edit.
    async fn edit_form(&self, auth: &AuthContext, id: &ListingId)
    -> Result<Outcome<EditForm>, Error>;
}
