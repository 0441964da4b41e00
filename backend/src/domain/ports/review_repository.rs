//! Driven port for review persistence.

use async_trait::async_trait;

use crate::domain::{Review, ReviewId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, review: &Review) -> Result<ReviewId, ReviewRepositoryError>;

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError>;

    async fn delete_by_id(&self, id: &ReviewId) -> Result<(), ReviewRepositoryError>;

    /// Remove all of `ids`; unknown ids are ignored. Returns how many went.
    async fn delete_many(&self, ids: &[ReviewId]) -> Result<usize, ReviewRepositoryError>;
}
