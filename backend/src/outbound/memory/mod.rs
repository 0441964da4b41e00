//! Process-local store implementing every repository port.
//!
//! Used when no database is configured and by tests. State lives behind one
//! `RwLock`; each port call takes the lock once, so single-record operations
//! are atomic with respect to each other, matching the guarantees of the
//! PostgreSQL adapters.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    ListingRepository, ListingRepositoryError, ReviewRepository, ReviewRepositoryError,
    UserCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Listing, ListingChanges, ListingDetails, ListingFilter, ListingId, PasswordDigest, Review,
    ReviewDetails, ReviewId, User, UserId,
};

#[derive(Debug, Default)]
struct State {
    listings: Vec<Listing>,
    reviews: HashMap<ReviewId, Review>,
    users: Vec<UserCredentials>,
}

impl State {
    fn user(&self, id: &UserId) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.user.id() == id)
            .map(|entry| entry.user.clone())
    }

    fn listing_mut(&mut self, id: &ListingId) -> Option<&mut Listing> {
        self.listings.iter_mut().find(|listing| &listing.id == id)
    }
}

/// In-memory implementation of the listing, review, and user repositories.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, String> {
        self.state.read().map_err(|_| POISONED.to_owned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, String> {
        self.state.write().map_err(|_| POISONED.to_owned())
    }

    /// Number of stored listings.
    pub fn listing_count(&self) -> Result<usize, ListingRepositoryError> {
        let state = self.read().map_err(ListingRepositoryError::query)?;
        Ok(state.listings.len())
    }

    /// Number of stored reviews, including any orphaned by a failed cascade.
    pub fn review_count(&self) -> Result<usize, ReviewRepositoryError> {
        let state = self.read().map_err(ReviewRepositoryError::query)?;
        Ok(state.reviews.len())
    }
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>, ListingRepositoryError> {
        let state = self.read().map_err(ListingRepositoryError::query)?;
        Ok(state
            .listings
            .iter()
            .filter(|listing| filter.matches(listing))
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let state = self.read().map_err(ListingRepositoryError::query)?;
        Ok(state.listings.iter().find(|listing| &listing.id == id).cloned())
    }

    async fn find_with_relations(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingDetails>, ListingRepositoryError> {
        let state = self.read().map_err(ListingRepositoryError::query)?;
        let Some(listing) = state.listings.iter().find(|listing| &listing.id == id) else {
            return Ok(None);
        };
        let reviews = listing
            .reviews
            .iter()
            .filter_map(|review_id| state.reviews.get(review_id))
            .map(|review| ReviewDetails {
                review: review.clone(),
                author: state.user(&review.author),
            })
            .collect();
        Ok(Some(ListingDetails {
            listing: listing.clone(),
            owner: state.user(&listing.owner),
            reviews,
        }))
    }

    async fn insert(&self, listing: &Listing) -> Result<ListingId, ListingRepositoryError> {
        let mut state = self.write().map_err(ListingRepositoryError::query)?;
        if state.listings.iter().any(|existing| existing.id == listing.id) {
            return Err(ListingRepositoryError::query(format!(
                "listing {} already exists",
                listing.id
            )));
        }
        state.listings.push(listing.clone());
        Ok(listing.id)
    }

    async fn update_fields(
        &self,
        id: &ListingId,
        changes: &ListingChanges,
    ) -> Result<(), ListingRepositoryError> {
        let mut state = self.write().map_err(ListingRepositoryError::query)?;
        if let Some(listing) = state.listing_mut(id) {
            listing.apply(changes);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &ListingId) -> Result<(), ListingRepositoryError> {
        let mut state = self.write().map_err(ListingRepositoryError::query)?;
        state.listings.retain(|listing| &listing.id != id);
        Ok(())
    }

    async fn push_review(
        &self,
        id: &ListingId,
        review: &ReviewId,
    ) -> Result<(), ListingRepositoryError> {
        let mut state = self.write().map_err(ListingRepositoryError::query)?;
        if let Some(listing) = state.listing_mut(id) {
            listing.reviews.push(*review);
        }
        Ok(())
    }

    async fn pull_review(
        &self,
        id: &ListingId,
        review: &ReviewId,
    ) -> Result<(), ListingRepositoryError> {
        let mut state = self.write().map_err(ListingRepositoryError::query)?;
        if let Some(listing) = state.listing_mut(id) {
            listing.reviews.retain(|existing| existing != review);
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn insert(&self, review: &Review) -> Result<ReviewId, ReviewRepositoryError> {
        let mut state = self.write().map_err(ReviewRepositoryError::query)?;
        state.reviews.insert(review.id, review.clone());
        Ok(review.id)
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        let state = self.read().map_err(ReviewRepositoryError::query)?;
        Ok(state.reviews.get(id).cloned())
    }

    async fn delete_by_id(&self, id: &ReviewId) -> Result<(), ReviewRepositoryError> {
        let mut state = self.write().map_err(ReviewRepositoryError::query)?;
        state.reviews.remove(id);
        Ok(())
    }

    async fn delete_many(&self, ids: &[ReviewId]) -> Result<usize, ReviewRepositoryError> {
        let mut state = self.write().map_err(ReviewRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter(|id| state.reviews.remove(*id).is_some())
            .count())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.write().map_err(UserPersistenceError::query)?;
        if state
            .users
            .iter()
            .any(|entry| entry.user.username() == user.username())
        {
            return Err(UserPersistenceError::duplicate_username(
                user.username().as_ref(),
            ));
        }
        state.users.push(UserCredentials {
            user: user.clone(),
            digest: digest.clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.read().map_err(UserPersistenceError::query)?;
        Ok(state.user(id))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let state = self.read().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .find(|entry| entry.user.username().as_ref() == username.trim())
            .cloned())
    }
}
