//! PostgreSQL-backed `ReviewRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{ListingId, Rating, Review, ReviewId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::ReviewRow;
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

/// Diesel-backed implementation of the review repository port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ReviewRepositoryError {
    map_pool_error(error, ReviewRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    map_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

/// Convert a stored row into a domain review, re-checking the rating range.
pub(super) fn row_to_review(row: ReviewRow) -> Result<Review, RatingOutOfRangeRow> {
    let rating = Rating::new(i64::from(row.rating)).map_err(|_| RatingOutOfRangeRow(row.id))?;
    Ok(Review {
        id: ReviewId::from_uuid(row.id),
        listing: ListingId::from_uuid(row.listing_id),
        rating,
        comment: row.comment,
        author: UserId::from_uuid(row.author_id),
        created_at: row.created_at,
    })
}

/// A stored review whose rating no longer satisfies the domain range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("review {0} holds an out-of-range rating")]
pub(super) struct RatingOutOfRangeRow(pub Uuid);

fn review_to_row(review: &Review) -> ReviewRow {
    ReviewRow {
        id: *review.id.as_uuid(),
        listing_id: *review.listing.as_uuid(),
        rating: i16::from(review.rating.value()),
        comment: review.comment.clone(),
        author_id: *review.author.as_uuid(),
        created_at: review.created_at,
    }
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert(&self, review: &Review) -> Result<ReviewId, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(reviews::table)
            .values(&review_to_row(review))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(review.id)
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = reviews::table
            .find(id.as_uuid())
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_review)
            .transpose()
            .map_err(|err| ReviewRepositoryError::query(err.to_string()))
    }

    async fn delete_by_id(&self, id: &ReviewId) -> Result<(), ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(reviews::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[ReviewId]) -> Result<usize, ReviewRepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        diesel::delete(reviews::table.filter(reviews::id.eq_any(raw)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)
    }
}
