//! Review entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListingId, ReviewId, UserId};

/// Lowest accepted rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted rating.
pub const RATING_MAX: u8 = 5;

/// Raised when a rating falls outside `RATING_MIN..=RATING_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between {RATING_MIN} and {RATING_MAX}, got {value}")]
pub struct RatingOutOfRange {
    pub value: i64,
}

/// Star rating attached to a review.
///
/// # Examples
/// ```
/// use wanderlust::domain::Rating;
///
/// assert_eq!(Rating::new(4).unwrap().value(), 4);
/// assert!(Rating::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i64) -> Result<Self, RatingOutOfRange> {
        u8::try_from(value)
            .ok()
            .filter(|rating| (RATING_MIN..=RATING_MAX).contains(rating))
            .map(Self)
            .ok_or(RatingOutOfRange { value })
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Validated review fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub rating: Rating,
    pub comment: String,
}

/// Persisted review. `listing` is the back-reference to the reviewed listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub listing: ListingId,
    pub rating: Rating,
    pub comment: String,
    pub author: UserId,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Assemble a new review written by `author` against `listing`.
    pub fn create(
        draft: ReviewDraft,
        listing: ListingId,
        author: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReviewId::random(),
            listing,
            rating: draft.rating,
            comment: draft.comment,
            author,
            created_at,
        }
    }

    pub fn is_authored_by(&self, principal: &UserId) -> bool {
        &self.author == principal
    }
}
