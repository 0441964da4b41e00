//! Ownership and authorship guards.
//!
//! Both guards load the target record and compare the stored principal with
//! the caller by value. They fail closed: a missing record is a `Deny` that
//! reports "does not exist", never an internal error. The record they load
//! is handed back on `Allow` so callers do not need a second lookup.

use super::ports::{ListingRepository, ReviewRepository};
use super::storage_errors::{map_listing_error, map_review_error};
use super::{Error, Listing, ListingId, Rejection, Review, ReviewId, UserId, Verdict};

/// Allows mutations of a listing by its owner only.
pub struct OwnershipGuard<'a> {
    listings: &'a dyn ListingRepository,
}

impl<'a> OwnershipGuard<'a> {
    pub fn new(listings: &'a dyn ListingRepository) -> Self {
        Self { listings }
    }

    pub async fn authorize_owner(
        &self,
        id: &ListingId,
        principal: &UserId,
    ) -> Result<Verdict<Listing>, Error> {
        let listing = self
            .listings
            .find_by_id(id)
            .await
            .map_err(map_listing_error)?;
        Ok(match listing {
            None => Verdict::Deny(Rejection::listing_missing()),
            Some(listing) if !listing.is_owned_by(principal) => {
                Verdict::Deny(Rejection::not_owner(*id))
            }
            Some(listing) => Verdict::Allow(listing),
        })
    }
}

/// Allows deletion of a review by its author only.
pub struct AuthorshipGuard<'a> {
    reviews: &'a dyn ReviewRepository,
}

impl<'a> AuthorshipGuard<'a> {
    pub fn new(reviews: &'a dyn ReviewRepository) -> Self {
        Self { reviews }
    }

    /// `listing` is the listing the review was addressed through; a review
    /// belonging to a different listing counts as missing.
    pub async fn authorize_author(
        &self,
        listing: &ListingId,
        id: &ReviewId,
        principal: &UserId,
    ) -> Result<Verdict<Review>, Error> {
        let review = self
            .reviews
            .find_by_id(id)
            .await
            .map_err(map_review_error)?;
        Ok(match review {
            Some(review) if review.listing != *listing => {
                Verdict::Deny(Rejection::review_missing(*listing))
            }
            None => Verdict::Deny(Rejection::review_missing(*listing)),
            Some(review) if !review.is_authored_by(principal) => {
                Verdict::Deny(Rejection::not_author(*listing))
            }
            Some(review) => Verdict::Allow(review),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        ListingRepositoryError, MockListingRepository, MockReviewRepository,
    };
    use crate::domain::{
        ErrorCode, Geometry, ListingDraft, Price, Rating, RejectionKind, ReviewDraft,
    };
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn owner() -> UserId {
        UserId::random()
    }

    fn listing_owned_by(owner: &UserId) -> Listing {
        Listing::create(
            ListingDraft {
                title: "Loft".into(),
                description: "Bright".into(),
                price: Price::new(90.0).expect("price"),
                location: "Berlin".into(),
                country: "Germany".into(),
                category: None,
            },
            Geometry::point(13.4, 52.5).expect("geometry"),
            None,
            owner.clone(),
            Utc::now(),
        )
    }

    fn repo_returning(listing: Option<Listing>) -> MockListingRepository {
        let mut repo = MockListingRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(listing));
        repo
    }

    #[rstest]
    #[tokio::test]
    async fn owner_is_allowed_and_receives_listing(owner: UserId) {
        let listing = listing_owned_by(&owner);
        let repo = repo_returning(Some(listing.clone()));
        let verdict = OwnershipGuard::new(&repo)
            .authorize_owner(&listing.id, &owner)
            .await
            .expect("lookup");
        assert_eq!(verdict, Verdict::Allow(listing));
    }

    #[rstest]
    #[tokio::test]
    async fn stranger_is_denied_with_redirect_to_listing(owner: UserId) {
        let listing = listing_owned_by(&owner);
        let id = listing.id;
        let repo = repo_returning(Some(listing));
        let verdict = OwnershipGuard::new(&repo)
            .authorize_owner(&id, &UserId::random())
            .await
            .expect("lookup");
        assert_eq!(verdict, Verdict::Deny(Rejection::not_owner(id)));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_listing_fails_closed(owner: UserId) {
        let repo = repo_returning(None);
        let verdict = OwnershipGuard::new(&repo)
            .authorize_owner(&ListingId::random(), &owner)
            .await
            .expect("lookup");
        let Verdict::Deny(rejection) = verdict else {
            panic!("expected deny, got {verdict:?}");
        };
        assert_eq!(rejection.kind, RejectionKind::Missing);
    }

    #[rstest]
    #[tokio::test]
    async fn storage_outage_is_an_error(owner: UserId) {
        let mut repo = MockListingRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Err(ListingRepositoryError::connection("refused")));
        let error = OwnershipGuard::new(&repo)
            .authorize_owner(&ListingId::random(), &owner)
            .await
            .expect_err("outage");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    fn review_by(author: &UserId, listing: ListingId) -> Review {
        Review::create(
            ReviewDraft {
                rating: Rating::new(5).expect("rating"),
                comment: "Great".into(),
            },
            listing,
            author.clone(),
            Utc::now(),
        )
    }

    #[rstest]
    #[case::author(true, true, None)]
    #[case::stranger(false, true, Some(RejectionKind::NotAuthor))]
    #[case::wrong_listing(true, false, Some(RejectionKind::Missing))]
    #[tokio::test]
    async fn authorship_decisions(
        owner: UserId,
        #[case] as_author: bool,
        #[case] same_listing: bool,
        #[case] expected: Option<RejectionKind>,
    ) {
        let listing = ListingId::random();
        let review = review_by(&owner, listing);
        let review_id = review.id;
        let mut repo = MockReviewRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(review)));

        let principal = if as_author { owner } else { UserId::random() };
        let addressed = if same_listing {
            listing
        } else {
            ListingId::random()
        };
        let verdict = AuthorshipGuard::new(&repo)
            .authorize_author(&addressed, &review_id, &principal)
            .await
            .expect("lookup");
        let kind = match verdict {
            Verdict::Allow(_) => None,
            Verdict::Deny(rejection) => Some(rejection.kind),
            Verdict::Invalid(errors) => panic!("unexpected validation failure: {errors}"),
        };
        assert_eq!(kind, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_review_is_denied(owner: UserId) {
        let mut repo = MockReviewRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));
        let listing = ListingId::random();
        let verdict = AuthorshipGuard::new(&repo)
            .authorize_author(&listing, &ReviewId::random(), &owner)
            .await
            .expect("lookup");
        assert_eq!(verdict, Verdict::Deny(Rejection::review_missing(listing)));
    }
}
