//! Listing and review orchestration service.
//!
//! Implements the listing query/command and review command driving ports by
//! running each mutating request through a [`Pipeline`]:
//!
//! - create: authenticate, validate, geocode, attach media, persist;
//! - update: authenticate, check ownership, validate, attach media, persist;
//! - delete: authenticate, check ownership, persist;
//! - review create: authenticate, validate, persist;
//! - review delete: authenticate, check authorship, persist.
//!
//! Nothing is written before [`Stage::Persisting`]. Writes that span two
//! records (listing delete, review create and delete) are sequential with no
//! rollback.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};

use super::ports::{
    EditForm, Geocoder, ListingCommand, ListingQuery, ListingRepository, ListingSubmission,
    MediaStore, ReviewCommand, ReviewRepository,
};
use super::storage_errors::{
    map_geocoder_error, map_listing_error, map_media_error, map_review_error,
};
use super::{
    AuthContext, AuthorshipGuard, Error, Halt, Listing, ListingChanges, ListingDetails,
    ListingFilter, ListingId, MediaRef, Operation, Outcome, OwnershipGuard, Payload, Pipeline,
    Rejection, Review, ReviewId, ReviewInput, Schema, Stage, UploadHandle, UserId, Verdict, settle,
};

/// Domain service backing every listing and review use-case.
#[derive(Clone)]
pub struct ListingService<L, R> {
    listings: Arc<L>,
    reviews: Arc<R>,
    geocoder: Arc<dyn Geocoder>,
    media: Arc<dyn MediaStore>,
    clock: Arc<dyn Clock>,
}

impl<L, R> ListingService<L, R> {
    /// Create a new service over the given adapters.
    pub fn new(
        listings: Arc<L>,
        reviews: Arc<R>,
        geocoder: Arc<dyn Geocoder>,
        media: Arc<dyn MediaStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            listings,
            reviews,
            geocoder,
            media,
            clock,
        }
    }
}

impl<L, R> ListingService<L, R>
where
    L: ListingRepository + 'static,
    R: ReviewRepository + 'static,
{
    async fn attach(&self, upload: Option<&UploadHandle>) -> Result<Option<MediaRef>, Error> {
        match upload {
            Some(upload) => self
                .media
                .attach(upload)
                .await
                .map(Some)
                .map_err(map_media_error),
            None => Ok(None),
        }
    }

    async fn authorize_owner(
        &self,
        pipeline: &mut Pipeline,
        id: &ListingId,
        principal: &UserId,
    ) -> Result<Listing, Halt> {
        pipeline.enter(Stage::AuthorizingOwnership)?;
        let verdict = OwnershipGuard::new(&*self.listings)
            .authorize_owner(id, principal)
            .await?;
        pipeline.admit(verdict)
    }

    async fn run_edit_form(&self, auth: &AuthContext, id: &ListingId) -> Result<EditForm, Halt> {
        let mut pipeline = Pipeline::start(Operation::EditListingForm);
        let principal = pipeline.authenticate(auth)?;
        let listing = self.authorize_owner(&mut pipeline, id, &principal).await?;
        let preview_url = listing.image.as_ref().map(MediaRef::preview_url);
        pipeline.finish(EditForm {
            listing,
            preview_url,
        })
    }

    async fn run_create(
        &self,
        auth: &AuthContext,
        payload: Payload<ListingSubmission>,
    ) -> Result<Listing, Halt> {
        let mut pipeline = Pipeline::start(Operation::CreateListing);
        let owner = pipeline.authenticate(auth)?;

        pipeline.enter(Stage::Validating)?;
        let submission = pipeline.admit(payload.decode().into())?;
        let draft = pipeline.admit(submission.input.validate().into())?;

        pipeline.enter(Stage::Enriching)?;
        let geometry = self
            .geocoder
            .forward_geocode(&draft.location)
            .await
            .map_err(map_geocoder_error)?;

        pipeline.enter(Stage::AttachingMedia)?;
        let image = self.attach(submission.upload.as_ref()).await?;

        pipeline.enter(Stage::Persisting)?;
        let listing = Listing::create(draft, geometry, image, owner, self.clock.utc());
        self.listings
            .insert(&listing)
            .await
            .map_err(map_listing_error)?;
        info!(listing_id = %listing.id, owner = %listing.owner, "listing created");

        pipeline.finish(listing)
    }

    async fn run_update(
        &self,
        auth: &AuthContext,
        id: &ListingId,
        payload: Payload<ListingSubmission>,
    ) -> Result<Listing, Halt> {
        let mut pipeline = Pipeline::start(Operation::UpdateListing);
        let principal = pipeline.authenticate(auth)?;
        let mut listing = self.authorize_owner(&mut pipeline, id, &principal).await?;

        pipeline.enter(Stage::Validating)?;
        let submission = pipeline.admit(payload.decode().into())?;
        let fields = pipeline.admit(submission.input.validate().into())?;

        pipeline.enter(Stage::AttachingMedia)?;
        let image = self.attach(submission.upload.as_ref()).await?;

        pipeline.enter(Stage::Persisting)?;
        let changes = ListingChanges { fields, image };
        self.listings
            .update_fields(id, &changes)
            .await
            .map_err(map_listing_error)?;
        listing.apply(&changes);
        info!(listing_id = %id, "listing updated");

        pipeline.finish(listing)
    }

    async fn run_delete(&self, auth: &AuthContext, id: &ListingId) -> Result<ListingId, Halt> {
        let mut pipeline = Pipeline::start(Operation::DeleteListing);
        let principal = pipeline.authenticate(auth)?;
        let listing = self.authorize_owner(&mut pipeline, id, &principal).await?;

        pipeline.enter(Stage::Persisting)?;
        self.listings
            .delete_by_id(id)
            .await
            .map_err(map_listing_error)?;
        if !listing.reviews.is_empty() {
            match self.reviews.delete_many(&listing.reviews).await {
                Ok(removed) => info!(listing_id = %id, removed, "listing reviews removed"),
                Err(err) => error!(
                    listing_id = %id,
                    orphaned = listing.reviews.len(),
                    error = %err,
                    "listing deleted but its reviews were not"
                ),
            }
        }
        info!(listing_id = %id, "listing deleted");

        pipeline.finish(*id)
    }

    async fn run_create_review(
        &self,
        auth: &AuthContext,
        listing_id: &ListingId,
        payload: Payload<ReviewInput>,
    ) -> Result<Review, Halt> {
        let mut pipeline = Pipeline::start(Operation::CreateReview);
        let author = pipeline.authenticate(auth)?;

        pipeline.enter(Stage::Validating)?;
        let input = pipeline.admit(payload.decode().into())?;
        let draft = pipeline.admit(input.validate().into())?;

        pipeline.enter(Stage::Persisting)?;
        let exists = self
            .listings
            .find_by_id(listing_id)
            .await
            .map_err(map_listing_error)?
            .is_some();
        if !exists {
            return pipeline.admit(Verdict::Deny(Rejection::listing_missing()));
        }
        let review = Review::create(draft, *listing_id, author, self.clock.utc());
        self.reviews
            .insert(&review)
            .await
            .map_err(map_review_error)?;
        if let Err(err) = self.listings.push_review(listing_id, &review.id).await {
            error!(
                listing_id = %listing_id,
                review_id = %review.id,
                error = %err,
                "review stored but not linked to its listing"
            );
            return Err(map_listing_error(err).into());
        }
        info!(listing_id = %listing_id, review_id = %review.id, "review created");

        pipeline.finish(review)
    }

    async fn run_delete_review(
        &self,
        auth: &AuthContext,
        listing_id: &ListingId,
        review_id: &ReviewId,
    ) -> Result<ReviewId, Halt> {
        let mut pipeline = Pipeline::start(Operation::DeleteReview);
        let principal = pipeline.authenticate(auth)?;

        pipeline.enter(Stage::AuthorizingAuthorship)?;
        let verdict = AuthorshipGuard::new(&*self.reviews)
            .authorize_author(listing_id, review_id, &principal)
            .await?;
        pipeline.admit(verdict)?;

        pipeline.enter(Stage::Persisting)?;
        self.listings
            .pull_review(listing_id, review_id)
            .await
            .map_err(map_listing_error)?;
        if let Err(err) = self.reviews.delete_by_id(review_id).await {
            error!(
                listing_id = %listing_id,
                review_id = %review_id,
                error = %err,
                "review unlinked but not removed"
            );
            return Err(map_review_error(err).into());
        }
        info!(listing_id = %listing_id, review_id = %review_id, "review deleted");

        pipeline.finish(*review_id)
    }
}

#[async_trait]
impl<L, R> ListingQuery for ListingService<L, R>
where
    L: ListingRepository + 'static,
    R: ReviewRepository + 'static,
{
    async fn index(&self, filter: &ListingFilter) -> Result<Vec<Listing>, Error> {
        self.listings.list(filter).await.map_err(map_listing_error)
    }

    async fn show(&self, id: &ListingId) -> Result<Outcome<ListingDetails>, Error> {
        let details = self
            .listings
            .find_with_relations(id)
            .await
            .map_err(map_listing_error)?;
        Ok(match details {
            Some(details) => Outcome::Done(details),
            None => {
                info!(listing_id = %id, "listing not found");
                Outcome::Rejected(Rejection::listing_missing())
            }
        })
    }

    async fn new_form(&self, auth: &AuthContext) -> Result<Outcome<()>, Error> {
        let mut pipeline = Pipeline::start(Operation::NewListingForm);
        settle(
            pipeline
                .authenticate(auth)
                .and_then(|_| pipeline.finish(())),
        )
    }

    async fn edit_form(
        &self,
        auth: &AuthContext,
        id: &ListingId,
    ) -> Result<Outcome<EditForm>, Error> {
        settle(self.run_edit_form(auth, id).await)
    }
}

#[async_trait]
impl<L, R> ListingCommand for ListingService<L, R>
where
    L: ListingRepository + 'static,
    R: ReviewRepository + 'static,
{
    async fn create(
        &self,
        auth: &AuthContext,
        submission: Payload<ListingSubmission>,
    ) -> Result<Outcome<Listing>, Error> {
        settle(self.run_create(auth, submission).await)
    }

    async fn update(
        &self,
        auth: &AuthContext,
        id: &ListingId,
        submission: Payload<ListingSubmission>,
    ) -> Result<Outcome<Listing>, Error> {
        settle(self.run_update(auth, id, submission).await)
    }

    async fn delete(
        &self,
        auth: &AuthContext,
        id: &ListingId,
    ) -> Result<Outcome<ListingId>, Error> {
        settle(self.run_delete(auth, id).await)
    }
}

#[async_trait]
impl<L, R> ReviewCommand for ListingService<L, R>
where
    L: ListingRepository + 'static,
    R: ReviewRepository + 'static,
{
    async fn create_review(
        &self,
        auth: &AuthContext,
        listing: &ListingId,
        input: Payload<ReviewInput>,
    ) -> Result<Outcome<Review>, Error> {
        settle(self.run_create_review(auth, listing, input).await)
    }

    async fn delete_review(
        &self,
        auth: &AuthContext,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<Outcome<ReviewId>, Error> {
        settle(self.run_delete_review(auth, listing, review).await)
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
