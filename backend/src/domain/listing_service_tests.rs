//! Behavioural tests for the listing service pipeline.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::{
    FixtureGeocoder, GeocoderError, MediaStoreError, MockGeocoder, MockListingRepository,
    MockMediaStore, MockReviewRepository, PassthroughMediaStore, ReviewRepositoryError,
};
use crate::domain::{ErrorCode, Geometry, ListingDraft, ListingInput, Price, RejectionKind};
use crate::outbound::memory::InMemoryStore;

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        fixture_timestamp().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixture_timestamp()
    }
}

type MemoryService = ListingService<InMemoryStore, InMemoryStore>;

struct Harness {
    store: Arc<InMemoryStore>,
    service: MemoryService,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let service = ListingService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(FixtureGeocoder),
        Arc::new(PassthroughMediaStore),
        Arc::new(FixtureClock),
    );
    Harness { store, service }
}

fn signed_in(principal: &UserId) -> AuthContext {
    AuthContext::authenticated(principal.clone(), "/listings")
}

fn input(title: &str, location: &str, country: &str) -> ListingInput {
    ListingInput {
        title: Some(title.into()),
        description: Some("A lovely place to stay".into()),
        price: Some(json!(1500)),
        location: Some(location.into()),
        country: Some(country.into()),
        category: None,
    }
}

fn upload(name: &str) -> UploadHandle {
    UploadHandle {
        locator: format!("https://res.cloudinary.com/demo/image/upload/v1/{name}.png"),
        filename: format!("wanderlust/{name}"),
    }
}

fn submission(input: ListingInput, upload: Option<UploadHandle>) -> Payload<ListingSubmission> {
    ListingSubmission { input, upload }.into()
}

fn malformed<T>() -> Payload<T> {
    Payload::Malformed("invalid type: integer `5`, expected a string".into())
}

fn done<T: std::fmt::Debug>(outcome: Outcome<T>) -> T {
    match outcome {
        Outcome::Done(value) => value,
        Outcome::Rejected(rejection) => panic!("expected success, got {rejection:?}"),
    }
}

fn rejected<T: std::fmt::Debug>(outcome: Outcome<T>) -> Rejection {
    match outcome {
        Outcome::Rejected(rejection) => rejection,
        Outcome::Done(value) => panic!("expected rejection, got {value:?}"),
    }
}

async fn create_as(harness: &Harness, owner: &UserId, title: &str) -> Listing {
    let outcome = harness
        .service
        .create(
            &signed_in(owner),
            submission(input(title, "Calangute", "India"), Some(upload("beach"))),
        )
        .await
        .expect("create");
    done(outcome)
}

#[rstest]
#[tokio::test]
async fn create_assigns_owner_geometry_and_image(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;

    assert_eq!(listing.owner, owner);
    assert!(listing.reviews.is_empty());
    assert_eq!(listing.created_at, fixture_timestamp());
    let expected = FixtureGeocoder
        .forward_geocode("Calangute")
        .await
        .expect("geometry");
    assert_eq!(listing.geometry, expected);
    assert_eq!(
        listing.image.as_ref().map(MediaRef::filename),
        Some("wanderlust/beach")
    );
    assert_eq!(harness.store.listing_count(), Ok(1));
}

#[rstest]
#[tokio::test]
async fn create_without_file_stores_no_image(harness: Harness) {
    let owner = UserId::random();
    let outcome = harness
        .service
        .create(
            &signed_in(&owner),
            submission(input("Cabin", "Aspen", "United States"), None),
        )
        .await
        .expect("create");
    assert_eq!(done(outcome).image, None);
}

#[rstest]
#[tokio::test]
async fn anonymous_create_is_sent_to_login(harness: Harness) {
    let auth = AuthContext::anonymous("/listings");
    let outcome = harness
        .service
        .create(&auth, submission(input("Cabin", "Aspen", "USA"), None))
        .await
        .expect("handled");
    let rejection = rejected(outcome);
    assert_eq!(rejection.kind, RejectionKind::Unauthenticated);
    assert_eq!(rejection.return_to.as_deref(), Some("/listings"));
    assert_eq!(harness.store.listing_count(), Ok(0));
}

#[rstest]
#[tokio::test]
async fn invalid_payload_never_reaches_geocoder_or_storage() {
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_forward_geocode().never();
    let mut listings = MockListingRepository::new();
    listings.expect_insert().never();
    let service = ListingService::new(
        Arc::new(listings),
        Arc::new(MockReviewRepository::new()),
        Arc::new(geocoder),
        Arc::new(PassthroughMediaStore),
        Arc::new(FixtureClock),
    );

    let mut payload = input("", "Aspen", "USA");
    payload.price = Some(json!("free"));
    let error = service
        .create(&signed_in(&UserId::random()), submission(payload, None))
        .await
        .expect_err("invalid");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.message(),
        "\"title\" is not allowed to be empty,\"price\" must be a number"
    );
}

#[rstest]
#[case::no_match(GeocoderError::no_match("Atlantis"))]
#[case::timeout(GeocoderError::timeout("deadline elapsed"))]
#[case::transport(GeocoderError::transport("connection reset"))]
#[tokio::test]
async fn geocoding_failure_aborts_before_any_write(#[case] failure: GeocoderError) {
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward_geocode()
        .times(1)
        .return_once(move |_| Err(failure));
    let mut media = MockMediaStore::new();
    media.expect_attach().never();
    let mut listings = MockListingRepository::new();
    listings.expect_insert().never();
    let service = ListingService::new(
        Arc::new(listings),
        Arc::new(MockReviewRepository::new()),
        Arc::new(geocoder),
        Arc::new(media),
        Arc::new(FixtureClock),
    );

    let error = service
        .create(
            &signed_in(&UserId::random()),
            submission(input("Lost City", "Atlantis", "Nowhere"), Some(upload("x"))),
        )
        .await
        .expect_err("enrichment failure");
    assert_eq!(error.code(), ErrorCode::EnrichmentFailed);
}

#[rstest]
#[tokio::test]
async fn media_failure_aborts_before_any_write() {
    let mut media = MockMediaStore::new();
    media
        .expect_attach()
        .return_once(|_| Err(MediaStoreError::unavailable("cdn down")));
    let mut listings = MockListingRepository::new();
    listings.expect_insert().never();
    let service = ListingService::new(
        Arc::new(listings),
        Arc::new(MockReviewRepository::new()),
        Arc::new(FixtureGeocoder),
        Arc::new(media),
        Arc::new(FixtureClock),
    );

    let error = service
        .create(
            &signed_in(&UserId::random()),
            submission(input("Loft", "Berlin", "Germany"), Some(upload("loft"))),
        )
        .await
        .expect_err("media failure");
    assert_eq!(error.code(), ErrorCode::EnrichmentFailed);
}

#[rstest]
#[tokio::test]
async fn strangers_cannot_update_or_delete(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;
    let stranger = UserId::random();

    let update = harness
        .service
        .update(
            &signed_in(&stranger),
            &listing.id,
            submission(input("Hijacked", "Elsewhere", "Nowhere"), None),
        )
        .await
        .expect("handled");
    assert_eq!(rejected(update), Rejection::not_owner(listing.id));

    let delete = harness
        .service
        .delete(&signed_in(&stranger), &listing.id)
        .await
        .expect("handled");
    assert_eq!(rejected(delete), Rejection::not_owner(listing.id));

    let stored = ListingRepository::find_by_id(&*harness.store, &listing.id)
        .await
        .expect("query");
    assert_eq!(stored, Some(listing));
}

#[rstest]
#[tokio::test]
async fn update_without_media_preserves_image(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;

    let outcome = harness
        .service
        .update(
            &signed_in(&owner),
            &listing.id,
            submission(input("Beach Villa", "Calangute", "India"), None),
        )
        .await
        .expect("update");
    let updated = done(outcome);
    assert_eq!(updated.title, "Beach Villa");
    assert_eq!(updated.image, listing.image);
    assert_eq!(updated.geometry, listing.geometry);

    let stored = ListingRepository::find_by_id(&*harness.store, &listing.id)
        .await
        .expect("query")
        .expect("present");
    assert_eq!(stored, updated);
}

#[rstest]
#[tokio::test]
async fn update_with_media_replaces_image_entirely(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;

    let outcome = harness
        .service
        .update(
            &signed_in(&owner),
            &listing.id,
            submission(input("Beach House", "Calangute", "India"), Some(upload("sunset"))),
        )
        .await
        .expect("update");
    let image = done(outcome).image.expect("image");
    assert_eq!(image.filename(), "wanderlust/sunset");
    assert_eq!(
        image.url(),
        "https://res.cloudinary.com/demo/image/upload/v1/sunset.png"
    );
}

#[rstest]
#[tokio::test]
async fn invalid_update_leaves_listing_untouched(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;

    let error = harness
        .service
        .update(
            &signed_in(&owner),
            &listing.id,
            submission(ListingInput::default(), Some(upload("ignored"))),
        )
        .await
        .expect_err("invalid");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let stored = ListingRepository::find_by_id(&*harness.store, &listing.id)
        .await
        .expect("query");
    assert_eq!(stored, Some(listing));
}

#[rstest]
#[tokio::test]
async fn missing_listing_is_reported_not_failed(harness: Harness) {
    let owner = UserId::random();
    let id = ListingId::random();

    let show = harness.service.show(&id).await.expect("handled");
    assert_eq!(rejected(show), Rejection::listing_missing());

    let delete = harness
        .service
        .delete(&signed_in(&owner), &id)
        .await
        .expect("handled");
    assert_eq!(rejected(delete).kind, RejectionKind::Missing);
}

#[rstest]
#[tokio::test]
async fn search_matches_any_text_field_case_insensitively(harness: Harness) {
    let owner = UserId::random();
    let fixtures = [
        ("Goa Beach Shack", "Anjuna", "India"),
        ("Treehouse", "North GOA", "India"),
        ("City Flat", "Lisbon", "Portugal"),
    ];
    for (title, location, country) in fixtures {
        harness
            .service
            .create(
                &signed_in(&owner),
                submission(input(title, location, country), None),
            )
            .await
            .expect("create");
    }

    let found = harness
        .service
        .index(&ListingFilter::search("goa"))
        .await
        .expect("search");
    let titles: Vec<_> = found.iter().map(|listing| listing.title.as_str()).collect();
    assert_eq!(titles, vec!["Goa Beach Shack", "Treehouse"]);

    let all = harness
        .service
        .index(&ListingFilter::search("  "))
        .await
        .expect("index");
    assert_eq!(all.len(), 3);
}

#[rstest]
#[tokio::test]
async fn reviews_are_appended_and_expanded(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;
    let reviewer = UserId::random();

    let review = done(
        harness
            .service
            .create_review(
                &signed_in(&reviewer),
                &listing.id,
                ReviewInput {
                    rating: Some(json!(4)),
                    comment: Some("Great sunsets".into()),
                }
                .into(),
            )
            .await
            .expect("review"),
    );
    assert_eq!(review.author, reviewer);
    assert_eq!(review.listing, listing.id);

    let details = done(harness.service.show(&listing.id).await.expect("show"));
    assert_eq!(details.listing.reviews, vec![review.id]);
    assert_eq!(details.reviews.len(), 1);
    assert_eq!(details.reviews[0].review, review);
}

#[rstest]
#[tokio::test]
async fn review_on_missing_listing_is_rejected(harness: Harness) {
    let outcome = harness
        .service
        .create_review(
            &signed_in(&UserId::random()),
            &ListingId::random(),
            ReviewInput {
                rating: Some(json!(5)),
                comment: Some("?".into()),
            }
            .into(),
        )
        .await
        .expect("handled");
    assert_eq!(rejected(outcome), Rejection::listing_missing());
    assert_eq!(harness.store.review_count(), Ok(0));
}

async fn review_as(harness: &Harness, listing: &ListingId, author: &UserId) -> Review {
    done(
        harness
            .service
            .create_review(
                &signed_in(author),
                listing,
                ReviewInput {
                    rating: Some(json!("3")),
                    comment: Some("Fine".into()),
                }
                .into(),
            )
            .await
            .expect("review"),
    )
}

#[rstest]
#[tokio::test]
async fn deleting_a_review_pulls_its_reference(harness: Harness) {
    let listing = create_as(&harness, &UserId::random(), "Beach House").await;
    let author = UserId::random();
    let keep = review_as(&harness, &listing.id, &author).await;
    let drop = review_as(&harness, &listing.id, &author).await;

    let outcome = harness
        .service
        .delete_review(&signed_in(&author), &listing.id, &drop.id)
        .await
        .expect("delete");
    assert_eq!(done(outcome), drop.id);

    let details = done(harness.service.show(&listing.id).await.expect("show"));
    assert_eq!(details.listing.reviews, vec![keep.id]);
    assert!(
        ReviewRepository::find_by_id(&*harness.store, &drop.id)
            .await
            .expect("query")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn only_the_author_may_delete_a_review(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;
    let review = review_as(&harness, &listing.id, &UserId::random()).await;

    let outcome = harness
        .service
        .delete_review(&signed_in(&owner), &listing.id, &review.id)
        .await
        .expect("handled");
    assert_eq!(rejected(outcome), Rejection::not_author(listing.id));
    assert_eq!(harness.store.review_count(), Ok(1));
}

#[rstest]
#[tokio::test]
async fn deleting_a_listing_cascades_to_its_reviews(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;
    let other = create_as(&harness, &owner, "Mountain Hut").await;
    review_as(&harness, &listing.id, &UserId::random()).await;
    review_as(&harness, &listing.id, &UserId::random()).await;
    let survivor = review_as(&harness, &other.id, &UserId::random()).await;

    let outcome = harness
        .service
        .delete(&signed_in(&owner), &listing.id)
        .await
        .expect("delete");
    assert_eq!(done(outcome), listing.id);
    assert_eq!(harness.store.listing_count(), Ok(1));
    assert_eq!(harness.store.review_count(), Ok(1));
    assert!(
        ReviewRepository::find_by_id(&*harness.store, &survivor.id)
            .await
            .expect("query")
            .is_some()
    );
}

#[rstest]
#[tokio::test]
async fn cascade_failure_still_reports_listing_deleted() {
    let owner = UserId::random();
    let mut stored = Listing::create(
        ListingDraft {
            title: "Hut".into(),
            description: "Cold".into(),
            price: Price::new(5.0).expect("price"),
            location: "Alps".into(),
            country: "Switzerland".into(),
            category: None,
        },
        Geometry::point(8.0, 46.5).expect("geometry"),
        None,
        owner.clone(),
        fixture_timestamp(),
    );
    stored.reviews.push(ReviewId::random());
    let id = stored.id;

    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    listings.expect_delete_by_id().times(1).returning(|_| Ok(()));
    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_delete_many()
        .times(1)
        .returning(|_| Err(ReviewRepositoryError::connection("gone")));
    let service = ListingService::new(
        Arc::new(listings),
        Arc::new(reviews),
        Arc::new(FixtureGeocoder),
        Arc::new(PassthroughMediaStore),
        Arc::new(FixtureClock),
    );

    let outcome = service
        .delete(&signed_in(&owner), &id)
        .await
        .expect("delete");
    assert_eq!(done(outcome), id);
}

#[rstest]
#[tokio::test]
async fn edit_form_offers_reduced_preview(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;

    let form = done(
        harness
            .service
            .edit_form(&signed_in(&owner), &listing.id)
            .await
            .expect("form"),
    );
    assert_eq!(
        form.preview_url.as_deref(),
        Some("https://res.cloudinary.com/demo/image/upload/w_250/v1/beach.png")
    );

    let stranger = harness
        .service
        .edit_form(&signed_in(&UserId::random()), &listing.id)
        .await
        .expect("handled");
    assert_eq!(rejected(stranger).kind, RejectionKind::NotOwner);
}

#[rstest]
#[tokio::test]
async fn new_form_requires_authentication(harness: Harness) {
    let anonymous = harness
        .service
        .new_form(&AuthContext::anonymous("/listings/new"))
        .await
        .expect("handled");
    assert_eq!(
        rejected(anonymous).return_to.as_deref(),
        Some("/listings/new")
    );

    let signed = harness
        .service
        .new_form(&signed_in(&UserId::random()))
        .await
        .expect("handled");
    done(signed);
}

#[rstest]
#[tokio::test]
async fn undecodable_bodies_wait_for_the_gates(harness: Harness) {
    let anonymous = harness
        .service
        .create(&AuthContext::anonymous("/listings"), malformed())
        .await
        .expect("handled");
    assert_eq!(rejected(anonymous), Rejection::unauthenticated("/listings"));

    let listing = create_as(&harness, &UserId::random(), "Beach House").await;
    let stranger = harness
        .service
        .update(&signed_in(&UserId::random()), &listing.id, malformed())
        .await
        .expect("handled");
    assert_eq!(rejected(stranger), Rejection::not_owner(listing.id));

    let review = harness
        .service
        .create_review(
            &AuthContext::anonymous("/listings"),
            &listing.id,
            malformed(),
        )
        .await
        .expect("handled");
    assert_eq!(rejected(review).kind, RejectionKind::Unauthenticated);
}

#[rstest]
#[tokio::test]
async fn undecodable_body_fails_validation_for_the_owner(harness: Harness) {
    let owner = UserId::random();
    let listing = create_as(&harness, &owner, "Beach House").await;

    let error = harness
        .service
        .update(&signed_in(&owner), &listing.id, malformed())
        .await
        .expect_err("invalid");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.message().starts_with("\"body\" could not be decoded"));

    let stored = ListingRepository::find_by_id(&*harness.store, &listing.id)
        .await
        .expect("query");
    assert_eq!(stored, Some(listing));
}
