//! Review HTTP handlers.
//!
//! ```text
//! POST   /listings/{id}/reviews {"review":{"rating":4,"comment":"Lovely"}}
//! DELETE /listings/{id}/reviews/{review_id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, post, web};
use serde::Deserialize;

use crate::domain::{Outcome, Payload, RedirectTarget, Rejection, ReviewId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings::{login_first, protected_listing_id};
use crate::inbound::http::listings_dto::ReviewRequest;
use crate::inbound::http::redirect::{RedirectBody, reject, succeed};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

pub(crate) const MSG_REVIEW_CREATED: &str = "New Review Created!";
pub(crate) const MSG_REVIEW_DELETED: &str = "Review Deleted!";

#[derive(Debug, Deserialize)]
pub(super) struct ReviewPath {
    id: String,
    review_id: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_review).service(delete_review);
}

/// Add a review to a listing as the signed-in user.
#[utoipa::path(
    post,
    path = "/listings/{id}/reviews",
    request_body = ReviewRequest,
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 303, description = "Created, or rejected with a flash", body = RedirectBody),
        (status = 400, description = "Invalid review", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/listings/{id}/reviews")]
pub async fn create_review(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let auth = session.auth_context(&req)?;
    let listing = match protected_listing_id(&auth, &path) {
        Ok(id) => id,
        Err(rejection) => return reject(&session, rejection),
    };
    let payload = Payload::from_json::<ReviewRequest>(&body);
    match state.reviews.create_review(&auth, &listing, payload).await?
    {
        Outcome::Done(_) => succeed(
            &session,
            RedirectTarget::Listing(listing),
            MSG_REVIEW_CREATED,
        ),
        Outcome::Rejected(rejection) => reject(&session, rejection),
    }
}

/// Delete one of the signed-in user's reviews.
#[utoipa::path(
    delete,
    path = "/listings/{id}/reviews/{review_id}",
    params(
        ("id" = String, Path, description = "Listing identifier"),
        ("review_id" = String, Path, description = "Review identifier")
    ),
    responses(
        (status = 303, description = "Deleted, or rejected with a flash", body = RedirectBody),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/listings/{id}/reviews/{review_id}")]
pub async fn delete_review(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ReviewPath>,
) -> ApiResult<HttpResponse> {
    let auth = session.auth_context(&req)?;
    let listing = match protected_listing_id(&auth, &path.id) {
        Ok(id) => id,
        Err(rejection) => return reject(&session, rejection),
    };
    let review = match ReviewId::new(&path.review_id) {
        Ok(id) => id,
        Err(_) => {
            return reject(
                &session,
                login_first(&auth, Rejection::review_missing(listing)),
            );
        }
    };
    match state.reviews.delete_review(&auth, &listing, &review).await? {
        Outcome::Done(_) => succeed(
            &session,
            RedirectTarget::Listing(listing),
            MSG_REVIEW_DELETED,
        ),
        Outcome::Rejected(rejection) => reject(&session, rejection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::LOCATION;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::ports::{ListingRepository, ReviewRepository};
    use crate::domain::{
        Geometry, Listing, ListingDraft, MSG_LISTING_MISSING, MSG_LOGIN_REQUIRED, MSG_NOT_AUTHOR,
        MSG_REVIEW_MISSING, Price, UserId,
    };
    use crate::inbound::http::test_utils::{CookieJar, memory_state, test_app};

    const AUTHOR: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const STRANGER: &str = "9b2e9f4c-6c1d-4f7e-8a55-2d7f1e0c4b11";

    fn listing() -> Listing {
        Listing::create(
            ListingDraft {
                title: "Shack".into(),
                description: "d".into(),
                price: Price::new(80.0).expect("price"),
                location: "Goa".into(),
                country: "India".into(),
                category: None,
            },
            Geometry::point(73.8, 15.5).expect("geometry"),
            None,
            UserId::random(),
            Utc::now(),
        )
    }

    macro_rules! call {
        ($app:expr, $jar:expr, $req:expr) => {{
            let res = actix_test::call_service(&$app, $jar.attach($req).to_request()).await;
            $jar.store(&res);
            res
        }};
    }

    fn redirect_of(res: &actix_web::dev::ServiceResponse) -> Option<&str> {
        res.headers().get(LOCATION).and_then(|v| v.to_str().ok())
    }

    #[actix_web::test]
    async fn review_lifecycle_keeps_listing_references_in_step() {
        let (store, state) = memory_state();
        let listing = listing();
        ListingRepository::insert(&*store, &listing)
            .await
            .expect("seed");
        let app = actix_test::init_service(test_app(state)).await;
        let mut jar = CookieJar::default();
        call!(
            app,
            jar,
            actix_test::TestRequest::post().uri(&format!("/test/sign-in/{AUTHOR}"))
        );

        let res = call!(
            app,
            jar,
            actix_test::TestRequest::post()
                .uri(&format!("/listings/{}/reviews", listing.id))
                .set_json(json!({ "review": { "rating": 4, "comment": "Lovely" } }))
        );
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let expected = format!("/listings/{}", listing.id);
        assert_eq!(redirect_of(&res), Some(expected.as_str()));
        let body: RedirectBody = actix_test::read_body_json(res).await;
        assert_eq!(body.message, MSG_REVIEW_CREATED);

        let stored = ListingRepository::find_by_id(&*store, &listing.id)
            .await
            .expect("query")
            .expect("present");
        let review_id = *stored.reviews.first().expect("linked review");
        let review = ReviewRepository::find_by_id(&*store, &review_id)
            .await
            .expect("query")
            .expect("review stored");
        assert_eq!(review.listing, listing.id);
        assert_eq!(review.author.as_ref(), AUTHOR);

        let res = call!(
            app,
            jar,
            actix_test::TestRequest::delete()
                .uri(&format!("/listings/{}/reviews/{review_id}", listing.id))
        );
        let body: RedirectBody = actix_test::read_body_json(res).await;
        assert_eq!(body.message, MSG_REVIEW_DELETED);
        assert_eq!(store.review_count(), Ok(0));
        let stored = ListingRepository::find_by_id(&*store, &listing.id)
            .await
            .expect("query")
            .expect("present");
        assert!(stored.reviews.is_empty());
    }

    #[actix_web::test]
    async fn strangers_cannot_delete_reviews() {
        let (store, state) = memory_state();
        let listing = listing();
        ListingRepository::insert(&*store, &listing)
            .await
            .expect("seed");
        let app = actix_test::init_service(test_app(state)).await;
        let mut jar = CookieJar::default();
        call!(
            app,
            jar,
            actix_test::TestRequest::post().uri(&format!("/test/sign-in/{AUTHOR}"))
        );
        call!(
            app,
            jar,
            actix_test::TestRequest::post()
                .uri(&format!("/listings/{}/reviews", listing.id))
                .set_json(json!({ "review": { "rating": "5", "comment": "Great" } }))
        );
        let review_id = ListingRepository::find_by_id(&*store, &listing.id)
            .await
            .expect("query")
            .and_then(|stored| stored.reviews.first().copied())
            .expect("linked review");

        let mut stranger = CookieJar::default();
        call!(
            app,
            stranger,
            actix_test::TestRequest::post().uri(&format!("/test/sign-in/{STRANGER}"))
        );
        let res = call!(
            app,
            stranger,
            actix_test::TestRequest::delete()
                .uri(&format!("/listings/{}/reviews/{review_id}", listing.id))
        );
        let body: RedirectBody = actix_test::read_body_json(res).await;
        assert_eq!(body.message, MSG_NOT_AUTHOR);
        assert_eq!(store.review_count(), Ok(1));
    }

    #[rstest]
    #[case(json!({ "review": { "rating": 6, "comment": "x" } }), "rating")]
    #[case(json!({ "review": { "rating": 3 } }), "comment")]
    #[case(json!({}), "rating")]
    #[case(json!({ "review": { "rating": 4, "comment": 7 } }), "body")]
    #[actix_web::test]
    async fn invalid_reviews_are_bad_requests(#[case] payload: Value, #[case] field: &str) {
        let (store, state) = memory_state();
        let listing = listing();
        ListingRepository::insert(&*store, &listing)
            .await
            .expect("seed");
        let app = actix_test::init_service(test_app(state)).await;
        let mut jar = CookieJar::default();
        call!(
            app,
            jar,
            actix_test::TestRequest::post().uri(&format!("/test/sign-in/{AUTHOR}"))
        );

        let res = call!(
            app,
            jar,
            actix_test::TestRequest::post()
                .uri(&format!("/listings/{}/reviews", listing.id))
                .set_json(payload)
        );
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["errors"][0]["field"], field);
        assert_eq!(store.review_count(), Ok(0));
    }

    #[rstest]
    #[case(None, "/login", MSG_LOGIN_REQUIRED)]
    #[case(Some(AUTHOR), "/listings", MSG_LISTING_MISSING)]
    #[actix_web::test]
    async fn review_on_unknown_listing_is_handled(
        #[case] user: Option<&str>,
        #[case] redirect: &str,
        #[case] message: &str,
    ) {
        let (_store, state) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let mut jar = CookieJar::default();
        if let Some(user) = user {
            call!(
                app,
                jar,
                actix_test::TestRequest::post().uri(&format!("/test/sign-in/{user}"))
            );
        }

        let res = call!(
            app,
            jar,
            actix_test::TestRequest::post()
                .uri("/listings/0b6b2c4e-3f1a-4c2d-9e8f-7a6b5c4d3e2f/reviews")
                .set_json(json!({ "review": { "rating": 4, "comment": "ok" } }))
        );
        assert_eq!(redirect_of(&res), Some(redirect));
        let body: RedirectBody = actix_test::read_body_json(res).await;
        assert_eq!(body.message, message);
    }

    #[actix_web::test]
    async fn malformed_review_id_is_a_missing_review() {
        let (_store, state) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let mut jar = CookieJar::default();
        call!(
            app,
            jar,
            actix_test::TestRequest::post().uri(&format!("/test/sign-in/{AUTHOR}"))
        );

        let listing = "0b6b2c4e-3f1a-4c2d-9e8f-7a6b5c4d3e2f";
        let res = call!(
            app,
            jar,
            actix_test::TestRequest::delete().uri(&format!("/listings/{listing}/reviews/nope"))
        );
        let expected = format!("/listings/{listing}");
        assert_eq!(redirect_of(&res), Some(expected.as_str()));
        let body: RedirectBody = actix_test::read_body_json(res).await;
        assert_eq!(body.message, MSG_REVIEW_MISSING);
    }

    #[actix_web::test]
    async fn anonymous_mistyped_review_is_sent_to_login() {
        let (store, state) = memory_state();
        let listing = listing();
        ListingRepository::insert(&*store, &listing)
            .await
            .expect("seed");
        let app = actix_test::init_service(test_app(state)).await;
        let mut jar = CookieJar::default();

        let res = call!(
            app,
            jar,
            actix_test::TestRequest::post()
                .uri(&format!("/listings/{}/reviews", listing.id))
                .set_json(json!({ "review": { "comment": 7 } }))
        );
        assert_eq!(redirect_of(&res), Some("/login"));
        let body: RedirectBody = actix_test::read_body_json(res).await;
        assert_eq!(body.message, MSG_LOGIN_REQUIRED);
        assert_eq!(store.review_count(), Ok(0));
    }
}
