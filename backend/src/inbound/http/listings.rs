//! Listing HTTP handlers.
//!
//! ```text
//! GET    /listings?q=beach
//! GET    /listings/search?q=beach
//! GET    /listings/filter/{category}
//! GET    /listings/new
//! POST   /listings {"listing":{...},"image":{...}}
//! GET    /listings/{id}
//! GET    /listings/{id}/edit
//! PUT    /listings/{id} {"listing":{...}}
//! DELETE /listings/{id}
//! ```
//!
//! Mutations and handled rejections answer `303 See Other`; see
//! [`crate::inbound::http::redirect`]. Bodies are taken as raw bytes and
//! decoded into a [`Payload`] so a malformed body never outruns the login and
//! ownership checks.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::domain::{
    AuthContext, ListingFilter, ListingId, Outcome, Payload, RedirectTarget, Rejection, Verdict,
    require_principal,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings_dto::{
    EditFormResponse, FormResponse, ListingIndexResponse, ListingRequest, ListingResponse,
    ListingShowResponse, SearchQuery,
};
use crate::inbound::http::redirect::{RedirectBody, reject, succeed};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

pub(crate) const MSG_LISTING_CREATED: &str = "New Listing Created!";
pub(crate) const MSG_LISTING_UPDATED: &str = "Listing Updated!";
pub(crate) const MSG_LISTING_DELETED: &str = "Listing Deleted!";

/// Register listing routes. Literal segments come before `{id}` so
/// `/listings/new` and `/listings/search` are not read as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(search)
        .service(filter_by_category)
        .service(new_form)
        .service(create)
        .service(show)
        .service(edit_form)
        .service(update)
        .service(remove);
}

/// Path ids that do not parse cannot name a stored listing.
pub(crate) fn parse_listing_id(raw: &str) -> Result<ListingId, Rejection> {
    ListingId::new(raw).map_err(|_| Rejection::listing_missing())
}

/// Resolve a path id for a protected route. An anonymous caller is sent to
/// log in before being told the listing is missing.
pub(crate) fn protected_listing_id(auth: &AuthContext, raw: &str) -> Result<ListingId, Rejection> {
    parse_listing_id(raw).map_err(|missing| login_first(auth, missing))
}

pub(crate) fn login_first(auth: &AuthContext, rejection: Rejection) -> Rejection {
    match require_principal(auth) {
        Verdict::Deny(unauthenticated) => unauthenticated,
        _ => rejection,
    }
}

async fn render_index(
    state: &HttpState,
    session: &SessionContext,
    filter: &ListingFilter,
) -> ApiResult<web::Json<ListingIndexResponse>> {
    let listings = state.listings.index(filter).await?;
    Ok(web::Json(ListingIndexResponse {
        listings: listings.iter().map(ListingResponse::from).collect(),
        flash: session.take_flash(),
    }))
}

/// List listings, optionally filtered by a search term.
#[utoipa::path(
    get,
    path = "/listings",
    params(SearchQuery),
    responses(
        (status = 200, description = "Listings", body = ListingIndexResponse),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "listListings"
)]
#[get("/listings")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<ListingIndexResponse>> {
    let filter = ListingFilter::search(query.q.as_deref().unwrap_or_default());
    render_index(&state, &session, &filter).await
}

/// Search listings by title, location, country, or category.
#[utoipa::path(
    get,
    path = "/listings/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching listings", body = ListingIndexResponse),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "searchListings"
)]
#[get("/listings/search")]
pub async fn search(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<ListingIndexResponse>> {
    let filter = ListingFilter::search(query.q.as_deref().unwrap_or_default());
    render_index(&state, &session, &filter).await
}

/// List listings with an exact category.
#[utoipa::path(
    get,
    path = "/listings/filter/{category}",
    params(("category" = String, Path, description = "Category label")),
    responses(
        (status = 200, description = "Listings in the category", body = ListingIndexResponse),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "filterListings"
)]
#[get("/listings/filter/{category}")]
pub async fn filter_by_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ListingIndexResponse>> {
    let filter = ListingFilter::Category(path.into_inner());
    render_index(&state, &session, &filter).await
}

/// Create form; requires a signed-in user.
#[utoipa::path(
    get,
    path = "/listings/new",
    responses(
        (status = 200, description = "Create form target", body = FormResponse),
        (status = 303, description = "Not signed in; redirected to /login", body = RedirectBody)
    ),
    tags = ["listings"],
    operation_id = "newListingForm"
)]
#[get("/listings/new")]
pub async fn new_form(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let auth = session.auth_context(&req)?;
    match state.listings.new_form(&auth).await? {
        Outcome::Done(()) => Ok(HttpResponse::Ok().json(FormResponse::new(
            "/listings",
            "POST",
            session.take_flash(),
        ))),
        Outcome::Rejected(rejection) => reject(&session, rejection),
    }
}

/// Create a listing owned by the signed-in user.
#[utoipa::path(
    post,
    path = "/listings",
    request_body = ListingRequest,
    responses(
        (status = 303, description = "Created, or rejected with a flash", body = RedirectBody),
        (status = 400, description = "Invalid listing", body = ErrorSchema),
        (status = 502, description = "Geocoding or media attachment failed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "createListing"
)]
#[post("/listings")]
pub async fn create(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let auth = session.auth_context(&req)?;
    let payload = Payload::from_json::<ListingRequest>(&body);
    match state.listing_commands.create(&auth, payload).await?
    {
        Outcome::Done(_) => succeed(&session, RedirectTarget::Listings, MSG_LISTING_CREATED),
        Outcome::Rejected(rejection) => reject(&session, rejection),
    }
}

/// Show one listing with its owner and reviews.
#[utoipa::path(
    get,
    path = "/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Listing", body = ListingShowResponse),
        (status = 303, description = "Listing missing; redirected to /listings", body = RedirectBody),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "showListing"
)]
#[get("/listings/{id}")]
pub async fn show(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = match parse_listing_id(&path) {
        Ok(id) => id,
        Err(rejection) => return reject(&session, rejection),
    };
    match state.listings.show(&id).await? {
        Outcome::Done(details) => Ok(HttpResponse::Ok()
            .json(ListingShowResponse::new(&details, session.take_flash()))),
        Outcome::Rejected(rejection) => reject(&session, rejection),
    }
}

/// Edit form for the listing's owner.
#[utoipa::path(
    get,
    path = "/listings/{id}/edit",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Current values and image preview", body = EditFormResponse),
        (status = 303, description = "Rejected with a flash", body = RedirectBody),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "editListingForm"
)]
#[get("/listings/{id}/edit")]
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let auth = session.auth_context(&req)?;
    let id = match protected_listing_id(&auth, &path) {
        Ok(id) => id,
        Err(rejection) => return reject(&session, rejection),
    };
    match state.listings.edit_form(&auth, &id).await? {
        Outcome::Done(edit) => Ok(HttpResponse::Ok().json(EditFormResponse::new(
            &id,
            &edit,
            session.take_flash(),
        ))),
        Outcome::Rejected(rejection) => reject(&session, rejection),
    }
}

/// Replace a listing's fields; the image changes only when one is sent.
#[utoipa::path(
    put,
    path = "/listings/{id}",
    request_body = ListingRequest,
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 303, description = "Updated, or rejected with a flash", body = RedirectBody),
        (status = 400, description = "Invalid listing", body = ErrorSchema),
        (status = 502, description = "Media attachment failed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "updateListing"
)]
#[put("/listings/{id}")]
pub async fn update(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let auth = session.auth_context(&req)?;
    let id = match protected_listing_id(&auth, &path) {
        Ok(id) => id,
        Err(rejection) => return reject(&session, rejection),
    };
    let payload = Payload::from_json::<ListingRequest>(&body);
    match state.listing_commands.update(&auth, &id, payload).await?
    {
        Outcome::Done(_) => succeed(&session, RedirectTarget::Listing(id), MSG_LISTING_UPDATED),
        Outcome::Rejected(rejection) => reject(&session, rejection),
    }
}

/// Delete a listing and its reviews.
#[utoipa::path(
    delete,
    path = "/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 303, description = "Deleted, or rejected with a flash", body = RedirectBody),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["listings"],
    operation_id = "deleteListing"
)]
#[delete("/listings/{id}")]
pub async fn remove(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let auth = session.auth_context(&req)?;
    let id = match protected_listing_id(&auth, &path) {
        Ok(id) => id,
        Err(rejection) => return reject(&session, rejection),
    };
    match state.listing_commands.delete(&auth, &id).await? {
        Outcome::Done(_) => succeed(&session, RedirectTarget::Listings, MSG_LISTING_DELETED),
        Outcome::Rejected(rejection) => reject(&session, rejection),
    }
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
