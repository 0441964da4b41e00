//! OpenAPI document for the HTTP API.
//!
//! Registers every listing, review, account, and health path plus the schema
//! wrappers from [`crate::inbound::http::schemas`]. Served through Swagger UI
//! at `/docs` in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::health::ProbeBody;
use crate::inbound::http::listings_dto::{
    EditFormResponse, FormResponse, ImageResponse, ListingIndexResponse, ListingRequest,
    ListingResponse, ListingShowResponse, PointResponse, ReviewRequest, ReviewResponse,
    UploadRequest, UserSummary,
};
use crate::inbound::http::redirect::RedirectBody;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, ListingInputSchema, ReviewInputSchema,
};
use crate::inbound::http::session::Flash;
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::users::{LoginRequest, SignupRequest};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Encrypted session cookie issued by POST /signup or POST /login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Wanderlust API",
        description = "Rental listings with owner-guarded edits and reviews."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::redirect::root,
        crate::inbound::http::listings::index,
        crate::inbound::http::listings::search,
        crate::inbound::http::listings::filter_by_category,
        crate::inbound::http::listings::new_form,
        crate::inbound::http::listings::create,
        crate::inbound::http::listings::show,
        crate::inbound::http::listings::edit_form,
        crate::inbound::http::listings::update,
        crate::inbound::http::listings::remove,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::users::signup_form,
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login_form,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ListingInputSchema,
        ReviewInputSchema,
        ListingRequest,
        UploadRequest,
        ReviewRequest,
        ListingResponse,
        ImageResponse,
        PointResponse,
        ListingIndexResponse,
        ListingShowResponse,
        ReviewResponse,
        UserSummary,
        FormResponse,
        EditFormResponse,
        RedirectBody,
        Flash,
        LoginRequest,
        SignupRequest,
        ProbeBody,
    )),
    tags(
        (name = "listings", description = "Browse and manage listings"),
        (name = "reviews", description = "Reviews attached to a listing"),
        (name = "users", description = "Signup, login, and logout"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
