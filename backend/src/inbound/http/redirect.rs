//! Redirect responses for handled outcomes.
//!
//! Successful mutations and handled rejections both answer `303 See Other`
//! with a `Location` header, queue a flash message, and echo the target and
//! message as JSON for API clients.

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, get};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{RedirectTarget, Rejection};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{FlashLevel, SessionContext};

/// Body of every redirect response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RedirectBody {
    /// Path the client should visit next.
    #[schema(example = "/listings")]
    pub redirect: String,
    /// Message also queued as a flash for the next page view.
    #[schema(example = "New Listing Created!")]
    pub message: String,
}

pub(crate) fn see_other(location: String, message: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location.clone()))
        .json(RedirectBody {
            redirect: location,
            message: message.to_owned(),
        })
}

/// Queue a success flash and redirect to `target`.
pub(crate) fn succeed(
    session: &SessionContext,
    target: RedirectTarget,
    message: &str,
) -> ApiResult<HttpResponse> {
    session.flash(FlashLevel::Success, message)?;
    Ok(see_other(target.path(), message))
}

/// Queue an error flash for a handled rejection and redirect.
///
/// Unauthenticated rejections also remember the requested path so login can
/// resume it.
pub(crate) fn reject(session: &SessionContext, rejection: Rejection) -> ApiResult<HttpResponse> {
    info!(kind = ?rejection.kind, redirect = %rejection.redirect.path(), "request rejected");
    if let Some(path) = rejection.return_to.as_deref() {
        session.remember_return_to(path)?;
    }
    session.flash(FlashLevel::Error, rejection.message)?;
    Ok(see_other(rejection.redirect.path(), rejection.message))
}

/// Landing page; sends visitors to the listing index.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 303, description = "Redirect to /listings")),
    tags = ["listings"],
    operation_id = "root",
    security([])
)]
#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, RedirectTarget::Listings.path()))
        .finish()
}
