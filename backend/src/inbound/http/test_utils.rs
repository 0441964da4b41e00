//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::test::TestRequest;
use actix_web::{App, HttpResponse, web};
use mockable::DefaultClock;

use crate::domain::ports::{FixtureGeocoder, PassthroughMediaStore};
use crate::domain::{ListingService, UserAccountService, UserId};
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, listings, reviews, users};
use crate::outbound::memory::InMemoryStore;

pub(crate) const SESSION_COOKIE: &str = "session";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state backed by a fresh in-memory store and offline adapters.
pub(crate) fn memory_state() -> (Arc<InMemoryStore>, HttpState) {
    let store = Arc::new(InMemoryStore::new());
    let service = Arc::new(ListingService::new(
        store.clone(),
        store.clone(),
        Arc::new(FixtureGeocoder),
        Arc::new(PassthroughMediaStore),
        Arc::new(DefaultClock),
    ));
    let accounts = Arc::new(UserAccountService::new(store.clone()));
    (store, HttpState::from_service(service, accounts))
}

/// Mark the session as signed in as the user named in the path.
async fn sign_in(session: SessionContext, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user_id = UserId::new(path.as_str())
        .map_err(|err| crate::domain::Error::invalid_request(err.to_string()))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Every application route plus `POST /test/sign-in/{user_id}`.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(test_session_middleware())
        .route("/test/sign-in/{user_id}", web::post().to(sign_in))
        .configure(listings::configure)
        .configure(reviews::configure)
        .configure(users::configure)
}

/// Carries the latest session cookie between test requests.
#[derive(Debug, Default)]
pub(crate) struct CookieJar(Option<Cookie<'static>>);

impl CookieJar {
    pub(crate) fn attach(&self, req: TestRequest) -> TestRequest {
        match &self.0 {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    pub(crate) fn store<B>(&mut self, res: &ServiceResponse<B>) {
        if let Some(cookie) = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
        {
            self.0 = Some(cookie.into_owned());
        }
    }
}
