//! Shared harness for HTTP integration tests.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::LOCATION;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use mockable::DefaultClock;
use serde_json::{Value, json};

use wanderlust::Trace;
use wanderlust::domain::ports::{FixtureGeocoder, PassthroughMediaStore};
use wanderlust::domain::{ListingService, UserAccountService};
use wanderlust::inbound::http::error::{json_error_handler, page_not_found};
use wanderlust::inbound::http::state::HttpState;
use wanderlust::inbound::http::{listings, reviews, users};
use wanderlust::outbound::memory::InMemoryStore;

pub const SESSION_COOKIE: &str = "session";

/// Send a request as `$browser` and read the reply.
macro_rules! send {
    ($app:expr, $browser:expr, $req:expr) => {{
        let res = actix_web::test::call_service(&$app, $browser.attach($req).to_request()).await;
        $browser.observe(&res);
        $crate::support::Reply::read(res).await
    }};
}

/// HTTP state over a fresh in-memory store with offline adapters.
pub fn memory_state() -> (Arc<InMemoryStore>, HttpState) {
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

/// The application as the binary assembles it, minus Swagger UI and probes.
pub fn app(
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
        .wrap(
            SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                .cookie_name(SESSION_COOKIE.to_owned())
                .cookie_secure(false)
                .build(),
        )
        .wrap(Trace)
        .configure(listings::configure)
        .configure(reviews::configure)
        .configure(users::configure)
        .default_service(web::to(page_not_found))
}

/// One browser: carries the session cookie across requests.
#[derive(Debug, Default)]
pub struct Browser {
    cookie: Option<Cookie<'static>>,
}

impl Browser {
    pub fn attach(&self, req: TestRequest) -> TestRequest {
        match &self.cookie {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    pub fn observe<B>(&mut self, res: &ServiceResponse<B>) {
        if let Some(cookie) = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
        {
            self.cookie = Some(cookie.into_owned());
        }
    }
}

/// Status, redirect target, and JSON body of a response.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub location: Option<String>,
    pub body: Value,
}

impl Reply {
    pub async fn read<B: MessageBody>(res: ServiceResponse<B>) -> Self {
        let status = res.status().as_u16();
        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = test::read_body(res).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            location,
            body,
        }
    }
}

pub fn signup_request(username: &str) -> TestRequest {
    TestRequest::post().uri("/signup").set_json(json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "correct horse",
    }))
}

/// A complete listing form body.
pub fn listing_body(title: &str, category: &str) -> Value {
    json!({
        "listing": {
            "title": title,
            "description": "A quiet place to stay",
            "price": 1200,
            "location": "Calangute",
            "country": "India",
            "category": category,
        }
    })
}
