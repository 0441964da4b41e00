//! Session helpers so handlers never touch raw session keys.
//!
//! The session holds three things: the signed-in user's id, the path to
//! resume after logging in, and pending flash messages.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::{AuthContext, Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const RETURN_TO_KEY: &str = "return_to";
pub(crate) const FLASH_KEY: &str = "flash";

/// Category of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

/// Messages queued for the next page view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Flash {
    pub success: Vec<String>,
    pub error: Vec<String>,
}

impl Flash {
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }

    fn push(&mut self, level: FlashLevel, message: impl Into<String>) {
        match level {
            FlashLevel::Success => self.success.push(message.into()),
            FlashLevel::Error => self.error.push(message.into()),
        }
    }
}

fn read_failed(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

fn write_failed(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

/// Newtype wrapper exposing domain-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(write_failed)
    }

    /// Current user id. A tampered or malformed value counts as signed out.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self.0.get::<String>(USER_ID_KEY).map_err(read_failed)?;
        Ok(raw.and_then(|raw| match UserId::new(raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Sign the user out while keeping queued flash messages.
    pub fn forget_user(&self) {
        self.0.remove(USER_ID_KEY);
        self.0.remove(RETURN_TO_KEY);
    }

    /// Build the per-request identity for the pipeline.
    pub fn auth_context(&self, req: &HttpRequest) -> Result<AuthContext, Error> {
        let requested = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
        Ok(AuthContext::new(self.user_id()?, requested))
    }

    /// Remember where to send the user after they log in.
    pub fn remember_return_to(&self, path: &str) -> Result<(), Error> {
        self.0.insert(RETURN_TO_KEY, path).map_err(write_failed)
    }

    /// Take the remembered post-login path, clearing it.
    pub fn take_return_to(&self) -> Option<String> {
        match self.0.remove_as::<String>(RETURN_TO_KEY) {
            Some(Ok(path)) => Some(path),
            Some(Err(raw)) => {
                warn!(value = %raw, "discarding unreadable return path");
                None
            }
            None => None,
        }
    }

    /// Queue a flash message for the next page view.
    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) -> Result<(), Error> {
        let mut pending = self
            .0
            .get::<Flash>(FLASH_KEY)
            .map_err(read_failed)?
            .unwrap_or_default();
        pending.push(level, message);
        self.0.insert(FLASH_KEY, pending).map_err(write_failed)
    }

    /// Drain queued flash messages.
    pub fn take_flash(&self) -> Flash {
        match self.0.remove_as::<Flash>(FLASH_KEY) {
            Some(Ok(flash)) => flash,
            Some(Err(raw)) => {
                warn!(value = %raw, "discarding unreadable flash messages");
                Flash::default()
            }
            None => Flash::default(),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn round_trips_user_id_into_auth_context() {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let id = UserId::new(FIXTURE_ID).expect("fixture id");
                        session.persist_user(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/whoami",
                    web::get().to(|req: HttpRequest, session: SessionContext| async move {
                        let auth = session.auth_context(&req)?;
                        let body = format!(
                            "{}|{}",
                            auth.current_principal()
                                .map(ToString::to_string)
                                .unwrap_or_default(),
                            auth.requested_path()
                        );
                        Ok::<_, Error>(HttpResponse::Ok().body(body))
                    }),
                ),
        )
        .await;

        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami?q=goa")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, format!("{FIXTURE_ID}|/whoami?q=goa"));
    }

    #[actix_web::test]
    async fn tampered_user_id_counts_as_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(USER_ID_KEY, "not-a-uuid")
                            .expect("set invalid user id");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/check",
                    web::get().to(|session: SessionContext| async move {
                        let signed_in = session.user_id()?.is_some();
                        Ok::<_, Error>(HttpResponse::Ok().body(signed_in.to_string()))
                    }),
                ),
        )
        .await;

        let set = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/check")
                .cookie(session_cookie(&set))
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(res).await, "false");
    }

    #[actix_web::test]
    async fn flash_messages_are_drained_once() {
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/queue",
                    web::get().to(|session: SessionContext| async move {
                        session.flash(FlashLevel::Success, "Listing Updated!")?;
                        session.flash(FlashLevel::Error, "careful")?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/drain",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().json(session.take_flash())
                    }),
                ),
        )
        .await;

        let queued =
            test::call_service(&app, test::TestRequest::get().uri("/queue").to_request()).await;
        let first = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/drain")
                .cookie(session_cookie(&queued))
                .to_request(),
        )
        .await;
        let drained_cookie = session_cookie(&first);
        let flash: Flash = test::read_body_json(first).await;
        assert_eq!(flash.success, vec!["Listing Updated!".to_owned()]);
        assert_eq!(flash.error, vec!["careful".to_owned()]);

        let second = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/drain")
                .cookie(drained_cookie)
                .to_request(),
        )
        .await;
        let flash: Flash = test::read_body_json(second).await;
        assert!(flash.is_empty());
    }
}
