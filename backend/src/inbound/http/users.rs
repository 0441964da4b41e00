//! Account HTTP handlers.
//!
//! ```text
//! GET  /signup
//! POST /signup {"username":"ada","email":"ada@example.com","password":"analytical"}
//! GET  /login
//! POST /login {"username":"ada","password":"analytical"}
//! POST /logout
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, RedirectTarget, SignupDetails,
    SignupValidationError, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::listings_dto::FormResponse;
use crate::inbound::http::redirect::{RedirectBody, see_other, succeed};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::{FlashLevel, SessionContext};
use crate::inbound::http::state::HttpState;

pub(crate) const MSG_WELCOME: &str = "Welcome to Wanderlust!";
pub(crate) const MSG_WELCOME_BACK: &str = "Welcome back!";
pub(crate) const MSG_LOGGED_OUT: &str = "You are logged out!";

/// Login request body for `POST /login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "analytical")]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Signup request body for `POST /signup`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SignupRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "analytical")]
    pub password: String,
}

impl TryFrom<SignupRequest> for SignupDetails {
    type Error = SignupValidationError;

    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.email, &value.password)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(signup_form)
        .service(signup)
        .service(login_form)
        .service(login)
        .service(logout);
}

fn field_error(message: String, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    field_error(err.to_string(), field, code)
}

fn map_signup_validation_error(err: SignupValidationError) -> Error {
    let (field, code) = match &err {
        SignupValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        SignupValidationError::User(user) => match user {
            UserValidationError::EmptyUsername => ("username", "empty_username"),
            UserValidationError::UsernameTooShort { .. } => ("username", "username_too_short"),
            UserValidationError::UsernameTooLong { .. } => ("username", "username_too_long"),
            UserValidationError::UsernameInvalidCharacters => {
                ("username", "username_invalid_characters")
            }
            UserValidationError::EmptyEmail => ("email", "empty_email"),
            UserValidationError::InvalidEmail => ("email", "invalid_email"),
            UserValidationError::EmptyId | UserValidationError::InvalidId => {
                return Error::internal(format!("signup produced an invalid user id: {err}"));
            }
        },
    };
    field_error(err.to_string(), field, code)
}

/// Signup form target.
#[utoipa::path(
    get,
    path = "/signup",
    responses((status = 200, description = "Signup form target", body = FormResponse)),
    tags = ["users"],
    operation_id = "signupForm",
    security([])
)]
#[get("/signup")]
pub async fn signup_form(session: SessionContext) -> web::Json<FormResponse> {
    web::Json(FormResponse::new("/signup", "POST", session.take_flash()))
}

/// Register an account and sign it in.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 303, description = "Registered and signed in", body = RedirectBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid or duplicate account", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let details =
        SignupDetails::try_from(payload.into_inner()).map_err(map_signup_validation_error)?;
    let user = state.accounts.signup(&details).await?;
    session.persist_user(user.id())?;
    succeed(&session, RedirectTarget::Listings, MSG_WELCOME)
}

/// Login form target; carries the flash left by a login redirect.
#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Login form target", body = FormResponse)),
    tags = ["users"],
    operation_id = "loginForm",
    security([])
)]
#[get("/login")]
pub async fn login_form(session: SessionContext) -> web::Json<FormResponse> {
    web::Json(FormResponse::new("/login", "POST", session.take_flash()))
}

/// Authenticate and resume the path that asked for a login.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Signed in", body = RedirectBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.accounts.authenticate(&credentials).await?;
    let resume = session.take_return_to();
    session.persist_user(&user_id)?;
    session.flash(FlashLevel::Success, MSG_WELCOME_BACK)?;
    info!(user_id = %user_id, "user signed in");
    let location = resume.unwrap_or_else(|| RedirectTarget::Listings.path());
    Ok(see_other(location, MSG_WELCOME_BACK))
}

/// Forget the signed-in user.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Signed out", body = RedirectBody)),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.forget_user();
    succeed(&session, RedirectTarget::Listings, MSG_LOGGED_OUT)
}
