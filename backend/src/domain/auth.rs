//! Authentication primitives: login credentials, stored password digests, and
//! the per-request authentication context.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;
use zeroize::Zeroizing;

use super::{Email, UserId, UserValidationError, Username};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use wanderlust::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada", "password").unwrap();
/// assert_eq!(creds.username(), "ada");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised while validating a signup payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupValidationError {
    /// Username or email failed validation.
    User(UserValidationError),
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
}

impl fmt::Display for SignupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(error) => error.fmt(f),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for SignupValidationError {}

impl From<UserValidationError> for SignupValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Minimum accepted password length at signup.
pub const PASSWORD_MIN: usize = 8;

/// Validated signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDetails {
    username: Username,
    email: Email,
    password: Zeroizing<String>,
}

impl SignupDetails {
    /// Validate raw signup inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, SignupValidationError> {
        let username = Username::new(username)?;
        let email = Email::new(email)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(SignupValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Contact address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password, zeroized on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

const SALT_LEN: usize = 16;

/// Password hashing failed before anything was stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordDigestError(String);

/// Argon2id password hash in PHC string form, as persisted with a user.
///
/// The PHC string carries the algorithm, cost parameters, and salt, so a
/// stored digest keeps verifying after the defaults change.
///
/// # Examples
/// ```
/// use wanderlust::domain::PasswordDigest;
///
/// let digest = PasswordDigest::derive("correct horse").expect("hash");
/// assert!(digest.as_phc().starts_with("$argon2id$"));
/// assert!(digest.verify("correct horse"));
/// assert!(!digest.verify("wrong horse"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    phc: String,
}

impl PasswordDigest {
    /// Hash `password` under a fresh random salt.
    pub fn derive(password: &str) -> Result<Self, PasswordDigestError> {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|err| PasswordDigestError(err.to_string()))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordDigestError(err.to_string()))?;
        Ok(Self {
            phc: hash.to_string(),
        })
    }

    /// Wrap a stored PHC string. It is parsed only when verifying.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self { phc: phc.into() }
    }

    pub fn as_phc(&self) -> &str {
        self.phc.as_str()
    }

    /// Check `password` against the stored hash. Unparseable hashes never
    /// verify.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordDigest").finish_non_exhaustive()
    }
}

/// Identity of the caller, resolved once per request from verified session
/// data and threaded explicitly into every pipeline call.
///
/// # Examples
/// ```
/// use wanderlust::domain::{AuthContext, UserId};
///
/// let anonymous = AuthContext::anonymous("/listings/new");
/// assert!(!anonymous.is_authenticated());
///
/// let id = UserId::random();
/// let signed_in = AuthContext::authenticated(id.clone(), "/listings");
/// assert_eq!(signed_in.current_principal(), Some(&id));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    principal: Option<UserId>,
    requested_path: String,
}

impl AuthContext {
    /// Context for a request carrying no principal.
    pub fn anonymous(requested_path: impl Into<String>) -> Self {
        Self {
            principal: None,
            requested_path: requested_path.into(),
        }
    }

    /// Context for a request made by `principal`.
    pub fn authenticated(principal: UserId, requested_path: impl Into<String>) -> Self {
        Self {
            principal: Some(principal),
            requested_path: requested_path.into(),
        }
    }

    /// Build from an optional principal.
    pub fn new(principal: Option<UserId>, requested_path: impl Into<String>) -> Self {
        Self {
            principal,
            requested_path: requested_path.into(),
        }
    }

    /// Whether a principal is attached.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// The acting principal, if any.
    pub fn current_principal(&self) -> Option<&UserId> {
        self.principal.as_ref()
    }

    /// Original path and query of the request, kept for post-login redirects.
    pub fn requested_path(&self) -> &str {
        self.requested_path.as_str()
    }
}
