//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyUsername,
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyEmail,
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, dots, dashes, or underscores",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Login name chosen at signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new("^[A-Za-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl Username {
    /// Validate and construct a [`Username`]; surrounding whitespace is trimmed.
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let username = username.as_ref().trim();
        if username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }

        let length = username.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(username) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }

        Ok(Self(username.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact address; required for every account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`]; surrounding whitespace is trimmed.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// Credential material is not part of this type; it is stored alongside the
/// user by the repository and only surfaces during authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    username: Username,
    email: Email,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, username: Username, email: Email) -> Self {
        Self {
            id,
            username,
            email,
        }
    }

    /// Fallible constructor enforcing identifier, username, and email invariants.
    pub fn try_from_strings(
        id: impl AsRef<str>,
        username: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self::new(
            UserId::new(id)?,
            Username::new(username)?,
            Email::new(email)?,
        ))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Contact address.
    pub fn email(&self) -> &Email {
        &self.email
    }
}
