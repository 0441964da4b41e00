//! Session cookie configuration.
//!
//! Settings come from `SESSION_*` environment variables read through
//! [`mockable::Env`]. Debug builds fall back to permissive defaults with a
//! warning; release builds reject anything missing or malformed.

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite, time::Duration};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const KEY_DEFAULT_PATH: &str = "/var/run/secrets/wanderlust_session_key";
const KEY_MIN_LEN: usize = 64;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "wanderlust_session";
/// Sessions outlive the browser for a week.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// # Examples
    ///
    /// ```rust
    /// use wanderlust::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Private (encrypted) cookie sessions with a persistent TTL.
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_http_only(true)
            .cookie_secure(self.cookie_secure)
            .cookie_same_site(self.same_site)
            .session_lifecycle(
                PersistentSession::default().session_ttl(Duration::days(SESSION_TTL_DAYS)),
            )
            .build()
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// One environment toggle with its parser and debug-build fallback.
struct Toggle<T> {
    name: &'static str,
    expected: &'static str,
    parse: fn(&str) -> Option<T>,
    debug_default: T,
}

impl<T: Copy> Toggle<T> {
    fn read<E: Env>(&self, env: &E, mode: BuildMode) -> Result<T, SessionConfigError> {
        let Some(value) = env.string(self.name) else {
            if mode.is_debug() {
                warn!(name = self.name, "session toggle not set; using default");
                return Ok(self.debug_default);
            }
            return Err(SessionConfigError::MissingEnv { name: self.name });
        };
        match (self.parse)(&value) {
            Some(parsed) => Ok(parsed),
            None if mode.is_debug() => {
                warn!(name = self.name, value = %value, "invalid session toggle; using default");
                Ok(self.debug_default)
            }
            None => Err(SessionConfigError::InvalidEnv {
                name: self.name,
                value,
                expected: self.expected,
            }),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use wanderlust::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).unwrap();
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = Toggle {
        name: COOKIE_SECURE_ENV,
        expected: BOOL_EXPECTED,
        parse: parse_bool,
        debug_default: true,
    }
    .read(env, mode)?;
    let same_site = Toggle {
        name: SAMESITE_ENV,
        expected: SAMESITE_EXPECTED,
        parse: parse_same_site,
        debug_default: SameSite::Lax,
    }
    .read(env, mode)?;
    if same_site == SameSite::None && !cookie_secure {
        if !mode.is_debug() {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
        warn!("SESSION_SAMESITE=None without a secure cookie; browsers may drop it");
    }
    let allow_ephemeral = Toggle {
        name: ALLOW_EPHEMERAL_ENV,
        expected: BOOL_EXPECTED,
        parse: parse_bool,
        debug_default: false,
    }
    .read(env, mode)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn session_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| KEY_DEFAULT_PATH.to_owned()),
    );
    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), %error, "using temporary session key");
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };
    let length = bytes.len();
    if length < KEY_MIN_LEN {
        bytes.zeroize();
        if mode.is_debug() {
            warn!(path = %path.display(), length, "session key too short; using temporary key");
            return Ok(Key::generate());
        }
        return Err(SessionConfigError::KeyTooShort {
            path,
            length,
            min_len: KEY_MIN_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}
