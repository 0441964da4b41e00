//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{PasswordDigest, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Username already taken by another account.
        DuplicateUsername { username: String } => "username already registered: {username}",
    }
}

/// A user together with the digest used to verify their password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    pub digest: PasswordDigest,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user; usernames are unique.
    async fn insert(&self, user: &User, digest: &PasswordDigest)
    -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the account and digest registered under `username`.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;
}
