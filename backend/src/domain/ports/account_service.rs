//! Driving port for account signup and login.
//!
//! Inbound adapters call it to register and authenticate users without
//! knowing how credentials are stored.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, SignupDetails, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Register a new account.
    async fn signup(&self, details: &SignupDetails) -> Result<User, Error>;

    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
