//! Account registration and credential verification.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::ports::{AccountService, UserRepository};
use super::storage_errors::map_user_error;
use super::{Error, LoginCredentials, PasswordDigest, SignupDetails, User, UserId};

/// Message returned for any failed login, whichever part was wrong.
pub const MSG_BAD_CREDENTIALS: &str = "Invalid username or password.";

/// Domain service implementing [`AccountService`] over a user repository.
#[derive(Clone)]
pub struct UserAccountService<U> {
    users: Arc<U>,
}

impl<U> UserAccountService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> AccountService for UserAccountService<U>
where
    U: UserRepository,
{
    async fn signup(&self, details: &SignupDetails) -> Result<User, Error> {
        let digest = PasswordDigest::derive(details.password())
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = User::new(
            UserId::random(),
            details.username().clone(),
            details.email().clone(),
        );
        self.users
            .insert(&user, &digest)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), "user registered");
        Ok(user)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_error)?;
        match stored {
            Some(stored) if stored.digest.verify(credentials.password()) => {
                Ok(stored.user.id().clone())
            }
            _ => Err(Error::unauthorized(MSG_BAD_CREDENTIALS)),
        }
    }
}
