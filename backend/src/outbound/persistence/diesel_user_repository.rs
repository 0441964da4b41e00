//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserCredentials, UserPersistenceError, UserRepository};
use crate::domain::{Email, PasswordDigest, User, UserId, Username};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: super::pool::PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Rebuild a validated user from its row, keeping the digest alongside.
pub(super) fn row_to_credentials(row: UserRow) -> Result<UserCredentials, UserPersistenceError> {
    let UserRow {
        id,
        username,
        email,
        password_hash,
    } = row;
    let username =
        Username::new(username).map_err(|err| UserPersistenceError::query(err.to_string()))?;
    let email = Email::new(email).map_err(|err| UserPersistenceError::query(err.to_string()))?;
    Ok(UserCredentials {
        user: User::new(UserId::from_uuid(id), username, email),
        digest: PasswordDigest::from_phc(password_hash),
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            email: user.email().as_ref(),
            password_hash: digest.as_phc(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_username(user.username().as_ref())
                } else {
                    diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(|row| row_to_credentials(row).map(|stored| stored.user))
            .transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.trim()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_credentials).transpose()
    }
}
