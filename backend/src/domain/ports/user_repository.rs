//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, Error, User, UserId, UserPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already owns this email.
        DuplicateEmail { email: String } => "a user with email {email} already exists",
        /// No user with this id exists.
        NotFound { id: String } => "user {id} not found",
    }
}

impl From<UserPersistenceError> for Error {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { email } => {
                Error::conflict(format!("email {email} is already registered")).with_details(
                    serde_json::json!({ "field": "email", "code": "email_taken" }),
                )
            }
            UserPersistenceError::NotFound { id } => Error::not_found(format!("user {id} not found")),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new user; the email must be unused.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Apply `patch` to an existing user and return the stored result.
    ///
    /// Changing the email to one owned by another user fails with
    /// [`UserPersistenceError::DuplicateEmail`].
    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, UserPersistenceError>;

    /// All users ordered by creation time.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Remove a user.
    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_email(&self, _email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn create(&self, _user: &User) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn update(&self, id: &UserId, _patch: UserPatch) -> Result<User, UserPersistenceError> {
        Err(UserPersistenceError::not_found(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(Vec::new())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        Err(UserPersistenceError::not_found(id.to_string()))
    }
}
