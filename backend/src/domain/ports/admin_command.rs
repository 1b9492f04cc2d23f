//! Driving port for the admin panel.

use async_trait::async_trait;

use crate::domain::{
    Email, Error, Feedback, LoginCredentials, Password, Profile, User, UserId,
    UserValidationError,
};

use super::DirectUploadTicket;

/// Validated admin edit of a user record.
#[derive(Debug, Clone)]
pub struct AdminUserUpdate {
    pub email: Email,
    pub profile: Profile,
    /// Reset the password when present.
    pub new_password: Option<Password>,
}

/// Raw admin edit fields.
#[derive(Debug, Clone, Copy)]
pub struct AdminUserUpdateParts<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub country: &'a str,
    pub city: &'a str,
    pub phone_number: &'a str,
    pub new_password: Option<&'a str>,
}

impl AdminUserUpdate {
    /// Validate an admin edit. Blank new passwords mean "keep the current
    /// one"; non-blank ones only need the minimum length.
    pub fn try_from_parts(parts: AdminUserUpdateParts<'_>) -> Result<Self, UserValidationError> {
        let email = Email::parse(parts.email)?;
        let profile =
            Profile::try_from_parts(parts.name, parts.country, parts.city, parts.phone_number)?;
        let new_password = match parts.new_password {
            Some(raw) if !raw.is_empty() => Some(Password::with_min_length(raw)?),
            _ => None,
        };
        Ok(Self {
            email,
            profile,
            new_password,
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminCommand: Send + Sync {
    /// Check the configured admin credentials; returns the admin email.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Email, Error>;

    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Apply an admin edit to a user.
    async fn update_user(&self, id: &UserId, update: AdminUserUpdate) -> Result<User, Error>;

    async fn delete_user(&self, id: &UserId) -> Result<(), Error>;

    /// Feedback, newest first.
    async fn list_feedback(&self) -> Result<Vec<Feedback>, Error>;

    /// Reserve a direct upload URL for a new video.
    async fn create_upload_ticket(&self) -> Result<DirectUploadTicket, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parts(new_password: Option<&str>) -> AdminUserUpdateParts<'_> {
        AdminUserUpdateParts {
            name: "Arya Stark",
            email: "Arya@Gmail.com",
            country: "Westeros",
            city: "Winterfell",
            phone_number: "0123456",
            new_password,
        }
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(""), false)]
    #[case(Some("needle-sharp"), true)]
    fn password_reset_is_optional(#[case] password: Option<&str>, #[case] reset: bool) {
        let update = AdminUserUpdate::try_from_parts(parts(password)).expect("valid update");
        assert_eq!(update.new_password.is_some(), reset);
        assert_eq!(update.email.as_ref(), "arya@gmail.com");
    }

    #[rstest]
    fn short_reset_password_is_rejected() {
        let err = AdminUserUpdate::try_from_parts(parts(Some("short"))).expect_err("too short");
        assert_eq!(err.code(), "password_too_short");
    }
}
