//! Authentication primitives: login credentials, registration input, and
//! password changes.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use serde_json::json;
use zeroize::Zeroizing;

use super::{Email, Error, Password, PasswordDigest, UserValidationError};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl LoginValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "email",
            Self::EmptyPassword => "password",
        }
    }
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

impl From<LoginValidationError> for Error {
    fn from(err: LoginValidationError) -> Self {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": err.field(), "code": "empty_field" }))
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed, lowercased and must not be empty. It is not matched
///   against the address pattern: an unknown address simply fails to log in.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use dragonfire::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Arya@Gmail.com ", "needle1").unwrap();
/// assert_eq!(creds.email(), "arya@gmail.com");
/// assert_eq!(creds.password(), "needle1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email suitable for lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Whether the supplied password produces `digest`.
    pub fn matches(&self, digest: &PasswordDigest) -> bool {
        digest.matches(self.password())
    }
}

/// Registration input that passed every field rule.
#[derive(Debug, Clone)]
pub struct Registration {
    email: Email,
    password: Password,
}

impl Registration {
    /// Validate the email (pattern and allowed domain) then the password.
    ///
    /// # Examples
    /// ```
    /// use dragonfire::domain::Registration;
    ///
    /// assert!(Registration::try_from_parts("jon@outlook.com", "ghost123").is_ok());
    /// assert!(Registration::try_from_parts("jon@nightswatch.org", "ghost123").is_err());
    /// ```
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, UserValidationError> {
        let email = Email::for_registration(email)?;
        let password = Password::new(password)?;
        Ok(Self { email, password })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Self-service password change.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    replacement: Password,
}

impl PasswordChange {
    /// The current password must be present; the replacement must satisfy
    /// the registration rule.
    pub fn try_from_parts(current: &str, replacement: &str) -> Result<Self, UserValidationError> {
        if current.is_empty() {
            return Err(UserValidationError::EmptyProfileField {
                field: "currentPassword",
            });
        }
        let replacement = Password::new(replacement)?;
        Ok(Self {
            current: Zeroizing::new(current.to_owned()),
            replacement,
        })
    }

    /// Whether the supplied current password produces `digest`.
    pub fn current_matches(&self, digest: &PasswordDigest) -> bool {
        digest.matches(self.current.as_str())
    }

    pub fn replacement(&self) -> &Password {
        &self.replacement
    }
}
