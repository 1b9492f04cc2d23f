//! User accounts: identity, credentials, profile, and entitlements.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{Entitlements, Error};

/// Minimum password length accepted anywhere.
pub const PASSWORD_MIN: usize = 8;

/// Email domains accepted at registration.
pub const ALLOWED_EMAIL_DOMAINS: [&str; 5] = [
    "gmail.com",
    "outlook.com",
    "yahoo.com",
    "protonmail.com",
    "icloud.com",
];

/// Validation errors for user-facing account input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmailDomainNotAllowed { domain: String },
    PasswordTooShort { min: usize },
    PasswordInvalidCharacters,
    PasswordMissingLetter,
    PasswordMissingDigit,
    InvalidPasswordDigest,
    EmptyProfileField { field: &'static str },
    InvalidPhoneNumber,
}

impl UserValidationError {
    /// Name of the offending input field, as exposed on the wire.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyEmail | Self::InvalidEmail | Self::EmailDomainNotAllowed { .. } => "email",
            Self::PasswordTooShort { .. }
            | Self::PasswordInvalidCharacters
            | Self::PasswordMissingLetter
            | Self::PasswordMissingDigit
            | Self::InvalidPasswordDigest => "password",
            Self::EmptyProfileField { field } => *field,
            Self::InvalidPhoneNumber => "phoneNumber",
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyId => "empty_id",
            Self::InvalidId => "invalid_id",
            Self::EmptyEmail => "empty_email",
            Self::InvalidEmail => "invalid_email",
            Self::EmailDomainNotAllowed { .. } => "email_domain_not_allowed",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordInvalidCharacters => "password_invalid_characters",
            Self::PasswordMissingLetter => "password_missing_letter",
            Self::PasswordMissingDigit => "password_missing_digit",
            Self::InvalidPasswordDigest => "invalid_password_digest",
            Self::EmptyProfileField { .. } => "empty_field",
            Self::InvalidPhoneNumber => "invalid_phone_number",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmailDomainNotAllowed { domain } => {
                write!(f, "email domain '{domain}' is not accepted")
            }
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordInvalidCharacters => {
                write!(f, "password may only contain letters and digits")
            }
            Self::PasswordMissingLetter => write!(f, "password must contain a letter"),
            Self::PasswordMissingDigit => write!(f, "password must contain a digit"),
            Self::InvalidPasswordDigest => write!(f, "password digest must be SHA-256 hex"),
            Self::EmptyProfileField { field } => write!(f, "{field} must not be empty"),
            Self::InvalidPhoneNumber => write!(f, "phone number may only contain digits"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl From<UserValidationError> for Error {
    fn from(err: UserValidationError) -> Self {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": err.field(), "code": err.code() }))
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
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
        value.1
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse an address for registration: well-formed and on an allowed
    /// domain.
    ///
    /// # Examples
    /// ```
    /// use dragonfire::domain::Email;
    ///
    /// let email = Email::for_registration(" Arya@Gmail.com ").expect("allowed");
    /// assert_eq!(email.as_ref(), "arya@gmail.com");
    /// assert!(Email::for_registration("arya@winterfell.org").is_err());
    /// ```
    pub fn for_registration(raw: &str) -> Result<Self, UserValidationError> {
        let email = Self::parse(raw)?;
        let domain = email.domain();
        if !ALLOWED_EMAIL_DOMAINS.contains(&domain) {
            return Err(UserValidationError::EmailDomainNotAllowed {
                domain: domain.to_owned(),
            });
        }
        Ok(email)
    }

    /// Parse any well-formed address, normalising case and whitespace.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Part after the `@`.
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
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
        Self::parse(&value)
    }
}

/// Plaintext password that passed a strength rule. Wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Registration and self-service rule: at least [`PASSWORD_MIN`] ASCII
    /// letters and digits, with at least one of each.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let password = Self::with_min_length(raw)?;
        if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UserValidationError::PasswordInvalidCharacters);
        }
        if !raw.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(UserValidationError::PasswordMissingLetter);
        }
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            return Err(UserValidationError::PasswordMissingDigit);
        }
        Ok(password)
    }

    /// Administrative reset rule: length only.
    pub fn with_min_length(raw: &str) -> Result<Self, UserValidationError> {
        if raw.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Digest of this password.
    pub fn digest(&self) -> PasswordDigest {
        PasswordDigest::of(self.0.as_str())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Lowercase hex SHA-256 of a password.
///
/// Illustrative only: unsalted digests are not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Digest a plaintext password.
    ///
    /// # Examples
    /// ```
    /// use dragonfire::domain::PasswordDigest;
    ///
    /// let digest = PasswordDigest::of("password1");
    /// assert!(digest.matches("password1"));
    /// assert!(!digest.matches("password2"));
    /// ```
    pub fn of(plaintext: &str) -> Self {
        Self(hex::encode(Sha256::digest(plaintext.as_bytes())))
    }

    /// Parse a stored digest.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().to_ascii_lowercase();
        let is_hex = normalised.len() == 64 && normalised.chars().all(|c| c.is_ascii_hexdigit());
        if is_hex {
            Ok(Self(normalised))
        } else {
            Err(UserValidationError::InvalidPasswordDigest)
        }
    }

    /// Whether `candidate` hashes to this digest.
    pub fn matches(&self, candidate: &str) -> bool {
        Self::of(candidate) == *self
    }
}

impl AsRef<str> for PasswordDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PasswordDigest> for String {
    fn from(value: PasswordDigest) -> Self {
        value.0
    }
}

impl TryFrom<String> for PasswordDigest {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Free-form profile attributes. Empty strings mean "not provided yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub country: String,
    pub city: String,
    pub phone_number: String,
}

impl Profile {
    /// Validate a complete profile edit: every field required and the phone
    /// number digits only.
    pub fn try_from_parts(
        name: &str,
        country: &str,
        city: &str,
        phone_number: &str,
    ) -> Result<Self, UserValidationError> {
        let required = |field: &'static str, value: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(UserValidationError::EmptyProfileField { field })
            } else {
                Ok(trimmed.to_owned())
            }
        };
        let name = required("name", name)?;
        let country = required("country", country)?;
        let city = required("city", city)?;
        let phone_number = required("phoneNumber", phone_number)?;
        if !phone_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(UserValidationError::InvalidPhoneNumber);
        }
        Ok(Self {
            name,
            country,
            city,
            phone_number,
        })
    }

    /// Name to show, falling back to the email's local part.
    pub fn display_name_or<'a>(&'a self, email: &'a Email) -> &'a str {
        if self.name.is_empty() {
            email.as_ref().split('@').next().unwrap_or_default()
        } else {
            self.name.as_str()
        }
    }
}

/// Application user.
///
/// ## Invariants
/// - `email` is lowercased and unique across the store.
/// - `password_digest` never holds plaintext.
/// - Entitlement sets only contain ids present in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    password_digest: PasswordDigest,
    profile: Profile,
    entitlements: Entitlements,
    created_at: DateTime<Utc>,
}

/// Field bundle for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub email: Email,
    pub password_digest: PasswordDigest,
    pub profile: Profile,
    pub entitlements: Entitlements,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user from validated parts.
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            email,
            password_digest,
            profile,
            entitlements,
            created_at,
        } = draft;
        Self {
            id,
            email,
            password_digest,
            profile,
            entitlements,
            created_at,
        }
    }

    /// A freshly registered user with no profile and no entitlements.
    pub fn register(email: Email, password: &Password, created_at: DateTime<Utc>) -> Self {
        Self::new(UserDraft {
            id: UserId::random(),
            email,
            password_digest: password.digest(),
            profile: Profile::default(),
            entitlements: Entitlements::default(),
            created_at,
        })
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn entitlements(&self) -> &Entitlements {
        &self.entitlements
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Name shown in greetings and feedback.
    pub fn display_name(&self) -> &str {
        self.profile.display_name_or(&self.email)
    }

    /// Apply a partial update, returning the new record.
    pub fn apply(self, patch: UserPatch) -> Self {
        let UserPatch {
            email,
            password_digest,
            profile,
            entitlements,
        } = patch;
        Self {
            email: email.unwrap_or(self.email),
            password_digest: password_digest.unwrap_or(self.password_digest),
            profile: profile.unwrap_or(self.profile),
            entitlements: entitlements.unwrap_or(self.entitlements),
            ..self
        }
    }
}

/// Partial update for a stored user. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<Email>,
    pub password_digest: Option<PasswordDigest>,
    pub profile: Option<Profile>,
    pub entitlements: Option<Entitlements>,
}

impl UserPatch {
    /// Patch that replaces only the entitlements.
    pub fn entitlements(entitlements: Entitlements) -> Self {
        Self {
            entitlements: Some(entitlements),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
