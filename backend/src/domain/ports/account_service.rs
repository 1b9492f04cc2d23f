//! Driving port for account use-cases: registration, login, profile.
//!
//! Inbound adapters call this port without knowing which store backs it.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    EpisodeId, Error, LoginCredentials, PasswordChange, Profile, Registration, SeriesId, User,
    UserId,
};

/// One episode listed on the profile summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEpisode {
    pub id: EpisodeId,
    pub series_id: SeriesId,
    pub series_title: String,
    pub title: String,
}

/// Watched and purchased episodes for the profile page, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub watched: Vec<SummaryEpisode>,
    pub purchased: Vec<SummaryEpisode>,
    pub sequel_unlocked: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create a user from validated registration input.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;

    /// Authenticate by email and password.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Load the signed-in user.
    async fn current_user(&self, id: &UserId) -> Result<User, Error>;

    /// Replace the profile attributes.
    async fn update_profile(&self, id: &UserId, profile: Profile) -> Result<User, Error>;

    /// Change the password after verifying the current one.
    async fn change_password(&self, id: &UserId, change: &PasswordChange) -> Result<(), Error>;

    /// Episodes the user watched and bought.
    async fn profile_summary(&self, id: &UserId) -> Result<ProfileSummary, Error>;
}
