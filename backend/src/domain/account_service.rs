//! Account domain service: registration, login, and profile management.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountService, CatalogProvider, ProfileSummary, SummaryEpisode, UserRepository,
};
use crate::domain::{
    Catalog, Email, EpisodeId, Error, LoginCredentials, PasswordChange, Profile, Registration, User,
    UserId, UserPatch,
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Account service implementing the [`AccountService`] driving port.
#[derive(Clone)]
pub struct UserAccountService<R: ?Sized> {
    users: Arc<R>,
    catalog: Arc<dyn CatalogProvider>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> UserAccountService<R> {
    pub fn new(users: Arc<R>, catalog: Arc<dyn CatalogProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            catalog,
            clock,
        }
    }
}

/// Load the user behind a session, treating a vanished record as an
/// expired login.
pub(crate) async fn require_user<R>(users: &R, id: &UserId) -> Result<User, Error>
where
    R: UserRepository + ?Sized,
{
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::unauthorized("session user no longer exists"))
}

#[async_trait]
impl<R> AccountService for UserAccountService<R>
where
    R: UserRepository + ?Sized,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let user = User::register(
            registration.email().clone(),
            registration.password(),
            self.clock.utc(),
        );
        self.users.create(&user).await?;
        info!(user_id = %user.id(), "user registered");
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Ok(email) = Email::parse(credentials.email()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !credentials.matches(user.password_digest()) {
            warn!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        info!(user_id = %user.id(), "user logged in");
        Ok(user)
    }

    async fn current_user(&self, id: &UserId) -> Result<User, Error> {
        require_user(self.users.as_ref(), id).await
    }

    async fn update_profile(&self, id: &UserId, profile: Profile) -> Result<User, Error> {
        let patch = UserPatch {
            profile: Some(profile),
            ..UserPatch::default()
        };
        let user = self.users.update(id, patch).await?;
        info!(user_id = %id, "profile updated");
        Ok(user)
    }

    async fn change_password(&self, id: &UserId, change: &PasswordChange) -> Result<(), Error> {
        let user = require_user(self.users.as_ref(), id).await?;
        if !change.current_matches(user.password_digest()) {
            return Err(Error::invalid_request("current password is incorrect").with_details(
                json!({ "field": "currentPassword", "code": "password_mismatch" }),
            ));
        }
        let patch = UserPatch {
            password_digest: Some(change.replacement().digest()),
            ..UserPatch::default()
        };
        self.users.update(id, patch).await?;
        info!(user_id = %id, "password changed");
        Ok(())
    }

    async fn profile_summary(&self, id: &UserId) -> Result<ProfileSummary, Error> {
        let user = require_user(self.users.as_ref(), id).await?;
        let catalog = self.catalog.catalog();
        let entitlements = user.entitlements();

        Ok(ProfileSummary {
            watched: summarise(&catalog, |episode| entitlements.has_watched(episode)),
            purchased: summarise(&catalog, |episode| entitlements.has_purchased(episode)),
            sequel_unlocked: entitlements.sequel_unlocked(),
        })
    }
}

/// Episodes accepted by `wanted`, in catalog order.
fn summarise(catalog: &Catalog, wanted: impl Fn(EpisodeId) -> bool) -> Vec<SummaryEpisode> {
    let mut episodes = Vec::new();
    for series in catalog.list_series() {
        for episode in series.episodes().iter().filter(|episode| wanted(episode.id)) {
            episodes.push(SummaryEpisode {
                id: episode.id,
                series_id: series.id().clone(),
                series_title: series.title().to_owned(),
                title: episode.title.clone(),
            });
        }
    }
    episodes
}
