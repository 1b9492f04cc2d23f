//! Catalog browsing with per-user access decisions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::account_service::require_user;
use crate::domain::ports::{
    CatalogProvider, CatalogQuery, EpisodeAccess, SequelStatus, SeriesSummary, UserRepository,
};
use crate::domain::{
    AccessPolicy, Catalog, Entitlements, EpisodeId, Error, SeriesAccessView, SeriesId,
    SeriesKind, UserId,
};

/// Sequel state for `entitlements`, or `None` when the catalog has no sequel.
pub(crate) fn sequel_status(catalog: &Catalog, entitlements: &Entitlements) -> Option<SequelStatus> {
    let progress = AccessPolicy::new(catalog).sequel_progress(entitlements)?;
    let sequel = catalog.sequel_series()?;
    let SeriesKind::Sequel { unlock_price, .. } = sequel.kind() else {
        return None;
    };
    Some(SequelStatus {
        locked: progress.is_locked(),
        sequel: progress.sequel,
        watched: progress.watched,
        required: progress.required,
        unlocked_by_payment: progress.unlocked_by_payment,
        unlock_price: *unlock_price,
    })
}

pub(crate) fn no_sequel() -> Error {
    Error::not_found("catalog has no sequel series")
}

/// Catalog query service backed by a user repository and catalog provider.
#[derive(Clone)]
pub struct CatalogService<R: ?Sized> {
    users: Arc<R>,
    catalog: Arc<dyn CatalogProvider>,
}

impl<R: ?Sized> CatalogService<R> {
    pub fn new(users: Arc<R>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { users, catalog }
    }
}

impl<R> CatalogService<R>
where
    R: UserRepository + ?Sized,
{
    async fn entitlements(&self, user: &UserId) -> Result<Entitlements, Error> {
        let user = require_user(self.users.as_ref(), user).await?;
        Ok(user.entitlements().clone())
    }
}

#[async_trait]
impl<R> CatalogQuery for CatalogService<R>
where
    R: UserRepository + ?Sized,
{
    async fn list_series(&self, user: &UserId) -> Result<Vec<SeriesSummary>, Error> {
        let entitlements = self.entitlements(user).await?;
        let catalog = self.catalog.catalog();
        let policy = AccessPolicy::new(&catalog);
        Ok(catalog
            .list_series()
            .iter()
            .map(|series| SeriesSummary {
                id: series.id().clone(),
                title: series.title().to_owned(),
                description: series.description().to_owned(),
                poster_url: series.poster_url().to_owned(),
                sequel: series.is_sequel(),
                total_episodes: series.total_episodes(),
                locked: !policy.is_series_open(&entitlements, series),
            })
            .collect())
    }

    async fn series_access(
        &self,
        user: &UserId,
        series: &SeriesId,
    ) -> Result<SeriesAccessView, Error> {
        let entitlements = self.entitlements(user).await?;
        let catalog = self.catalog.catalog();
        Ok(AccessPolicy::new(&catalog).series_access(&entitlements, series)?)
    }

    async fn episode_access(
        &self,
        user: &UserId,
        episode: EpisodeId,
    ) -> Result<EpisodeAccess, Error> {
        let entitlements = self.entitlements(user).await?;
        let catalog = self.catalog.catalog();
        let policy = AccessPolicy::new(&catalog);
        let location = catalog.locate(episode)?;
        Ok(EpisodeAccess {
            episode,
            series: location.series.id().clone(),
            position: location.episode.position,
            decision: policy.entitlement(&entitlements, episode)?,
            watch: policy.check_watch_access(&entitlements, episode)?,
            download: policy.check_download_access(&entitlements, episode)?,
            series_locked: !policy.is_series_open(&entitlements, location.series),
        })
    }

    async fn sequel_status(&self, user: &UserId) -> Result<SequelStatus, Error> {
        let entitlements = self.entitlements(user).await?;
        let catalog = self.catalog.catalog();
        sequel_status(&catalog, &entitlements).ok_or_else(no_sequel)
    }
}
