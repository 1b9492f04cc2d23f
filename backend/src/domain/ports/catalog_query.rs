//! Driving port for catalog browsing with per-user access decisions.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    DownloadAccess, EntitlementDecision, EpisodeId, Error, SeriesAccessView, SeriesId, UserId,
    WatchAccess,
};

/// Catalog entry for the series list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub id: SeriesId,
    pub title: String,
    pub description: String,
    pub poster_url: String,
    pub sequel: bool,
    pub total_episodes: usize,
    /// Whether the series is currently closed to the user.
    pub locked: bool,
}

/// Access decisions for one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAccess {
    pub episode: EpisodeId,
    pub series: SeriesId,
    pub position: u32,
    pub decision: EntitlementDecision,
    pub watch: WatchAccess,
    pub download: DownloadAccess,
    /// The owning series is a sequel that is still locked.
    pub series_locked: bool,
}

/// Sequel unlock state for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequelStatus {
    pub sequel: SeriesId,
    pub locked: bool,
    pub watched: usize,
    pub required: usize,
    pub unlocked_by_payment: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub unlock_price: Decimal,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Every series with its lock state for `user`.
    async fn list_series(&self, user: &UserId) -> Result<Vec<SeriesSummary>, Error>;

    /// Episode-level decisions for one series, grouped by season.
    async fn series_access(&self, user: &UserId, series: &SeriesId)
    -> Result<SeriesAccessView, Error>;

    /// Decisions for one episode.
    async fn episode_access(&self, user: &UserId, episode: EpisodeId)
    -> Result<EpisodeAccess, Error>;

    /// Progress towards the sequel.
    async fn sequel_status(&self, user: &UserId) -> Result<SequelStatus, Error>;
}
