//! Access policy engine.
//!
//! Pure functions over the catalog and a user's [`Entitlements`]: which
//! episodes may be watched or downloaded, and whether the sequel series is
//! open. Nothing here performs I/O; mutating operations return the updated
//! entitlements for the caller to persist.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::{
    Catalog, CatalogLookupError, Entitlements, Episode, EpisodeId, Error, Series, SeriesId,
    SeriesKind,
};

/// Outcome of a watch access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WatchAccess {
    /// Playback may start.
    Allowed,
    /// The episode must be bought first.
    RequiresPurchase {
        #[serde(with = "rust_decimal::serde::str")]
        price: Decimal,
    },
}

/// Outcome of a download access check. Downloads always go through a
/// purchase confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DownloadAccess {
    /// Confirm payment of `price` before the download is granted.
    RequiresPurchase {
        #[serde(with = "rust_decimal::serde::str")]
        price: Decimal,
    },
}

/// Derived entitlement state of one episode for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EntitlementDecision {
    /// Inside the series' free prefix.
    Free,
    /// Payable and not yet bought.
    LockedPayable {
        #[serde(with = "rust_decimal::serde::str")]
        price: Decimal,
    },
    /// Payable and already bought.
    UnlockedByPurchase,
}

/// How far a user is towards opening the sequel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequelProgress {
    /// The sequel series.
    pub sequel: SeriesId,
    /// Base-series episodes watched.
    pub watched: usize,
    /// Base-series episodes in the current catalog.
    pub required: usize,
    /// Whether the sequel was paid for.
    pub unlocked_by_payment: bool,
}

impl SequelProgress {
    /// Locked while the base series is unfinished and no payment was made.
    pub fn is_locked(&self) -> bool {
        self.watched < self.required && !self.unlocked_by_payment
    }
}

/// Failures raised by policy views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicyError {
    /// An id did not resolve against the catalog.
    NotFound(CatalogLookupError),
    /// The sequel is requested while still locked.
    SequelLocked { series: SeriesId },
}

impl fmt::Display for AccessPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(err) => err.fmt(f),
            Self::SequelLocked { series } => write!(f, "series '{series}' is locked"),
        }
    }
}

impl std::error::Error for AccessPolicyError {}

impl From<CatalogLookupError> for AccessPolicyError {
    fn from(value: CatalogLookupError) -> Self {
        Self::NotFound(value)
    }
}

impl From<CatalogLookupError> for Error {
    fn from(value: CatalogLookupError) -> Self {
        Error::not_found(value.to_string())
    }
}

impl From<AccessPolicyError> for Error {
    fn from(value: AccessPolicyError) -> Self {
        match value {
            AccessPolicyError::NotFound(err) => err.into(),
            AccessPolicyError::SequelLocked { series } => {
                Error::forbidden(format!("series '{series}' is locked"))
                    .with_details(serde_json::json!({ "code": "sequel_locked", "series": series }))
            }
        }
    }
}

/// One episode as seen by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAccessView {
    pub id: EpisodeId,
    pub position: u32,
    pub season: u32,
    pub number: u32,
    pub title: String,
    pub description: String,
    pub decision: EntitlementDecision,
    #[serde(with = "rust_decimal::serde::str")]
    pub watch_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub download_price: Decimal,
    pub watched: bool,
}

/// Episodes of one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonAccessView {
    pub season: u32,
    pub episodes: Vec<EpisodeAccessView>,
}

/// A series with every episode's access decision, grouped by season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAccessView {
    pub id: SeriesId,
    pub title: String,
    pub description: String,
    pub poster_url: String,
    pub seasons: Vec<SeasonAccessView>,
}

/// Policy engine bound to a catalog.
///
/// # Examples
/// ```
/// use dragonfire::domain::{AccessPolicy, Catalog, Entitlements};
///
/// fn sequel_open(catalog: &Catalog, entitlements: &Entitlements) -> bool {
///     !AccessPolicy::new(catalog).is_sequel_locked(entitlements)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy<'a> {
    catalog: &'a Catalog,
}

impl<'a> AccessPolicy<'a> {
    /// Bind the policy to `catalog`.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Episode is past the free prefix and not purchased.
    pub fn is_locked(
        &self,
        entitlements: &Entitlements,
        episode: EpisodeId,
    ) -> Result<bool, CatalogLookupError> {
        let location = self.catalog.locate(episode)?;
        Ok(Self::locked_in(location.series, location.episode, entitlements))
    }

    fn locked_in(series: &Series, episode: &Episode, entitlements: &Entitlements) -> bool {
        !series.pricing().is_free_position(episode.position) && !entitlements.has_purchased(episode.id)
    }

    /// Whether `episode` may be played, ignoring the sequel gate.
    pub fn check_watch_access(
        &self,
        entitlements: &Entitlements,
        episode: EpisodeId,
    ) -> Result<WatchAccess, CatalogLookupError> {
        let location = self.catalog.locate(episode)?;
        if Self::locked_in(location.series, location.episode, entitlements) {
            Ok(WatchAccess::RequiresPurchase {
                price: location.series.pricing().watch_price(),
            })
        } else {
            Ok(WatchAccess::Allowed)
        }
    }

    /// Downloads always require confirming the series' download price,
    /// whatever the user owns.
    pub fn check_download_access(
        &self,
        _entitlements: &Entitlements,
        episode: EpisodeId,
    ) -> Result<DownloadAccess, CatalogLookupError> {
        let location = self.catalog.locate(episode)?;
        Ok(DownloadAccess::RequiresPurchase {
            price: location.series.pricing().download_price(),
        })
    }

    /// Tri-state decision for display.
    pub fn entitlement(
        &self,
        entitlements: &Entitlements,
        episode: EpisodeId,
    ) -> Result<EntitlementDecision, CatalogLookupError> {
        let location = self.catalog.locate(episode)?;
        Ok(Self::decide(location.series, location.episode, entitlements))
    }

    fn decide(series: &Series, episode: &Episode, entitlements: &Entitlements) -> EntitlementDecision {
        if series.pricing().is_free_position(episode.position) {
            EntitlementDecision::Free
        } else if entitlements.has_purchased(episode.id) {
            EntitlementDecision::UnlockedByPurchase
        } else {
            EntitlementDecision::LockedPayable {
                price: series.pricing().watch_price(),
            }
        }
    }

    /// Add `episode` to the purchased set.
    pub fn record_purchase(
        &self,
        entitlements: &Entitlements,
        episode: EpisodeId,
    ) -> Result<Entitlements, CatalogLookupError> {
        self.catalog.locate(episode)?;
        Ok(entitlements.clone().with_purchased(episode))
    }

    /// Add `episode` to the watched set.
    pub fn record_watched(
        &self,
        entitlements: &Entitlements,
        episode: EpisodeId,
    ) -> Result<Entitlements, CatalogLookupError> {
        self.catalog.locate(episode)?;
        Ok(entitlements.clone().with_watched(episode))
    }

    /// Progress towards the sequel, or `None` when the catalog has none.
    ///
    /// Recomputed from the current catalog on every call, so shrinking the
    /// prerequisite series changes the outcome immediately.
    pub fn sequel_progress(&self, entitlements: &Entitlements) -> Option<SequelProgress> {
        let sequel = self.catalog.sequel_series()?;
        let SeriesKind::Sequel { requires, .. } = sequel.kind() else {
            return None;
        };
        let prerequisite = self.catalog.series(requires).ok()?;
        let watched = entitlements
            .watched()
            .iter()
            .filter(|id| prerequisite.contains(**id))
            .count();
        Some(SequelProgress {
            sequel: sequel.id().clone(),
            watched,
            required: prerequisite.total_episodes(),
            unlocked_by_payment: entitlements.sequel_unlocked(),
        })
    }

    /// Whether the sequel is still closed to this user.
    pub fn is_sequel_locked(&self, entitlements: &Entitlements) -> bool {
        self.sequel_progress(entitlements)
            .is_some_and(|progress| progress.is_locked())
    }

    /// Open the sequel regardless of watch progress.
    pub fn unlock_sequel_by_payment(&self, entitlements: &Entitlements) -> Entitlements {
        entitlements.clone().with_sequel_unlocked()
    }

    /// Whether `series` is visible: base series always, sequel once open.
    pub fn is_series_open(&self, entitlements: &Entitlements, series: &Series) -> bool {
        !series.is_sequel() || !self.is_sequel_locked(entitlements)
    }

    /// Every episode of `series_id` with its decision, grouped by season.
    pub fn series_access(
        &self,
        entitlements: &Entitlements,
        series_id: &SeriesId,
    ) -> Result<SeriesAccessView, AccessPolicyError> {
        let series = self.catalog.series(series_id)?;
        if !self.is_series_open(entitlements, series) {
            return Err(AccessPolicyError::SequelLocked {
                series: series.id().clone(),
            });
        }

        let pricing = series.pricing();
        let seasons = series
            .seasons()
            .into_iter()
            .map(|(season, episodes)| SeasonAccessView {
                season,
                episodes: episodes
                    .into_iter()
                    .map(|episode| EpisodeAccessView {
                        id: episode.id,
                        position: episode.position,
                        season: episode.season,
                        number: episode.number,
                        title: episode.title.clone(),
                        description: episode.description.clone(),
                        decision: Self::decide(series, episode, entitlements),
                        watch_price: pricing.watch_price(),
                        download_price: pricing.download_price(),
                        watched: entitlements.has_watched(episode.id),
                    })
                    .collect(),
            })
            .collect();

        Ok(SeriesAccessView {
            id: series.id().clone(),
            title: series.title().to_owned(),
            description: series.description().to_owned(),
            poster_url: series.poster_url().to_owned(),
            seasons,
        })
    }
}

#[cfg(test)]
mod tests;
