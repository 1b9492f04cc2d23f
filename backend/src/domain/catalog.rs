//! Series and episode catalog model.
//!
//! The catalog is immutable once built. Episodes carry a catalog-wide
//! [`EpisodeId`] for wire compatibility, but every rule that depends on an
//! episode's place in its series goes through the series-scoped
//! [`EpisodeKey`] so that overlapping numeric ranges across series can never
//! be confused.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Validation errors raised while assembling a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogValidationError {
    /// A series id is not a lowercase slug.
    InvalidSeriesId { id: String },
    /// Two series share an id.
    DuplicateSeriesId { id: SeriesId },
    /// Two episodes share an id.
    DuplicateEpisodeId { id: EpisodeId },
    /// No base series exists.
    MissingBaseSeries,
    /// More than one base series exists.
    MultipleBaseSeries,
    /// More than one sequel series exists.
    MultipleSequelSeries,
    /// A sequel requires a series that is not the base series.
    UnknownPrerequisite { series: SeriesId, requires: SeriesId },
    /// The download price is not strictly above the watch price.
    DownloadNotAboveWatch { series: SeriesId },
    /// A price is negative.
    NegativePrice { series: SeriesId },
    /// Episode positions do not run 1..=n in order.
    PositionsOutOfOrder { series: SeriesId },
}

impl fmt::Display for CatalogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSeriesId { id } => {
                write!(f, "series id '{id}' must be a lowercase slug")
            }
            Self::DuplicateSeriesId { id } => write!(f, "series '{id}' is defined twice"),
            Self::DuplicateEpisodeId { id } => write!(f, "episode {id} is defined twice"),
            Self::MissingBaseSeries => write!(f, "catalog must contain a base series"),
            Self::MultipleBaseSeries => write!(f, "catalog must contain exactly one base series"),
            Self::MultipleSequelSeries => {
                write!(f, "catalog must contain at most one sequel series")
            }
            Self::UnknownPrerequisite { series, requires } => write!(
                f,
                "sequel '{series}' requires '{requires}', which is not the base series"
            ),
            Self::DownloadNotAboveWatch { series } => write!(
                f,
                "series '{series}' must price downloads above watching"
            ),
            Self::NegativePrice { series } => {
                write!(f, "series '{series}' has a negative price")
            }
            Self::PositionsOutOfOrder { series } => write!(
                f,
                "series '{series}' episodes must be positioned 1..n in order"
            ),
        }
    }
}

impl std::error::Error for CatalogValidationError {}

/// Lookup failures surfaced to callers as "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLookupError {
    /// No episode with this id exists.
    EpisodeNotFound(EpisodeId),
    /// No series with this id exists.
    SeriesNotFound(SeriesId),
}

impl fmt::Display for CatalogLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EpisodeNotFound(id) => write!(f, "episode {id} not found"),
            Self::SeriesNotFound(id) => write!(f, "series '{id}' not found"),
        }
    }
}

impl std::error::Error for CatalogLookupError {}

static SERIES_ID_RE: OnceLock<Regex> = OnceLock::new();

fn series_id_regex() -> &'static Regex {
    SERIES_ID_RE.get_or_init(|| {
        Regex::new("^[a-z0-9]+(?:-[a-z0-9]+)*$")
            .unwrap_or_else(|error| panic!("series id regex failed to compile: {error}"))
    })
}

/// Slug identifying a series, e.g. `got`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeriesId(String);

impl SeriesId {
    /// Validate and construct a series id.
    pub fn new(id: impl Into<String>) -> Result<Self, CatalogValidationError> {
        let id = id.into();
        if series_id_regex().is_match(&id) {
            Ok(Self(id))
        } else {
            Err(CatalogValidationError::InvalidSeriesId { id })
        }
    }
}

impl AsRef<str> for SeriesId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SeriesId> for String {
    fn from(value: SeriesId) -> Self {
        value.0
    }
}

impl TryFrom<String> for SeriesId {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Catalog-wide episode identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EpisodeId(u32);

impl EpisodeId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Series-scoped episode key: the 1-based position within the series'
/// ordered episode list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeKey {
    /// Owning series.
    pub series: SeriesId,
    /// 1-based position within the series.
    pub position: u32,
}

/// How a series is gated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SeriesKind {
    /// Always visible.
    Base,
    /// Hidden until `requires` is fully watched or the sequel is paid for.
    #[serde(rename_all = "camelCase")]
    Sequel {
        /// The prerequisite series.
        requires: SeriesId,
        /// Price of unlocking the sequel outright.
        #[serde(with = "rust_decimal::serde::str")]
        unlock_price: Decimal,
    },
}

/// Per-series pricing: a free prefix followed by a payable tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    free_threshold: u32,
    #[serde(with = "rust_decimal::serde::str")]
    watch_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    download_price: Decimal,
}

impl PricingPolicy {
    /// Build a pricing policy; downloads must cost strictly more than
    /// watching and neither price may be negative.
    ///
    /// # Examples
    /// ```
    /// use dragonfire::domain::{PricingPolicy, SeriesId};
    /// use rust_decimal::Decimal;
    ///
    /// let series = SeriesId::new("got").expect("slug");
    /// let pricing = PricingPolicy::new(&series, 4, Decimal::new(10, 2), Decimal::new(50, 2))
    ///     .expect("valid pricing");
    /// assert!(pricing.is_free_position(4));
    /// assert!(!pricing.is_free_position(5));
    /// ```
    pub fn new(
        series: &SeriesId,
        free_threshold: u32,
        watch_price: Decimal,
        download_price: Decimal,
    ) -> Result<Self, CatalogValidationError> {
        if watch_price.is_sign_negative() || download_price.is_sign_negative() {
            return Err(CatalogValidationError::NegativePrice {
                series: series.clone(),
            });
        }
        if download_price <= watch_price {
            return Err(CatalogValidationError::DownloadNotAboveWatch {
                series: series.clone(),
            });
        }
        Ok(Self {
            free_threshold,
            watch_price,
            download_price,
        })
    }

    /// Last free position.
    pub fn free_threshold(&self) -> u32 {
        self.free_threshold
    }

    /// Price of unlocking playback of a payable episode.
    pub fn watch_price(&self) -> Decimal {
        self.watch_price
    }

    /// Price of downloading any episode.
    pub fn download_price(&self) -> Decimal {
        self.download_price
    }

    /// Whether `position` falls inside the free prefix.
    pub fn is_free_position(&self, position: u32) -> bool {
        position <= self.free_threshold
    }
}

/// Immutable catalog episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Catalog-wide identifier.
    pub id: EpisodeId,
    /// 1-based position within the owning series.
    pub position: u32,
    /// 1-based season number.
    pub season: u32,
    /// 1-based ordinal within the season.
    pub number: u32,
    /// Display title.
    pub title: String,
    /// Short synopsis.
    pub description: String,
    /// Progressive media URL.
    pub video_url: String,
}

/// Immutable catalog series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    id: SeriesId,
    title: String,
    description: String,
    poster_url: String,
    kind: SeriesKind,
    pricing: PricingPolicy,
    episodes: Vec<Episode>,
}

/// Field bundle for [`Series::new`].
pub struct SeriesDraft {
    pub id: SeriesId,
    pub title: String,
    pub description: String,
    pub poster_url: String,
    pub kind: SeriesKind,
    pub pricing: PricingPolicy,
    pub episodes: Vec<Episode>,
}

impl Series {
    /// Build a series, checking episodes are positioned `1..=n` in order.
    pub fn new(draft: SeriesDraft) -> Result<Self, CatalogValidationError> {
        let in_order = (1_u32..)
            .zip(draft.episodes.iter())
            .all(|(expected, episode)| episode.position == expected);
        if !in_order {
            return Err(CatalogValidationError::PositionsOutOfOrder { series: draft.id });
        }
        Ok(Self {
            id: draft.id,
            title: draft.title,
            description: draft.description,
            poster_url: draft.poster_url,
            kind: draft.kind,
            pricing: draft.pricing,
            episodes: draft.episodes,
        })
    }

    pub fn id(&self) -> &SeriesId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn poster_url(&self) -> &str {
        &self.poster_url
    }

    pub fn kind(&self) -> &SeriesKind {
        &self.kind
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Episodes in playback order.
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Number of episodes in the series.
    pub fn total_episodes(&self) -> usize {
        self.episodes.len()
    }

    /// Whether `episode` belongs to this series.
    pub fn contains(&self, episode: EpisodeId) -> bool {
        self.episodes.iter().any(|candidate| candidate.id == episode)
    }

    /// Episodes grouped by season number, in season order.
    pub fn seasons(&self) -> BTreeMap<u32, Vec<&Episode>> {
        let mut seasons: BTreeMap<u32, Vec<&Episode>> = BTreeMap::new();
        for episode in &self.episodes {
            seasons.entry(episode.season).or_default().push(episode);
        }
        seasons
    }

    /// Whether this is a sequel series.
    pub fn is_sequel(&self) -> bool {
        matches!(self.kind, SeriesKind::Sequel { .. })
    }
}

/// An episode resolved against the catalog.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeLocation<'a> {
    /// Owning series.
    pub series: &'a Series,
    /// The episode itself.
    pub episode: &'a Episode,
}

impl EpisodeLocation<'_> {
    /// Series-scoped key for the episode.
    pub fn key(&self) -> EpisodeKey {
        EpisodeKey {
            series: self.series.id.clone(),
            position: self.episode.position,
        }
    }
}

/// Validated, read-only catalog.
///
/// ## Invariants
/// - Series ids and episode ids are unique.
/// - Exactly one base series; at most one sequel, which requires the base.
#[derive(Debug, Clone)]
pub struct Catalog {
    series: Vec<Series>,
    episode_index: HashMap<EpisodeId, (usize, usize)>,
    base: usize,
    sequel: Option<usize>,
}

impl Catalog {
    /// Assemble and validate a catalog from its series in display order.
    pub fn new(series: Vec<Series>) -> Result<Self, CatalogValidationError> {
        let mut seen_series = HashSet::new();
        let mut episode_index = HashMap::new();
        let mut base = None;
        let mut sequel = None;

        for (series_slot, entry) in series.iter().enumerate() {
            if !seen_series.insert(entry.id.clone()) {
                return Err(CatalogValidationError::DuplicateSeriesId {
                    id: entry.id.clone(),
                });
            }
            for (episode_slot, episode) in entry.episodes.iter().enumerate() {
                if episode_index
                    .insert(episode.id, (series_slot, episode_slot))
                    .is_some()
                {
                    return Err(CatalogValidationError::DuplicateEpisodeId { id: episode.id });
                }
            }
            let slot = match entry.kind {
                SeriesKind::Base => &mut base,
                SeriesKind::Sequel { .. } => &mut sequel,
            };
            if slot.replace(series_slot).is_some() {
                return Err(if entry.is_sequel() {
                    CatalogValidationError::MultipleSequelSeries
                } else {
                    CatalogValidationError::MultipleBaseSeries
                });
            }
        }

        let base = base.ok_or(CatalogValidationError::MissingBaseSeries)?;
        let base_id = series.get(base).map(|entry| &entry.id);
        if let Some(entry) = sequel.and_then(|slot| series.get(slot)) {
            if let SeriesKind::Sequel { requires, .. } = &entry.kind {
                if base_id != Some(requires) {
                    return Err(CatalogValidationError::UnknownPrerequisite {
                        series: entry.id.clone(),
                        requires: requires.clone(),
                    });
                }
            }
        }

        Ok(Self {
            series,
            episode_index,
            base,
            sequel,
        })
    }

    /// All series in display order.
    pub fn list_series(&self) -> &[Series] {
        &self.series
    }

    /// Look up a series by id.
    pub fn series(&self, id: &SeriesId) -> Result<&Series, CatalogLookupError> {
        self.series
            .iter()
            .find(|series| &series.id == id)
            .ok_or_else(|| CatalogLookupError::SeriesNotFound(id.clone()))
    }

    /// Resolve an episode id to its series and series-scoped key.
    pub fn locate(&self, id: EpisodeId) -> Result<EpisodeLocation<'_>, CatalogLookupError> {
        self.episode_index
            .get(&id)
            .and_then(|(series_slot, episode_slot)| {
                let series = self.series.get(*series_slot)?;
                let episode = series.episodes.get(*episode_slot)?;
                Some(EpisodeLocation { series, episode })
            })
            .ok_or(CatalogLookupError::EpisodeNotFound(id))
    }

    /// Whether an episode id exists anywhere in the catalog.
    pub fn contains_episode(&self, id: EpisodeId) -> bool {
        self.episode_index.contains_key(&id)
    }

    /// The always-visible base series.
    pub fn base_series(&self) -> &Series {
        &self.series[self.base]
    }

    /// The gated sequel series, if the catalog has one.
    pub fn sequel_series(&self) -> Option<&Series> {
        self.sequel.and_then(|slot| self.series.get(slot))
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
