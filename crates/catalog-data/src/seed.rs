//! Generated catalog seed types.
//!
//! These types are the output of episode generation. They deliberately mirror
//! the backend catalog model without depending on it, so the backend converts
//! them into validated domain values at the point of use.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Relationship between a generated series and the rest of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SeriesKindSeed {
    /// Always visible.
    Base,
    /// Gated behind another series.
    #[serde(rename_all = "camelCase")]
    Sequel {
        /// Identifier of the prerequisite series.
        requires: String,
        /// Price of unlocking without completing the prerequisite.
        #[serde(with = "rust_decimal::serde::str")]
        unlock_price: Decimal,
    },
}

/// Pricing rules for a generated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSeed {
    /// Last free one-based position within the series.
    pub free_threshold: u32,
    /// Watch unlock price.
    #[serde(with = "rust_decimal::serde::str")]
    pub watch_price: Decimal,
    /// Download price.
    #[serde(with = "rust_decimal::serde::str")]
    pub download_price: Decimal,
}

/// A generated episode.
///
/// # Example
///
/// ```
/// use catalog_data::EpisodeSeed;
///
/// let episode = EpisodeSeed {
///     id: 12,
///     position: 12,
///     season: 2,
///     number: 2,
///     title: "Season 2, Episode 2".to_owned(),
///     description: "Episode 2 of season 2 of Pilot.".to_owned(),
///     video_url: "https://example.invalid/s2e2.mp4".to_owned(),
/// };
///
/// assert_eq!(episode.season, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSeed {
    /// Catalog-wide unique identifier.
    pub id: u32,
    /// One-based position within the series.
    pub position: u32,
    /// One-based season number.
    pub season: u32,
    /// One-based episode number within the season.
    pub number: u32,
    /// Display title.
    pub title: String,
    /// Short synopsis.
    pub description: String,
    /// Resolved video URL.
    pub video_url: String,
}

/// A generated series with its episodes in playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSeed {
    /// Slug identifying the series.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short synopsis.
    pub description: String,
    /// Poster image URL.
    pub poster_url: String,
    /// Relationship to other series.
    pub kind: SeriesKindSeed,
    /// Pricing rules.
    pub pricing: PricingSeed,
    /// Episodes in playback order.
    pub episodes: Vec<EpisodeSeed>,
}
