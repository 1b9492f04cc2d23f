//! Catalog document types and JSON parsing.

use std::collections::BTreeSet;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CatalogDataError;

/// Current supported document version.
const SUPPORTED_VERSION: u32 = 1;

/// How a series relates to the rest of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SeriesKindDefinition {
    /// A series that is always visible.
    Base,
    /// A series gated behind completion of, or payment for, another series.
    #[serde(rename_all = "camelCase")]
    Sequel {
        /// Identifier of the series that must be completed first.
        requires: String,
        /// Price of unlocking the sequel without completing `requires`.
        #[serde(with = "rust_decimal::serde::str")]
        unlock_price: Decimal,
    },
}

/// Pricing rules applied to every episode of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDefinition {
    /// Episodes at or below this one-based position are free to watch.
    pub free_threshold: u32,
    /// Price of unlocking playback of a payable episode.
    #[serde(with = "rust_decimal::serde::str")]
    pub watch_price: Decimal,
    /// Price of downloading any episode.
    #[serde(with = "rust_decimal::serde::str")]
    pub download_price: Decimal,
}

/// A single series entry in the catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDefinition {
    /// Slug identifying the series.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short synopsis.
    pub description: String,
    /// Poster image URL.
    pub poster_url: String,
    /// Relationship to other series.
    pub kind: SeriesKindDefinition,
    /// Number of episodes in each season, in season order.
    pub season_lengths: Vec<u32>,
    /// Pricing rules.
    pub pricing: PricingDefinition,
    /// Template for episode video URLs; `{id}`, `{season}` and `{episode}`
    /// are substituted per episode.
    pub video_url_template: String,
}

/// A parsed and structurally validated catalog document.
///
/// # Example
///
/// ```
/// use catalog_data::CatalogDocument;
///
/// let document = CatalogDocument::from_json(catalog_data::DEFAULT_CATALOG_JSON)
///     .expect("bundled catalog parses");
/// assert_eq!(document.series().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    version: u32,
    series: Vec<SeriesDefinition>,
}

impl CatalogDocument {
    /// Parses a catalog document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDataError`] if the JSON is malformed, the version is
    /// unsupported, or the series list is structurally invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogDataError> {
        let document: Self =
            serde_json::from_str(json).map_err(|err| CatalogDataError::ParseError {
                message: err.to_string(),
            })?;
        document.validate()?;
        Ok(document)
    }

    /// Loads a catalog document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDataError::IoError`] if the file cannot be read, and
    /// the errors of [`CatalogDocument::from_json`] otherwise.
    pub fn from_file(path: &Utf8Path) -> Result<Self, CatalogDataError> {
        let io_error = |message: String| CatalogDataError::IoError {
            path: path.to_path_buf(),
            message,
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| io_error("catalog path must name a file".to_owned()))?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|err| io_error(err.to_string()))?;
        let contents = dir
            .read_to_string(file_name)
            .map_err(|err| io_error(err.to_string()))?;

        Self::from_json(&contents)
    }

    /// Document format version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Series definitions in catalog order.
    #[must_use]
    pub fn series(&self) -> &[SeriesDefinition] {
        &self.series
    }

    fn validate(&self) -> Result<(), CatalogDataError> {
        if self.version != SUPPORTED_VERSION {
            return Err(CatalogDataError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: self.version,
            });
        }
        if self.series.is_empty() {
            return Err(CatalogDataError::EmptySeries);
        }

        let mut seen = BTreeSet::new();
        for definition in &self.series {
            if !seen.insert(definition.id.as_str()) {
                return Err(CatalogDataError::DuplicateSeriesId {
                    id: definition.id.clone(),
                });
            }
            if definition.season_lengths.is_empty() {
                return Err(CatalogDataError::EmptySeasonLengths {
                    series: definition.id.clone(),
                });
            }
            if let Some((season, _)) = (1_u32..)
                .zip(definition.season_lengths.iter())
                .find(|(_, length)| **length == 0)
            {
                return Err(CatalogDataError::EmptySeason {
                    series: definition.id.clone(),
                    season,
                });
            }
        }
        Ok(())
    }
}
