//! Catalog provider backed by the `catalog-data` document.
//!
//! The document is generated into seeds once at startup and validated into
//! a domain [`Catalog`]; the result is shared read-only.

use std::sync::Arc;

use camino::Utf8Path;
use catalog_data::{CatalogDocument, EpisodeSeed, SeriesKindSeed, SeriesSeed, generate_catalog};
use tracing::info;

use crate::domain::ports::CatalogProvider;
use crate::domain::{
    Catalog, CatalogValidationError, Episode, EpisodeId, PricingPolicy, Series, SeriesDraft,
    SeriesId, SeriesKind,
};

/// Failures while building the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogLoadError {
    /// The document could not be read or generated.
    #[error("catalog document error: {0}")]
    Document(#[from] catalog_data::CatalogDataError),
    /// Generated seeds violate a catalog invariant.
    #[error("catalog validation error: {0}")]
    Validation(#[from] CatalogValidationError),
}

/// Immutable catalog shared across requests.
#[derive(Debug, Clone)]
pub struct StaticCatalogProvider {
    catalog: Arc<Catalog>,
}

impl StaticCatalogProvider {
    /// Use the catalog bundled with the binary.
    pub fn bundled() -> Result<Self, CatalogLoadError> {
        let document = catalog_data::default_document()?;
        Self::from_document(&document)
    }

    /// Load a catalog document from disk.
    pub fn from_path(path: &Utf8Path) -> Result<Self, CatalogLoadError> {
        let document = CatalogDocument::from_file(path)?;
        info!(path = %path, "loading catalog override");
        Self::from_document(&document)
    }

    pub fn from_document(document: &CatalogDocument) -> Result<Self, CatalogLoadError> {
        let seeds = generate_catalog(document)?;
        let catalog = catalog_from_seeds(seeds)?;
        info!(
            series = catalog.list_series().len(),
            base_episodes = catalog.base_series().total_episodes(),
            "catalog loaded"
        );
        Ok(Self::new(catalog))
    }

    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }
}

/// Validate generated seeds into a domain catalog.
pub fn catalog_from_seeds(seeds: Vec<SeriesSeed>) -> Result<Catalog, CatalogValidationError> {
    let series = seeds
        .into_iter()
        .map(series_from_seed)
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::new(series)
}

fn series_from_seed(seed: SeriesSeed) -> Result<Series, CatalogValidationError> {
    let id = SeriesId::new(seed.id)?;
    let kind = match seed.kind {
        SeriesKindSeed::Base => SeriesKind::Base,
        SeriesKindSeed::Sequel {
            requires,
            unlock_price,
        } => SeriesKind::Sequel {
            requires: SeriesId::new(requires)?,
            unlock_price,
        },
    };
    let pricing = PricingPolicy::new(
        &id,
        seed.pricing.free_threshold,
        seed.pricing.watch_price,
        seed.pricing.download_price,
    )?;
    Series::new(SeriesDraft {
        id,
        title: seed.title,
        description: seed.description,
        poster_url: seed.poster_url,
        kind,
        pricing,
        episodes: seed.episodes.into_iter().map(episode_from_seed).collect(),
    })
}

fn episode_from_seed(seed: EpisodeSeed) -> Episode {
    Episode {
        id: EpisodeId::new(seed.id),
        position: seed.position,
        season: seed.season,
        number: seed.number,
        title: seed.title,
        description: seed.description,
        video_url: seed.video_url,
    }
}
