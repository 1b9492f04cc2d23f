//! Port supplying the read-only catalog.

use std::sync::Arc;

use crate::domain::{Catalog, CatalogLookupError, Series, SeriesId};

/// Source of the current catalog. Implementations hand out a shared,
/// immutable snapshot; no synchronisation is needed to read it.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogProvider: Send + Sync {
    /// Current catalog snapshot.
    fn catalog(&self) -> Arc<Catalog>;
}

/// Series in display order.
pub fn list_series(provider: &dyn CatalogProvider) -> Vec<Series> {
    provider.catalog().list_series().to_vec()
}

/// One series by id.
pub fn series_by_id(
    provider: &dyn CatalogProvider,
    id: &SeriesId,
) -> Result<Series, CatalogLookupError> {
    provider.catalog().series(id).cloned()
}

/// Provider over a fixed catalog.
#[derive(Debug, Clone)]
pub struct FixtureCatalogProvider {
    catalog: Arc<Catalog>,
}

impl FixtureCatalogProvider {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl CatalogProvider for FixtureCatalogProvider {
    fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }
}
