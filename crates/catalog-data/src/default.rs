//! The catalog bundled with the crate.

use crate::document::CatalogDocument;
use crate::error::CatalogDataError;
use crate::generator::generate_catalog;
use crate::seed::SeriesSeed;

/// Raw JSON of the bundled catalog.
pub const DEFAULT_CATALOG_JSON: &str = include_str!("../data/catalog.json");

/// Parses the bundled catalog document.
///
/// # Errors
///
/// Returns [`CatalogDataError`] if the bundled JSON is invalid.
pub fn default_document() -> Result<CatalogDocument, CatalogDataError> {
    CatalogDocument::from_json(DEFAULT_CATALOG_JSON)
}

/// Parses and expands the bundled catalog.
///
/// # Errors
///
/// Returns [`CatalogDataError`] if the bundled JSON is invalid.
pub fn default_catalog() -> Result<Vec<SeriesSeed>, CatalogDataError> {
    generate_catalog(&default_document()?)
}
