//! Series catalog documents and deterministic episode generation.
//!
//! The catalog is described by a small versioned JSON document listing each
//! series, its per-season episode counts, and its pricing. Episodes are not
//! listed individually; they are generated in document order so that every
//! episode receives a globally unique, stable identifier. The crate is kept
//! independent of backend domain types so the backend can validate the seeds
//! into its own model.
//!
//! # Example
//!
//! ```
//! use catalog_data::{CatalogDocument, generate_catalog};
//!
//! let json = r#"{
//!     "version": 1,
//!     "series": [{
//!         "id": "pilot",
//!         "title": "Pilot",
//!         "description": "A short run.",
//!         "posterUrl": "https://example.invalid/pilot.jpg",
//!         "kind": { "type": "base" },
//!         "seasonLengths": [2, 1],
//!         "pricing": { "freeThreshold": 1, "watchPrice": "0.10", "downloadPrice": "0.50" },
//!         "videoUrlTemplate": "https://example.invalid/{id}.mp4"
//!     }]
//! }"#;
//!
//! let document = CatalogDocument::from_json(json).expect("valid document");
//! let series = generate_catalog(&document).expect("generation succeeds");
//!
//! assert_eq!(series[0].episodes.len(), 3);
//! assert_eq!(series[0].episodes[2].season, 2);
//! ```

mod default;
mod document;
mod error;
mod generator;
mod seed;

pub use default::{DEFAULT_CATALOG_JSON, default_catalog, default_document};
pub use document::{CatalogDocument, PricingDefinition, SeriesDefinition, SeriesKindDefinition};
pub use error::CatalogDataError;
pub use generator::generate_catalog;
pub use seed::{EpisodeSeed, PricingSeed, SeriesKindSeed, SeriesSeed};
