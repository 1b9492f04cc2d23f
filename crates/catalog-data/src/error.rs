//! Error types for catalog document parsing and episode generation.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while loading a catalog document or generating its
/// episodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogDataError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file at '{path}': {message}")]
    IoError {
        /// Path to the catalog file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The catalog JSON is malformed or missing required fields.
    #[error("invalid catalog JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The catalog document version is not supported.
    #[error("unsupported catalog version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the document.
        actual: u32,
    },

    /// The document lists no series.
    #[error("catalog contains no series")]
    EmptySeries,

    /// Two series share the same identifier.
    #[error("series '{id}' is defined more than once")]
    DuplicateSeriesId {
        /// The repeated series identifier.
        id: String,
    },

    /// A series lists no seasons.
    #[error("series '{series}' has no seasons")]
    EmptySeasonLengths {
        /// Identifier of the offending series.
        series: String,
    },

    /// A season declares zero episodes.
    #[error("series '{series}' season {season} has no episodes")]
    EmptySeason {
        /// Identifier of the offending series.
        series: String,
        /// One-based season number.
        season: u32,
    },

    /// Episode identifiers ran past `u32::MAX`.
    #[error("episode identifiers overflowed while generating '{series}'")]
    IdOverflow {
        /// Identifier of the series being generated.
        series: String,
    },
}
