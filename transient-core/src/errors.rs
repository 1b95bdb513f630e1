//! Error types for transient candidate vetting.
//!
//! A single error type, [`VettingError`], covers every failure the pipeline can
//! encounter. Only two of its variants are ever allowed to reach a per-candidate
//! decision, and both are absorbed before they do: an unavailable catalog
//! degrades to an empty result set, and a missing measurement degrades to NaN.
//! Everything else is fatal before the first candidate is evaluated.
//!
//! # Error Categories
//!
//! | Variant | Use Case | Recoverable? |
//! |---------|----------|--------------|
//! | [`CatalogUnavailable`](VettingError::CatalogUnavailable) | Transport failure, HTTP error, malformed VOTable | Yes |
//! | [`MissingMeasurement`](VettingError::MissingMeasurement) | Absent, null or non-numeric catalog field | Yes |
//! | [`ConfigurationError`](VettingError::ConfigurationError) | Bad catalog mapping, invalid threshold, pool setup | No |
//! | [`InputError`](VettingError::InputError) | Unreadable or malformed candidate file | No |
//! | [`InvalidPosition`](VettingError::InvalidPosition) | Non-finite RA, Dec outside [-90°, +90°] | No |

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VettingError {
    /// Catalog query failed in transport or returned a response that does not
    /// match the configured schema.
    #[error("Catalog {catalog} unavailable: {message}")]
    CatalogUnavailable { catalog: String, message: String },

    /// A catalog column is absent, null or non-numeric in a row. Raised by
    /// `CatalogRow::measurement` and absorbed by the classifiers as NaN.
    #[error("Missing measurement {field}")]
    MissingMeasurement { field: String },

    /// Invalid startup configuration. Raised before any candidate is evaluated.
    #[error("Configuration error in {context}: {message}")]
    ConfigurationError { context: String, message: String },

    /// Candidate input could not be read or parsed.
    #[error("Input error ({source_name}): {message}")]
    InputError {
        source_name: String,
        message: String,
    },

    #[error("Invalid sky position RA={ra}, Dec={dec}")]
    InvalidPosition { ra: f64, dec: f64 },
}

/// Convenience alias for `Result<T, VettingError>`.
pub type VettingResult<T> = Result<T, VettingError>;

impl VettingError {
    /// Creates a [`CatalogUnavailable`](Self::CatalogUnavailable) error.
    pub fn catalog_unavailable(catalog: &str, reason: &str) -> Self {
        Self::CatalogUnavailable {
            catalog: catalog.to_string(),
            message: reason.to_string(),
        }
    }

    /// Creates a [`MissingMeasurement`](Self::MissingMeasurement) error.
    pub fn missing_measurement(field: &str) -> Self {
        Self::MissingMeasurement {
            field: field.to_string(),
        }
    }

    /// Creates a [`ConfigurationError`](Self::ConfigurationError).
    pub fn configuration(context: &str, reason: &str) -> Self {
        Self::ConfigurationError {
            context: context.to_string(),
            message: reason.to_string(),
        }
    }

    /// Creates an [`InputError`](Self::InputError).
    pub fn input(source_name: &str, reason: &str) -> Self {
        Self::InputError {
            source_name: source_name.to_string(),
            message: reason.to_string(),
        }
    }

    /// Returns `true` if the pipeline absorbs this error instead of aborting.
    ///
    /// Catalog outages become empty result sets and missing measurements
    /// become NaN; neither is ever surfaced as a candidate-level failure.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::CatalogUnavailable { .. } | Self::MissingMeasurement { .. } => true,
            _ => false,
        }
    }
}
