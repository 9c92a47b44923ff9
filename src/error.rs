//! Error types for the demand estimation pipeline.

use thiserror::Error;

/// Errors that abort a pipeline stage.
///
/// Per-building degraded conditions (missing attributes, buildings outside every tract,
/// too few reference heights) never surface here; they resolve to documented defaults.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or incomplete configuration handed to a stage.
    #[error("[{stage}] invalid configuration: {message}")]
    Configuration {
        /// Stage that rejected the configuration.
        stage: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Provider data could not be read or parsed.
    #[error("[{source_name}] external data failure: {message}")]
    External {
        /// Provider or file the data came from.
        source_name: String,
        /// Reason for failure.
        message: String,
    },

    /// A geometry could not be processed.
    #[error("[{stage}] geometry error on {entity}: {message}")]
    Geometry {
        /// Stage that hit the geometry.
        stage: &'static str,
        /// Offending building or tract id.
        entity: String,
        /// Reason for failure.
        message: String,
    },

    /// Coordinate reprojection failed.
    #[error("projection error: {0}")]
    Projection(String),

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tabular data error.
    #[error("table error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Shapefile decoding error.
    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),
}

impl Error {
    pub(crate) fn config(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration { stage, message: message.into() }
    }

    pub(crate) fn external(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::External { source_name: source_name.into(), message: message.into() }
    }

    /// Attach the offending entity to a failure that happened while processing its geometry.
    pub(crate) fn geometry(stage: &'static str, entity: impl Into<String>, cause: Error) -> Self {
        Self::Geometry { stage, entity: entity.into(), message: cause.to_string() }
    }

    /// True for failures of provider data, as opposed to configuration mistakes.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::External { .. } | Self::Io(_) | Self::Json(_) | Self::Polars(_) | Self::Shapefile(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
