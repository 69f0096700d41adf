//! Fatal error type for the generation pipeline.
//!
//! Modeling problems never surface here; they accumulate as warnings and
//! diagnostics on the built model. Only structural input failures abort.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum Error {
    /// A required input file is absent from the dataset directory
    #[error("missing required input file: {0}")]
    MissingInput(PathBuf),

    /// An input or output file could not be read or written
    #[error("i/o failure on {path}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// An input file failed schema validation
    #[error("failed to parse {path}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The dataset contains no sections to schedule
    #[error("dataset contains no sections")]
    NoSections,

    /// A section references a semester with no calendar window
    #[error("no semester window found for semester '{0}'")]
    MissingSemesterWindow(String),
}
