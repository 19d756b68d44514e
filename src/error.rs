//! Error types for the classification pipeline and its collaborators.

use std::path::PathBuf;

/// Result type alias
pub type Result<T> = std::result::Result<T, MccError>;

/// Errors raised while validating, classifying, or storing point sets.
#[derive(Debug, thiserror::Error)]
pub enum MccError {
    /// Input collection does not exist in the store
    #[error("point collection <{0}> not found")]
    NotFound(String),

    /// Input collection exists but holds no points
    #[error("point collection <{0}> does not contain points")]
    EmptyInput(String),

    /// A parameter is outside its accepted range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as exposed on the command line
        name: &'static str,
        /// Human readable constraint that was violated
        reason: String,
    },

    /// The surface could not be fitted to the candidate set
    #[error("interpolation failed: {0}")]
    Interpolation(String),

    /// The outlier filter did not partition its input exactly
    #[error(
        "outlier filter lost or duplicated points: {expected} in, {outliers} outliers + {inliers} inliers out"
    )]
    PartitionMismatch {
        /// Points handed to the filter
        expected: usize,
        /// Points returned as outliers
        outliers: usize,
        /// Points returned as inliers
        inliers: usize,
    },

    /// Output collection already exists and overwriting was not requested
    #[error("output collection <{0}> already exists (use overwrite)")]
    OutputExists(String),

    /// Malformed point record in a text file
    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        /// File being read
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// Configuration file could not be used
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MccError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for failures detected before any work was done.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::EmptyInput(_)
                | Self::InvalidParameter { .. }
                | Self::OutputExists(_)
        )
    }
}
