//! # Error Module
//!
//! Error types shared by every part of the filler. Only configuration and setup
//! problems are errors here: a block that lands out of bounds or on top of
//! another block is an ordinary [`BlockState`](crate::placement::block::BlockState),
//! not a failure.

use thiserror::Error;

use crate::placement::pattern::PatternType;

/// Result type alias for filler operations.
pub type FillerResult<T> = Result<T, FillerError>;

/// Errors that can occur while configuring or preparing a fill.
#[derive(Debug, Error)]
pub enum FillerError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`FillerConfig`](crate::config::FillerConfig).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Grid dimensions or voxel size are not usable.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// A bounding volume is malformed.
    #[error("invalid bounding volume: {0}")]
    InvalidVolume(String),

    /// A pattern template was refused by the library.
    #[error("invalid pattern {0:?}: {1}")]
    InvalidPattern(PatternType, String),

    /// A pattern was requested that was never registered.
    #[error("no pattern registered for {0:?}")]
    PatternNotFound(PatternType),
}

impl FillerError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }

    /// Create an invalid grid error.
    #[must_use]
    pub fn invalid_grid(details: impl Into<String>) -> Self {
        Self::InvalidGrid(details.into())
    }

    /// Create an invalid bounding volume error.
    #[must_use]
    pub fn invalid_volume(details: impl Into<String>) -> Self {
        Self::InvalidVolume(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FillerError::invalid_grid("voxel size must be positive");
        assert!(format!("{err}").contains("voxel size"));

        let err = FillerError::PatternNotFound(PatternType::PatternB);
        assert!(format!("{err}").contains("PatternB"));

        let err = FillerError::invalid_volume("triangle index 9 out of range");
        assert!(format!("{err}").contains("out of range"));
    }
}
