//! Error types for Ankyra core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Ankyra core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The image name is empty or too short to form a repository name.
    #[error("missing valid app name: '{name}'")]
    InvalidImageName {
        /// The offending image name, after tag trimming.
        name: String,
    },

    /// The requirements file could not be read.
    #[error("failed to read requirements from {path}: {source}")]
    RequirementsRead {
        /// Path to the requirements file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The requirements file could not be parsed.
    #[error("failed to parse requirements from {path}: {source}")]
    RequirementsParse {
        /// Path to the requirements file.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// No requirements file was found for the pipeline.
    #[error("no pipeline requirements found searching upwards from {start}")]
    RequirementsNotFound {
        /// Directory the search started from.
        start: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_image_name() {
        let err = Error::InvalidImageName {
            name: "ab".to_string(),
        };
        assert_eq!(err.to_string(), "missing valid app name: 'ab'");
    }

    #[test]
    fn test_error_display_requirements_not_found() {
        let err = Error::RequirementsNotFound {
            start: PathBuf::from("/tmp/build"),
        };
        assert!(err.to_string().contains("/tmp/build"));
    }
}
