// Copyright 2025 Qcolorize (https://github.com/qcolorize)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Colorizer error types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for colorizer operations
pub type ColorizeResult<T> = Result<T, ColorizeError>;

/// Errors surfaced by the colorizer facade and capability implementations
#[derive(Debug, Error)]
pub enum ColorizeError {
    /// A required filesystem path (configuration document or phrase index)
    /// does not exist
    #[error("No such file or directory: {path}")]
    MissingFile {
        /// The absent path
        path: PathBuf,
    },

    /// An operation requiring a configured (or ready) colorizer was invoked
    /// too early
    #[error("Colorizer is not configured")]
    NotConfigured,

    /// Configuration document failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input text contains content the classification engine cannot process
    #[error("Unsupported text: {0}")]
    UnsupportedText(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ColorizeError {
    /// Build a [`ColorizeError::MissingFile`] for the given path.
    pub fn missing_file(path: impl AsRef<Path>) -> Self {
        Self::MissingFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Whether this is a classification-content error.
    ///
    /// Content errors are the only kind the degrading markup policy may
    /// suppress; filesystem and state-precondition errors always surface.
    pub fn is_content_error(&self) -> bool {
        matches!(self, Self::UnsupportedText(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_message() {
        let err = ColorizeError::missing_file("/tmp/absent.xml");
        assert_eq!(err.to_string(), "No such file or directory: /tmp/absent.xml");
    }

    #[test]
    fn test_only_unsupported_text_is_content_error() {
        assert!(ColorizeError::UnsupportedText("cjk".into()).is_content_error());
        assert!(!ColorizeError::NotConfigured.is_content_error());
        assert!(!ColorizeError::missing_file("x").is_content_error());
        assert!(!ColorizeError::InvalidConfig("bad".into()).is_content_error());
    }
}
