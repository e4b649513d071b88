//! Error types for loading documents and building the route table.
//!
//! Everything here is a startup failure. Once the route table is built,
//! request handling never produces an `Error`; it always answers with a
//! response.

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML/JSON decoding error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Structurally malformed API specification
    #[error("Invalid specification: {0}")]
    Spec(#[from] SpecError),

    /// Invalid override configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Structural problems found while walking a specification document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    /// The top level has no `paths` key
    #[error("document has no `paths` mapping")]
    MissingPaths,

    /// A value that must be a mapping is something else
    #[error("expected a mapping at {location}")]
    NotAMapping { location: String },

    /// A path key that is empty, not a string, or not rooted at `/`
    #[error("invalid path {path:?}: paths must be non-empty and start with '/'")]
    InvalidPath { path: String },

    /// An operation key that is not a valid HTTP method token
    #[error("invalid method {method:?} under path {path}")]
    InvalidMethod { path: String, method: String },

    /// The same method declared twice for a path (e.g. `get` and `GET`)
    #[error("duplicate route {method} {path}")]
    DuplicateRoute { path: String, method: String },
}

impl SpecError {
    pub(crate) fn not_a_mapping<S: Into<String>>(location: S) -> Self {
        Self::NotAMapping {
            location: location.into(),
        }
    }
}
