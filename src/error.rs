//! Error types for glyph-canvas operations.

use std::io;
use thiserror::Error;

use crate::scene::ShapeId;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in glyph-canvas operations.
///
/// Writes that fall outside the grid are deliberately absent: the canvas
/// recovers from them locally and never reports them.
#[derive(Error, Debug)]
pub enum Error {
    /// The primitive is not attached to a live scene, so there is no sink to
    /// draw through. Attach it (again) before issuing further operations.
    #[error("no sink reachable: shape {id} is not attached to a live scene")]
    Detached {
        /// Identifier of the shape the operation targeted.
        id: ShapeId,
    },

    /// A polygon needs at least one vertex.
    #[error("polygon requires at least one vertex")]
    EmptyPolygon,

    /// I/O error (sink writes, worker spawn).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },
}
