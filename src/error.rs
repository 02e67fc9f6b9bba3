//! Error types for htmldoc library.
//!
//! Document content never produces an error: unknown tags, unmapped style
//! properties and overflowing tables all degrade to safe defaults. The
//! variants below cover configuration misuse and adapter failures.

use std::io;
use thiserror::Error;

/// Result type alias for htmldoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while configuring or running a pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A tag handler or default style was registered under an unusable tag name.
    #[error("Invalid tag name: {0:?}")]
    InvalidTagName(String),

    /// A style mapper or style meta entry was registered under an unusable property name.
    #[error("Invalid style property: {0:?}")]
    InvalidProperty(String),

    /// No adapter is registered for the requested output format.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
