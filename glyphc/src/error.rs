//! Error handling for the glyphc CLI.
//!
//! Mirrors the teacher CLI's narrow-library/broad-binary error split: the
//! reader crate has one error kind ([`glyph_util::ReaderError`]); this binary
//! wraps it alongside the CLI-level failures (file I/O, config parsing) it
//! alone is responsible for.

use thiserror::Error;

/// Top-level error type for the glyphc CLI application.
#[derive(Error, Debug)]
pub enum GlyphcError {
    /// Error when a required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source file failed to read as valid Glyph forms.
    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: glyph_util::ReaderError,
    },

    /// Error when IO operations fail.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when TOML config parsing fails.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias using `GlyphcError`.
pub type Result<T> = std::result::Result<T, GlyphcError>;
