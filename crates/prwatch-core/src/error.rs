//! Unified error type for prwatch.
//!
//! Library code that strings many fallible steps together returns
//! `anyhow::Result` with context attached; [`PrError`] is used where callers
//! need to tell failure kinds apart (bad dates, config files, rendering).

use thiserror::Error;

/// Error type shared by the prwatch crates.
#[derive(Error, Debug)]
pub enum PrError {
    /// I/O errors (file access, directory creation)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed dates or numeric cells
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data frame construction, reading or writing
    #[error("Frame error: {0}")]
    Frame(String),

    /// Chart drawing or image encoding
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration file problems
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using PrError.
pub type PrResult<T> = Result<T, PrError>;
