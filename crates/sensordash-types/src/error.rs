//! Error types for sensordash-types.

use thiserror::Error;

/// Errors that can occur when interpreting sensor metadata.
///
/// Malformed reading fields are never reported through this type: the
/// record parser degrades them to sentinel values instead.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The label does not name a tracked sensor kind.
    #[error("Unknown sensor kind: {0}")]
    UnknownKind(String),
}

/// Result type alias using sensordash-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
