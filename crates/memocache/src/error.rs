//! Error types for memocache

use std::fmt;

/// Result type alias for memocache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
///
/// Lookups and calls never fail; the only fallible operation is the
/// consistency walk performed by `check_invariants`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Recency list and key index disagree
    Invariant(String),
}

impl Error {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Invariant(msg) => write!(f, "Invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invariant("index has 3 keys, list has 2");
        assert_eq!(
            err.to_string(),
            "Invariant violated: index has 3 keys, list has 2"
        );
    }
}
