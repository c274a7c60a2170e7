//! Error taxonomy.
//!
//! Each of these is handled at the boundary nearest its origin (loader,
//! resolver, score persistence, session) and turned into a display message.
//! None of them should reach the top level as a fault.

use thiserror::Error;

use crate::model::Category;

/// A data source could not be fetched or decoded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be reached at all.
    #[error("source unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {location}")]
    Status { status: u16, location: String },

    /// The fetch did not complete within the configured timeout.
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// The payload was valid JSON but not an array of records.
    #[error("expected a JSON array, found {0}")]
    NotAnArray(&'static str),

    /// The payload was not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(String),
}

/// The repository holds zero items for the requested category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no items available for {0}")]
pub struct NoItemsAvailable(pub Category);

/// A record's mood/tense metadata does not yield a confident classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot classify mood {mood:?} / tense {tense:?}")]
pub struct Unclassifiable {
    pub mood: String,
    pub tense: String,
}

/// An answer cannot be graded because the item lacks an expected value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    #[error("item cannot be graded: {0}")]
    Ungradable(String),
}

/// The persisted score snapshot failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("corrupt score snapshot: {0}")]
pub struct CorruptPersistedState(pub String);

impl LoadError {
    /// Short kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Unreachable(_) => "unreachable",
            LoadError::Status { .. } => "status",
            LoadError::Timeout(_) => "timeout",
            LoadError::NotAnArray(_) => "not-an-array",
            LoadError::Parse(_) => "parse",
            LoadError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = LoadError::Status {
            status: 404,
            location: "./data/bv.json".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404 fetching ./data/bv.json");
        assert_eq!(err.kind(), "status");

        let err = NoItemsAvailable(Category::Spelling);
        assert_eq!(err.to_string(), "no items available for bv");
    }
}
