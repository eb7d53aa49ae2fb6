//! Error types for path parsing and record selection.

use thiserror::Error;

/// A dotted path string that cannot be split into usable segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path cannot be empty.")]
    Empty,

    #[error("Path '{path}' has an empty segment at position {position}.")]
    EmptySegment { path: String, position: usize },

    #[error("Delimiter {0:?} cannot be used to split paths.")]
    InvalidDelimiter(char),
}

/// Errors returned by [`crate::query`] and friends.
///
/// Shape mismatches are caller bugs: the `many` flag disagrees with the shape
/// of the data. They are reported before any output is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("many=true expects a list of records, got {found}")]
    ExpectedSequence { found: &'static str },

    #[error("many=false expects a single record, got {found}")]
    ExpectedRecord { found: &'static str },

    #[error("element {index} of the input is a {found}, not a record")]
    ElementNotRecord { index: usize, found: &'static str },

    #[error(transparent)]
    Path(#[from] PathError),
}
