//! dictfilter - select dotted field paths out of nested records
//!
//! Given a record (or a list of records) and paths such as `"b.nest"`, build a
//! copy that holds only the requested fields. Paths sharing a prefix merge
//! into one nested record, and paths that pass through a list are applied to
//! every element of it.
//!
//! - `value` - the [`Value`] / [`Record`] data model
//! - `path` - parsing dotted strings and grouping them by head segment
//! - `select` - [`query`] and the recursive selector
//! - `python` - native Python module (`python` feature)

pub mod error;
pub mod path;
pub mod select;
pub mod value;

#[cfg(feature = "python")]
mod python;

pub use error::{PathError, QueryError};
pub use path::{group_by_head, Group, Path, PathSet, Selection, DEFAULT_DELIMITER};
pub use select::{query, query_with, select, select_many, QueryOptions};
pub use value::{Record, Value};
