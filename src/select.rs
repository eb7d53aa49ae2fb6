//! Field selection over records.
//!
//! [`query`] is the entry point: it checks the `many` flag against the shape
//! of the data, parses the dotted paths, and rebuilds a filtered copy of each
//! record. Keys selected in full are carried over as-is, which for records
//! and lists means sharing the caller's `Arc`.

use crate::error::QueryError;
use crate::path::{group_by_head, PathSet, Selection, DEFAULT_DELIMITER};
use crate::value::{Record, Value};
use tracing::{debug, trace};

/// Settings for [`query_with`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    /// Separator between path segments.
    pub delimiter: char,
}

impl QueryOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Selects `paths` from `data`.
///
/// With `many == false`, `data` must be a record and a record comes back.
/// With `many == true`, `data` must be a list of records and a list of the
/// same length comes back, each element filtered independently.
///
/// ```
/// use dictfilter::{query, Value};
/// use serde_json::json;
///
/// let data = Value::from(json!({"a": 1, "b": {"nest": true, "unwanted": 7}, "c": "testing"}));
/// let filtered = query(&data, ["b.nest", "c"], false).unwrap();
/// assert_eq!(filtered, Value::from(json!({"b": {"nest": true}, "c": "testing"})));
/// ```
pub fn query<I, S>(data: &Value, paths: I, many: bool) -> Result<Value, QueryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    query_with(data, paths, many, &QueryOptions::default())
}

pub fn query_with<I, S>(
    data: &Value,
    paths: I,
    many: bool,
    options: &QueryOptions,
) -> Result<Value, QueryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parse = || -> Result<PathSet, QueryError> {
        let paths = PathSet::parse_with(paths, options.delimiter)?;
        debug!(many, paths = paths.len(), "running query");
        Ok(paths)
    };

    match (many, data) {
        (true, Value::List(records)) => Ok(Value::from(select_many(records, &parse()?)?)),
        (false, Value::Record(record)) => Ok(Value::from(select(record, &parse()?))),
        (true, other) => Err(QueryError::ExpectedSequence { found: other.kind() }),
        (false, other) => Err(QueryError::ExpectedRecord { found: other.kind() }),
    }
}

/// Filters every element of `records`, which must all be records.
///
/// Nothing is built unless every element passes the check.
pub fn select_many(records: &[Value], paths: &PathSet) -> Result<Vec<Value>, QueryError> {
    let records = records
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Record(record) => Ok(record),
            other => Err(QueryError::ElementNotRecord {
                index,
                found: other.kind(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records
        .into_iter()
        .map(|record| Value::from(select(record, paths)))
        .collect())
}

/// Builds a new record holding only what `paths` reach in `record`.
pub fn select(record: &Record, paths: &PathSet) -> Record {
    select_segments(record, &paths.views())
}

fn select_segments(record: &Record, paths: &[&[String]]) -> Record {
    let groups = group_by_head(paths);
    let mut out = Record::with_capacity(groups.len());

    for group in groups {
        let Some(value) = record.get(group.key) else {
            trace!(key = group.key, "key absent, skipping");
            continue;
        };

        match group.selection {
            Selection::Full => {
                out.insert(group.key, value.clone());
            }
            Selection::Narrow(rests) => match narrow(value, &rests) {
                Some(narrowed) => {
                    out.insert(group.key, narrowed);
                }
                None => {
                    trace!(key = group.key, kind = value.kind(), "cannot narrow into scalar");
                }
            },
        }
    }

    out
}

/// Applies `paths` inside a container. Scalars yield `None`.
///
/// List elements are narrowed one by one; scalar elements are kept as they
/// are so the list keeps its length.
fn narrow(value: &Value, paths: &[&[String]]) -> Option<Value> {
    match value {
        Value::Record(record) => Some(Value::from(select_segments(record, paths))),
        Value::List(items) => Some(Value::from(
            items
                .iter()
                .map(|item| narrow(item, paths).unwrap_or_else(|| item.clone()))
                .collect::<Vec<_>>(),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn value(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn full_selection_shares_nested_containers() {
        let data = value(json!({"b": {"nest": true}, "l": [1, 2], "c": 3}));
        let out = query(&data, ["b", "l"], false).unwrap();

        let input = data.as_record().unwrap();
        let output = out.as_record().unwrap();
        assert!(Arc::ptr_eq(
            input.get("b").and_then(Value::as_record).unwrap(),
            output.get("b").and_then(Value::as_record).unwrap(),
        ));
        assert!(Arc::ptr_eq(
            input.get("l").and_then(Value::as_list).unwrap(),
            output.get("l").and_then(Value::as_list).unwrap(),
        ));
    }

    #[test]
    fn narrowed_records_are_rebuilt() {
        let data = value(json!({"b": {"nest": true, "x": 1}}));
        let out = query(&data, ["b.nest"], false).unwrap();

        let input = data.as_record().unwrap().get("b").and_then(Value::as_record).unwrap();
        let output = out.as_record().unwrap().get("b").and_then(Value::as_record).unwrap();
        assert!(!Arc::ptr_eq(input, output));
        assert_eq!(data, value(json!({"b": {"nest": true, "x": 1}})));
    }

    #[test]
    fn narrowing_into_scalar_drops_key() {
        let data = value(json!({"a": 1, "c": "text"}));
        let out = query(&data, ["a.x", "c"], false).unwrap();
        assert_eq!(out, value(json!({"c": "text"})));
    }

    #[test]
    fn scalar_list_elements_are_kept_when_narrowing() {
        let data = value(json!({"b": [{"nest": 1, "x": 2}, 7, [{"nest": 3, "y": 4}]]}));
        let out = query(&data, ["b.nest"], false).unwrap();
        assert_eq!(out, value(json!({"b": [{"nest": 1}, 7, [{"nest": 3}]]})));
    }

    #[test]
    fn deep_paths_merge_at_every_level() {
        let data = value(json!({
            "a": {"b": {"c": 1, "d": 2, "e": 3}, "f": 4},
            "g": 5
        }));
        let out = query(&data, ["a.b.c", "a.b.e", "a.f"], false).unwrap();
        assert_eq!(out, value(json!({"a": {"b": {"c": 1, "e": 3}, "f": 4}})));
    }

    #[test]
    fn output_keys_follow_first_mention() {
        let data = value(json!({"a": 1, "b": 2, "c": 3}));
        let out = query(&data, ["c", "a"], false).unwrap();
        let keys: Vec<_> = out.as_record().unwrap().keys().collect();
        assert_eq!(keys, vec!["c", "a"]);
    }

    #[test]
    fn custom_delimiter_option() {
        let data = value(json!({"b": {"nest.x": 1, "nest": 2}}));
        let options = QueryOptions::default().with_delimiter('/');
        let out = query_with(&data, ["b/nest.x"], false, &options).unwrap();
        assert_eq!(out, value(json!({"b": {"nest.x": 1}})));
    }

    #[test]
    fn shape_is_checked_before_paths() {
        let err = query(&value(json!([])), [""], false).unwrap_err();
        assert_eq!(err, QueryError::ExpectedRecord { found: "list" });
    }

    #[test]
    fn many_rejects_non_record_elements() {
        let data = value(json!([{"a": 1}, 2]));
        let err = query(&data, ["a"], true).unwrap_err();
        assert_eq!(
            err,
            QueryError::ElementNotRecord {
                index: 1,
                found: "int"
            }
        );
    }
}
