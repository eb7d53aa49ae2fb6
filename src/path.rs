//! Dotted field paths and the head-segment grouping that drives selection.

use crate::error::PathError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const DEFAULT_DELIMITER: char = '.';

static DOTTED_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^.]+(?:\.[^.]+)*$").expect("valid regex"));

fn path_regex(delimiter: char) -> Result<Regex, PathError> {
    let escaped = regex::escape(&delimiter.to_string());
    Regex::new(&format!("^[^{escaped}]+(?:{escaped}[^{escaped}]+)*$"))
        .map_err(|_| PathError::InvalidDelimiter(delimiter))
}

/// One requested field, split into segments. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        Self::parse_with(raw, DEFAULT_DELIMITER)
    }

    /// Splits `raw` on `delimiter`. Empty strings and empty segments are
    /// rejected; everything else, brackets included, is a literal key.
    pub fn parse_with(raw: &str, delimiter: char) -> Result<Self, PathError> {
        if delimiter == DEFAULT_DELIMITER {
            Self::parse_matching(raw, delimiter, &DOTTED_PATH_RE)
        } else {
            Self::parse_matching(raw, delimiter, &path_regex(delimiter)?)
        }
    }

    fn parse_matching(raw: &str, delimiter: char, matcher: &Regex) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        if !matcher.is_match(raw) {
            let position = raw
                .split(delimiter)
                .position(str::is_empty)
                .unwrap_or_default();
            return Err(PathError::EmptySegment {
                path: raw.to_string(),
                position,
            });
        }
        Ok(Self {
            segments: raw.split(delimiter).map(str::to_string).collect(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

/// Always joins with `.`, whatever delimiter the path was parsed with.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// The full list of paths requested by one query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathSet {
    paths: Vec<Path>,
}

impl PathSet {
    pub fn parse<I, S>(raw: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse_with(raw, DEFAULT_DELIMITER)
    }

    pub fn parse_with<I, S>(raw: I, delimiter: char) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matcher = if delimiter == DEFAULT_DELIMITER {
            DOTTED_PATH_RE.clone()
        } else {
            path_regex(delimiter)?
        };
        let paths = raw
            .into_iter()
            .map(|path| Path::parse_matching(path.as_ref(), delimiter, &matcher))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { paths })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Segment slices of every path, in request order.
    pub fn views(&self) -> Vec<&[String]> {
        self.paths.iter().map(Path::segments).collect()
    }

    pub fn groups(&self) -> Vec<Group<'_>> {
        group_by_head(&self.views())
    }
}

impl FromIterator<Path> for PathSet {
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// What to take from the value under one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Some path ended at this key: keep the value whole.
    Full,
    /// Every path continues past this key; these are the remaining segments.
    Narrow(Vec<&'a [String]>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group<'a> {
    pub key: &'a str,
    pub selection: Selection<'a>,
}

/// Merges paths that share a head segment into one group per key.
///
/// Groups come back in first-occurrence order of their key. A path that ends
/// at a key turns the whole group into [`Selection::Full`], regardless of
/// where it appears relative to the longer paths. Empty slices are ignored.
pub fn group_by_head<'a>(paths: &[&'a [String]]) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();

    for &path in paths {
        let Some((head, rest)) = path.split_first() else {
            continue;
        };

        let index = match groups.iter().position(|group| group.key == head.as_str()) {
            Some(index) => index,
            None => {
                groups.push(Group {
                    key: head.as_str(),
                    selection: Selection::Narrow(Vec::new()),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        if rest.is_empty() {
            group.selection = Selection::Full;
        } else if let Selection::Narrow(rests) = &mut group.selection {
            rests.push(rest);
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_dotted_paths() {
        let path = Path::parse("b.nest.deep").unwrap();
        assert_eq!(path.segments(), segs(&["b", "nest", "deep"]).as_slice());
        assert_eq!(path.to_string(), "b.nest.deep");
    }

    #[test]
    fn brackets_are_literal() {
        let path = Path::parse("b[0].nest").unwrap();
        assert_eq!(path.segments(), segs(&["b[0]", "nest"]).as_slice());
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
        assert_eq!(
            Path::parse("b."),
            Err(PathError::EmptySegment {
                path: "b.".to_string(),
                position: 1
            })
        );
        assert_eq!(
            Path::parse(".b"),
            Err(PathError::EmptySegment {
                path: ".b".to_string(),
                position: 0
            })
        );
        assert_eq!(
            Path::parse("a..b"),
            Err(PathError::EmptySegment {
                path: "a..b".to_string(),
                position: 1
            })
        );
    }

    #[test]
    fn custom_delimiter() {
        let path = Path::parse_with("b/nest.x", '/').unwrap();
        assert_eq!(path.segments(), segs(&["b", "nest.x"]).as_slice());
        assert_eq!(path.to_string(), "b.nest.x");
        assert!(matches!(
            Path::parse_with("b//x", '/'),
            Err(PathError::EmptySegment { position: 1, .. })
        ));
    }

    #[test]
    fn path_set_fails_on_first_bad_path() {
        let err = PathSet::parse(["a", "b..c", ""]).unwrap_err();
        assert!(matches!(err, PathError::EmptySegment { .. }));
    }

    #[test]
    fn groups_merge_shared_heads() {
        let paths = PathSet::parse(["b.nest", "c", "b.other"]).unwrap();
        let groups = paths.groups();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "b");
        let nest = segs(&["nest"]);
        let other = segs(&["other"]);
        assert_eq!(
            groups[0].selection,
            Selection::Narrow(vec![nest.as_slice(), other.as_slice()])
        );
        assert_eq!(groups[1].key, "c");
        assert_eq!(groups[1].selection, Selection::Full);
    }

    #[test]
    fn full_selection_wins_in_any_order() {
        for raw in [["b", "b.nest"], ["b.nest", "b"]] {
            let paths = PathSet::parse(raw).unwrap();
            let groups = paths.groups();
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].selection, Selection::Full);
        }
    }

    #[test]
    fn empty_set_has_no_groups() {
        assert!(PathSet::default().groups().is_empty());
    }
}
