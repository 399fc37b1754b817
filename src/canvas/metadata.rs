use std::cmp::Ordering;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt::{Display, Formatter};

/// A position on the pixel grid, counted from the top-left corner
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Coordinate {
    /// Column, counted from the left edge
    pub x: usize,
    /// Row, counted from the top edge
    pub y: usize,
}

impl Coordinate {
    /// Create a new coordinate
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Coordinates are ordered row-major so that iterating over them visits the grid line by line
impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Sparse mapping from grid coordinates to annotation texts.
///
/// Iteration always happens in row-major coordinate order, independent of insertion order.
/// The map itself does not know anything about grid bounds; it is up to [`PixelCanvas`](super::PixelCanvas)
/// to decide which entries are reachable through editing.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct MetadataMap {
    entries: BTreeMap<Coordinate, String>,
}

impl MetadataMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` at `coordinate`, returning the text that was previously stored there
    pub fn insert(&mut self, coordinate: Coordinate, text: impl Into<String>) -> Option<String> {
        self.entries.insert(coordinate, text.into())
    }

    /// Get the text stored at `coordinate`
    pub fn get(&self, coordinate: Coordinate) -> Option<&str> {
        self.entries.get(&coordinate).map(String::as_str)
    }

    /// Remove and return the text stored at `coordinate`
    pub fn remove(&mut self, coordinate: Coordinate) -> Option<String> {
        self.entries.remove(&coordinate)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in row-major order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

/// Iterator over the entries of a [`MetadataMap`]
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, Coordinate, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (Coordinate, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(c, text)| (*c, text.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a MetadataMap {
    type Item = (Coordinate, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: Into<String>> FromIterator<(Coordinate, S)> for MetadataMap {
    fn from_iter<T: IntoIterator<Item = (Coordinate, S)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(c, text)| (c, text.into())).collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_iteration_is_row_major() {
        let map: MetadataMap = [
            (Coordinate::new(5, 1), "c"),
            (Coordinate::new(0, 1), "b"),
            (Coordinate::new(9, 0), "a"),
        ]
        .into_iter()
        .collect();

        let order: Vec<_> = map.iter().map(|(_, text)| text).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut map = MetadataMap::new();
        assert_eq!(map.insert(Coordinate::new(1, 1), "first"), None);
        assert_eq!(
            map.insert(Coordinate::new(1, 1), "second"),
            Some("first".to_string())
        );
        assert_eq!(map.get(Coordinate::new(1, 1)), Some("second"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_coordinate_display() {
        assert_eq!(Coordinate::new(3, 14).to_string(), "(3, 14)");
    }
}
