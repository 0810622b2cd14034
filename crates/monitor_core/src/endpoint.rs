use std::collections::btree_set;
use std::collections::BTreeSet;

/// Set of endpoint strings seen for a target.
///
/// Equality of entries is byte equality. Iteration order is lexicographic so
/// that records and reports render the same way on every run; callers must not
/// attach meaning to it beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointSet {
    entries: BTreeSet<String>,
}

impl EndpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.entries.contains(endpoint)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    /// Returns `true` when every entry of `other` is also in `self`.
    pub fn is_superset(&self, other: &EndpointSet) -> bool {
        self.entries.is_superset(&other.entries)
    }

    /// Entries of `self` that are absent from `other`.
    pub fn difference(&self, other: &EndpointSet) -> EndpointSet {
        self.entries.difference(&other.entries).cloned().collect()
    }

    pub fn union(&self, other: &EndpointSet) -> EndpointSet {
        self.entries.union(&other.entries).cloned().collect()
    }
}

impl FromIterator<String> for EndpointSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for EndpointSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_owned).collect()
    }
}

impl Extend<String> for EndpointSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for EndpointSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a EndpointSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
