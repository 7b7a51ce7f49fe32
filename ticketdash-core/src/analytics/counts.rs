//! Insertion-ordered label counters.
//!
//! Rankings break ties by the order labels were first seen, so the map keeps
//! insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Label → occurrence count, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountMap(IndexMap<String, usize>);

impl CountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `label`.
    pub fn increment(&mut self, label: &str) {
        match self.0.get_mut(label) {
            Some(count) => *count += 1,
            None => {
                self.0.insert(label.to_string(), 1);
            }
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// Entry with the greatest count.
    ///
    /// Scans in insertion order and only replaces the current best with an
    /// entry that is strictly greater, so the first label reaching the maximum
    /// wins. `None` for an empty map.
    pub fn find_max(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in self.iter() {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((label, count));
            }
        }
        best
    }

    /// Up to `n` entries by descending count; equal counts keep insertion
    /// order.
    pub fn top_n(&self, n: usize) -> Vec<(String, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        // sort_by is stable
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
            .into_iter()
            .take(n)
            .map(|(label, count)| (label.to_string(), count))
            .collect()
    }

    /// Copy without the labels matching `exclude`, order preserved.
    pub fn without(&self, exclude: impl Fn(&str) -> bool) -> CountMap {
        self.iter()
            .filter(|(label, _)| !exclude(*label))
            .map(|(label, count)| (label.to_string(), count))
            .collect()
    }
}

impl FromIterator<(String, usize)> for CountMap {
    fn from_iter<T: IntoIterator<Item = (String, usize)>>(iter: T) -> Self {
        CountMap(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for CountMap {
    /// Count occurrences of each label.
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut counts = CountMap::new();
        for label in iter {
            counts.increment(label);
        }
        counts
    }
}
