//! Frequency-ranked segment dictionary.
//!
//! Every distinct edge name in a [`PathGraph`] gets one entry. The weight of
//! an entry is the number of edges carrying the name, where an edge of a
//! shared node counts once no matter how many paths run through it. Entries
//! are ranked by descending weight; equal weights keep the order in which the
//! names are first met walking the nodes in id order and their edges in
//! sorted order.

use std::collections::HashMap;

use super::graph::PathGraph;
use super::DecodeError;

/// A segment name and the number of edges carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    name: String,
    weight: u64,
}

impl DictionaryEntry {
    /// The segment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many edges of the graph carry this name.
    pub fn weight(&self) -> u64 {
        self.weight
    }
}

/// Segment names in rank order, with a reverse index from name to rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    ranks: HashMap<String, usize>,
}

impl Dictionary {
    /// Counts and ranks the edge names of `graph`.
    pub fn from_graph(graph: &PathGraph) -> Self {
        let mut entries: Vec<DictionaryEntry> = Vec::new();
        let mut first_seen: HashMap<&str, usize> = HashMap::new();

        for edge in graph.nodes().flat_map(|node| node.children()) {
            let slot = *first_seen.entry(edge.name()).or_insert_with(|| {
                entries.push(DictionaryEntry { name: edge.name().to_string(), weight: 0 });
                entries.len() - 1
            });
            entries[slot].weight += 1;
        }

        // Stable, so ties keep their first-seen order.
        entries.sort_by(|a, b| b.weight.cmp(&a.weight));

        let ranks = Self::index(&entries);
        Self { entries, ranks }
    }

    /// Rebuilds a dictionary from `(name, weight)` pairs already in rank
    /// order.
    pub(crate) fn from_entries(pairs: Vec<(String, u64)>) -> Result<Self, DecodeError> {
        let entries: Vec<DictionaryEntry> = pairs
            .into_iter()
            .map(|(name, weight)| DictionaryEntry { name, weight })
            .collect();

        let ranks = Self::index(&entries);
        if ranks.len() != entries.len() {
            let duplicate = entries
                .iter()
                .enumerate()
                .find(|(rank, entry)| ranks.get(&entry.name) != Some(rank))
                .map(|(_, entry)| entry.name.clone())
                .unwrap_or_default();
            return Err(DecodeError::DuplicateSegmentName(duplicate));
        }

        Ok(Self { entries, ranks })
    }

    fn index(entries: &[DictionaryEntry]) -> HashMap<String, usize> {
        let mut ranks = HashMap::with_capacity(entries.len());
        for (rank, entry) in entries.iter().enumerate() {
            ranks.entry(entry.name.clone()).or_insert(rank);
        }
        ranks
    }

    /// The rank of `name`, if it is in the dictionary.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.ranks.get(name).copied()
    }

    /// The entry at `rank`.
    pub fn get(&self, rank: usize) -> Option<&DictionaryEntry> {
        self.entries.get(rank)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no names.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.iter()
    }

    /// Entry weights in rank order.
    pub fn weights(&self) -> Vec<u64> {
        self.entries.iter().map(DictionaryEntry::weight).collect()
    }
}

/// Names of `graph` in rank order.
pub fn order(graph: &PathGraph) -> Vec<String> {
    Dictionary::from_graph(graph)
        .entries
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}
