//! Per-blob structure table deduplicating object key-sets.

use std::collections::HashMap;

/// Ordered, append-only list of distinct sorted key sequences.
///
/// Indices are allocated in order of first appearance. Lookup by key
/// sequence is O(1) through a reverse map.
#[derive(Debug, Default, Clone)]
pub struct StructureTable {
    entries: Vec<Vec<String>>,
    lookup: HashMap<Vec<String>, usize>,
}

impl StructureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `keys`, appending it on first sight.
    pub fn intern(&mut self, keys: &[&str]) -> usize {
        let owned: Vec<String> = keys.iter().map(|k| (*k).to_owned()).collect();
        if let Some(&index) = self.lookup.get(&owned) {
            return index;
        }
        self.push(owned)
    }

    /// Appends an entry read back from a blob. Duplicates keep their own slot.
    pub fn push(&mut self, keys: Vec<String>) -> usize {
        let index = self.entries.len();
        self.lookup.entry(keys.clone()).or_insert(index);
        self.entries.push(keys);
        index
    }

    pub fn get(&self, index: usize) -> Option<&[String]> {
        self.entries.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.entries.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_appearance_order() {
        let mut table = StructureTable::new();
        assert_eq!(table.intern(&["a", "b"]), 0);
        assert_eq!(table.intern(&["foo"]), 1);
        assert_eq!(table.intern(&["a", "b"]), 0);
        assert_eq!(table.intern(&[]), 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1), Some(&["foo".to_string()][..]));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn key_sequence_equality_is_exact() {
        let mut table = StructureTable::new();
        let ab = table.intern(&["a", "b"]);
        let a_b = table.intern(&["ab"]);
        assert_ne!(ab, a_b);
    }

    #[test]
    fn pushed_duplicates_keep_slots() {
        let mut table = StructureTable::new();
        table.push(vec!["x".into()]);
        table.push(vec!["x".into()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.intern(&["x"]), 0);
    }
}
