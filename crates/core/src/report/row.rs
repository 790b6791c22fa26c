//! Row sources: anything that can hand the table a cell per column key.

use std::collections::{BTreeMap, HashMap};

use super::cell::Cell;

/// A record that can supply a cell for a column key.
///
/// Returning `None` for a declared key makes the append fail without
/// touching the table.
pub trait RowSource {
    fn cell(&self, key: &str) -> Option<Cell>;
}

impl RowSource for HashMap<String, Cell> {
    fn cell(&self, key: &str) -> Option<Cell> {
        self.get(key).cloned()
    }
}

impl RowSource for BTreeMap<String, Cell> {
    fn cell(&self, key: &str) -> Option<Cell> {
        self.get(key).cloned()
    }
}

impl RowSource for [(&str, Cell)] {
    fn cell(&self, key: &str) -> Option<Cell> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
    }
}

impl<const N: usize> RowSource for [(&str, Cell); N] {
    fn cell(&self, key: &str) -> Option<Cell> {
        self.as_slice().cell(key)
    }
}
