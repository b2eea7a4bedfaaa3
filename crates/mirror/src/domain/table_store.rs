use std::collections::HashMap;

use super::row::{Row, matches_keys};

/// In-memory replica of the venue's tables.
///
/// Holds rows per table in arrival order plus the key set the venue declared
/// for each table on its last `partial`. Not synchronized; see
/// [`SharedTableStore`](crate::application::SharedTableStore) for the
/// cross-thread wrapper.
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    tables: HashMap<String, Vec<Row>>,
    keys: HashMap<String, Vec<String>>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table if `name` has never been seen. Returns true if created.
    pub fn ensure_table(&mut self, name: &str) -> bool {
        if self.tables.contains_key(name) {
            return false;
        }
        self.tables.insert(name.to_string(), Vec::new());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn contains_all(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.contains(name))
    }

    pub fn table(&self, name: &str) -> Option<&[Row]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Key set declared by the last `partial` for this table
    pub fn keys(&self, name: &str) -> Option<&[String]> {
        self.keys.get(name).map(Vec::as_slice)
    }

    /// Replace the whole table image and its key set.
    pub fn replace(&mut self, name: &str, rows: Vec<Row>, keys: Vec<String>) {
        self.tables.insert(name.to_string(), rows);
        self.keys.insert(name.to_string(), keys);
    }

    pub fn append(&mut self, name: &str, rows: Vec<Row>) {
        self.tables.entry(name.to_string()).or_default().extend(rows);
    }

    /// Index of the first row matching `target` on every field of `keys`.
    pub fn position(&self, name: &str, keys: &[String], target: &Row) -> Option<usize> {
        self.tables
            .get(name)?
            .iter()
            .position(|row| matches_keys(keys, row, target))
    }

    pub fn row_mut(&mut self, name: &str, index: usize) -> Option<&mut Row> {
        self.tables.get_mut(name)?.get_mut(index)
    }

    pub fn remove(&mut self, name: &str, index: usize) -> Option<Row> {
        let rows = self.tables.get_mut(name)?;
        (index < rows.len()).then(|| rows.remove(index))
    }
}
