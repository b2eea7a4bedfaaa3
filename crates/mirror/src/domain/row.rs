use serde_json::{Map, Value};

/// A schema-less row. Field sets are table-dependent and defined by the venue.
pub type Row = Map<String, Value>;

/// Two rows match when every key field holds an equal value in both.
pub fn matches_keys(keys: &[String], row: &Row, target: &Row) -> bool {
    keys.iter().all(|key| row.get(key) == target.get(key))
}

/// Name of the first key field absent from `row`, if any.
pub fn missing_key<'a>(keys: &'a [String], row: &Row) -> Option<&'a str> {
    keys.iter()
        .find(|key| !row.contains_key(key.as_str()))
        .map(String::as_str)
}

/// Merge `update` into `row`: present fields overwrite, absent fields are kept.
pub fn merge(row: &mut Row, update: Row) {
    for (field, value) in update {
        row.insert(field, value);
    }
}

/// Numeric field as f64. Null, missing and non-numeric all read as `None`.
pub fn number(row: &Row, field: &str) -> Option<f64> {
    row.get(field).and_then(Value::as_f64)
}
