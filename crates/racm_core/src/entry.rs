use std::collections::BTreeMap;

use crate::schema;

/// One RACM row as received from the service: a flat string map that may
/// address any field by its human label, its normalized key, or both.
///
/// All reads and writes go through [`Entry::field`] / [`Entry::set_field`],
/// which encode the one precedence rule for the dual addressing: label first,
/// then normalized key, with the label form used when a field is created.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    values: BTreeMap<String, String>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw key/value pair as it arrived on the wire.
    pub fn insert_raw(&mut self, key: String, value: String) {
        self.values.insert(key, value);
    }

    /// Read a field by schema index: label form first, then normalized key,
    /// empty string when neither is present.
    pub fn field(&self, field: usize) -> &str {
        if let Some(value) = self.values.get(schema::label(field)) {
            return value;
        }
        self.values
            .get(schema::normalized_key(field).as_str())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Write a field by schema index, updating whichever addressing form the
    /// entry already carries. Fresh fields are created under the label.
    pub fn set_field(&mut self, field: usize, value: String) {
        let label = schema::label(field);
        if self.values.contains_key(label) {
            self.values.insert(label.to_string(), value);
            return;
        }
        let key = schema::normalized_key(field);
        if self.values.contains_key(&key) {
            self.values.insert(key, value);
            return;
        }
        self.values.insert(label.to_string(), value);
    }

    /// The full 25-field record keyed by label, in schema order. This is the
    /// shape the bulk-update endpoint expects.
    pub fn to_labeled(&self) -> Vec<(String, String)> {
        (0..schema::FIELD_COUNT)
            .map(|field| (schema::label(field).to_string(), self.field(field).to_string()))
            .collect()
    }
}

impl FromIterator<(String, String)> for Entry {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
