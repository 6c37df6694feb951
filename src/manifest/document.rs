//! The normalised manifest mapping.

use serde::Serialize;
use serde_json::{Map, Value};

/// An immutable mapping from manifest keys to JSON-model values.
///
/// `null` never appears at any depth: object members holding `null` are
/// dropped and `null` list elements are removed. A key is therefore either
/// present with a value or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ManifestDocument {
    entries: Map<String, Value>,
}

impl ManifestDocument {
    /// Build a document from a JSON object, stripping nulls recursively.
    #[must_use]
    pub fn from_object(mut entries: Map<String, Value>) -> Self {
        strip_nulls_in_map(&mut entries);
        Self { entries }
    }

    /// Look up a value by key or by dotted path such as `app.launch.local_path`.
    ///
    /// An exact top-level key wins over path traversal, so keys that
    /// themselves contain dots remain reachable.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.entries.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.entries.get(first)?, |value, segment| {
            value.as_object()?.get(segment)
        })
    }

    /// Look up a string value.
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Look up a nested mapping.
    #[must_use]
    pub fn get_map(&self, path: &str) -> Option<&Map<String, Value>> {
        self.get(path).and_then(Value::as_object)
    }

    /// Look up a list.
    #[must_use]
    pub fn get_list(&self, path: &str) -> Option<&[Value]> {
        self.get(path).and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Report whether `path` resolves to a value.
    #[must_use]
    pub fn contains_key(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the document has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }
}

impl From<Map<String, Value>> for ManifestDocument {
    fn from(entries: Map<String, Value>) -> Self {
        Self::from_object(entries)
    }
}

fn strip_nulls_in_map(map: &mut Map<String, Value>) {
    map.retain(|_, value| !value.is_null());
    map.values_mut().for_each(strip_nulls);
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => strip_nulls_in_map(map),
        Value::Array(items) => {
            items.retain(|item| !item.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}
