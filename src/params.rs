use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};

/// Per-call request parameters.
///
/// Built fresh for every call and passed by reference; the client never
/// stores one, so concurrent callers cannot observe each other's fields.
/// Keys iterate in lexicographic order, which keeps encoded bodies stable
/// across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    fields: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any previous value for the same key.
    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.insert(key.into(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Overlay `other` on top of these fields; `other` wins on collisions.
    pub fn merge(mut self, other: &Params) -> Self {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_previous_value() {
        let params = Params::new().set("page", 1).set("page", 2);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("page"), Some("2"));
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let params = Params::new().set("b", "2").set("a", "1").set("c", "3");
        let keys: Vec<&str> = params.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_prefers_overlay() {
        let base = Params::new().set("keep", "base").set("page", "1");
        let overlay = Params::new().set("page", "9");

        let merged = base.merge(&overlay);
        assert_eq!(merged.get("keep"), Some("base"));
        assert_eq!(merged.get("page"), Some("9"));
    }

    #[test]
    fn test_merge_leaves_overlay_untouched() {
        let overlay = Params::new().set("page", "9");
        let _ = Params::new().set("page", "1").merge(&overlay);
        assert_eq!(overlay.get("page"), Some("9"));
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let params = Params::new().set("b", "2").set("a", "1");
        let encoded = serde_json::to_string(&params).unwrap();
        assert_eq!(encoded, r#"{"a":"1","b":"2"}"#);
    }
}
