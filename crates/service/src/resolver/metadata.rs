use std::collections::{btree_map::Entry, BTreeMap};

use serde::{Deserialize, Deserializer, Serialize};

/// Bibliographic fields a remote target can be searched by.
pub const SEARCHABLE_FIELDS: [&str; 6] = [
    "isbn",
    "issn",
    "container_title",
    "container_author",
    "title",
    "author",
];

/// Request metadata keyed by lower-cased field name.
///
/// When two submitted keys differ only in case, the first non-empty value wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestMetadata(BTreeMap<String, String>);

impl RequestMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl AsRef<str>, value: impl Into<String>) {
        match self.0.entry(field.as_ref().to_lowercase()) {
            Entry::Vacant(slot) => {
                slot.insert(value.into());
            }
            Entry::Occupied(mut slot) => {
                if slot.get().trim().is_empty() {
                    slot.insert(value.into());
                }
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(&field.to_lowercase()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any searchable field carries a non-blank value.
    pub fn has_searchable_field(&self) -> bool {
        SEARCHABLE_FIELDS
            .iter()
            .any(|field| self.0.get(*field).is_some_and(|v| !v.trim().is_empty()))
    }

    /// JSON form of the metadata, URL-encoded for the `metadata=` query parameter.
    pub fn to_query_payload(&self) -> String {
        let json = serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string());
        urlencoding::encode(&json).into_owned()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RequestMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut md = Self::new();
        for (k, v) in iter {
            md.insert(k, v);
        }
        md
    }
}

impl<'de> Deserialize<'de> for RequestMetadata {
    /// Accepts any JSON value. Inside an object, strings, numbers and booleans
    /// are kept as text; anything else carries no searchable value and is
    /// dropped. A non-object payload is empty metadata.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let serde_json::Value::Object(raw) = serde_json::Value::deserialize(deserializer)? else {
            return Ok(Self::new());
        };
        Ok(raw
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::String(s) => Some((k, s)),
                serde_json::Value::Number(n) => Some((k, n.to_string())),
                serde_json::Value::Bool(b) => Some((k, b.to_string())),
                _ => None,
            })
            .collect())
    }
}
