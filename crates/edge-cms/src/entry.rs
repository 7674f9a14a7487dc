//! CMS entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A content entry, passed through as returned by the CMS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(Map<String, Value>);

impl Entry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Entry uid, if present.
    pub fn uid(&self) -> Option<&str> {
        self.str_field("uid")
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Nested lookup by JSON pointer (e.g. `/seo/og_meta_tags/title`).
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (first, tail) = match rest.split_once('/') {
            Some((first, tail)) => (first, Some(tail)),
            None => (rest, None),
        };
        let value = self.0.get(first)?;
        match tail {
            Some(tail) => value.pointer(&format!("/{}", tail)),
            None => Some(value),
        }
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
