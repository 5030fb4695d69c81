//! Session records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute holding a record's key.
pub const SESSION_KEY_ATTRIBUTE: &str = "_idx";

/// A session record: its key plus arbitrary attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Record key.
    #[serde(rename = "_idx")]
    pub idx: String,
    /// All other attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    /// Whether the record came from the store (`false` for placeholders).
    #[serde(skip, default = "persisted_default")]
    pub persisted: bool,
}

fn persisted_default() -> bool {
    true
}

impl SessionRecord {
    /// A stored record.
    #[must_use]
    pub fn new(idx: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            idx: idx.into(),
            attributes,
            persisted: true,
        }
    }

    /// The record returned when nothing is stored under `idx`.
    #[must_use]
    pub fn placeholder(idx: impl Into<String>) -> Self {
        Self {
            idx: idx.into(),
            attributes: Map::new(),
            persisted: false,
        }
    }

    /// Build a record from a flat attribute map that includes the key
    /// attribute. Returns `None` when the key is missing or not a string.
    #[must_use]
    pub fn from_item(mut item: Map<String, Value>) -> Option<Self> {
        let Some(Value::String(idx)) = item.remove(SESSION_KEY_ATTRIBUTE) else {
            return None;
        };
        Some(Self::new(idx, item))
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}
