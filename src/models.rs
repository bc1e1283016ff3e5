// src/models.rs

use serde::{Deserialize, Serialize};

/// A single journal entry. `id` is the primary key and never changes once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub ts: i64, // milliseconds since the Unix epoch
    #[serde(default)]
    pub tag: String,
    pub text: String,
}

impl Entry {
    pub fn new(id: impl Into<String>, ts: i64, tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ts,
            tag: tag.into(),
            text: text.into(),
        }
    }
}

/// Generates a fresh opaque entry id.
pub fn new_entry_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_ids_are_distinct() {
        let a = new_entry_id();
        let b = new_entry_id();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_entry_serializes_all_four_fields() {
        let entry = Entry::new("a", 100, "", "fine");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["ts"], 100);
        assert_eq!(json["tag"], "");
        assert_eq!(json["text"], "fine");
    }
}
