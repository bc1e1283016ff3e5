// src/query.rs

//! Search over a store snapshot. Nothing here touches storage; callers pass in the
//! result of `EntryStore::get_all` and re-run the search after every mutation.

use crate::models::Entry;
use std::cmp::Ordering;

/// Trims and lower-cases a raw query string.
pub fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Most recent first, ties broken by ascending id.
fn display_order(a: &Entry, b: &Entry) -> Ordering {
    b.ts.cmp(&a.ts).then_with(|| a.id.cmp(&b.id))
}

fn matches(entry: &Entry, needle: &str) -> bool {
    entry.tag.to_lowercase().contains(needle) || entry.text.to_lowercase().contains(needle)
}

/// Sorts the snapshot for display and keeps entries whose tag or text contains `query`,
/// ignoring case. An empty (or all-whitespace) query keeps everything.
pub fn search(mut snapshot: Vec<Entry>, query: &str) -> Vec<Entry> {
    snapshot.sort_by(display_order);

    let needle = normalize(query);
    if needle.is_empty() {
        return snapshot;
    }
    snapshot.retain(|e| matches(e, &needle));
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<Entry> {
        vec![
            Entry::new("a", 100, "mood", "fine"),
            Entry::new("b", 200, "", "great day"),
        ]
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_all_most_recent_first() {
        let result = search(snapshot(), "");
        assert_eq!(ids(&result), vec!["b", "a"]);
    }

    #[test]
    fn test_query_matches_text_substring() {
        let result = search(snapshot(), "day");
        assert_eq!(result, vec![Entry::new("b", 200, "", "great day")]);
    }

    #[test]
    fn test_query_matches_tag_case_insensitively() {
        let result = search(snapshot(), "  MOOD ");
        assert_eq!(ids(&result), vec!["a"]);
    }

    #[test]
    fn test_query_is_case_insensitive_on_content() {
        let entries = vec![
            Entry::new("x1", 1, "Xmas", ""),
            Entry::new("x2", 2, "", "boX"),
            Entry::new("x3", 3, "", "nothing here"),
        ];
        assert_eq!(ids(&search(entries, "x")), vec!["x2", "x1"]);
    }

    #[test]
    fn test_equal_timestamps_ordered_by_id() {
        let entries = vec![
            Entry::new("c", 50, "", "one"),
            Entry::new("a", 50, "", "two"),
            Entry::new("b", 70, "", "three"),
            Entry::new("b2", 50, "", "four"),
        ];
        assert_eq!(ids(&search(entries, "")), vec!["b", "a", "b2", "c"]);
    }

    #[test]
    fn test_search_is_deterministic_regardless_of_input_order() {
        let mut reversed = snapshot();
        reversed.reverse();
        assert_eq!(search(snapshot(), "e"), search(reversed, "e"));
    }

    #[test]
    fn test_no_match_yields_empty() {
        assert!(search(snapshot(), "zzz").is_empty());
    }
}
