// Free-text and location filtering over the loaded gallery. An empty filter
// means "show everything"; a query that matches nothing means an empty
// result, so the UI can tell "no results" apart from "no filter".

use rustc_hash::{FxHashMap, FxHashSet};

use crate::format_capture_date;
use crate::location_index::LocationIndex;
use crate::PhotoRecord;

/// Case-insensitive substring match over the fields the gallery displays:
/// name, description and the formatted capture date. `needle` must already
/// be lowercased.
pub fn matches_text(record: &PhotoRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.description.to_lowercase().contains(needle)
        || record
            .captured_at
            .map(|ts| format_capture_date(&ts).to_lowercase().contains(needle))
            .unwrap_or(false)
}

/// Select the subset of `all_ids` matching the free-text query or any of the
/// selected location labels. The result is the union of both match sets,
/// deduplicated, in first-seen order: text matches in `all_ids` order first,
/// then label members in their index insertion order.
pub fn filter(
    query: &str,
    labels: &[String],
    all_ids: &[String],
    records: &FxHashMap<String, PhotoRecord>,
    index: &LocationIndex,
) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() && labels.is_empty() {
        return all_ids.to_vec();
    }

    let needle = query.to_lowercase();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut out = Vec::new();

    if !needle.is_empty() {
        for id in all_ids {
            // Ids whose record has not been fetched yet cannot match text
            if let Some(record) = records.get(id)
                && matches_text(record, &needle)
                && seen.insert(id.clone())
            {
                out.push(id.clone());
            }
        }
    }

    for label in labels {
        for id in index.ids_for_label(label) {
            if seen.insert(id.clone()) {
                out.push(id);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, name: &str, description: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            thumbnail: Vec::new(),
            full: Vec::new(),
            captured_at: Some(Utc.with_ymd_and_hms(2024, 6, 3, 14, 5, 0).unwrap()),
            gps: None,
            width: 4000,
            height: 3000,
            camera_make: String::new(),
            camera_model: String::new(),
            uploaded_at: None,
        }
    }

    fn fixtures() -> (Vec<String>, FxHashMap<String, PhotoRecord>, LocationIndex) {
        let all_ids: Vec<String> =
            ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();

        let mut records = FxHashMap::default();
        records.insert("a".to_string(), record("a", "Harbor sunset", "boats at dusk"));
        records.insert("b".to_string(), record("b", "Old town", "cobblestone alley"));
        records.insert("c".to_string(), record("c", "Harbor crane", ""));

        let mut index = LocationIndex::new();
        index.record("b", "Uusimaa, Finland");
        index.record("d", "Uusimaa, Finland");

        (all_ids, records, index)
    }

    #[test]
    fn test_no_filter_shows_everything() {
        let (all_ids, records, index) = fixtures();
        assert_eq!(filter("", &[], &all_ids, &records, &index), all_ids);
    }

    #[test]
    fn test_no_match_is_empty_not_full() {
        let (all_ids, records, index) = fixtures();
        let result = filter("zzz-no-match", &[], &all_ids, &records, &index);
        assert!(result.is_empty());
    }

    #[test]
    fn test_text_match_case_insensitive() {
        let (all_ids, records, index) = fixtures();
        assert_eq!(filter("HARBOR", &[], &all_ids, &records, &index), vec!["a", "c"]);
        assert_eq!(filter("alley", &[], &all_ids, &records, &index), vec!["b"]);
    }

    #[test]
    fn test_date_string_matches() {
        let (all_ids, records, index) = fixtures();
        assert_eq!(
            filter("june 2024", &[], &all_ids, &records, &index),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_label_union_keeps_discovery_order() {
        let (all_ids, records, index) = fixtures();
        let labels = vec!["Uusimaa, Finland".to_string()];

        // "b" is found by text first and must not repeat from the label set;
        // "d" has no fetched record and still arrives via the label.
        let result = filter("old town", &labels, &all_ids, &records, &index);
        assert_eq!(result, vec!["b", "d"]);
    }

    #[test]
    fn test_labels_only() {
        let (all_ids, records, index) = fixtures();
        let labels = vec!["Uusimaa, Finland".to_string()];
        assert_eq!(filter("", &labels, &all_ids, &records, &index), vec!["b", "d"]);
    }

    #[test]
    fn test_whitespace_query_is_no_filter() {
        let (all_ids, records, index) = fixtures();
        assert_eq!(filter("   ", &[], &all_ids, &records, &index), all_ids);
    }
}
