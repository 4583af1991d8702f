// Bidirectional mapping between location labels and photo ids, built
// incrementally as geocode results stream in. Labels are many-to-one:
// distinct coordinates can resolve to the same "place, country" string.

use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;

#[derive(Default)]
struct LabelEntry {
    /// Insertion order, for stable display.
    ordered: Vec<u32>,
    /// Membership bitmap; suppresses duplicates when a photo is reprocessed.
    members: RoaringBitmap,
}

/// Photo ids are interned to u32 indices so label entries stay compact.
#[derive(Default)]
pub struct LocationIndex {
    id_to_index: FxHashMap<String, u32>,
    index_to_id: Vec<String>,
    by_label: FxHashMap<String, LabelEntry>,
    label_of: FxHashMap<u32, String>,
}

impl LocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, photo_id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(photo_id) {
            idx
        } else {
            let idx = self.index_to_id.len() as u32;
            self.id_to_index.insert(photo_id.to_string(), idx);
            self.index_to_id.push(photo_id.to_string());
            idx
        }
    }

    /// Insert into both index directions. An empty label means the photo has
    /// no resolvable location and is skipped. Re-recording a photo under a
    /// new label moves it (last write wins); the old label disappears once
    /// its last photo moves away.
    pub fn record(&mut self, photo_id: &str, label: &str) {
        if label.is_empty() {
            return;
        }

        let idx = self.intern(photo_id);

        if let Some(old) = self.label_of.get(&idx).cloned() {
            if old == label {
                return;
            }
            if let Some(entry) = self.by_label.get_mut(&old) {
                entry.members.remove(idx);
                entry.ordered.retain(|&i| i != idx);
                if entry.ordered.is_empty() {
                    self.by_label.remove(&old);
                }
            }
        }

        let entry = self.by_label.entry(label.to_string()).or_default();
        if entry.members.insert(idx) {
            entry.ordered.push(idx);
        }
        self.label_of.insert(idx, label.to_string());
    }

    /// All observed labels, sorted for suggestion lists.
    pub fn all_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.by_label.keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Photo ids recorded under `label`, in insertion order. Empty for
    /// unknown labels.
    pub fn ids_for_label(&self, label: &str) -> Vec<String> {
        self.by_label
            .get(label)
            .map(|entry| {
                entry.ordered.iter().map(|&i| self.index_to_id[i as usize].clone()).collect()
            })
            .unwrap_or_default()
    }

    pub fn label_for_id(&self, photo_id: &str) -> Option<&str> {
        let idx = self.id_to_index.get(photo_id)?;
        self.label_of.get(idx).map(|s| s.as_str())
    }

    /// Number of photos currently carrying a label.
    pub fn len(&self) -> usize {
        self.label_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.label_of.is_empty()
    }
}
