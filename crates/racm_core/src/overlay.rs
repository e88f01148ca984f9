use std::collections::BTreeMap;

use crate::entry::Entry;

/// Uncommitted cell edits layered over the canonical entries of the active
/// sequence. Keys are `(entry index, field index)` positions in the source
/// sequence, never positions in a filtered/sorted/paginated view, so staged
/// edits stay addressed correctly while the view changes underneath them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditOverlay {
    edits: BTreeMap<(usize, usize), String>,
}

impl EditOverlay {
    /// Stage an edit. A cell carries an overlay entry iff its new value
    /// differs from the canonical one; editing a cell back to its canonical
    /// value removes the staged entry instead of recording a no-op diff.
    pub fn stage(&mut self, entry: usize, field: usize, value: String, canonical: &str) {
        if value == canonical {
            self.edits.remove(&(entry, field));
        } else {
            self.edits.insert((entry, field), value);
        }
    }

    pub fn get(&self, entry: usize, field: usize) -> Option<&str> {
        self.edits.get(&(entry, field)).map(String::as_str)
    }

    /// The value the user currently sees for a cell: staged value if present,
    /// canonical value otherwise.
    pub fn displayed<'a>(&'a self, entries: &'a [Entry], entry: usize, field: usize) -> &'a str {
        self.get(entry, field)
            .unwrap_or_else(|| entries[entry].field(field))
    }

    /// Fold the staged edits into copies of `entries`.
    pub fn apply_to(&self, entries: &[Entry]) -> Vec<Entry> {
        let mut applied = entries.to_vec();
        for (&(entry, field), value) in &self.edits {
            if let Some(target) = applied.get_mut(entry) {
                target.set_field(field, value.clone());
            }
        }
        applied
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::EditOverlay;
    use crate::entry::Entry;
    use crate::schema::RISK_RATING_FIELD;

    fn entry(rating: &str) -> Entry {
        let mut entry = Entry::new();
        entry.set_field(RISK_RATING_FIELD, rating.to_string());
        entry
    }

    #[test]
    fn staging_the_canonical_value_removes_the_edit() {
        let entries = vec![entry("Medium")];
        let mut overlay = EditOverlay::default();

        overlay.stage(0, RISK_RATING_FIELD, "High".into(), entries[0].field(RISK_RATING_FIELD));
        assert_eq!(overlay.get(0, RISK_RATING_FIELD), Some("High"));

        overlay.stage(0, RISK_RATING_FIELD, "Medium".into(), entries[0].field(RISK_RATING_FIELD));
        assert!(overlay.is_empty());
    }

    #[test]
    fn displayed_prefers_the_staged_value() {
        let entries = vec![entry("Medium")];
        let mut overlay = EditOverlay::default();
        assert_eq!(overlay.displayed(&entries, 0, RISK_RATING_FIELD), "Medium");

        overlay.stage(0, RISK_RATING_FIELD, "High".into(), "Medium");
        assert_eq!(overlay.displayed(&entries, 0, RISK_RATING_FIELD), "High");
    }

    #[test]
    fn apply_leaves_the_originals_untouched() {
        let entries = vec![entry("Medium"), entry("Low")];
        let mut overlay = EditOverlay::default();
        overlay.stage(1, RISK_RATING_FIELD, "Critical".into(), "Low");

        let applied = overlay.apply_to(&entries);
        assert_eq!(applied[0].field(RISK_RATING_FIELD), "Medium");
        assert_eq!(applied[1].field(RISK_RATING_FIELD), "Critical");
        assert_eq!(entries[1].field(RISK_RATING_FIELD), "Low");
    }

    #[test]
    fn out_of_range_edits_are_dropped_on_apply() {
        let entries = vec![entry("Medium")];
        let mut overlay = EditOverlay::default();
        overlay.stage(9, RISK_RATING_FIELD, "High".into(), "");
        let applied = overlay.apply_to(&entries);
        assert_eq!(applied.len(), 1);
    }
}
