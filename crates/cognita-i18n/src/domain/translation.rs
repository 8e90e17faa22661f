//! Translation map construction and text resolution.

use std::collections::HashMap;

use cognita_core::ports::TranslationRow;

/// Localized text keyed by entity ID, then field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    entries: HashMap<String, HashMap<String, String>>,
}

impl TranslationMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one row, replacing any earlier text for the same entity and
    /// field.
    pub fn insert(&mut self, row: TranslationRow) {
        self.entries
            .entry(row.entity_id)
            .or_default()
            .insert(row.field, row.text);
    }

    /// The translated text for `(entity_id, field)`, if a row supplied one.
    #[must_use]
    pub fn get(&self, entity_id: &str, field: &str) -> Option<&str> {
        self.entries
            .get(entity_id)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    /// Resolves displayable text.
    ///
    /// Returns the translated text when present, even if it is empty;
    /// otherwise `fallback` when given; otherwise `""`.
    #[must_use]
    pub fn resolve<'a>(
        &'a self,
        entity_id: &str,
        field: &str,
        fallback: Option<&'a str>,
    ) -> &'a str {
        self.get(entity_id, field).or(fallback).unwrap_or("")
    }

    /// Number of `(entity, field)` pairs held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Whether no text is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(HashMap::is_empty)
    }
}

impl Extend<TranslationRow> for TranslationMap {
    fn extend<I: IntoIterator<Item = TranslationRow>>(&mut self, rows: I) {
        for row in rows {
            self.insert(row);
        }
    }
}

impl FromIterator<TranslationRow> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = TranslationRow>>(rows: I) -> Self {
        let mut map = Self::new();
        map.extend(rows);
        map
    }
}

/// Folds rows left to right into a map; the last row for a key wins.
pub fn build_map<I: IntoIterator<Item = TranslationRow>>(rows: I) -> TranslationMap {
    rows.into_iter().collect()
}

/// Free-function form of [`TranslationMap::resolve`].
#[must_use]
pub fn resolve<'a>(
    map: &'a TranslationMap,
    entity_id: &str,
    field: &str,
    fallback: Option<&'a str>,
) -> &'a str {
    map.resolve(entity_id, field, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entity_id: &str, field: &str, text: &str) -> TranslationRow {
        TranslationRow {
            entity_id: entity_id.to_owned(),
            field: field.to_owned(),
            text: text.to_owned(),
        }
    }

    #[test]
    fn test_resolve_prefers_mapped_text_over_fallback() {
        let map = build_map(vec![row("e1", "headline", "Hola")]);

        assert_eq!(resolve(&map, "e1", "headline", Some("Hello")), "Hola");
    }

    #[test]
    fn test_resolve_uses_fallback_for_absent_field() {
        let map = build_map(vec![row("e1", "headline", "Hola")]);

        assert_eq!(resolve(&map, "e1", "subtext", Some("Default")), "Default");
    }

    #[test]
    fn test_resolve_returns_empty_string_when_nothing_applies() {
        let map = build_map(vec![row("e1", "headline", "Hola")]);

        assert_eq!(resolve(&map, "e2", "headline", None), "");
    }

    #[test]
    fn test_present_but_empty_translation_is_not_absent() {
        let map = build_map(vec![row("e1", "subtext", "")]);

        assert_eq!(resolve(&map, "e1", "subtext", Some("Default")), "");
        assert_eq!(map.get("e1", "subtext"), Some(""));
    }

    #[test]
    fn test_later_rows_overwrite_earlier_rows_for_same_key() {
        let map = build_map(vec![
            row("e1", "headline", "first"),
            row("e1", "subtext", "kept"),
            row("e1", "headline", "second"),
        ]);

        assert_eq!(map.resolve("e1", "headline", None), "second");
        assert_eq!(map.resolve("e1", "subtext", None), "kept");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_fields_of_different_entities_do_not_collide() {
        let map = build_map(vec![row("e1", "headline", "uno"), row("e2", "headline", "dos")]);

        assert_eq!(map.resolve("e1", "headline", None), "uno");
        assert_eq!(map.resolve("e2", "headline", None), "dos");
    }

    #[test]
    fn test_empty_map_reports_empty() {
        let map = build_map(Vec::new());

        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
