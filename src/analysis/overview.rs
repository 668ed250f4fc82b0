// analysis/overview.rs
// Card list filtering and selection toggling

use crate::catalog::models::{MetadataRecord, SchemaId};

/// Records whose schema name contains `search`, ignoring case. Catalog order is kept.
pub fn filter_records<'a>(catalog: &'a [MetadataRecord], search: &str) -> Vec<&'a MetadataRecord> {
    let needle = search.to_lowercase();
    catalog
        .iter()
        .filter(|r| r.schema_name.to_lowercase().contains(&needle))
        .collect()
}

/// Clicking the selected card clears the selection, any other card replaces it.
pub fn toggle_selection(current: Option<SchemaId>, clicked: &str) -> Option<SchemaId> {
    match current {
        Some(name) if name == clicked => None,
        _ => Some(clicked.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> MetadataRecord {
        MetadataRecord {
            schema_name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let catalog = vec![named("Precipitation_FR"), named("Temperature_DE")];
        let hits = filter_records(&catalog, "temp");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].schema_name, "Temperature_DE");
    }

    #[test]
    fn empty_search_keeps_everything() {
        let catalog = vec![named("a"), named("b")];
        assert_eq!(filter_records(&catalog, "").len(), 2);
    }

    #[test]
    fn toggle_semantics() {
        assert_eq!(toggle_selection(None, "a"), Some("a".to_string()));
        assert_eq!(toggle_selection(Some("a".into()), "a"), None);
        assert_eq!(toggle_selection(Some("a".into()), "b"), Some("b".to_string()));
    }
}
