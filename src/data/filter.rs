use std::collections::{BTreeMap, BTreeSet};

use super::model::{Field, MetadataRecord, MetadataTable};

/// Fields that can be narrowed with a value checklist.
pub const FACETS: [Field; 4] = [
    Field::Method,
    Field::Location,
    Field::Mode,
    Field::Magnification,
];

// ---------------------------------------------------------------------------
// Filter configuration
// ---------------------------------------------------------------------------

/// Free-text search plus per-facet value selections.
///
/// A facet missing from `selections` is unconstrained. A facet present with
/// an empty set hides every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Case-insensitive substring matched against `sample` or `filename`.
    pub search: String,
    pub selections: BTreeMap<Field, BTreeSet<String>>,
}

impl FilterConfig {
    /// Every facet selected with all values observed in `table`.
    pub fn all_selected(table: &MetadataTable) -> Self {
        FilterConfig {
            search: String::new(),
            selections: FACETS
                .iter()
                .map(|&f| (f, table.unique_values(f)))
                .collect(),
        }
    }

    /// Replace the selection for one facet.
    pub fn with_selection<I, S>(mut self, field: Field, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections
            .insert(field, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Whether a single record passes every facet.
    pub fn matches(&self, record: &MetadataRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        self.matches_search(&needle, record) && self.matches_facets(record)
    }

    fn matches_search(&self, needle: &str, record: &MetadataRecord) -> bool {
        needle.is_empty()
            || record.sample.to_lowercase().contains(needle)
            || record.filename.to_lowercase().contains(needle)
    }

    fn matches_facets(&self, record: &MetadataRecord) -> bool {
        self.selections
            .iter()
            .all(|(field, selected)| selected.contains(field.value(record)))
    }
}

// ---------------------------------------------------------------------------
// Applying filters
// ---------------------------------------------------------------------------

/// Positions of the rows passing `config`, in table order.
pub fn filtered_indices(table: &MetadataTable, config: &FilterConfig) -> Vec<usize> {
    let needle = config.search.trim().to_lowercase();
    table
        .iter()
        .enumerate()
        .filter(|(_, rec)| config.matches_search(&needle, rec) && config.matches_facets(rec))
        .map(|(i, _)| i)
        .collect()
}

/// New table holding only the rows passing `config`.
pub fn apply_filters(table: &MetadataTable, config: &FilterConfig) -> MetadataTable {
    table.select(&filtered_indices(table, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn table() -> MetadataTable {
        let mut dic = record("DIC_LAB_GlassLube_POL_20x.png", "DIC", "GlassLube", "20x");
        dic.location = "LAB".to_string();
        dic.mode = "POL".to_string();
        MetadataTable::from_records(vec![
            record("PCM_BIU_steel_NA_10x.jpg", "PCM", "steel", "10x"),
            dic,
            record("PCM_BIU_glassLube_NA_NA.jpg", "PCM", "glassLube", "NA"),
        ])
    }

    fn names(t: &MetadataTable) -> Vec<&str> {
        t.iter().map(|r| r.filename.as_str()).collect()
    }

    #[test]
    fn full_selection_is_identity() {
        let t = table();
        assert_eq!(apply_filters(&t, &FilterConfig::all_selected(&t)), t);
        assert_eq!(apply_filters(&t, &FilterConfig::default()), t);
    }

    #[test]
    fn search_matches_sample_or_filename_case_insensitively() {
        let t = table();
        let cfg = FilterConfig::all_selected(&t).with_search("  GLASSLUBE ");
        assert_eq!(
            names(&apply_filters(&t, &cfg)),
            vec!["DIC_LAB_GlassLube_POL_20x.png", "PCM_BIU_glassLube_NA_NA.jpg"]
        );

        let by_filename = FilterConfig::default().with_search("pcm_biu");
        assert_eq!(apply_filters(&t, &by_filename).len(), 2);
    }

    #[test]
    fn facets_combine_with_and() {
        let t = table();
        let cfg = FilterConfig::all_selected(&t)
            .with_selection(Field::Method, ["PCM"])
            .with_selection(Field::Magnification, ["10x", "20x"]);
        assert_eq!(names(&apply_filters(&t, &cfg)), vec!["PCM_BIU_steel_NA_10x.jpg"]);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let t = table();
        let cfg = FilterConfig::all_selected(&t).with_selection(Field::Mode, Vec::<String>::new());
        assert!(apply_filters(&t, &cfg).is_empty());
    }

    #[test]
    fn indices_preserve_order_and_source_is_untouched() {
        let t = table();
        let before = t.clone();
        let cfg = FilterConfig::default().with_selection(Field::Location, ["BIU"]);
        assert_eq!(filtered_indices(&t, &cfg), vec![0, 2]);
        assert_eq!(t, before);
        assert!(cfg.matches(&t.records()[0]));
        assert!(!cfg.matches(&t.records()[1]));
    }
}
