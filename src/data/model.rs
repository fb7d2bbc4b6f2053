use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Field – the closed set of comparable record attributes
// ---------------------------------------------------------------------------

/// A textual attribute of a [`MetadataRecord`] that can be filtered,
/// pinned or grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Method,
    Location,
    Sample,
    Mode,
    Magnification,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Method,
        Field::Location,
        Field::Sample,
        Field::Mode,
        Field::Magnification,
    ];

    /// Column name as stored in `metadata.csv`.
    pub fn name(self) -> &'static str {
        match self {
            Field::Method => "method",
            Field::Location => "location",
            Field::Sample => "sample",
            Field::Mode => "mode",
            Field::Magnification => "magnification",
        }
    }

    /// Read this attribute from a record.
    pub fn value(self, record: &MetadataRecord) -> &str {
        match self {
            Field::Method => &record.method,
            Field::Location => &record.location,
            Field::Sample => &record.sample,
            Field::Mode => &record.mode,
            Field::Magnification => &record.magnification,
        }
    }

    /// Heading used in reports ("Method", "Magnification", ...).
    pub fn title(self) -> &'static str {
        match self {
            Field::Method => "Method",
            Field::Location => "Location",
            Field::Sample => "Sample",
            Field::Mode => "Mode",
            Field::Magnification => "Magnification",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field '{0}' (expected one of: method, location, sample, mode, magnification)")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MetadataRecord – one row of metadata.csv
// ---------------------------------------------------------------------------

/// Metadata decoded from a single image filename.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    /// Original file name including the extension.
    pub filename: String,
    pub method: String,
    pub location: String,
    /// May itself contain `_`.
    pub sample: String,
    pub mode: String,
    /// Raw last token, kept verbatim (`10x`, `10_5x`, `NA`).
    pub magnification: String,
    /// Numeric reading of `magnification`, when it has one.
    pub magnification_value: Option<f64>,
    /// Lowercase, with the leading dot.
    pub extension: String,
    /// Path relative to the dataset root, `/`-separated.
    pub relative_path: String,
}

// ---------------------------------------------------------------------------
// MetadataTable – the complete dataset
// ---------------------------------------------------------------------------

/// Ordered records plus pre-computed distinct values per [`Field`].
///
/// Rows are identified by position; the same filename may appear more than
/// once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable {
    records: Vec<MetadataRecord>,
    unique_values: BTreeMap<Field, BTreeSet<String>>,
}

impl MetadataTable {
    /// Build column indices from the records, keeping their order.
    pub fn from_records(records: Vec<MetadataRecord>) -> Self {
        let mut unique_values: BTreeMap<Field, BTreeSet<String>> = BTreeMap::new();
        for rec in &records {
            for field in Field::ALL {
                unique_values
                    .entry(field)
                    .or_default()
                    .insert(field.value(rec).to_string());
            }
        }
        MetadataTable {
            records,
            unique_values,
        }
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataRecord> {
        self.records.iter()
    }

    /// Sorted distinct values observed for `field` (empty for an empty table).
    pub fn unique_values(&self, field: Field) -> BTreeSet<String> {
        self.unique_values.get(&field).cloned().unwrap_or_default()
    }

    /// New table holding the rows at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> MetadataTable {
        let records = indices
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect();
        MetadataTable::from_records(records)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a MetadataTable {
    type Item = &'a MetadataRecord;
    type IntoIter = std::slice::Iter<'a, MetadataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(filename: &str, method: &str, sample: &str, mag: &str) -> MetadataRecord {
        MetadataRecord {
            filename: filename.to_string(),
            method: method.to_string(),
            location: "BIU".to_string(),
            sample: sample.to_string(),
            mode: "NA".to_string(),
            magnification: mag.to_string(),
            magnification_value: None,
            extension: ".jpg".to_string(),
            relative_path: filename.to_string(),
        }
    }

    #[test]
    fn field_parses_case_insensitively() {
        assert_eq!("Magnification".parse::<Field>(), Ok(Field::Magnification));
        assert_eq!(" method ".parse::<Field>(), Ok(Field::Method));
        assert_eq!(
            "colour".parse::<Field>(),
            Err(UnknownField("colour".to_string()))
        );
    }

    #[test]
    fn unique_values_are_sorted_and_deduplicated() {
        let table = MetadataTable::from_records(vec![
            record("a.jpg", "PCM", "s2", "10x"),
            record("b.jpg", "DIC", "s1", "10x"),
            record("c.jpg", "PCM", "s1", "20x"),
        ]);
        let methods: Vec<_> = table.unique_values(Field::Method).into_iter().collect();
        assert_eq!(methods, vec!["DIC", "PCM"]);
        assert_eq!(table.unique_values(Field::Magnification).len(), 2);
        assert!(MetadataTable::default().unique_values(Field::Sample).is_empty());
    }

    #[test]
    fn select_keeps_requested_order_and_duplicates() {
        let table = MetadataTable::from_records(vec![
            record("same.jpg", "PCM", "s1", "10x"),
            record("same.jpg", "DIC", "s1", "10x"),
        ]);
        let picked = table.select(&[1, 0, 7]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.records()[0].method, "DIC");
        assert_eq!(picked.records()[1].method, "PCM");
    }
}
