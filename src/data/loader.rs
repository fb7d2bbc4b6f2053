use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{MetadataRecord, MetadataTable};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Columns of `metadata.csv`, in write order.
pub const COLUMNS: [&str; 9] = [
    "filename",
    "method",
    "location",
    "sample",
    "mode",
    "magnification",
    "magnification_value",
    "ext",
    "rel_path",
];

/// Default name of the persisted table inside a dataset folder.
pub const DEFAULT_CSV_NAME: &str = "metadata.csv";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("metadata.csv is missing required columns: {}", .columns.join(", "))]
    MissingRequiredColumn { columns: Vec<String> },
}

/// One CSV row exactly as stored.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    filename: String,
    method: String,
    location: String,
    sample: String,
    mode: String,
    magnification: String,
    magnification_value: String,
    ext: String,
    rel_path: String,
}

impl From<&MetadataRecord> for CsvRow {
    fn from(rec: &MetadataRecord) -> Self {
        CsvRow {
            filename: rec.filename.clone(),
            method: rec.method.clone(),
            location: rec.location.clone(),
            sample: rec.sample.clone(),
            mode: rec.mode.clone(),
            magnification: rec.magnification.clone(),
            magnification_value: rec
                .magnification_value
                .map(format_decimal)
                .unwrap_or_default(),
            ext: rec.extension.clone(),
            rel_path: rec.relative_path.clone(),
        }
    }
}

impl From<CsvRow> for MetadataRecord {
    fn from(row: CsvRow) -> Self {
        // Non-numeric text coerces to "no value" rather than failing the load.
        let magnification_value = row.magnification_value.trim().parse::<f64>().ok();
        MetadataRecord {
            filename: row.filename,
            method: row.method,
            location: row.location,
            sample: row.sample,
            mode: row.mode,
            magnification: row.magnification,
            magnification_value,
            extension: row.ext,
            relative_path: row.rel_path,
        }
    }
}

/// Decimal text that always shows a fractional part (`10.0`, `10.5`).
fn format_decimal(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Serialize the table as CSV (header included) into any writer.
pub fn write_records<W: Write>(writer: W, table: &MetadataTable) -> Result<(), LoadError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    // Written by hand so an empty table still gets its header row.
    wtr.write_record(COLUMNS)?;
    for rec in table {
        wtr.serialize(CsvRow::from(rec))?;
    }
    wtr.flush().map_err(|source| LoadError::Io {
        path: "<writer>".to_string(),
        source,
    })?;
    Ok(())
}

/// Write the table to `path`, replacing any existing file.
pub fn write_table(path: &Path, table: &MetadataTable) -> Result<(), LoadError> {
    let file = std::fs::File::create(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_records(file, table)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Parse CSV text into a table.
///
/// Header names are trimmed and lowercased first. All nine columns must be
/// present; extra columns are ignored and order does not matter.
pub fn read_records<R: Read>(reader: R) -> Result<MetadataTable, LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: csv::StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let present: BTreeSet<&str> = headers.iter().collect();
    let missing: BTreeSet<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingRequiredColumn {
            columns: missing.into_iter().map(String::from).collect(),
        });
    }
    rdr.set_headers(headers);

    let mut records = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        records.push(MetadataRecord::from(row?));
    }
    log::debug!("read {} metadata rows", records.len());
    Ok(MetadataTable::from_records(records))
}

/// Load `metadata.csv` from disk.
pub fn load_table(path: &Path) -> Result<MetadataTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_records(file)?;
    log::info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MetadataRecord {
        MetadataRecord {
            filename: "PCM_BIU_glass_lube_NA_10x.jpg".to_string(),
            method: "PCM".to_string(),
            location: "BIU".to_string(),
            sample: "glass_lube".to_string(),
            mode: "NA".to_string(),
            magnification: "10x".to_string(),
            magnification_value: Some(10.0),
            extension: ".jpg".to_string(),
            relative_path: "PCM_BIU_glass_lube_NA_10x.jpg".to_string(),
        }
    }

    #[test]
    fn writes_header_and_decimal_values() {
        let mut other = sample_record();
        other.magnification = "NA".to_string();
        other.magnification_value = None;
        let table = MetadataTable::from_records(vec![sample_record(), other]);

        let mut buf = Vec::new();
        write_records(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "filename,method,location,sample,mode,magnification,magnification_value,ext,rel_path"
        );
        assert_eq!(
            lines[1],
            "PCM_BIU_glass_lube_NA_10x.jpg,PCM,BIU,glass_lube,NA,10x,10.0,.jpg,PCM_BIU_glass_lube_NA_10x.jpg"
        );
        assert!(lines[2].contains(",NA,,.jpg,"));
    }

    #[test]
    fn empty_table_still_has_a_header() {
        let mut buf = Vec::new();
        write_records(&mut buf, &MetadataTable::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(read_records(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn reload_gives_back_the_same_records() {
        let mut fractional = sample_record();
        fractional.magnification_value = Some(10.5);
        fractional.sample = "comma, inside".to_string();
        let table = MetadataTable::from_records(vec![sample_record(), fractional]);

        let mut buf = Vec::new();
        write_records(&mut buf, &table).unwrap();
        assert_eq!(read_records(buf.as_slice()).unwrap(), table);
    }

    #[test]
    fn headers_are_case_and_order_insensitive() {
        let csv = "REL_PATH, Filename ,method,location,sample,mode,magnification,magnification_value,ext,extra\n\
                   a.jpg,a.jpg,PCM,BIU,s,NA,10x,not-a-number,.jpg,ignored\n";
        let table = read_records(csv.as_bytes()).unwrap();
        let rec = &table.records()[0];
        assert_eq!(rec.filename, "a.jpg");
        assert_eq!(rec.relative_path, "a.jpg");
        assert_eq!(rec.magnification_value, None);
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let csv = "filename,method,sample,mode,magnification,ext\nx,y,z,w,v,.jpg\n";
        match read_records(csv.as_bytes()) {
            Err(LoadError::MissingRequiredColumn { columns }) => {
                assert_eq!(columns, vec!["location", "magnification_value", "rel_path"]);
            }
            other => panic!("expected MissingRequiredColumn, got {other:?}"),
        }
    }
}
