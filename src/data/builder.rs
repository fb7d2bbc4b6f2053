use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::model::{MetadataRecord, MetadataTable};
use super::parser::{parse_filename, ParseError};

/// Extensions picked up when none are given: common raster formats plus DICOM.
pub const DEFAULT_EXTENSIONS: [&str; 9] = [
    ".png", ".jpg", ".jpeg", ".tif", ".tiff", ".bmp", ".gif", ".webp", ".dcm",
];

/// How many skip reasons a summary prints before collapsing the rest.
pub const SKIP_SUMMARY_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Folder not found or not a directory: {}", .0.display())]
    InvalidRootFolder(PathBuf),

    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Extension allow-list
// ---------------------------------------------------------------------------

/// Case-insensitive set of accepted file suffixes, each stored as `.ext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    allowed: BTreeSet<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = extensions
            .into_iter()
            .map(|e| {
                let e = e.as_ref().trim().to_lowercase();
                if e.starts_with('.') {
                    e
                } else {
                    format!(".{e}")
                }
            })
            .collect();
        ExtensionFilter { allowed }
    }

    pub fn allows(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => self
                .allowed
                .contains(&format!(".{}", ext.to_string_lossy().to_lowercase())),
            None => false,
        }
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        ExtensionFilter::new(DEFAULT_EXTENSIONS)
    }
}

// ---------------------------------------------------------------------------
// Build report
// ---------------------------------------------------------------------------

/// A file that matched the extension filter but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: ParseError,
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.filename, self.reason)
    }
}

/// Outcome of one pass over a directory listing.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub table: MetadataTable,
    pub skipped: Vec<SkippedFile>,
    /// Every entry handed to the builder.
    pub entries_seen: usize,
    /// Entries whose extension passed the filter.
    pub considered: usize,
}

impl BuildReport {
    pub fn rows(&self) -> usize {
        self.table.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// The first `limit` skip reasons, then one line counting the rest.
    pub fn skip_summary(&self, limit: usize) -> Vec<String> {
        let mut lines: Vec<String> = self
            .skipped
            .iter()
            .take(limit)
            .map(|s| s.to_string())
            .collect();
        if self.skipped.len() > limit {
            lines.push(format!("... and {} more", self.skipped.len() - limit));
        }
        lines
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Parse every allowed entry into a record, in listing order.
///
/// A file that fails to parse is recorded in [`BuildReport::skipped`] and
/// the pass continues.
pub fn build_table<P: AsRef<Path>>(
    root: &Path,
    entries: &[P],
    extensions: &ExtensionFilter,
) -> BuildReport {
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut considered = 0;

    for entry in entries {
        let path = entry.as_ref();
        if !extensions.allows(path) {
            continue;
        }
        considered += 1;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match parse_filename(&filename) {
            Ok(parsed) => records.push(MetadataRecord {
                relative_path: relative_path(root, path),
                filename,
                method: parsed.method,
                location: parsed.location,
                sample: parsed.sample,
                mode: parsed.mode,
                magnification: parsed.magnification,
                magnification_value: parsed.magnification_value,
                extension: parsed.extension,
            }),
            Err(reason) => {
                log::debug!("skipping {filename}: {reason}");
                skipped.push(SkippedFile { filename, reason });
            }
        }
    }

    log::info!(
        "built {} rows from {} entries ({} skipped)",
        records.len(),
        entries.len(),
        skipped.len()
    );

    BuildReport {
        table: MetadataTable::from_records(records),
        skipped,
        entries_seen: entries.len(),
        considered,
    }
}

/// `path` relative to `root`, joined with `/` so it can be appended to a
/// URL prefix as well as a local folder.
///
/// A path outside `root` is returned as given.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let Ok(rel) = path.strip_prefix(root) else {
        return path.to_string_lossy().into_owned();
    };
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Regular files directly under `root`, sorted by path.
pub fn scan_dir(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidRootFolder(root.to_path_buf()));
    }
    let io_err = |source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(root).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(names: &[&str]) -> BuildReport {
        let root = Path::new("/data/set");
        let entries: Vec<PathBuf> = names.iter().map(|n| root.join(n)).collect();
        build_table(root, &entries, &ExtensionFilter::default())
    }

    #[test]
    fn extension_filter_normalizes_entries() {
        let filter = ExtensionFilter::new(["PNG", ".Jpg", " tif "]);
        assert!(filter.allows(Path::new("a.png")));
        assert!(filter.allows(Path::new("a.JPG")));
        assert!(filter.allows(Path::new("a.tif")));
        assert!(!filter.allows(Path::new("a.gif")));
        assert!(!filter.allows(Path::new("noext")));
    }

    #[test]
    fn mixed_listing_keeps_good_rows_and_reports_bad_ones() {
        let report = build(&[
            "PCM_BIU_glassLube_NA_10x.jpg",
            "DIC_LAB_foo_POL_20x.png",
            "bad.jpg",
        ]);
        assert_eq!(report.rows(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].filename, "bad.jpg");
        let values: Vec<_> = report
            .table
            .iter()
            .map(|r| r.magnification_value)
            .collect();
        assert_eq!(values, vec![Some(10.0), Some(20.0)]);
    }

    #[test]
    fn disallowed_extensions_are_not_considered() {
        let report = build(&["PCM_BIU_s_NA_10x.jpg", "metadata.csv", "notes.txt"]);
        assert_eq!(report.entries_seen, 3);
        assert_eq!(report.considered, 1);
        assert_eq!(report.rows(), 1);
        assert_eq!(report.skipped_count(), 0);
    }

    #[test]
    fn rows_follow_listing_order_and_carry_relative_paths() {
        let report = build(&["Z_A_s_NA_1x.png", "A_A_s_NA_1x.png"]);
        let names: Vec<_> = report.table.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["Z_A_s_NA_1x.png", "A_A_s_NA_1x.png"]);
        assert_eq!(report.table.records()[0].relative_path, "Z_A_s_NA_1x.png");
    }

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = Path::new("/data");
        let path = Path::new("/data/sub/dir/PCM_BIU_s_NA_1x.png");
        assert_eq!(relative_path(root, path), "sub/dir/PCM_BIU_s_NA_1x.png");
    }

    #[test]
    fn relative_path_keeps_parent_steps_and_foreign_paths() {
        let root = Path::new("/data");
        assert_eq!(
            relative_path(root, Path::new("/data/sub/../x.jpg")),
            "sub/../x.jpg"
        );
        let outside = Path::new("../x.jpg");
        assert_eq!(relative_path(root, outside), "../x.jpg");
        let elsewhere = Path::new("/other/x.jpg");
        assert_eq!(
            relative_path(root, elsewhere),
            elsewhere.to_string_lossy()
        );
    }

    #[test]
    fn skip_summary_is_bounded_but_counts_the_rest() {
        let names: Vec<String> = (0..25).map(|i| format!("bad{i}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let report = build(&refs);
        let summary = report.skip_summary(SKIP_SUMMARY_LIMIT);
        assert_eq!(summary.len(), SKIP_SUMMARY_LIMIT + 1);
        assert!(summary[0].starts_with("bad0.jpg: expected at least 5 tokens"));
        assert_eq!(summary.last().unwrap(), "... and 5 more");

        let short = build(&["bad.jpg"]).skip_summary(SKIP_SUMMARY_LIMIT);
        assert_eq!(short.len(), 1);
    }

    #[test]
    fn scan_dir_rejects_missing_root() {
        let err = scan_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, ScanError::InvalidRootFolder(_)));
    }

    #[test]
    fn scan_dir_lists_sorted_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"").unwrap();
        std::fs::create_dir(dir.path().join("c.jpg")).unwrap();
        let files = scan_dir(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }
}
