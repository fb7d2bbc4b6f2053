use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use crate::data::group::{Group, Pin};
use crate::data::model::{Field, MetadataRecord};
use crate::data::source::ImageSource;

/// Message shown whenever a view has nothing to display.
pub const EMPTY_STATE: &str = "No data matches your filters.";

// ---------------------------------------------------------------------------
// Captions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptionStyle {
    #[default]
    Filename,
    Short,
    Full,
}

impl CaptionStyle {
    pub fn caption(self, rec: &MetadataRecord) -> String {
        match self {
            CaptionStyle::Filename => rec.filename.clone(),
            CaptionStyle::Short => {
                format!("{} | {} | {}", rec.method, rec.sample, rec.magnification)
            }
            CaptionStyle::Full => format!(
                "Method: {} • Location: {} • Sample: {} • Mode: {} • Mag: {}",
                rec.method, rec.location, rec.sample, rec.mode, rec.magnification
            ),
        }
    }
}

impl FromStr for CaptionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filename" => Ok(CaptionStyle::Filename),
            "short" => Ok(CaptionStyle::Short),
            "full" => Ok(CaptionStyle::Full),
            other => Err(format!(
                "unknown caption style '{other}' (expected filename, short or full)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One image slot in a comparison group.
#[derive(Debug, Serialize)]
pub struct ReportRow<'a> {
    pub caption: String,
    pub image: String,
    pub record: &'a MetadataRecord,
}

#[derive(Debug, Serialize)]
pub struct ReportGroup<'a> {
    pub key: &'a str,
    pub rows: Vec<ReportRow<'a>>,
}

/// A rendered comparison: the pin, the grouping field and its groups.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// `None` when no pin value is available at all.
    pub pin: Option<&'a Pin>,
    pub group_by: Field,
    pub groups: Vec<ReportGroup<'a>>,
}

impl<'a> Report<'a> {
    pub fn new(
        pin: Option<&'a Pin>,
        group_by: Field,
        groups: &'a [Group],
        captions: CaptionStyle,
        images: &ImageSource,
    ) -> Self {
        let groups = groups
            .iter()
            .map(|g| ReportGroup {
                key: &g.key,
                rows: g
                    .rows
                    .iter()
                    .map(|rec| ReportRow {
                        caption: captions.caption(rec),
                        image: images.resolve(&rec.relative_path),
                        record: rec,
                    })
                    .collect(),
            })
            .collect();
        Report {
            pin,
            group_by,
            groups,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(pin) = self.pin {
            let _ = writeln!(out, "{}: {}", pin.mode.pinned_field().title(), pin.value);
        }
        if self.groups.is_empty() {
            let _ = writeln!(out, "{EMPTY_STATE}");
            return out;
        }
        for group in &self.groups {
            let _ = writeln!(out);
            let _ = writeln!(out, "### {}: {}", self.group_by.title(), group.key);
            for row in &group.rows {
                let _ = writeln!(out, "  {}  ->  {}", row.caption, row.image);
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
