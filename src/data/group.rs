use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::{Field, MetadataRecord, MetadataTable};

// ---------------------------------------------------------------------------
// Pinned axis
// ---------------------------------------------------------------------------

/// Which attribute is held fixed while the other axis varies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    BySample,
    ByMethod,
}

impl ViewMode {
    pub fn pinned_field(self) -> Field {
        match self {
            ViewMode::BySample => Field::Sample,
            ViewMode::ByMethod => Field::Method,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::BySample => f.write_str("sample"),
            ViewMode::ByMethod => f.write_str("method"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sample" | "by-sample" => Ok(ViewMode::BySample),
            "method" | "by-method" => Ok(ViewMode::ByMethod),
            other => Err(format!("unknown view mode '{other}' (expected sample or method)")),
        }
    }
}

/// One concrete value of the pinned attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pin {
    pub mode: ViewMode,
    pub value: String,
}

impl Pin {
    pub fn new(mode: ViewMode, value: impl Into<String>) -> Self {
        Pin {
            mode,
            value: value.into(),
        }
    }

    fn matches(&self, record: &MetadataRecord) -> bool {
        self.mode.pinned_field().value(record) == self.value
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Rows sharing one value of the grouping field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: String,
    pub rows: Vec<MetadataRecord>,
}

/// Candidate pin values for a view mode, sorted.
pub fn pin_options(table: &MetadataTable, mode: ViewMode) -> Vec<String> {
    table
        .unique_values(mode.pinned_field())
        .into_iter()
        .collect()
}

/// Keep rows matching `pin`, split them by `group_by`, and order both the
/// groups and the rows inside them.
///
/// Groups are ordered by [`natural_cmp`] on their key; rows inside a group by
/// filename. Equal filenames keep their table order. No matching row gives
/// an empty result.
pub fn group_rows(table: &MetadataTable, pin: &Pin, group_by: Field) -> Vec<Group> {
    let mut buckets: BTreeMap<NaturalKey, Vec<MetadataRecord>> = BTreeMap::new();
    for rec in table.iter().filter(|r| pin.matches(r)) {
        buckets
            .entry(NaturalKey(group_by.value(rec).to_string()))
            .or_default()
            .push(rec.clone());
    }

    buckets
        .into_iter()
        .map(|(NaturalKey(key), mut rows)| {
            rows.sort_by(|a, b| a.filename.cmp(&b.filename));
            Group { key, rows }
        })
        .collect()
}

/// Group key ordered with [`natural_cmp`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct NaturalKey(String);

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare strings treating runs of ASCII digits as numbers, so `5x` sorts
/// before `10x`. Falls back to byte order when the natural reading ties
/// (`05x` vs `5x`), which keeps the ordering total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut ai, mut bi) = (a.char_indices().peekable(), b.char_indices().peekable());
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((sa, ca)), Some((sb, cb))) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let ea = digit_run_end(a, sa);
                    let eb = digit_run_end(b, sb);
                    let na = a[sa..ea].trim_start_matches('0');
                    let nb = b[sb..eb].trim_start_matches('0');
                    let ord = na.len().cmp(&nb.len()).then_with(|| na.cmp(nb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    while ai.peek().is_some_and(|&(i, _)| i < ea) {
                        ai.next();
                    }
                    while bi.peek().is_some_and(|&(i, _)| i < eb) {
                        bi.next();
                    }
                } else {
                    if ca != cb {
                        return ca.cmp(&cb);
                    }
                    ai.next();
                    bi.next();
                }
            }
        }
    }
}

fn digit_run_end(s: &str, start: usize) -> usize {
    s[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |off| start + off)
}
