//! Filename grammar: `METHOD_LOCATION_SAMPLE_MODE_MAGNIFICATION.ext`.
//!
//! The first two tokens and the last two are anchored; everything between
//! them is the sample name, which may itself contain `_`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Token separator inside a filename stem.
pub const SEPARATOR: char = '_';

/// Minimum number of tokens a stem must split into.
pub const MIN_TOKENS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(
        "expected at least {} tokens separated by '{}' but got {tokens}: {stem}",
        MIN_TOKENS,
        SEPARATOR
    )]
    InvalidFilenameFormat { tokens: usize, stem: String },
}

/// Everything the filename itself tells us; the caller adds the location
/// of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    pub method: String,
    pub location: String,
    pub sample: String,
    pub mode: String,
    pub magnification: String,
    pub magnification_value: Option<f64>,
    pub extension: String,
}

/// Parse a bare file name (no directories) into its metadata tokens.
pub fn parse_filename(name: &str) -> Result<ParsedName, ParseError> {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    let tokens: Vec<&str> = stem.split(SEPARATOR).collect();
    let n = tokens.len();
    if n < MIN_TOKENS {
        return Err(ParseError::InvalidFilenameFormat { tokens: n, stem });
    }

    let sample = if n == MIN_TOKENS {
        tokens[2].to_string()
    } else {
        tokens[2..n - 2].join(SEPARATOR.to_string().as_str())
    };

    let magnification = tokens[n - 1].to_string();
    let magnification_value = magnification_value(&magnification);

    Ok(ParsedName {
        method: tokens[0].to_string(),
        location: tokens[1].to_string(),
        sample,
        mode: tokens[n - 2].to_string(),
        magnification,
        magnification_value,
        extension,
    })
}

fn magnification_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)\s*[xX]?\s*$").expect("magnification regex is valid")
    })
}

/// Numeric reading of a raw magnification token.
///
/// `_` stands in for the decimal point (`10_5x` is 10.5). Anything that is
/// not a plain number with an optional trailing `x` yields `None`.
pub fn magnification_value(raw: &str) -> Option<f64> {
    let normalized = raw.replace(SEPARATOR, ".");
    let caps = magnification_re().captures(&normalized)?;
    caps.get(1)?.as_str().parse::<f64>().ok()
}
