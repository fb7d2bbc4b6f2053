//! Plain-text and JSON presentation of comparison groups.

pub mod report;
