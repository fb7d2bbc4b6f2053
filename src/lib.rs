//! Metadata index for microscopy image folders whose filenames follow
//! `METHOD_LOCATION_SAMPLE_MODE_MAGNIFICATION.ext`.

pub mod data;
pub mod state;
pub mod ui;

pub use data::model::{Field, MetadataRecord, MetadataTable};
