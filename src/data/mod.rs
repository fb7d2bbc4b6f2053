/// Data layer: filename parsing, the metadata table, persistence, filtering
/// and grouping.
///
/// Architecture:
/// ```text
///  directory listing
///        │
///        ▼
///   ┌──────────┐
///   │  parser   │  filename → ParsedName (per entry)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ builder   │  ParsedName + path → MetadataTable, skipped files
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ loader    │  MetadataTable ⇄ metadata.csv (cache: path + mtime)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  search + facet selections → filtered table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  group    │  pinned sample/method → ordered groups
///   └──────────┘
/// ```

pub mod builder;
pub mod cache;
pub mod filter;
pub mod group;
pub mod loader;
pub mod model;
pub mod parser;
pub mod source;
