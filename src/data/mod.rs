/// Data layer: core types, loading, searching and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet  (path or URL)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → Table, cached per location
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  columns + Vec<Record>, missing cells = ""
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  search   │  case-insensitive substring on one column → SearchResult
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group + count + rank → top-N Histogram
///   └───────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod search;
