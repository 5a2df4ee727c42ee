use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{CellValue, ColumnKind, Record, Table};
use crate::error::{Result, SearchError};

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where a dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` locations are URLs, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::Path(PathBuf::from(location))
        }
    }

    /// Lowercased file extension, ignoring any URL query or fragment.
    fn extension(&self) -> String {
        let name = match self {
            DataSource::Path(p) => p.to_string_lossy().into_owned(),
            DataSource::Url(u) => u
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
    }

    /// Read the whole resource into memory.
    fn fetch(&self) -> Result<Vec<u8>> {
        let location = self.to_string();
        match self {
            DataSource::Path(p) => {
                std::fs::read(p).map_err(|e| SearchError::retrieval(&location, e))
            }
            DataSource::Url(u) => {
                let body = http_get(u)?
                    .bytes()
                    .map_err(|e| SearchError::retrieval(&location, e))?;
                Ok(body.to_vec())
            }
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(p) => write!(f, "{}", p.display()),
            DataSource::Url(u) => write!(f, "{u}"),
        }
    }
}

fn http_get(url: &str) -> Result<reqwest::blocking::Response> {
    log::debug!("GET {url}");
    reqwest::blocking::get(url)
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| SearchError::retrieval(url, e))
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset, bypassing the cache.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – header row, comma separated (also the fallback)
/// * `.json`         – `[{ "address": "...", "beds": 3 }, ...]`
/// * `.parquet`      – any flat schema
pub fn load_source(source: &DataSource) -> Result<Table> {
    let location = source.to_string();
    let table = match source.extension().as_str() {
        "parquet" | "pq" => load_parquet(source)?,
        "json" => parse_json(&source.fetch()?, &location)?,
        _ => parse_csv(&source.fetch()?, &location)?,
    };
    log::info!(
        "Loaded {} rows with columns {:?} from {location}",
        table.len(),
        table.columns()
    );
    if table.is_empty() {
        log::warn!("{location} has a header but no rows");
    }
    Ok(table)
}

/// Process-lifetime cache of loaded tables, keyed by source location.
///
/// Each key has its own slot lock, so concurrent callers asking for the same
/// location wait for one load instead of fetching twice. Failed loads leave
/// the slot empty and the next caller retries.
#[derive(Debug, Default)]
pub struct DatasetCache {
    slots: Mutex<HashMap<String, Arc<Mutex<Option<Arc<Table>>>>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for `location`, loading it on first use.
    pub fn load(&self, location: &str) -> Result<Arc<Table>> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(location.to_string()).or_default())
        };

        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = cached.as_ref() {
            log::debug!("Cache hit for {location}");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_source(&DataSource::parse(location))?);
        *cached = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Number of locations with a loaded table.
    #[cfg(test)]
    pub fn loaded(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row gives the column names; every record must have the same
/// number of fields. Empty cells become the empty-string sentinel.
///
/// Types are inferred per column: a column is numeric or boolean only when
/// every non-empty cell is, otherwise all its cells keep their written text.
fn parse_csv(bytes: &[u8], location: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SearchError::parse(location, format!("reading header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| SearchError::parse(location, e))?;

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|col| ColumnKind::detect(rows.iter().map(move |row| row.get(col).unwrap_or(""))))
        .collect();

    let records = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.parse(cell))
                .collect::<Record>()
        })
        .collect();

    Table::new(headers, records).map_err(|e| relocate(e, location))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "address": "100 Main St", "beds": 3 },
///   { "address": "200 Oak Ave", "beds": null }
/// ]
/// ```
///
/// Columns are the union of keys in first-seen order.
fn parse_json(bytes: &[u8], location: &str) -> Result<Table> {
    let root: JsonValue =
        serde_json::from_slice(bytes).map_err(|e| SearchError::parse(location, e))?;
    let rows = root
        .as_array()
        .ok_or_else(|| SearchError::parse(location, "expected top-level JSON array"))?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| SearchError::parse(location, format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let records = objects
        .into_iter()
        .map(|obj| {
            columns
                .iter()
                .map(|c| obj.get(c).map_or_else(CellValue::missing, json_to_cell))
                .collect::<Record>()
        })
        .collect();

    Table::new(columns, records).map_err(|e| relocate(e, location))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::missing(),
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Local files are read in place; remote files are buffered first.
fn load_parquet(source: &DataSource) -> Result<Table> {
    let location = source.to_string();
    match source {
        DataSource::Path(p) => {
            let file = File::open(p).map_err(|e| SearchError::retrieval(&location, e))?;
            read_parquet(file, &location)
        }
        DataSource::Url(u) => {
            let body = http_get(u)?
                .bytes()
                .map_err(|e| SearchError::retrieval(&location, e))?;
            read_parquet(body, &location)
        }
    }
}

/// Works with files written by **Pandas** (`df.to_parquet()`), **Polars**
/// (`df.write_parquet()`) and Arrow writers alike.
fn read_parquet<R: ChunkReader + 'static>(input: R, location: &str) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input)
        .map_err(|e| SearchError::parse(location, format!("reading parquet metadata: {e}")))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| SearchError::parse(location, format!("building parquet reader: {e}")))?;

    let mut records: Vec<Record> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| SearchError::parse(location, e))?;
        let cells = batch
            .columns()
            .iter()
            .map(|col| column_cells(col, location))
            .collect::<Result<Vec<_>>>()?;

        // Column-major → row-major.
        let mut iters: Vec<_> = cells.into_iter().map(Vec::into_iter).collect();
        for _ in 0..batch.num_rows() {
            records.push(iters.iter_mut().filter_map(|it| it.next()).collect());
        }
    }

    Table::new(columns, records).map_err(|e| relocate(e, location))
}

/// Convert one Arrow column into cells; nulls become the empty-string sentinel.
fn column_cells(col: &ArrayRef, location: &str) -> Result<Vec<CellValue>> {
    let cells: Vec<CellValue> = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().iter().map(text_cell).collect(),
        DataType::LargeUtf8 => col.as_string::<i64>().iter().map(text_cell).collect(),
        DataType::Utf8View => col.as_string_view().iter().map(text_cell).collect(),
        DataType::Boolean => col
            .as_boolean()
            .iter()
            .map(|v| v.map_or_else(CellValue::missing, CellValue::Bool))
            .collect(),
        dt if dt.is_integer() => {
            let ints = cast(col, &DataType::Int64).map_err(|e| SearchError::parse(location, e))?;
            ints.as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map_or_else(CellValue::missing, CellValue::Integer))
                .collect()
        }
        dt if dt.is_floating() => {
            let floats =
                cast(col, &DataType::Float64).map_err(|e| SearchError::parse(location, e))?;
            floats
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map_or_else(CellValue::missing, CellValue::Float))
                .collect()
        }
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(col.as_ref(), &options)
                .map_err(|e| SearchError::parse(location, e))?;
            (0..col.len())
                .map(|row| {
                    if col.is_null(row) {
                        CellValue::missing()
                    } else {
                        CellValue::Text(formatter.value(row).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

fn text_cell(v: Option<&str>) -> CellValue {
    v.map_or_else(CellValue::missing, |s| CellValue::Text(s.to_string()))
}

/// Attach the real source location to a parse error raised by `Table::new`.
fn relocate(err: SearchError, location: &str) -> SearchError {
    match err {
        SearchError::Parse { reason, .. } => SearchError::parse(location, reason),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::data::search::search;

    fn temp_file(suffix: &str, contents: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn location(file: &NamedTempFile) -> String {
        file.path().to_string_lossy().into_owned()
    }

    #[test]
    fn parses_source_kinds() {
        assert_eq!(
            DataSource::parse("https://example.com/a.csv"),
            DataSource::Url("https://example.com/a.csv".into())
        );
        assert_eq!(
            DataSource::parse("data/listings.csv"),
            DataSource::Path(PathBuf::from("data/listings.csv"))
        );
        assert_eq!(
            DataSource::parse("HTTP://example.com/x.parquet?raw=1").extension(),
            "parquet"
        );
        assert_eq!(DataSource::parse("listings").extension(), "");
    }

    #[test]
    fn csv_missing_cells_become_empty_text() {
        let file = temp_file(".csv", b"address,beds,price\n100 Main St,3,\n200 Oak Ave,,450000\n");
        let table = load_source(&DataSource::parse(&location(&file))).unwrap();

        assert_eq!(table.columns(), &["address", "beds", "price"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "price"), Some(&CellValue::missing()));
        assert_eq!(table.value(1, "beds"), Some(&CellValue::missing()));
        assert_eq!(table.value(0, "beds"), Some(&CellValue::Integer(3)));
        assert_eq!(table.value(1, "price"), Some(&CellValue::Integer(450000)));
    }

    #[test]
    fn csv_quoted_fields() {
        let file = temp_file(".csv", b"address,beds\n\"1 Main St, Unit 2\",2\n");
        let table = load_source(&DataSource::parse(&location(&file))).unwrap();
        assert_eq!(
            table.value(0, "address"),
            Some(&CellValue::from("1 Main St, Unit 2"))
        );
    }

    #[test]
    fn mixed_text_column_keeps_written_form() {
        let file = temp_file(".csv", b"address,beds
0042,3
Unit 7 Main St,2
3.50,
1e3,4
");
        let table = load_source(&DataSource::parse(&location(&file))).unwrap();

        assert_eq!(table.value(0, "address"), Some(&CellValue::from("0042")));
        assert_eq!(table.value(2, "address"), Some(&CellValue::from("3.50")));
        assert_eq!(table.value(3, "address"), Some(&CellValue::from("1e3")));
        for query in ["0042", "3.50", "1e3"] {
            let found = search(&table, "address", query).unwrap();
            assert_eq!(found.len(), 1, "query {query:?}");
        }
        // Fully numeric columns are still typed.
        assert_eq!(table.value(3, "beds"), Some(&CellValue::Integer(4)));
        assert_eq!(table.value(2, "beds"), Some(&CellValue::missing()));
    }

    #[test]
    fn csv_column_types_are_inferred_per_column() {
        let file = temp_file(
            ".csv",
            b"price,baths,active,zip
450000,2.5,true,78704
,1,false,TX-1
",
        );
        let table = load_source(&DataSource::parse(&location(&file))).unwrap();

        assert_eq!(table.value(0, "price"), Some(&CellValue::Integer(450000)));
        assert!(matches!(table.value(1, "baths"), Some(CellValue::Float(f)) if *f == 1.0));
        assert_eq!(table.value(1, "active"), Some(&CellValue::Bool(false)));
        assert_eq!(table.value(0, "zip"), Some(&CellValue::from("78704")));
    }

    #[test]
    fn csv_header_only_is_an_empty_table() {
        let file = temp_file(".csv", b"address,beds
");
        let table = load_source(&DataSource::parse(&location(&file))).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["address", "beds"]);
    }

    #[test]
    fn csv_ragged_row_is_parse_error() {
        let file = temp_file(".csv", b"address,beds\n100 Main St,3\n200 Oak Ave\n");
        let err = load_source(&DataSource::parse(&location(&file))).unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }), "{err}");
    }

    #[test]
    fn csv_invalid_utf8_is_parse_error() {
        let file = temp_file(".csv", b"address,beds\n\xff\xfe Main,3\n");
        let err = load_source(&DataSource::parse(&location(&file))).unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }), "{err}");
    }

    #[test]
    fn unknown_extension_reads_as_csv() {
        let file = temp_file(".data", b"address\n1 Elm\n");
        let table = load_source(&DataSource::parse(&location(&file))).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_file_is_retrieval_error() {
        let err = load_source(&DataSource::parse("/nonexistent/listings.csv")).unwrap_err();
        assert!(matches!(err, SearchError::Retrieval { .. }), "{err}");
    }

    #[test]
    fn json_records_union_keys() {
        let file = temp_file(
            ".json",
            br#"[{"address": "1 Main", "beds": 3}, {"address": "2 Oak", "beds": null, "baths": 1.5}]"#,
        );
        let table = load_source(&DataSource::parse(&location(&file))).unwrap();
        assert_eq!(table.columns(), &["address", "beds", "baths"]);
        assert_eq!(table.value(0, "baths"), Some(&CellValue::missing()));
        assert_eq!(table.value(1, "beds"), Some(&CellValue::missing()));
        assert_eq!(table.value(1, "baths"), Some(&CellValue::Float(1.5)));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        let file = temp_file(".json", br#"{"address": "1 Main"}"#);
        let err = load_source(&DataSource::parse(&location(&file))).unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }));

        let file = temp_file(".json", br#"[1, 2]"#);
        let err = load_source(&DataSource::parse(&location(&file))).unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }));
    }

    #[test]
    fn parquet_nulls_become_empty_text() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("address", DataType::Utf8, true),
            Field::new("beds", DataType::Int32, true),
            Field::new("price", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("1 Main"), None])),
                Arc::new(Int32Array::from(vec![None, Some(4)])),
                Arc::new(Float64Array::from(vec![Some(1.5), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_source(&DataSource::parse(&location(&file))).unwrap();
        assert_eq!(table.columns(), &["address", "beds", "price"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "address"), Some(&CellValue::from("1 Main")));
        assert_eq!(table.value(1, "address"), Some(&CellValue::missing()));
        assert_eq!(table.value(0, "beds"), Some(&CellValue::missing()));
        assert_eq!(table.value(1, "beds"), Some(&CellValue::Integer(4)));
        assert_eq!(table.value(0, "price"), Some(&CellValue::Float(1.5)));
        assert_eq!(table.value(1, "price"), Some(&CellValue::missing()));
    }

    #[test]
    fn corrupt_parquet_is_parse_error() {
        let file = temp_file(".parquet", b"not a parquet file");
        let err = load_source(&DataSource::parse(&location(&file))).unwrap_err();
        assert!(matches!(err, SearchError::Parse { .. }), "{err}");
    }

    #[test]
    fn cache_serves_the_first_load() {
        let file = temp_file(".csv", b"address\n1 Main\n");
        let loc = location(&file);
        let cache = DatasetCache::new();

        let first = cache.load(&loc).unwrap();
        std::fs::write(file.path(), b"address\n1 Main\n2 Oak\n").unwrap();
        let second = cache.load(&loc).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
        assert_eq!(cache.loaded(), 1);
    }

    #[test]
    fn cache_does_not_keep_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("later.csv");
        let loc = path.to_string_lossy().into_owned();
        let cache = DatasetCache::new();

        assert!(cache.load(&loc).is_err());
        assert_eq!(cache.loaded(), 0);

        std::fs::write(&path, b"address\n1 Main\n").unwrap();
        assert_eq!(cache.load(&loc).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_loads_share_one_table() {
        let file = temp_file(".csv", b"address\n1 Main\n");
        let loc = location(&file);
        let cache = Arc::new(DatasetCache::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let loc = loc.clone();
                std::thread::spawn(move || cache.load(&loc).unwrap())
            })
            .collect();
        let tables: Vec<Arc<Table>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(tables.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
