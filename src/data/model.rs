use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SearchError};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// There is no null variant: missing cells are normalized to `Text("")` at
/// load time, so every consumer can treat a cell as text.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    /// The empty-string sentinel used for missing data.
    pub fn missing() -> Self {
        CellValue::Text(String::new())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Integer(_) | CellValue::Float(_) => 1,
            CellValue::Text(_) => 2,
        }
    }
}

// -- Manual Eq/Ord: numbers compare numerically across Integer/Float, so
//    equality has to follow the ordering rather than the variant.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        let (ra, rb) = (self.rank(), other.rank());
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)),
            (Integer(a), Float(b)) => cmp_int_float(*a, *b),
            (Float(a), Integer(b)) => cmp_int_float(*b, *a).reverse(),
            _ => Ordering::Equal,
        }
    }
}

/// Exact comparison of an integer with a float, without rounding the
/// integer through `f64`. NaNs sort by sign to the ends, as `total_cmp` does.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, exactly representable.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal if f > whole => Ordering::Less,
        Ordering::Equal if f < whole => Ordering::Greater,
        other => other,
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – type inference over a whole delimited column
// ---------------------------------------------------------------------------

/// The type shared by every non-empty cell of a text column.
///
/// A column is numeric only when all of its non-empty cells are, so a text
/// column keeps values like `0042` or `3.50` exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    pub fn detect<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> Self {
        let mut present = cells.filter(|s| !s.is_empty());
        if present.clone().next().is_none() {
            return ColumnKind::Text;
        }
        if present.clone().all(|s| s.parse::<i64>().is_ok()) {
            ColumnKind::Integer
        } else if present.clone().all(parses_as_float) {
            ColumnKind::Float
        } else if present.all(|s| s == "true" || s == "false") {
            ColumnKind::Bool
        } else {
            ColumnKind::Text
        }
    }

    /// Convert one cell; empty cells become the missing sentinel.
    pub fn parse(self, s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::missing();
        }
        let typed = match self {
            ColumnKind::Integer => s.parse().ok().map(CellValue::Integer),
            ColumnKind::Float => s.parse().ok().map(CellValue::Float),
            ColumnKind::Bool => Some(CellValue::Bool(s == "true")),
            ColumnKind::Text => None,
        };
        typed.unwrap_or_else(|| CellValue::Text(s.to_string()))
    }
}

// Rust accepts "inf" / "NaN" as floats; listings text should stay text.
fn parses_as_float(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit()) && s.parse::<f64>().is_ok()
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One row; values are positional with [`Table::columns`].
pub type Record = Vec<CellValue>;

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An immutable, uniform-schema table.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<Record>,
}

impl Table {
    /// Build a table, checking that every record carries one value per column.
    ///
    /// Repeated header names are made unique by suffixing `.1`, `.2`, ...
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Result<Self> {
        let columns = dedupe_columns(columns);
        for (row, record) in records.iter().enumerate() {
            if record.len() != columns.len() {
                return Err(SearchError::Parse {
                    location: String::from("<table>"),
                    reason: format!(
                        "row {row} has {} fields but the header declares {}",
                        record.len(),
                        columns.len()
                    ),
                });
            }
        }
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Ok(Table {
            columns,
            index,
            records,
        })
    }

    /// Declared column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Position of `column`, or an unknown-column error listing what exists.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| SearchError::UnknownColumn {
                column: column.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = *self.index.get(column)?;
        self.records.get(row).map(|r| &r[col])
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn dedupe_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(columns.len());
    for name in columns {
        let mut candidate = name.clone();
        while seen.contains_key(&candidate) {
            let n = seen.entry(name.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{name}.{n}");
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}
