use crate::error::Result;

use super::model::{Record, Table};

// ---------------------------------------------------------------------------
// SearchResult – matching rows, borrowed against the table
// ---------------------------------------------------------------------------

/// An order-preserving subset of a [`Table`], held as row indices.
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> SearchResult<'a> {
    /// The table this result was taken from.
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Row indices into [`SearchResult::table`], ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Matching records in table order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records()[i])
    }

    /// The first `n` matching records.
    pub fn head(&self, n: usize) -> impl Iterator<Item = &'a Record> + '_ {
        self.records().take(n)
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Substring search
// ---------------------------------------------------------------------------

/// Return the rows whose `column` value contains `query`, ignoring case.
///
/// The test runs on each value's textual form, so numeric cells match on
/// their digits. The query is a literal: no anchoring, tokenizing or
/// whitespace folding. An empty query matches every row.
pub fn search<'a>(table: &'a Table, column: &str, query: &str) -> Result<SearchResult<'a>> {
    let col = table.column_index(column)?;
    let needle = query.to_lowercase();

    let indices = if needle.is_empty() {
        (0..table.len()).collect()
    } else {
        table
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| contains_folded(&record[col].to_string(), &needle))
            .map(|(i, _)| i)
            .collect()
    };

    Ok(SearchResult { table, indices })
}

/// Case-insensitive containment of an already lowercased `needle`.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Rebuild a result from indices previously produced by [`search`].
///
/// Indices past the end of the table are dropped.
pub fn from_indices(table: &Table, mut indices: Vec<usize>) -> SearchResult<'_> {
    indices.retain(|&i| i < table.len());
    indices.sort_unstable();
    indices.dedup();
    SearchResult { table, indices }
}
