use std::sync::Arc;

use crate::config::SearchConfig;
use crate::data::aggregate::{top_categories, Histogram};
use crate::data::model::{Record, Table};
use crate::data::search::{self, search};
use crate::error::Result;

// ---------------------------------------------------------------------------
// SearchContext – one loaded table plus the page configuration
// ---------------------------------------------------------------------------

/// Built once per loaded dataset and handed to whoever runs queries.
#[derive(Debug, Clone)]
pub struct SearchContext {
    table: Arc<Table>,
    config: SearchConfig,
}

/// The output of one query: matching rows and the ranked histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub query: String,
    /// Row indices of matches, in table order.
    pub matches: Vec<usize>,
    pub histogram: Histogram,
    /// Rows in the table the query ran against.
    pub total_rows: usize,
}

impl SearchContext {
    /// Check that the configured columns exist before any query runs.
    pub fn new(table: Arc<Table>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        table.column_index(&config.search_column)?;
        table.column_index(&config.category_column)?;
        Ok(Self { table, config })
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Filter on the search column, then rank the category column.
    pub fn run(&self, query: &str) -> Result<QueryOutcome> {
        let results = search(&self.table, &self.config.search_column, query)?;
        let histogram = top_categories(&results, &self.config.category_column, self.config.top_n)?;
        log::debug!(
            "query {query:?}: {} of {} rows, {} categories",
            results.len(),
            self.table.len(),
            histogram.len()
        );
        Ok(QueryOutcome {
            query: query.to_string(),
            matches: results.into_indices(),
            histogram,
            total_rows: self.table.len(),
        })
    }

    /// The first `preview_rows` matches of `outcome`.
    pub fn preview<'a>(&'a self, outcome: &QueryOutcome) -> Vec<&'a Record> {
        search::from_indices(&self.table, outcome.matches.clone())
            .head(self.config.preview_rows)
            .collect()
    }

    /// Summary line shown after a search, e.g.
    /// `"1,204 results found in 11,731 addresses."`
    pub fn summary(&self, outcome: &QueryOutcome) -> String {
        format!(
            "{} results found in {} {}.",
            format_count(outcome.matches.len()),
            format_count(outcome.total_rows),
            self.config.row_noun
        )
    }
}

/// Format an integer with comma thousands separators.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
