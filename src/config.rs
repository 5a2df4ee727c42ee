use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Austin listings snapshot used by the homes preset.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/joe-bryan/search-zillow/main/Zillow_Austin_11-16-22.csv";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Homes,
    Text,
}

// ---------------------------------------------------------------------------
// SearchConfig – columns, labels and limits for one search page
// ---------------------------------------------------------------------------

/// Everything that differs between search pages. Both pages run the same
/// pipeline; only the source, column names and labels change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub preset: Preset,
    /// Window and page title.
    pub title: String,
    /// Dataset path or URL.
    pub source: String,
    /// Column searched by substring.
    pub search_column: String,
    /// Label of the query text box.
    pub search_label: String,
    /// Column whose values are counted in the bar chart.
    pub category_column: String,
    /// Axis title for the category axis.
    pub category_label: String,
    /// Axis title for the count axis.
    pub count_label: String,
    /// Plural noun for rows in the summary line ("addresses").
    pub row_noun: String,
    /// Number of bars in the chart.
    pub top_n: usize,
    /// Number of matching rows shown in the preview table.
    pub preview_rows: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::homes()
    }
}

impl SearchConfig {
    /// Austin homes search by address, charting bedroom counts.
    pub fn homes() -> Self {
        Self {
            preset: Preset::Homes,
            title: String::from("Austin Homes Search"),
            source: String::from(DEFAULT_SOURCE),
            search_column: String::from("address"),
            search_label: String::from("Enter address part to search"),
            category_column: String::from("beds"),
            category_label: String::from("Number of Beds"),
            count_label: String::from("Count"),
            row_noun: String::from("addresses"),
            top_n: 10,
            preview_rows: 10,
        }
    }

    /// Generic text search over the same data.
    pub fn text() -> Self {
        Self {
            preset: Preset::Text,
            title: String::from("Text Search"),
            search_label: String::from("Enter search text"),
            category_label: String::from("Category"),
            row_noun: String::from("rows"),
            ..Self::homes()
        }
    }

    pub fn for_preset(preset: Preset) -> Self {
        match preset {
            Preset::Homes => Self::homes(),
            Preset::Text => Self::text(),
        }
    }

    /// Parse a JSON config. Missing fields take the defaults of the selected
    /// `preset` (homes when absent).
    pub fn from_json(text: &str) -> Result<Self> {
        let mut value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| SearchError::Config(e.to_string()))?;
        let obj = value
            .as_object_mut()
            .ok_or_else(|| SearchError::Config("expected a JSON object".into()))?;

        let preset: Preset = match obj.get("preset") {
            Some(p) => serde_json::from_value(p.clone())
                .map_err(|e| SearchError::Config(format!("preset: {e}")))?,
            None => Preset::default(),
        };

        // Overlay the file onto the preset's defaults.
        let base = serde_json::to_value(Self::for_preset(preset))
            .map_err(|e| SearchError::Config(e.to_string()))?;
        let mut merged = match base {
            serde_json::Value::Object(map) => map,
            _ => return Err(SearchError::Config("preset did not serialize to an object".into())),
        };
        for (k, v) in std::mem::take(obj) {
            merged.insert(k, v);
        }

        let config: Self = serde_json::from_value(serde_json::Value::Object(merged))
            .map_err(|e| SearchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file from disk.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("loading config {}", path.display()))?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(SearchError::Config("source must not be empty".into()));
        }
        if self.search_column.is_empty() {
            return Err(SearchError::Config("search_column must not be empty".into()));
        }
        if self.category_column.is_empty() {
            return Err(SearchError::Config("category_column must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_homes_preset() {
        let config = SearchConfig::from_json("{}").unwrap();
        assert_eq!(config, SearchConfig::homes());
    }

    #[test]
    fn text_preset_shares_columns() {
        let text = SearchConfig::text();
        let homes = SearchConfig::homes();
        assert_eq!(text.search_column, homes.search_column);
        assert_eq!(text.category_column, homes.category_column);
        assert_ne!(text.title, homes.title);
    }

    #[test]
    fn fields_override_preset() {
        let config = SearchConfig::from_json(
            r#"{"preset": "text", "source": "listings.csv", "top_n": 5}"#,
        )
        .unwrap();
        assert_eq!(config.preset, Preset::Text);
        assert_eq!(config.title, "Text Search");
        assert_eq!(config.source, "listings.csv");
        assert_eq!(config.top_n, 5);
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            SearchConfig::from_json("[]"),
            Err(SearchError::Config(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{"preset": "cars"}"#),
            Err(SearchError::Config(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{"search_column": ""}"#),
            Err(SearchError::Config(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{"top_n": -1}"#),
            Err(SearchError::Config(_))
        ));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, r#"{"category_column": "baths"}"#).unwrap();
        let config = SearchConfig::from_file(&path).unwrap();
        assert_eq!(config.category_column, "baths");
        assert!(SearchConfig::from_file(&dir.path().join("missing.json")).is_err());
    }
}
