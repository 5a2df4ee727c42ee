use std::collections::BTreeMap;

use crate::error::Result;

use super::model::CellValue;
use super::search::SearchResult;

/// One bar of the histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category: CellValue,
    pub count: usize,
}

/// Ranked `(category, count)` pairs, highest count first.
pub type Histogram = Vec<CategoryCount>;

/// Count every distinct value of `column` in `results`, in rank order.
///
/// Rank is count descending; equal counts are ordered by ascending category
/// value so the output never depends on hash or insertion order.
pub fn category_counts(results: &SearchResult<'_>, column: &str) -> Result<Histogram> {
    let col = results.table().column_index(column)?;
    if results.is_empty() {
        return Ok(Histogram::new());
    }

    let mut groups: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for record in results.records() {
        *groups.entry(&record[col]).or_default() += 1;
    }

    let mut ranked: Histogram = groups
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.clone(),
            count,
        })
        .collect();
    // Stable sort over a map already in ascending key order keeps the tie-break.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(ranked)
}

/// The `top_n` most frequent values of `column` in `results`.
///
/// `top_n == 0` yields an empty histogram. The column is validated first.
pub fn top_categories(
    results: &SearchResult<'_>,
    column: &str,
    top_n: usize,
) -> Result<Histogram> {
    let mut ranked = category_counts(results, column)?;
    ranked.truncate(top_n);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Table;
    use crate::data::search::search;
    use crate::error::SearchError;

    fn table(rows: &[(&str, CellValue)]) -> Table {
        Table::new(
            vec!["addr".into(), "beds".into()],
            rows.iter()
                .map(|(a, b)| vec![CellValue::from(*a), b.clone()])
                .collect(),
        )
        .unwrap()
    }

    fn pairs(h: &Histogram) -> Vec<(String, usize)> {
        h.iter().map(|c| (c.category.to_string(), c.count)).collect()
    }

    #[test]
    fn main_street_scenario() {
        let t = table(&[
            ("100 Main St", "3".into()),
            ("200 Oak Ave", "2".into()),
            ("300 Main Ct", "3".into()),
        ]);
        let result = search(&t, "addr", "main").unwrap();
        let hist = top_categories(&result, "beds", 10).unwrap();
        assert_eq!(pairs(&hist), vec![("3".to_string(), 2)]);
    }

    #[test]
    fn large_integers_group_apart_from_nearby_floats() {
        let two_53 = 1_i64 << 53;
        let t = table(&[
            ("a", CellValue::Integer(two_53)),
            ("b", CellValue::Float(two_53 as f64)),
            ("c", CellValue::Integer(two_53 + 1)),
        ]);
        let result = search(&t, "addr", "").unwrap();
        let hist = category_counts(&result, "beds").unwrap();
        assert_eq!(
            pairs(&hist),
            vec![
                ("9007199254740992".to_string(), 2),
                ("9007199254740993".to_string(), 1),
            ]
        );
    }

    #[test]
    fn ties_break_by_ascending_value() {
        let t = table(&[
            ("a", CellValue::Integer(4)),
            ("b", CellValue::Integer(10)),
            ("c", CellValue::Integer(2)),
            ("d", CellValue::Integer(10)),
            ("e", CellValue::Integer(2)),
            ("f", CellValue::Integer(4)),
            ("g", CellValue::Integer(1)),
        ]);
        let result = search(&t, "addr", "").unwrap();
        let hist = category_counts(&result, "beds").unwrap();
        assert_eq!(
            pairs(&hist),
            vec![
                ("2".to_string(), 2),
                ("4".to_string(), 2),
                ("10".to_string(), 2),
                ("1".to_string(), 1),
            ]
        );
    }

    #[test]
    fn text_ties_are_lexicographic() {
        let t = table(&[("a", "b".into()), ("b", "a".into()), ("c", "".into())]);
        let result = search(&t, "addr", "").unwrap();
        let hist = category_counts(&result, "beds").unwrap();
        assert_eq!(
            pairs(&hist),
            vec![
                ("".to_string(), 1),
                ("a".to_string(), 1),
                ("b".to_string(), 1)
            ]
        );
    }

    #[test]
    fn truncates_to_top_n() {
        let t = table(&[
            ("a", CellValue::Integer(1)),
            ("b", CellValue::Integer(2)),
            ("c", CellValue::Integer(2)),
            ("d", CellValue::Integer(3)),
        ]);
        let result = search(&t, "addr", "").unwrap();
        let hist = top_categories(&result, "beds", 2).unwrap();
        assert_eq!(pairs(&hist), vec![("2".to_string(), 2), ("1".to_string(), 1)]);

        let all = top_categories(&result, "beds", 50).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn zero_top_n_is_empty() {
        let t = table(&[("a", CellValue::Integer(1))]);
        let result = search(&t, "addr", "").unwrap();
        assert!(top_categories(&result, "beds", 0).unwrap().is_empty());
    }

    #[test]
    fn counts_sum_to_result_len() {
        let t = table(&[
            ("1 Main", CellValue::Integer(3)),
            ("2 Main", CellValue::Float(3.0)),
            ("3 Main", CellValue::missing()),
            ("4 Elm", CellValue::Integer(5)),
            ("5 Main", CellValue::Float(2.5)),
        ]);
        let result = search(&t, "addr", "main").unwrap();
        let hist = category_counts(&result, "beds").unwrap();
        let total: usize = hist.iter().map(|c| c.count).sum();
        assert_eq!(total, result.len());
        // 3 and 3.0 are one category.
        assert_eq!(hist[0].count, 2);
        assert!(hist.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn empty_result_gives_empty_histogram() {
        let t = table(&[]);
        let result = search(&t, "addr", "x").unwrap();
        for n in [0, 1, 10] {
            assert!(top_categories(&result, "beds", n).unwrap().is_empty());
        }
    }

    #[test]
    fn unknown_category_column() {
        let t = table(&[("a", CellValue::Integer(1))]);
        let result = search(&t, "addr", "").unwrap();
        let err = top_categories(&result, "baths", 0).unwrap_err();
        assert!(matches!(err, SearchError::UnknownColumn { .. }));
    }
}
