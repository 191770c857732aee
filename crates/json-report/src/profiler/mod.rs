//! Column classification and the statistics behind each chart.
//!
//! This module provides:
//! - Numeric vs. categorical partitioning of a dataset's columns
//! - Histogram binning, kernel density and boxplot statistics
//! - Category frequency ranking and pairwise Pearson correlation

pub mod statistics;

use crate::dataset::Dataset;
use crate::utils::{DtypeCategory, get_dtype_category};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Partition of a dataset's column names into numeric and categorical sets.
///
/// Both lists keep the dataset column order. A column that is neither
/// (for example one where every value is missing) appears in neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClassification {
    /// True when no column can be charted.
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }
}

/// Classify every column of a dataset by its stored dtype.
///
/// Integer and float columns are numeric; string and boolean columns are
/// categorical; everything else is skipped.
pub fn classify_columns(dataset: &Dataset) -> ColumnClassification {
    let mut classification = ColumnClassification::default();

    for column in dataset.frame().get_columns() {
        let name = column.name().to_string();
        match get_dtype_category(column.dtype()) {
            DtypeCategory::Numeric => classification.numeric.push(name),
            DtypeCategory::String | DtypeCategory::Boolean => {
                classification.categorical.push(name)
            }
            DtypeCategory::Other => {
                debug!("Column '{}' has no chartable type, skipping", name);
            }
        }
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn dataset(value: Value) -> Dataset {
        match value {
            Value::Array(rows) => Dataset::from_records(&rows).unwrap(),
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn test_classify_value_category_scenario() {
        let ds = dataset(json!([
            {"value": 1, "category": "A"},
            {"value": 2, "category": "B"}
        ]));

        let classification = classify_columns(&ds);

        assert_eq!(classification.numeric, vec!["value"]);
        assert_eq!(classification.categorical, vec!["category"]);
    }

    #[test]
    fn test_booleans_and_mixed_are_categorical() {
        let ds = dataset(json!([
            {"flag": true, "mixed": 1, "price": 9.5},
            {"flag": false, "mixed": "one", "price": 3}
        ]));

        let classification = classify_columns(&ds);

        assert_eq!(classification.numeric, vec!["price"]);
        assert_eq!(classification.categorical, vec!["flag", "mixed"]);
    }

    #[test]
    fn test_all_missing_column_skipped() {
        let ds = dataset(json!([{"a": null, "b": 1}, {"a": null, "b": 2}]));

        let classification = classify_columns(&ds);

        assert_eq!(classification.numeric, vec!["b"]);
        assert!(classification.categorical.is_empty());
        assert!(!classification.is_empty());
    }

    #[test]
    fn test_nothing_chartable() {
        let ds = dataset(json!([{"a": null}, {"a": null}]));

        assert!(classify_columns(&ds).is_empty());
    }

    #[test]
    fn test_order_follows_columns() {
        let ds = dataset(json!([{"z": 1, "y": "a", "x": 2.0, "w": "b"}]));

        let classification = classify_columns(&ds);

        assert_eq!(classification.numeric, vec!["z", "x"]);
        assert_eq!(classification.categorical, vec!["y", "w"]);
    }
}
