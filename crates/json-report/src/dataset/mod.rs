//! In-memory dataset built from JSON records.
//!
//! A [`Dataset`] wraps a polars `DataFrame` together with the [`ColumnKind`]
//! inferred for each column at load time. It is created once per report and
//! never mutated; renderers drop missing values locally when they read a
//! column.

mod loader;

pub use loader::load_json_dataset;

use crate::error::{ReportError, Result, ResultExt};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Value type of a column, inferred from its non-missing JSON values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Every value is an integral number that fits in `i64`.
    Integer,
    /// Every value is a number, at least one of them non-integral.
    Float,
    /// Every value is `true` or `false`.
    Boolean,
    /// Every value is a string.
    Text,
    /// Values of different kinds, or nested arrays/objects.
    Mixed,
    /// Every value is missing.
    Empty,
}

impl ColumnKind {
    /// Infer the kind of a column from its (possibly missing) values.
    pub fn infer<'a>(values: impl IntoIterator<Item = Option<&'a Value>>) -> Self {
        let mut seen_any = false;
        let mut all_integer = true;
        let mut all_number = true;
        let mut all_boolean = true;
        let mut all_string = true;

        for value in values.into_iter().flatten() {
            seen_any = true;
            match value {
                Value::Number(n) => {
                    all_integer &= n.as_i64().is_some();
                    all_boolean = false;
                    all_string = false;
                }
                Value::Bool(_) => {
                    all_integer = false;
                    all_number = false;
                    all_string = false;
                }
                Value::String(_) => {
                    all_integer = false;
                    all_number = false;
                    all_boolean = false;
                }
                _ => {
                    all_integer = false;
                    all_number = false;
                    all_boolean = false;
                    all_string = false;
                }
            }
        }

        if !seen_any {
            ColumnKind::Empty
        } else if all_integer {
            ColumnKind::Integer
        } else if all_number {
            ColumnKind::Float
        } else if all_boolean {
            ColumnKind::Boolean
        } else if all_string {
            ColumnKind::Text
        } else {
            ColumnKind::Mixed
        }
    }

    /// The polars dtype a column of this kind is stored as.
    pub fn dtype(&self) -> DataType {
        match self {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Boolean => DataType::Boolean,
            ColumnKind::Text | ColumnKind::Mixed => DataType::String,
            ColumnKind::Empty => DataType::Null,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        };
        f.pad(name)
    }
}

/// A table of rows and named columns loaded from JSON.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    kinds: Vec<ColumnKind>,
}

static_assertions::assert_impl_all!(Dataset: Send, Sync);

impl Dataset {
    /// Build a dataset from a list of JSON records.
    ///
    /// The column set is the union of record keys in first-seen order; a
    /// record missing a key contributes a null in that column.
    pub fn from_records(records: &[Value]) -> Result<Self> {
        let mut objects: Vec<&Map<String, Value>> = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match record {
                Value::Object(map) => objects.push(map),
                other => {
                    return Err(ReportError::Validation(format!(
                        "Record {index} is not a JSON object (found {})",
                        json_type_name(other)
                    )));
                }
            }
        }

        let mut seen = HashSet::new();
        let mut names: Vec<&str> = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if seen.insert(key.as_str()) {
                    names.push(key.as_str());
                }
            }
        }

        let height = objects.len();
        let mut columns = Vec::with_capacity(names.len());
        let mut kinds = Vec::with_capacity(names.len());
        for name in names {
            let cells: Vec<Option<&Value>> = objects
                .iter()
                .map(|object| object.get(name).filter(|v| !v.is_null()))
                .collect();
            let kind = ColumnKind::infer(cells.iter().copied());
            debug!("Column '{}' inferred as {}", name, kind);
            columns.push(Column::from(build_series(name, kind, &cells, height)));
            kinds.push(kind);
        }

        let frame = DataFrame::new(columns).context("Building dataset table")?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(ReportError::Validation(
                "JSON dataset produced an empty table".to_string(),
            ));
        }

        Ok(Self { frame, kinds })
    }

    /// The underlying table.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Column names in first-seen order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Kind of a single column.
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let index = self.frame.get_column_index(name)?;
        self.kinds.get(index).copied()
    }

    /// Borrow a column as a series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|column| column.as_materialized_series())
            .map_err(|_| ReportError::ColumnNotFound(name.to_string()))
    }

    /// A column as floats, keeping missing values in place.
    pub fn optional_numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let casted = self
            .series(name)?
            .cast(&DataType::Float64)
            .context(format!("Casting '{name}' to float"))?;
        Ok(casted.f64()?.into_iter().collect())
    }

    /// A column as floats with missing values dropped.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self
            .optional_numeric_values(name)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// A column coerced to text with missing values dropped.
    pub fn text_values(&self, name: &str) -> Result<Vec<String>> {
        let non_null = self.series(name)?.drop_nulls();
        let casted = non_null
            .cast(&DataType::String)
            .context(format!("Casting '{name}' to text"))?;
        Ok(casted
            .str()?
            .into_iter()
            .flatten()
            .map(|value| value.to_string())
            .collect())
    }
}

fn build_series(name: &str, kind: ColumnKind, cells: &[Option<&Value>], height: usize) -> Series {
    match kind {
        ColumnKind::Integer => {
            let values: Vec<Option<i64>> = cells.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Boolean => {
            let values: Vec<Option<bool>> =
                cells.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Text | ColumnKind::Mixed => {
            let values: Vec<Option<String>> =
                cells.iter().map(|v| v.map(value_to_text)).collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Empty => Series::full_null(name.into(), height, &DataType::Null),
    }
}

/// Render a JSON value as category text; strings are taken verbatim.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
