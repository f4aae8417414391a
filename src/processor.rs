//! The data processor: current table, load-time snapshot, and the
//! filter / clean / statistics / edit operations over them.

use polars::prelude::*;

use crate::error::{DataError, Result};
use crate::predicate;
use crate::statistics;

/// What `clean` changed, for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanSummary {
    pub values_filled: usize,
    pub duplicates_removed: usize,
}

/// Wraps the loaded table. The snapshot taken at construction is immutable;
/// every operation installs a fresh `DataFrame` as the current table.
pub struct DataProcessor {
    data: DataFrame,
    original: DataFrame,
}

impl DataProcessor {
    pub fn new(data: DataFrame) -> Self {
        let original = data.clone();
        Self { data, original }
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Keeps the rows of `column` for which the parsed predicate holds.
    /// Returns the number of rows kept. Row order is preserved.
    pub fn filter(&mut self, column: &str, condition: &str) -> Result<usize> {
        if !self.has_column(column) {
            return Err(DataError::MissingColumn(column.to_string()));
        }
        let expr = predicate::parse_predicate(condition, column)?;
        let filtered = self.data.clone().lazy().filter(expr).collect()?;
        self.data = filtered;
        Ok(self.data.height())
    }

    /// Restores the table to the load-time snapshot.
    pub fn reset(&mut self) {
        self.data = self.original.clone();
    }

    /// Fills missing numeric values with the column mean, then removes exact
    /// duplicate rows keeping the first occurrence. Idempotent.
    pub fn clean(&mut self) -> Result<CleanSummary> {
        let mut values_filled = 0;
        let names = self.column_names();
        for name in &names {
            let series = self.data.column(name)?.as_materialized_series().clone();
            if !statistics::is_numeric_type(series.dtype()) {
                continue;
            }
            let null_count = series.null_count();
            if null_count == 0 {
                continue;
            }
            let filled = series.fill_null(FillNullStrategy::Mean)?;
            self.data.replace(name, filled)?;
            values_filled += null_count;
        }

        let before = self.data.height();
        self.data = self
            .data
            .unique_stable(None, UniqueKeepStrategy::First, None)?;
        let duplicates_removed = before - self.data.height();

        Ok(CleanSummary {
            values_filled,
            duplicates_removed,
        })
    }

    /// Describe-style statistics over the numeric columns of the current table.
    pub fn statistics(&self) -> Result<DataFrame> {
        statistics::describe(&self.data)
    }

    /// Projection of the current table onto `columns`, used by the report.
    pub fn select_columns(&self, columns: &[String]) -> Result<DataFrame> {
        for name in columns {
            if !self.has_column(name) {
                return Err(DataError::MissingColumn(name.clone()));
            }
        }
        Ok(self.data.select(columns.iter().map(|s| s.as_str()))?)
    }

    /// Writes `text` into the cell at (`row`, `column`), parsing it to the
    /// column dtype. Empty text clears the cell to null. The snapshot is
    /// untouched.
    pub fn set_cell(&mut self, row: usize, column: &str, text: &str) -> Result<()> {
        if !self.has_column(column) {
            return Err(DataError::MissingColumn(column.to_string()));
        }
        if row >= self.data.height() {
            return Err(DataError::MalformedInput(format!(
                "row {} out of range",
                row
            )));
        }

        let series = self.data.column(column)?.as_materialized_series().clone();
        let text = text.trim();
        let name = series.name().clone();

        let replacement = match series.dtype() {
            DataType::Int64 => {
                let parsed = parse_cell::<i64>(text, column)?;
                let mut values: Vec<Option<i64>> = series.i64()?.iter().collect();
                values[row] = parsed;
                Series::new(name, values)
            }
            DataType::Float64 => {
                let parsed = parse_cell::<f64>(text, column)?;
                let mut values: Vec<Option<f64>> = series.f64()?.iter().collect();
                values[row] = parsed;
                Series::new(name, values)
            }
            DataType::Boolean => {
                let parsed = parse_cell::<bool>(text, column)?;
                let mut values: Vec<Option<bool>> = series.bool()?.iter().collect();
                values[row] = parsed;
                Series::new(name, values)
            }
            DataType::String => {
                let mut values: Vec<Option<String>> = series
                    .str()?
                    .iter()
                    .map(|v| v.map(|s| s.to_string()))
                    .collect();
                values[row] = if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                };
                Series::new(name, values)
            }
            other => {
                return Err(DataError::MalformedInput(format!(
                    "editing is not supported for {} columns",
                    other
                )))
            }
        };

        self.data.replace(column, replacement)?;
        Ok(())
    }
}

fn parse_cell<T: std::str::FromStr>(text: &str, column: &str) -> Result<Option<T>> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<T>().map(Some).map_err(|_| {
        DataError::MalformedInput(format!("'{}' is not valid for column '{}'", text, column))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataProcessor {
        let df = df!(
            "name" => &["ann", "bob", "cid", "bob"],
            "age" => &[Some(30_i64), None, Some(20), Some(25)],
            "score" => &[1.0_f64, 2.0, 3.0, 2.0]
        )
        .unwrap();
        DataProcessor::new(df)
    }

    #[test]
    fn filter_missing_column_errors() {
        let mut proc = sample();
        let err = proc.filter("salary", "x > 1").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(_)));
    }

    #[test]
    fn filter_keeps_matching_rows() {
        let mut proc = sample();
        let kept = proc.filter("score", "x >= 2").unwrap();
        assert_eq!(kept, 3);
        assert_eq!(proc.height(), 3);
    }

    #[test]
    fn reset_restores_snapshot() {
        let mut proc = sample();
        proc.filter("score", "x > 100").unwrap();
        assert_eq!(proc.height(), 0);
        proc.reset();
        assert_eq!(proc.height(), 4);
    }

    #[test]
    fn clean_fills_nulls_and_dedups() {
        let mut proc = sample();
        let summary = proc.clean().unwrap();
        assert_eq!(summary.values_filled, 1);
        // filling bob's age with the mean (25) makes the bob rows identical,
        // so dedup drops the second one
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(proc.height(), 3);
        assert_eq!(proc.data().column("age").unwrap().null_count(), 0);
        // filled with the mean of 30, 20, 25; the column stays Int64
        let filled = proc
            .data()
            .column("age")
            .unwrap()
            .as_materialized_series()
            .i64()
            .map(|ca| ca.get(1))
            .ok()
            .flatten();
        assert_eq!(filled, Some(25));
    }

    #[test]
    fn set_cell_updates_data_not_snapshot() {
        let mut proc = sample();
        proc.set_cell(0, "name", "zoe").unwrap();
        let value = proc.data().column("name").unwrap().get(0).unwrap();
        assert_eq!(value.str_value(), "zoe");
        proc.reset();
        let value = proc.data().column("name").unwrap().get(0).unwrap();
        assert_eq!(value.str_value(), "ann");
    }

    #[test]
    fn set_cell_rejects_malformed_numbers() {
        let mut proc = sample();
        let err = proc.set_cell(0, "score", "not-a-number").unwrap_err();
        assert!(matches!(err, DataError::MalformedInput(_)));
    }
}
