//! Summary statistics over the numeric columns of a table.

use polars::prelude::*;

use crate::error::{DataError, Result};

/// Measure labels, in the row order of the describe frame.
pub const MEASURES: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Per-column numeric summary over non-null values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Measure values in [`MEASURES`] order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

pub fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Converts a numeric series to its non-null values as f64.
pub fn numeric_values_as_f64(series: &Series) -> Vec<f64> {
    if let Ok(f64_series) = series.f64() {
        f64_series.iter().flatten().collect()
    } else if let Ok(i64_series) = series.i64() {
        i64_series
            .iter()
            .filter_map(|v| v.map(|x| x as f64))
            .collect()
    } else if let Ok(i32_series) = series.i32() {
        i32_series
            .iter()
            .filter_map(|v| v.map(|x| x as f64))
            .collect()
    } else if let Ok(u64_series) = series.u64() {
        u64_series
            .iter()
            .filter_map(|v| v.map(|x| x as f64))
            .collect()
    } else if let Ok(u32_series) = series.u32() {
        u32_series
            .iter()
            .filter_map(|v| v.map(|x| x as f64))
            .collect()
    } else if let Ok(f32_series) = series.f32() {
        f32_series
            .iter()
            .filter_map(|v| v.map(|x| x as f64))
            .collect()
    } else {
        match series.cast(&DataType::Float64) {
            Ok(cast_series) => match cast_series.f64() {
                Ok(f64_series) => f64_series.iter().flatten().collect(),
                Err(_) => Vec::new(),
            },
            Err(_) => Vec::new(),
        }
    }
}

/// Nearest-rank percentile over an already sorted slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let n = sorted.len();
    let idx = ((p / 100.0) * (n - 1) as f64).round() as usize;
    sorted[idx.min(n - 1)]
}

fn summarize_series(series: &Series) -> ColumnSummary {
    let values = numeric_values_as_f64(series);
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = series.mean().unwrap_or(f64::NAN);
    // Sample std (ddof=1); fewer than two observations have no spread to report
    let std = if values.len() < 2 {
        0.0
    } else {
        series.std(1).unwrap_or(f64::NAN)
    };

    ColumnSummary {
        name: series.name().to_string(),
        count: values.len(),
        mean,
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: percentile(&sorted, 25.0),
        median: percentile(&sorted, 50.0),
        q75: percentile(&sorted, 75.0),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Computes summaries for every numeric column of `df`, in column order.
pub fn summarize(df: &DataFrame) -> Result<Vec<ColumnSummary>> {
    let mut summaries = Vec::new();
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if is_numeric_type(series.dtype()) {
            summaries.push(summarize_series(series));
        }
    }
    Ok(summaries)
}

/// Builds the describe-style statistics table: a `statistic` label column
/// followed by one Float64 column per numeric source column.
pub fn describe(df: &DataFrame) -> Result<DataFrame> {
    let summaries = summarize(df)?;
    if summaries.is_empty() {
        return Err(DataError::Other(
            "no numeric columns to summarize".to_string(),
        ));
    }

    let labels: Vec<&str> = MEASURES.to_vec();
    let mut columns: Vec<Column> = vec![Series::new("statistic".into(), labels).into()];
    for summary in &summaries {
        let series = Series::new(summary.name.as_str().into(), summary.values().to_vec());
        columns.push(series.into());
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_column_has_zero_std() {
        let series = Series::new("v".into(), vec![7.0_f64, 7.0, 7.0, 7.0]);
        let summary = summarize_series(&series);
        assert_eq!(summary.mean, 7.0);
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.min, 7.0);
        assert_eq!(summary.max, 7.0);
        assert_eq!(summary.median, 7.0);
    }

    #[test]
    fn nulls_excluded_from_count() {
        let series = Series::new("v".into(), vec![Some(1.0_f64), None, Some(3.0)]);
        let summary = summarize_series(&series);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
    }

    #[test]
    fn integer_columns_summarized() {
        let series = Series::new("v".into(), vec![1_i64, 2, 3, 4]);
        let summary = summarize_series(&series);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn describe_skips_string_columns() {
        let df = df!(
            "name" => &["a", "b", "c"],
            "v" => &[1.0_f64, 2.0, 3.0]
        )
        .unwrap();
        let stats = describe(&df).unwrap();
        assert_eq!(stats.height(), MEASURES.len());
        assert_eq!(stats.width(), 2); // statistic + v
        assert!(stats.column("v").is_ok());
        assert!(stats.column("name").is_err());
    }

    #[test]
    fn describe_errors_without_numeric_columns() {
        let df = df!("name" => &["a", "b"]).unwrap();
        assert!(describe(&df).is_err());
    }
}
