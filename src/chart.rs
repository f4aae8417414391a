//! Chart preparation and PNG rendering (plotters bitmap backend).
//!
//! Non-numeric axes are substituted with per-value frequency counts, in
//! first-appearance order. `ChartKind::Auto` resolves to pie for low-cardinality
//! X, line when Y is numeric, bar otherwise.

use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;

use crate::error::{DataError, Result};
use crate::statistics;

pub const DEFAULT_ROW_LIMIT: usize = 10_000;

const AUTO_PIE_MAX_CATEGORIES: usize = 10;
const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Auto,
    Line,
    Bar,
    Scatter,
    Histogram,
    Pie,
}

impl ChartKind {
    pub const ALL: [Self; 6] = [
        Self::Auto,
        Self::Line,
        Self::Bar,
        Self::Scatter,
        Self::Histogram,
        Self::Pie,
    ];

    /// Case-insensitive lookup by name; empty input means `Auto`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Some(Self::Auto);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Line => "Line",
            Self::Bar => "Bar",
            Self::Scatter => "Scatter",
            Self::Histogram => "Histogram",
            Self::Pie => "Pie",
        }
    }
}

/// Prepared chart data, ready to render. `kind` is never `Auto` here.
#[derive(Debug)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// (x, y) points for line, bar, and scatter charts.
    pub points: Vec<(f64, f64)>,
    /// Tick labels when X is categorical; point x values are indices into this.
    pub x_tick_labels: Option<Vec<String>>,
    /// (label, value) slices for pie charts: Y sums grouped by X, or
    /// frequency counts when there is no usable Y.
    pub slices: Vec<(String, f64)>,
    /// Raw values for histograms.
    pub values: Vec<f64>,
}

/// Distinct values of `series` with their counts, in first-appearance order.
fn frequency_counts(series: &Series, limit: usize) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, f64> = HashMap::new();
    for i in 0..series.len().min(limit) {
        let value = match series.get(i) {
            Ok(AnyValue::Null) | Err(_) => continue,
            Ok(v) => v.str_value().to_string(),
        };
        if !counts.contains_key(&value) {
            order.push(value.clone());
        }
        *counts.entry(value).or_insert(0.0) += 1.0;
    }
    order
        .into_iter()
        .map(|v| {
            let n = counts[&v];
            (v, n)
        })
        .collect()
}

/// Sum of `y` per distinct `x` value, in first-appearance order.
fn grouped_sums(x: &Series, y: &Series, limit: usize) -> Result<Vec<(String, f64)>> {
    let ys = y.cast(&DataType::Float64)?;
    let ys = ys.f64()?;
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for i in 0..x.len().min(limit) {
        let label = match x.get(i) {
            Ok(AnyValue::Null) | Err(_) => continue,
            Ok(v) => v.str_value().to_string(),
        };
        if !sums.contains_key(&label) {
            order.push(label.clone());
        }
        let entry = sums.entry(label).or_insert(0.0);
        if let Some(yv) = ys.get(i) {
            if yv.is_finite() {
                *entry += yv;
            }
        }
    }
    Ok(order
        .into_iter()
        .map(|label| {
            let sum = sums[&label];
            (label, sum)
        })
        .collect())
}

fn numeric_values(series: &Series, limit: usize) -> Result<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca
        .iter()
        .take(limit)
        .flatten()
        .filter(|v| v.is_finite())
        .collect())
}

fn distinct_count(series: &Series, limit: usize) -> usize {
    let mut seen: HashMap<String, ()> = HashMap::new();
    for i in 0..series.len().min(limit) {
        if let Ok(v) = series.get(i) {
            if !matches!(v, AnyValue::Null) {
                seen.insert(v.str_value().to_string(), ());
            }
        }
    }
    seen.len()
}

/// Builds chart data for `x_column` (and optionally `y_column`) from `df`.
/// Rows beyond `row_limit` are ignored.
pub fn prepare(
    df: &DataFrame,
    x_column: &str,
    y_column: Option<&str>,
    kind: ChartKind,
    row_limit: usize,
) -> Result<ChartData> {
    let x_series = df
        .column(x_column)
        .map_err(|_| DataError::MissingColumn(x_column.to_string()))?
        .as_materialized_series()
        .clone();
    let y_series = match y_column {
        Some(name) => Some(
            df.column(name)
                .map_err(|_| DataError::MissingColumn(name.to_string()))?
                .as_materialized_series()
                .clone(),
        ),
        None => None,
    };
    if df.height() == 0 {
        return Err(DataError::NoData);
    }

    let x_numeric = statistics::is_numeric_type(x_series.dtype());
    let y_numeric = y_series
        .as_ref()
        .map(|s| statistics::is_numeric_type(s.dtype()))
        .unwrap_or(false);

    let kind = match kind {
        ChartKind::Auto => {
            if distinct_count(&x_series, row_limit) < AUTO_PIE_MAX_CATEGORIES {
                ChartKind::Pie
            } else if y_numeric {
                ChartKind::Line
            } else {
                ChartKind::Bar
            }
        }
        other => other,
    };

    let title = match (kind, y_column) {
        (ChartKind::Histogram, Some(y)) => format!("Histogram of {}", y),
        (ChartKind::Pie, Some(y)) if y_numeric => format!("{} by {}", y, x_column),
        (ChartKind::Histogram, None) | (ChartKind::Pie, _) => {
            format!("{} of {}", kind.as_str(), x_column)
        }
        (_, Some(y)) => format!("{} vs {}", y, x_column),
        (_, None) => format!("{} of {}", kind.as_str(), x_column),
    };

    let mut data = ChartData {
        kind,
        title,
        x_label: x_column.to_string(),
        y_label: y_column.map(|s| s.to_string()).unwrap_or_default(),
        points: Vec::new(),
        x_tick_labels: None,
        slices: Vec::new(),
        values: Vec::new(),
    };

    match kind {
        ChartKind::Histogram => {
            // a histogram covers one column: Y when given, X otherwise
            let (series, name) = match &y_series {
                Some(y) => (y, y_column.unwrap_or(x_column)),
                None => (&x_series, x_column),
            };
            if !statistics::is_numeric_type(series.dtype()) {
                return Err(DataError::MalformedInput(format!(
                    "histogram requires a numeric column, '{}' is {}",
                    name,
                    series.dtype()
                )));
            }
            data.values = numeric_values(series, row_limit)?;
            data.x_label = name.to_string();
            if data.values.is_empty() {
                return Err(DataError::NoData);
            }
        }
        ChartKind::Pie => {
            data.slices = match &y_series {
                Some(y) if y_numeric => grouped_sums(&x_series, y, row_limit)?,
                _ => frequency_counts(&x_series, row_limit),
            };
            if data.slices.is_empty() {
                return Err(DataError::NoData);
            }
        }
        ChartKind::Line | ChartKind::Bar | ChartKind::Scatter => {
            match (&y_series, x_numeric, y_numeric) {
                // both axes numeric: plot rows directly
                (Some(y), true, true) => {
                    let xs = x_series.cast(&DataType::Float64)?;
                    let ys = y.cast(&DataType::Float64)?;
                    let xs = xs.f64()?;
                    let ys = ys.f64()?;
                    for i in 0..x_series.len().min(row_limit) {
                        if let (Some(xv), Some(yv)) = (xs.get(i), ys.get(i)) {
                            if xv.is_finite() && yv.is_finite() {
                                data.points.push((xv, yv));
                            }
                        }
                    }
                }
                // categorical x with numeric y: index the categories
                (Some(y), false, true) => {
                    let mut order: Vec<String> = Vec::new();
                    let mut index: HashMap<String, usize> = HashMap::new();
                    let ys = y.cast(&DataType::Float64)?;
                    let ys = ys.f64()?;
                    for i in 0..x_series.len().min(row_limit) {
                        let label = match x_series.get(i) {
                            Ok(AnyValue::Null) | Err(_) => continue,
                            Ok(v) => v.str_value().to_string(),
                        };
                        let Some(yv) = ys.get(i) else { continue };
                        if !yv.is_finite() {
                            continue;
                        }
                        let idx = *index.entry(label.clone()).or_insert_with(|| {
                            order.push(label);
                            order.len() - 1
                        });
                        data.points.push((idx as f64, yv));
                    }
                    data.x_tick_labels = Some(order);
                }
                // no usable y: frequency of x
                _ => {
                    let counts = frequency_counts(&x_series, row_limit);
                    let mut labels = Vec::with_capacity(counts.len());
                    for (i, (label, n)) in counts.into_iter().enumerate() {
                        data.points.push((i as f64, n));
                        labels.push(label);
                    }
                    data.x_tick_labels = Some(labels);
                    data.y_label = "count".to_string();
                }
            }
            if data.points.is_empty() {
                return Err(DataError::NoData);
            }
        }
        ChartKind::Auto => unreachable!(),
    }

    Ok(data)
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max <= min {
        (min - 0.5, min + 0.5)
    } else {
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}

/// Renders prepared chart data to a PNG file.
pub fn render_png(path: &Path, data: &ChartData, size: (u32, u32)) -> color_eyre::Result<()> {
    use plotters::prelude::*;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let palette = [
        RGBColor(0, 119, 187),
        RGBColor(204, 51, 17),
        RGBColor(0, 153, 136),
        RGBColor(238, 119, 51),
        RGBColor(51, 187, 238),
        RGBColor(238, 51, 119),
        RGBColor(187, 187, 187),
    ];

    match data.kind {
        ChartKind::Pie => {
            let sizes: Vec<f64> = data.slices.iter().map(|(_, n)| *n).collect();
            let labels: Vec<String> = data
                .slices
                .iter()
                .map(|(label, n)| format!("{} ({})", label, n))
                .collect();
            let colors: Vec<RGBColor> = (0..sizes.len())
                .map(|i| palette[i % palette.len()])
                .collect();
            let root = root.titled(&data.title, ("sans-serif", 24))?;
            let (w, h) = root.dim_in_pixel();
            let center = (w as i32 / 2, h as i32 / 2);
            let radius = (w.min(h) as f64) * 0.35;
            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.label_style(("sans-serif", 16).into_font());
            root.draw(&pie)?;
            root.present()?;
            return Ok(());
        }
        ChartKind::Histogram => {
            let (v_min, v_max) = padded_range(data.values.iter().copied());
            let bin_width = (v_max - v_min) / HISTOGRAM_BINS as f64;
            let mut bins = [0usize; HISTOGRAM_BINS];
            for &v in &data.values {
                let idx = (((v - v_min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
                bins[idx] += 1;
            }
            let y_max = bins.iter().copied().max().unwrap_or(1).max(1) as f64;

            let mut chart = ChartBuilder::on(&root)
                .caption(&data.title, ("sans-serif", 24))
                .margin(30)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(v_min..v_max, 0.0..y_max * 1.05)?;
            chart
                .configure_mesh()
                .x_desc(data.x_label.as_str())
                .y_desc("count")
                .draw()?;
            chart.draw_series(bins.iter().enumerate().map(|(i, &n)| {
                let x0 = v_min + i as f64 * bin_width;
                let x1 = x0 + bin_width;
                Rectangle::new([(x0, 0.0), (x1, n as f64)], palette[0].filled())
            }))?;
        }
        ChartKind::Line | ChartKind::Bar | ChartKind::Scatter => {
            let (x_min, x_max) = padded_range(data.points.iter().map(|&(x, _)| x));
            let (y_min, y_max) = padded_range(data.points.iter().map(|&(_, y)| y));
            // bars always grow from zero
            let y_min = if data.kind == ChartKind::Bar {
                y_min.min(0.0)
            } else {
                y_min
            };

            let mut chart = ChartBuilder::on(&root)
                .caption(&data.title, ("sans-serif", 24))
                .margin(30)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

            match &data.x_tick_labels {
                Some(labels) => {
                    chart
                        .configure_mesh()
                        .x_desc(data.x_label.as_str())
                        .y_desc(data.y_label.as_str())
                        .x_label_formatter(&|v: &f64| {
                            let idx = v.round();
                            if (v - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len()
                            {
                                labels[idx as usize].clone()
                            } else {
                                String::new()
                            }
                        })
                        .draw()?;
                }
                None => {
                    chart
                        .configure_mesh()
                        .x_desc(data.x_label.as_str())
                        .y_desc(data.y_label.as_str())
                        .draw()?;
                }
            }

            let color = palette[0];
            match data.kind {
                ChartKind::Line => {
                    chart.draw_series(LineSeries::new(data.points.iter().copied(), color))?;
                }
                ChartKind::Scatter => {
                    chart.draw_series(
                        data.points
                            .iter()
                            .map(|&p| Circle::new(p, 3, color.filled())),
                    )?;
                }
                ChartKind::Bar => {
                    chart.draw_series(data.points.iter().map(|&(x, y)| {
                        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, y)], color.filled())
                    }))?;
                }
                _ => unreachable!(),
            }
        }
        ChartKind::Auto => unreachable!(),
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "city" => &["oslo", "bergen", "oslo", "oslo"],
            "temp" => &[3.0_f64, 5.0, 4.0, 2.0],
            "day" => &[1_i64, 2, 3, 4]
        )
        .unwrap()
    }

    #[test]
    fn numeric_line_keeps_row_order() {
        let df = sample();
        let data = prepare(&df, "day", Some("temp"), ChartKind::Line, 100).unwrap();
        assert_eq!(data.kind, ChartKind::Line);
        assert_eq!(
            data.points,
            vec![(1.0, 3.0), (2.0, 5.0), (3.0, 4.0), (4.0, 2.0)]
        );
        assert!(data.x_tick_labels.is_none());
    }

    #[test]
    fn categorical_axis_becomes_frequency_counts() {
        let df = sample();
        let data = prepare(&df, "city", None, ChartKind::Bar, 100).unwrap();
        // first-appearance order
        assert_eq!(
            data.x_tick_labels,
            Some(vec!["oslo".to_string(), "bergen".to_string()])
        );
        assert_eq!(data.points, vec![(0.0, 3.0), (1.0, 1.0)]);
        assert_eq!(data.y_label, "count");
    }

    #[test]
    fn categorical_x_with_numeric_y_indexes_categories() {
        let df = sample();
        let data = prepare(&df, "city", Some("temp"), ChartKind::Scatter, 100).unwrap();
        assert_eq!(
            data.points,
            vec![(0.0, 3.0), (1.0, 5.0), (0.0, 4.0), (0.0, 2.0)]
        );
    }

    #[test]
    fn auto_picks_pie_for_low_cardinality() {
        let df = sample();
        let data = prepare(&df, "city", None, ChartKind::Auto, 100).unwrap();
        assert_eq!(data.kind, ChartKind::Pie);
        assert_eq!(
            data.slices,
            vec![("oslo".to_string(), 3.0), ("bergen".to_string(), 1.0)]
        );
    }

    #[test]
    fn auto_picks_line_for_numeric_y() {
        let days: Vec<i64> = (0..20).collect();
        let temps: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let df = df!("day" => &days, "temp" => &temps).unwrap();
        let data = prepare(&df, "day", Some("temp"), ChartKind::Auto, 100).unwrap();
        assert_eq!(data.kind, ChartKind::Line);
    }

    #[test]
    fn pie_sums_y_grouped_by_x() {
        let df = df!(
            "group" => &[1_i64, 1, 2],
            "amount" => &[10.0_f64, 20.0, 5.0]
        )
        .unwrap();
        let data = prepare(&df, "group", Some("amount"), ChartKind::Pie, 100).unwrap();
        assert_eq!(
            data.slices,
            vec![("1".to_string(), 30.0), ("2".to_string(), 5.0)]
        );
    }

    #[test]
    fn pie_without_usable_y_falls_back_to_counts() {
        let df = sample();
        let data = prepare(&df, "city", None, ChartKind::Pie, 100).unwrap();
        assert_eq!(
            data.slices,
            vec![("oslo".to_string(), 3.0), ("bergen".to_string(), 1.0)]
        );
    }

    #[test]
    fn histogram_covers_y_when_given() {
        let df = sample();
        let data = prepare(&df, "city", Some("temp"), ChartKind::Histogram, 100).unwrap();
        assert_eq!(data.values, vec![3.0, 5.0, 4.0, 2.0]);
        assert_eq!(data.x_label, "temp");
    }

    #[test]
    fn histogram_rejects_string_y() {
        let df = sample();
        let err = prepare(&df, "day", Some("city"), ChartKind::Histogram, 100).unwrap_err();
        assert!(matches!(err, DataError::MalformedInput(_)));
    }

    #[test]
    fn histogram_rejects_string_column() {
        let df = sample();
        let err = prepare(&df, "city", None, ChartKind::Histogram, 100).unwrap_err();
        assert!(matches!(err, DataError::MalformedInput(_)));
    }

    #[test]
    fn missing_column_errors() {
        let df = sample();
        let err = prepare(&df, "wind", None, ChartKind::Auto, 100).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(_)));
    }

    #[test]
    fn row_limit_truncates() {
        let df = sample();
        let data = prepare(&df, "day", Some("temp"), ChartKind::Line, 2).unwrap();
        assert_eq!(data.points.len(), 2);
    }

    #[test]
    fn renders_png_files() {
        let df = sample();
        let dir = tempfile::tempdir().unwrap();
        for kind in [
            ChartKind::Line,
            ChartKind::Bar,
            ChartKind::Scatter,
            ChartKind::Pie,
        ] {
            let data = prepare(&df, "day", Some("temp"), kind, 100).unwrap();
            let path = dir.path().join(format!("{}.png", kind.as_str()));
            render_png(&path, &data, (640, 480)).unwrap();
            assert!(path.metadata().unwrap().len() > 0);
        }
        let data = prepare(&df, "temp", None, ChartKind::Histogram, 100).unwrap();
        let path = dir.path().join("hist.png");
        render_png(&path, &data, (640, 480)).unwrap();
        assert!(path.exists());
    }
}
