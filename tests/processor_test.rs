use datadesk::processor::DataProcessor;
use polars::prelude::*;

fn sample() -> DataFrame {
    df!(
        "region" => &["north", "south", "north", "north"],
        "sales" => &[Some(10.0_f64), None, Some(30.0), Some(10.0)],
        "units" => &[1_i64, 2, 3, 1]
    )
    .unwrap()
}

#[test]
fn tautological_filter_preserves_rows_and_order() {
    let mut proc = DataProcessor::new(sample());
    let kept = proc.filter("sales", "x = x").unwrap();
    // null = null is null, which does not satisfy the predicate
    assert_eq!(kept, 3);

    let mut proc = DataProcessor::new(sample());
    let kept = proc.filter("units", "x >= 1").unwrap();
    assert_eq!(kept, 4);
    let units: Vec<Option<i64>> = proc
        .data()
        .column("units")
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .iter()
        .collect();
    assert_eq!(units, vec![Some(1), Some(2), Some(3), Some(1)]);
}

#[test]
fn filters_compose() {
    let mut proc = DataProcessor::new(sample());
    proc.filter("units", "x >= 2").unwrap();
    proc.filter("units", "x <= 2").unwrap();
    assert_eq!(proc.height(), 1);
    proc.reset();
    assert_eq!(proc.height(), 4);
}

#[test]
fn membership_filter_on_strings() {
    let mut proc = DataProcessor::new(sample());
    let kept = proc.filter("region", "x in (\"south\", \"east\")").unwrap();
    assert_eq!(kept, 1);
}

#[test]
fn malformed_conditions_fail_closed() {
    let mut proc = DataProcessor::new(sample());
    for condition in ["x +", "x", "x + 1", "y > 2", "__import__(\"os\")", ""] {
        assert!(
            proc.filter("units", condition).is_err(),
            "condition {:?} should be rejected",
            condition
        );
        // data untouched on failure
        assert_eq!(proc.height(), 4);
    }
}

#[test]
fn clean_fills_means_and_preserves_present_values() {
    let mut proc = DataProcessor::new(sample());
    let summary = proc.clean().unwrap();
    assert_eq!(summary.values_filled, 1);

    let sales: Vec<Option<f64>> = proc
        .data()
        .column("sales")
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .iter()
        .collect();
    // mean of 10, 30, 10 fills the gap; other values are untouched
    assert_eq!(sales[0], Some(10.0));
    assert_eq!(sales[1], Some(50.0 / 3.0));
    assert_eq!(sales[2], Some(30.0));
}

#[test]
fn clean_removes_duplicates_keeping_first() {
    let df = df!(
        "a" => &["x", "y", "x", "z"],
        "b" => &[1_i64, 2, 1, 3]
    )
    .unwrap();
    let mut proc = DataProcessor::new(df);
    let summary = proc.clean().unwrap();
    assert_eq!(summary.duplicates_removed, 1);
    let a: Vec<Option<&str>> = proc
        .data()
        .column("a")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .iter()
        .collect();
    assert_eq!(a, vec![Some("x"), Some("y"), Some("z")]);
}

#[test]
fn clean_is_idempotent() {
    let mut proc = DataProcessor::new(sample());
    proc.clean().unwrap();
    let first = proc.data().clone();
    let second = proc.clean().unwrap();
    assert_eq!(second.values_filled, 0);
    assert_eq!(second.duplicates_removed, 0);
    assert!(proc.data().equals_missing(&first));
}

#[test]
fn reset_undoes_clean_and_edits() {
    let mut proc = DataProcessor::new(sample());
    proc.clean().unwrap();
    proc.set_cell(0, "region", "west").unwrap();
    proc.reset();
    assert!(proc.data().equals_missing(&sample()));
}
