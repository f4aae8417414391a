use datadesk::report::{paginate, write_report, PageMetrics};
use datadesk::statistics::{summarize, MEASURES};
use polars::prelude::*;

fn summaries_for(n: usize) -> Vec<datadesk::statistics::ColumnSummary> {
    let columns: Vec<Column> = (0..n)
        .map(|i| {
            Series::new(
                format!("col{}", i).into(),
                (0..10).map(|v| (v * (i + 1)) as f64).collect::<Vec<f64>>(),
            )
            .into()
        })
        .collect();
    let df = DataFrame::new(columns).unwrap();
    summarize(&df).unwrap()
}

#[test]
fn four_columns_split_into_two_blocks_of_two() {
    let names: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    let blocks = paginate(&names, 2);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], vec!["a".to_string(), "b".to_string()]);
    assert_eq!(blocks[1], vec!["c".to_string(), "d".to_string()]);
}

#[test]
fn every_block_covers_each_measure_once() {
    let names: Vec<String> = (0..7).map(|i| format!("col{}", i)).collect();
    let blocks = paginate(&names, PageMetrics::default().columns_per_block());
    // 3 per block on A4
    assert_eq!(blocks.len(), 3);
    let flattened: Vec<String> = blocks.concat();
    assert_eq!(flattened, names);
    // each block renders all eight measure rows
    assert_eq!(MEASURES.len(), 8);
}

#[test]
fn report_pdf_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    write_report(
        &path,
        "Data Report",
        &summaries_for(7),
        &[],
        PageMetrics::default(),
    )
    .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 1_000);
}

#[test]
fn report_includes_figures() {
    let dir = tempfile::tempdir().unwrap();
    let figure = dir.path().join("figure.png");
    image::RgbImage::from_pixel(40, 30, image::Rgb([200, 200, 255]))
        .save(&figure)
        .unwrap();

    let path = dir.path().join("report.pdf");
    write_report(
        &path,
        "Data Report",
        &summaries_for(2),
        &[figure],
        PageMetrics::default(),
    )
    .unwrap();
    let without_figure = dir.path().join("plain.pdf");
    write_report(
        &without_figure,
        "Data Report",
        &summaries_for(2),
        &[],
        PageMetrics::default(),
    )
    .unwrap();
    let with_len = std::fs::metadata(&path).unwrap().len();
    let plain_len = std::fs::metadata(&without_figure).unwrap().len();
    assert!(with_len > plain_len);
}

#[test]
fn undecodable_figure_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("not-an-image.png");
    std::fs::write(&bogus, b"this is not a png").unwrap();

    let path = dir.path().join("report.pdf");
    let skipped = write_report(
        &path,
        "Data Report",
        &summaries_for(2),
        &[bogus.clone()],
        PageMetrics::default(),
    )
    .unwrap();
    assert_eq!(skipped, vec![bogus]);
    assert!(path.exists());
}

#[test]
fn empty_report_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pdf");
    assert!(write_report(&path, "Data Report", &[], &[], PageMetrics::default()).is_err());
}

#[test]
fn tall_tables_paginate_with_small_metrics() {
    // tiny page: forces row pagination inside a block
    let metrics = PageMetrics {
        page_width: 210.0,
        page_height: 80.0,
        col_width: 45.0,
        row_height: 8.0,
    };
    assert_eq!(metrics.rows_per_page(), 5);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tall.pdf");
    write_report(&path, "Data Report", &summaries_for(3), &[], metrics).unwrap();
    assert!(path.exists());
}
