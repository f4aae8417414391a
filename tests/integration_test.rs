use datadesk::chart::ChartKind;
use datadesk::io::LoadOptions;
use datadesk::{App, AppEvent, ChartRequest};
use polars::prelude::*;
use std::fs::File;
use std::sync::mpsc;

fn write_sample_csv(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("sales.csv");
    let mut df = df!(
        "region" => &["north", "south", "north", "east", "north"],
        "sales" => &[Some(10.0_f64), None, Some(30.0), Some(40.0), Some(10.0)],
        "units" => &[1_i64, 2, 3, 4, 1]
    )
    .unwrap();
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

fn open(app: &mut App, path: &std::path::Path) {
    let mut event = Some(AppEvent::Open(path.to_path_buf(), LoadOptions::default()));
    while let Some(e) = event {
        event = app.event(&e);
        if matches!(event, Some(AppEvent::Crash(_))) {
            panic!("load crashed");
        }
    }
}

#[test]
fn full_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_sample_csv(dir.path());

    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    open(&mut app, &csv_path);

    let processor = app.processor.as_ref().expect("data loaded");
    assert_eq!(processor.height(), 5);

    // filter
    app.event(&AppEvent::Filter {
        column: "units".to_string(),
        condition: "x >= 1 & x <= 3".to_string(),
    });
    assert_eq!(app.processor.as_ref().unwrap().height(), 4);

    // clean: one missing value filled, one duplicate row dropped
    app.event(&AppEvent::Clean);
    let processor = app.processor.as_ref().unwrap();
    assert_eq!(processor.height(), 3);
    assert_eq!(processor.data().column("sales").unwrap().null_count(), 0);

    // chart export feeds the report
    let chart_path = dir.path().join("sales.png");
    app.event(&AppEvent::ExportChart(ChartRequest {
        x: "units".to_string(),
        y: Some("sales".to_string()),
        kind: ChartKind::Line,
        limit: None,
        path: chart_path.clone(),
    }));
    assert!(chart_path.exists());

    // report
    let report_path = dir.path().join("sales.pdf");
    app.event(&AppEvent::Report(report_path.clone()));
    assert!(report_path.exists());

    // save the cleaned table
    let out_path = dir.path().join("cleaned.csv");
    app.event(&AppEvent::SaveTable(out_path.clone()));
    let saved = datadesk::io::load_table(&out_path, &LoadOptions::default()).unwrap();
    assert_eq!(saved.height(), 3);

    // reset restores the load-time snapshot
    app.event(&AppEvent::Reset);
    assert_eq!(app.processor.as_ref().unwrap().height(), 5);
}

#[test]
fn edit_then_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_sample_csv(dir.path());

    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    open(&mut app, &csv_path);

    app.event(&AppEvent::EditCell {
        row: 0,
        column: "region".to_string(),
        value: "west".to_string(),
    });
    let value = app
        .processor
        .as_ref()
        .unwrap()
        .data()
        .column("region")
        .unwrap()
        .get(0)
        .unwrap()
        .str_value()
        .to_string();
    assert_eq!(value, "west");

    let out_path = dir.path().join("edited.tsv");
    app.event(&AppEvent::SaveTable(out_path.clone()));
    let saved = datadesk::io::load_table(&out_path, &LoadOptions::default()).unwrap();
    assert_eq!(
        saved.column("region").unwrap().get(0).unwrap().str_value(),
        "west"
    );
}

#[test]
fn bad_edit_value_surfaces_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_sample_csv(dir.path());

    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    open(&mut app, &csv_path);

    app.event(&AppEvent::EditCell {
        row: 0,
        column: "units".to_string(),
        value: "many".to_string(),
    });
    // value unchanged
    let units = app
        .processor
        .as_ref()
        .unwrap()
        .data()
        .column("units")
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .get(0);
    assert_eq!(units, Some(1));
}
