// Integration tests for the batch conversion and the date-range read path
// against real files on disk.

mod common;

use chrono::NaiveDate;
use serde_json::json;
use std::fs;

use common::{TestData, position_row};
use vesselmap::aggregate::{aggregate_range, parse_query_date};
use vesselmap::commands::convert::convert_directory;
use vesselmap::converter::convert_csv;
use vesselmap::{DailyStore, FeatureCollection};

fn date(s: &str) -> NaiveDate {
    parse_query_date(s).unwrap()
}

#[test]
fn test_polaris_scenario() {
    let data = TestData::new();
    let csv = data.write_day_csv(
        "2024-01-01.csv",
        &[&position_row("10.5", "70.2", " 123 ", "Polaris ")],
    );

    let fc = convert_csv(&csv, &data.index()).unwrap();

    assert_eq!(fc.len(), 1);
    let feature = &fc.features[0];
    assert_eq!(feature.geometry.coordinates, [10.5, 70.2]);
    assert_eq!(feature.property("country"), "NO");
    assert_eq!(feature.property("duration"), &json!(14.0));
    assert_eq!(feature.property("distance"), &json!(812.5));
}

#[test]
fn test_batch_writes_one_file_per_csv() {
    let data = TestData::new();
    data.write_day_csv(
        "2024-01-01.csv",
        &[
            &position_row("10.5", "70.2", "123", "Polaris"),
            &position_row("", "70.3", "123", "Polaris"),
            &position_row("11.0", "70.4", "257000001", "KV Svalbard"),
        ],
    );
    data.write_day_csv(
        "2024-01-02.csv",
        &[&position_row("12.0", "71.0", "273000002", "Akademik Fedorov")],
    );
    fs::write(data.raw_dir().join("notes.txt"), "not a csv").unwrap();

    let report = convert_directory(&data.raw_dir(), &data.geojson_dir(), &data.index(), false)
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.converted.len(), 2);
    assert_eq!(report.converted[0].features, 2);
    assert_eq!(report.converted[1].features, 1);
    assert_eq!(report.total_features(), 3);

    let store = DailyStore::new(data.geojson_dir());
    assert_eq!(
        store.days().unwrap(),
        vec![date("2024-01-01"), date("2024-01-02")]
    );
}

#[test]
fn test_failed_file_does_not_stop_batch() {
    let data = TestData::new();
    data.write_day_csv(
        "2024-01-01.csv",
        &[&position_row("10.5", "70.2", "123", "Polaris")],
    );
    // not UTF-8
    let mut unreadable = format!("{}\n10.5,70.2,", common::POSITION_HEADER).into_bytes();
    unreadable.extend_from_slice(b"\xff\xfe,123,Polaris,,,,,,,,,,\n");
    fs::write(data.raw_dir().join("2024-01-02.csv"), unreadable).unwrap();
    data.write_day_csv(
        "2024-01-03.csv",
        &[&position_row("12.0", "71.0", "123", "Polaris")],
    );

    let report = convert_directory(&data.raw_dir(), &data.geojson_dir(), &data.index(), false)
        .unwrap();

    assert_eq!(report.converted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].source.ends_with("2024-01-02.csv"));
    assert!(!report.failed[0].error.is_empty());

    let store = DailyStore::new(data.geojson_dir());
    assert!(store.load_day(date("2024-01-02")).unwrap().is_none());
    assert!(store.load_day(date("2024-01-03")).unwrap().is_some());
}

#[test]
fn test_short_rows_are_converted() {
    let data = TestData::new();
    let csv = data.write_day_csv(
        "2024-01-01.csv",
        &[
            "10.5,70.2,2024-01-01 12:00:00,123,Polaris",
            "11.0,70.4",
            "12.0",
        ],
    );

    let fc = convert_csv(&csv, &data.index()).unwrap();

    assert_eq!(fc.len(), 2);
    assert_eq!(fc.features[0].property("country"), "NO");
    assert!(fc.features[0].property("callsign").is_null());
    assert!(fc.features[1].property("mmsi").is_null());
    assert_eq!(fc.features[1].geometry.coordinates, [11.0, 70.4]);
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let data = TestData::new();
    for day in 1..=6 {
        let rows: Vec<String> = (0..day)
            .map(|i| position_row(&format!("{}.5", i), "70.0", "123", "Polaris"))
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        data.write_day_csv(&format!("2024-01-0{}.csv", day), &rows);
    }
    let index = data.index();

    let sequential =
        convert_directory(&data.raw_dir(), &data.root().join("seq"), &index, false).unwrap();
    let parallel =
        convert_directory(&data.raw_dir(), &data.root().join("par"), &index, true).unwrap();

    let counts = |r: &vesselmap::commands::convert::BatchReport| {
        r.converted.iter().map(|c| c.features).collect::<Vec<_>>()
    };
    assert_eq!(counts(&sequential), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(counts(&sequential), counts(&parallel));

    let seq_store = DailyStore::new(data.root().join("seq"));
    let par_store = DailyStore::new(data.root().join("par"));
    for day in seq_store.days().unwrap() {
        assert_eq!(
            seq_store.load_day(day).unwrap(),
            par_store.load_day(day).unwrap()
        );
    }
}

#[test]
fn test_round_trip_single_day() {
    let data = TestData::new();
    let csv = data.write_day_csv(
        "2024-01-01.csv",
        &[
            "10.5,70.2,2024-01-01 00:00:00, 123 ,Polaris ,LAXY,Under way,11.3,271,Cargo,120,18,6.5,TROMSO,01-02 12:00",
            "11.25,70.9,2024-01-01 00:10:00,999,Unknown,,Moored,0,,,,,,,",
            ",,2024-01-01 00:20:00,123,Polaris,,,,,,,,,,",
            "-8.123456789012345,71.000000000000001,2024-01-01 00:30:00,257000001,KV Svalbard,LCVS,,12.75,3.5,Law enforcement,103.7,19.2,,LONGYEARBYEN,",
        ],
    );
    let index = data.index();
    let direct = convert_csv(&csv, &index).unwrap();
    assert_eq!(direct.len(), 3);

    convert_directory(&data.raw_dir(), &data.geojson_dir(), &index, false).unwrap();
    let store = DailyStore::new(data.geojson_dir());
    let aggregated = aggregate_range(date("2024-01-01"), date("2024-01-01"), &store).unwrap();

    assert_eq!(aggregated, direct);
}

#[test]
fn test_range_counts_sum_existing_days() {
    let data = TestData::new();
    let store = DailyStore::new(data.geojson_dir());
    let index = data.index();

    let day_sizes = [("2024-01-01", 3usize), ("2024-01-03", 1), ("2024-01-04", 0)];
    for (day, size) in day_sizes {
        let rows: Vec<String> = (0..size)
            .map(|i| position_row(&i.to_string(), "70.0", "123", "Polaris"))
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let csv = data.write_day_csv(&format!("{}.csv", day), &rows);
        store
            .write_day(date(day), &convert_csv(&csv, &index).unwrap())
            .unwrap();
    }

    let all = aggregate_range(date("2023-12-31"), date("2024-01-05"), &store).unwrap();
    assert_eq!(all.len(), 4);

    let tail = aggregate_range(date("2024-01-02"), date("2024-01-03"), &store).unwrap();
    assert_eq!(tail.len(), 1);

    let reversed = aggregate_range(date("2024-01-03"), date("2024-01-01"), &store).unwrap();
    assert_eq!(reversed, FeatureCollection::empty());
}

#[test]
fn test_written_file_is_geojson() {
    let data = TestData::new();
    data.write_day_csv(
        "2024-01-01.csv",
        &[&position_row("10.5", "70.2", "123", "Polaris")],
    );
    convert_directory(&data.raw_dir(), &data.geojson_dir(), &data.index(), false).unwrap();

    let text = fs::read_to_string(data.geojson_dir().join("2024-01-01.geojson")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["type"], "FeatureCollection");
    let feature = &value["features"][0];
    assert_eq!(feature["type"], "Feature");
    assert_eq!(feature["geometry"]["type"], "Point");
    assert_eq!(feature["properties"]["timestamp"], "2024-01-01 12:00:00");
    assert_eq!(feature["properties"]["mmsi"], "123");
    assert_eq!(feature["properties"]["country"], "NO");
    assert!(feature["properties"]["callsign"].is_null());
    // pretty printed with two-space indentation
    assert!(text.contains("\n  \"features\""));
}
