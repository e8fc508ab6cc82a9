//! End-to-end tests for the staged pipeline

mod common;

use common::{FAKE_TRIPS, driver_trips};
use falsetrips::codec::{
    encode_anomaly_set, encode_feature_record, parse_anomaly_set, parse_feature_record,
};
use falsetrips::report::HEADER;
use falsetrips::{AnomalySet, Feature, KeyedShuffle, Pipeline, PipelineConfig, RawTrip};

fn fleet() -> Vec<RawTrip> {
    let mut trips = driver_trips("2");
    trips.extend(driver_trips("1"));
    trips
}

fn false_ids(report: &falsetrips::Report, driver_id: &str) -> Vec<u32> {
    report
        .drivers
        .iter()
        .find(|d| d.driver_id == driver_id)
        .map(|d| {
            d.verdicts
                .iter()
                .filter(|v| v.is_false)
                .map(|v| v.trip_id)
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_planted_trips_are_labelled_false() {
    let report = Pipeline::default().run(&fleet());

    assert_eq!(report.drivers.len(), 2);
    assert_eq!(false_ids(&report, "1"), FAKE_TRIPS.to_vec());
    assert_eq!(false_ids(&report, "2"), FAKE_TRIPS.to_vec());
    assert_eq!(report.false_count(), 2 * FAKE_TRIPS.len());
}

#[test]
fn test_each_feature_flags_planted_trips() {
    let pipeline = Pipeline::default();
    let trips = driver_trips("1");

    for feature in Feature::ALL {
        let sets = pipeline.run_feature(feature, &trips);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].trip_ids, FAKE_TRIPS.to_vec(), "{}", feature);
        assert_eq!(sets[0].weight, PipelineConfig::default().weights.weight_of(feature));
    }
}

#[test]
fn test_report_layout() {
    let report = Pipeline::default().run(&fleet());
    let rendered = report.render();

    assert!(!rendered.ends_with('\n'));
    let lines: Vec<&str> = rendered.split('\n').collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines.iter().filter(|l| **l == HEADER).count(), 1);
    assert_eq!(lines.len(), 1 + 400);

    // Drivers ascending, then trips 1..=200 ascending
    let mut expected = Vec::new();
    for driver in ["1", "2"] {
        for trip_id in 1..=200u32 {
            let sign = if FAKE_TRIPS.contains(&trip_id) { 0 } else { 1 };
            expected.push(format!("{}_{},{}", driver, trip_id, sign));
        }
    }
    assert_eq!(&lines[1..], expected.as_slice());
}

#[test]
fn test_run_is_deterministic() {
    let trips = fleet();
    let pipeline = Pipeline::default();

    let first = pipeline.run(&trips).render();
    let mut reversed = trips.clone();
    reversed.reverse();
    let second = pipeline.run(&reversed).render();

    assert_eq!(first, second);
}

#[test]
fn test_missing_trips_are_genuine() {
    let trips: Vec<RawTrip> = driver_trips("1")
        .into_iter()
        .filter(|t| !(10..=13).contains(&t.trip_id))
        .collect();

    let report = Pipeline::default().run(&trips);
    let driver = &report.drivers[0];

    assert_eq!(driver.verdicts.len(), 200);
    for trip_id in 10..=13 {
        assert!(!driver.verdicts[trip_id - 1].is_false);
    }
    assert_eq!(false_ids(&report, "1"), FAKE_TRIPS.to_vec());
}

#[test]
fn test_staged_run_through_line_records_matches_full_run() {
    let pipeline = Pipeline::default();
    let trips = fleet();

    let mut anomaly_lines = Vec::new();
    for feature in Feature::ALL {
        // Stage 1 output as text
        let feature_lines: Vec<String> = pipeline
            .extract_features(feature, &trips)
            .iter()
            .flat_map(|(driver, records)| {
                records
                    .iter()
                    .map(move |record| encode_feature_record(driver, record))
            })
            .collect();

        // Stage 2 reads it back
        let shuffle: KeyedShuffle<_> = feature_lines
            .iter()
            .map(|line| parse_feature_record(line).unwrap())
            .collect();
        let sets = pipeline.detect_suspicions(feature, shuffle);
        anomaly_lines.extend(sets.iter().map(encode_anomaly_set));
    }

    // Stage 3 reads the anomaly sets back
    let sets: Vec<AnomalySet> = anomaly_lines
        .iter()
        .map(|line| parse_anomaly_set(line).unwrap())
        .collect();
    let staged = pipeline.aggregate(sets);

    assert_eq!(staged, pipeline.run(&trips));
}

#[test]
fn test_empty_input() {
    let report = Pipeline::default().run(&[]);
    assert!(report.drivers.is_empty());
    assert_eq!(report.render(), HEADER);
}
