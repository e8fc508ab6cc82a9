//! Tests for per-driver outlier detection

use falsetrips::{FeatureRecord, cluster_values, detect_suspicious};

/// 150 trips near 10, 40 near 50 and 10 near 200.
///
/// Trips 1, 2 and 3 come from different groups so each seeds its own cluster.
fn three_groups() -> Vec<FeatureRecord> {
    (1..=200)
        .map(|trip_id| {
            let base = match trip_id {
                1 => 10.0,
                2 => 50.0,
                3..=12 => 200.0,
                13..=51 => 50.0,
                _ => 10.0,
            };
            let noise = ((trip_id % 7) as f64 - 3.0) * 0.1;
            FeatureRecord::new(trip_id, base + noise)
        })
        .collect()
}

#[test]
fn test_smallest_cluster_recovers_rare_group() {
    let records = three_groups();
    let values: Vec<f64> = records.iter().map(|r| r.value).collect();

    let clusters = cluster_values(&values, [0, 1, 2], 7);
    assert_eq!(clusters.sizes(), [150, 40, 10]);

    let [smallest, middle, largest] = clusters.ranked();
    assert_eq!((smallest, middle, largest), (2, 1, 0));

    let rare: Vec<u32> = clusters.members[smallest]
        .iter()
        .map(|&i| records[i].trip_id)
        .collect();
    assert_eq!(rare, (3..=12).collect::<Vec<u32>>());
}

#[test]
fn test_both_small_clusters_flagged_when_dwarfed() {
    // 10 + 40 < 150 / 2, so the middle group is suspicious as well
    let suspicious = detect_suspicious(&three_groups(), 7);
    assert_eq!(suspicious, (2..=51).collect::<Vec<u32>>());
}

#[test]
fn test_only_smallest_flagged_when_middle_is_substantial() {
    // Sizes 100 / 60 / 40: 40 + 60 is not under 100 / 2
    let records: Vec<FeatureRecord> = (1..=200)
        .map(|trip_id| {
            let value = match trip_id {
                1 => 0.0,
                2 => 100.0,
                3..=42 => 1000.0,
                43..=101 => 100.0,
                _ => 0.0,
            };
            FeatureRecord::new(trip_id, value)
        })
        .collect();

    let suspicious = detect_suspicious(&records, 7);
    assert_eq!(suspicious, (3..=42).collect::<Vec<u32>>());
}

#[test]
fn test_input_order_does_not_matter() {
    let records = three_groups();
    let mut reversed = records.clone();
    reversed.reverse();

    assert_eq!(detect_suspicious(&records, 7), detect_suspicious(&reversed, 7));
}

#[test]
fn test_too_few_trips() {
    assert!(detect_suspicious(&[], 7).is_empty());

    let two = [FeatureRecord::new(1, 1.0), FeatureRecord::new(2, 100.0)];
    assert!(detect_suspicious(&two, 7).is_empty());

    // Duplicates of the same trip count once
    let dupes = [
        FeatureRecord::new(1, 1.0),
        FeatureRecord::new(1, 2.0),
        FeatureRecord::new(2, 100.0),
    ];
    assert!(detect_suspicious(&dupes, 7).is_empty());
}

#[test]
fn test_three_trips() {
    let records = [
        FeatureRecord::new(7, 1.0),
        FeatureRecord::new(8, 2.0),
        FeatureRecord::new(9, 50.0),
    ];
    // One trip per cluster, ties ranked by cluster index: trip 7 is smallest
    // and 1 + 1 is not under 1 / 2
    assert_eq!(detect_suspicious(&records, 7), vec![7]);
}

#[test]
fn test_identical_values_flag_nothing() {
    let records: Vec<FeatureRecord> = (1..=50).map(|id| FeatureRecord::new(id, 4.2)).collect();
    assert!(detect_suspicious(&records, 7).is_empty());
}

#[test]
fn test_cluster_sizes_sum_to_trip_count() {
    let values: Vec<f64> = (0..97).map(|i| ((i * 37) % 101) as f64).collect();
    let clusters = cluster_values(&values, [0, 1, 2], 7);
    assert_eq!(clusters.sizes().iter().sum::<usize>(), values.len());
}

#[test]
fn test_last_record_wins_for_duplicate_trip() {
    let mut records = three_groups();
    // Trip 100 was near 10; a later record moves it into the rare group
    records.push(FeatureRecord::new(100, 200.0));

    let suspicious = detect_suspicious(&records, 7);
    assert!(suspicious.contains(&100));
}

#[test]
fn test_non_finite_value_does_not_hide_outliers() {
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut records = three_groups();
        records[100] = FeatureRecord::new(101, bad);

        let suspicious = detect_suspicious(&records, 7);
        assert_eq!(suspicious, (2..=51).collect::<Vec<u32>>(), "value {}", bad);
    }
}

#[test]
fn test_non_finite_values_do_not_count_towards_minimum() {
    let records = [
        FeatureRecord::new(1, 1.0),
        FeatureRecord::new(2, 100.0),
        FeatureRecord::new(3, f64::NAN),
    ];
    assert!(detect_suspicious(&records, 7).is_empty());
}
