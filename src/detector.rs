//! Per-driver outlier detection.
//!
//! A driver's trips are grouped into three clusters by nearest mean of one
//! feature. Most of a driver's trips look alike, so the small clusters are
//! where fabricated trips end up:
//! 1. Seed clusters 1, 2, 3 with the three smallest trip IDs
//! 2. Reassign every trip to the nearest cluster mean, a fixed number of times
//! 3. Flag the smallest cluster, and the middle one too when both together are
//!    still under half the size of the largest

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::FeatureRecord;

/// Number of clusters a driver's trips are split into.
pub const CLUSTER_COUNT: usize = 3;

/// Final partition of a driver's trips.
///
/// Each cluster holds indices into the input slice, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Clusters {
    pub members: [Vec<usize>; CLUSTER_COUNT],
}

impl Clusters {
    pub fn sizes(&self) -> [usize; CLUSTER_COUNT] {
        [
            self.members[0].len(),
            self.members[1].len(),
            self.members[2].len(),
        ]
    }

    /// Cluster indices ordered by size ascending, ties by cluster index.
    pub fn ranked(&self) -> [usize; CLUSTER_COUNT] {
        let sizes = self.sizes();
        let mut order = [0, 1, 2];
        order.sort_by_key(|&c| (sizes[c], c));
        order
    }
}

/// Mean of the values at `members`, `None` for an empty cluster.
fn cluster_mean(values: &[f64], members: &[usize]) -> Option<f64> {
    if members.is_empty() {
        return None;
    }
    let sum: f64 = members.iter().map(|&i| values[i]).sum();
    Some(sum / members.len() as f64)
}

/// Index of the cluster whose mean is closest to `value`.
///
/// Empty clusters are never chosen; on equal distance the lower index wins.
fn nearest_cluster(value: f64, means: &[Option<f64>; CLUSTER_COUNT]) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (c, mean) in means.iter().enumerate() {
        let Some(mean) = mean else { continue };
        let dist = (mean - value).abs();
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((c, dist)),
        }
    }
    best.map(|(c, _)| c).unwrap_or(0)
}

/// Three-way nearest-mean clustering.
///
/// `seeds` are indices into `values`, one per cluster. Every iteration
/// recomputes all means from the previous assignment and then reassigns every
/// value, so membership is fully rebuilt each pass.
pub fn cluster_values(values: &[f64], seeds: [usize; CLUSTER_COUNT], iterations: u32) -> Clusters {
    let mut members: [Vec<usize>; CLUSTER_COUNT] = seeds.map(|s| vec![s]);

    for _ in 0..iterations {
        let means = [
            cluster_mean(values, &members[0]),
            cluster_mean(values, &members[1]),
            cluster_mean(values, &members[2]),
        ];

        let mut next: [Vec<usize>; CLUSTER_COUNT] = Default::default();
        for (i, &value) in values.iter().enumerate() {
            next[nearest_cluster(value, &means)].push(i);
        }
        members = next;
    }

    Clusters { members }
}

/// Trip IDs of one driver that look out of place for one feature.
///
/// Records are deduplicated by trip ID (the last record wins) and ordered by
/// trip ID before clustering, so the result does not depend on input order.
/// Trips whose value is NaN or infinite are left out of the clustering and
/// are never flagged.
/// Fewer than three trips cannot seed three clusters and yield no suspects.
/// The returned IDs are ascending.
pub fn detect_suspicious(records: &[FeatureRecord], iterations: u32) -> Vec<u32> {
    let by_trip: BTreeMap<u32, f64> = records.iter().map(|r| (r.trip_id, r.value)).collect();

    // Non-finite values would poison the cluster means
    let skipped = by_trip.values().filter(|v| !v.is_finite()).count();
    let by_trip: BTreeMap<u32, f64> = if skipped > 0 {
        warn!(
            "[Detector] Ignoring {} trips with non-finite feature values",
            skipped
        );
        by_trip.into_iter().filter(|(_, v)| v.is_finite()).collect()
    } else {
        by_trip
    };

    if by_trip.len() < CLUSTER_COUNT {
        debug!(
            "[Detector] {} trips, need at least {} to cluster",
            by_trip.len(),
            CLUSTER_COUNT
        );
        return Vec::new();
    }

    let trip_ids: Vec<u32> = by_trip.keys().copied().collect();
    let values: Vec<f64> = by_trip.values().copied().collect();

    let clusters = cluster_values(&values, [0, 1, 2], iterations);
    let [smallest, middle, largest] = clusters.ranked();
    let sizes = clusters.sizes();

    let mut suspicious: Vec<u32> = clusters.members[smallest]
        .iter()
        .map(|&i| trip_ids[i])
        .collect();

    let small_total = (sizes[smallest] + sizes[middle]) as f64;
    if small_total < sizes[largest] as f64 / 2.0 {
        suspicious.extend(clusters.members[middle].iter().map(|&i| trip_ids[i]));
    }

    debug!(
        "[Detector] Cluster sizes {:?}, flagged {} of {} trips",
        sizes,
        suspicious.len(),
        trip_ids.len()
    );

    suspicious.sort_unstable();
    suspicious
}
