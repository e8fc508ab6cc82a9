//! # Staged Pipeline
//!
//! Runs the false-trip analysis as three keyed stages:
//! - `extract_features` - one feature value per raw trip, shuffled by driver
//! - `detect_suspicions` - per-driver clustering into a weighted anomaly set
//! - `aggregate` - per-driver weighted vote into verdicts 1..=N
//!
//! The three feature stages are independent; aggregation starts only once all
//! of them have produced their anomaly sets. With the `parallel` feature each
//! stage fans out over rayon's pool; the output is identical either way.

pub mod shuffle;

pub use shuffle::KeyedShuffle;

use log::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::aggregate::{DriverVerdicts, aggregate_driver};
use crate::detector::detect_suspicious;
use crate::report::Report;
use crate::{AnomalySet, Feature, FeatureRecord, PipelineConfig, RawTrip};

/// The false-trip pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // ========================================================================
    // Stage 1: Feature extraction
    // ========================================================================

    /// Extract one feature from every trip, grouped by driver.
    pub fn extract_features(&self, feature: Feature, trips: &[RawTrip]) -> KeyedShuffle<FeatureRecord> {
        let extract = |trip: &RawTrip| {
            let value = feature.extract(&trip.text, &self.config);
            (trip.driver_id.clone(), FeatureRecord::new(trip.trip_id, value))
        };

        #[cfg(feature = "parallel")]
        let records: Vec<(String, FeatureRecord)> = trips.par_iter().map(extract).collect();

        #[cfg(not(feature = "parallel"))]
        let records: Vec<(String, FeatureRecord)> = trips.iter().map(extract).collect();

        records.into_iter().collect()
    }

    // ========================================================================
    // Stage 2: Outlier detection
    // ========================================================================

    /// Cluster each driver's feature values and emit the weighted anomaly set.
    ///
    /// Every driver gets a set, possibly empty, so the aggregator sees all of
    /// them.
    pub fn detect_suspicions(
        &self,
        feature: Feature,
        features: KeyedShuffle<FeatureRecord>,
    ) -> Vec<AnomalySet> {
        let weight = self.config.weights.weight_of(feature);
        let iterations = self.config.clustering_iterations;

        let detect = |(driver_id, records): (String, Vec<FeatureRecord>)| AnomalySet {
            trip_ids: detect_suspicious(&records, iterations),
            driver_id,
            weight,
        };

        let groups = features.into_groups();

        #[cfg(feature = "parallel")]
        let sets: Vec<AnomalySet> = groups.into_par_iter().map(detect).collect();

        #[cfg(not(feature = "parallel"))]
        let sets: Vec<AnomalySet> = groups.into_iter().map(detect).collect();

        let flagged: usize = sets.iter().map(|s| s.trip_ids.len()).sum();
        info!(
            "[Pipeline] {}: flagged {} trips across {} drivers (weight {})",
            feature,
            flagged,
            sets.len(),
            weight
        );
        sets
    }

    /// Stages 1 and 2 for a single feature.
    pub fn run_feature(&self, feature: Feature, trips: &[RawTrip]) -> Vec<AnomalySet> {
        let features = self.extract_features(feature, trips);
        self.detect_suspicions(feature, features)
    }

    // ========================================================================
    // Stage 3: Aggregation
    // ========================================================================

    /// Combine anomaly sets of every feature into per-driver verdicts.
    pub fn aggregate(&self, sets: impl IntoIterator<Item = AnomalySet>) -> Report {
        let shuffle: KeyedShuffle<AnomalySet> = sets
            .into_iter()
            .map(|set| (set.driver_id.clone(), set))
            .collect();

        let verdict = |(driver_id, sets): (String, Vec<AnomalySet>)| {
            aggregate_driver(&driver_id, &sets, &self.config)
        };

        let groups = shuffle.into_groups();

        #[cfg(feature = "parallel")]
        let drivers: Vec<DriverVerdicts> = groups.into_par_iter().map(verdict).collect();

        #[cfg(not(feature = "parallel"))]
        let drivers: Vec<DriverVerdicts> = groups.into_iter().map(verdict).collect();

        Report::new(drivers)
    }

    // ========================================================================
    // Full run
    // ========================================================================

    /// Run all stages over the given trips.
    pub fn run(&self, trips: &[RawTrip]) -> Report {
        info!(
            "[Pipeline] Analyzing {} trips (N = {}, {} clustering passes)",
            trips.len(),
            self.config.trips_per_driver,
            self.config.clustering_iterations
        );

        #[cfg(feature = "parallel")]
        let per_feature: Vec<Vec<AnomalySet>> = Feature::ALL
            .par_iter()
            .map(|&feature| self.run_feature(feature, trips))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let per_feature: Vec<Vec<AnomalySet>> = Feature::ALL
            .iter()
            .map(|&feature| self.run_feature(feature, trips))
            .collect();

        let report = self.aggregate(per_feature.into_iter().flatten());

        info!(
            "[Pipeline] {} drivers, {} of {} reported trips labelled false",
            report.drivers.len(),
            report.false_count(),
            report.trip_count()
        );
        report
    }
}
