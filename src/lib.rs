//! # False Trips
//!
//! Detection of fabricated GPS trips in per-driver trip logs.
//!
//! This library provides:
//! - Trip parsing from raw `x,y` per-second position logs
//! - Per-trip feature extraction (distance, duration, acceleration events)
//! - Per-driver, per-feature three-way clustering to surface outlier trips
//! - Weighted cross-feature voting into a genuine/false verdict per trip
//! - An in-process staged pipeline with a keyed shuffle and a report writer
//!
//! ## Features
//!
//! - **`parallel`** - Run extraction and per-driver detection on rayon's pool
//! - **`synthetic`** - Deterministic synthetic fleet generator for benches and demos
//!
//! ## Quick Start
//!
//! ```rust
//! use falsetrips::{Pipeline, PipelineConfig, RawTrip};
//!
//! let trips: Vec<RawTrip> = (1..=5)
//!     .map(|id| {
//!         let text: String = (0..30).map(|s| format!("{},0\n", s * id)).collect();
//!         RawTrip::new("1", id, text)
//!     })
//!     .collect();
//!
//! let config = PipelineConfig { trips_per_driver: 5, ..PipelineConfig::default() };
//! let report = Pipeline::new(config).run(&trips);
//!
//! assert_eq!(report.drivers.len(), 1);
//! assert_eq!(report.drivers[0].verdicts.len(), 5);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{FalseTripError, OptionExt, Result};

// Raw trip parsing (points, segments, destination)
pub mod trip;
pub use trip::{ParsedTrip, parse_trip};

// Per-trip feature extractors
pub mod features;
pub use features::{Feature, acceleration_samples, average_acceleration, velocities};

// Per-driver outlier detection (three-way nearest-mean clustering)
pub mod detector;
pub use detector::{Clusters, cluster_values, detect_suspicious};

// Weighted verdict aggregation
pub mod aggregate;
pub use aggregate::{DriverVerdicts, aggregate_driver, suspicion_weights};

// Intermediate record line formats
pub mod codec;

// Final report rendering
pub mod report;
pub use report::{Report, ReportWriter};

// Input root discovery (driver directories, trip files)
pub mod source;
pub use source::{TripLocation, discover_trips, load_trips};

// Staged pipeline with keyed shuffle
pub mod engine;
pub use engine::{KeyedShuffle, Pipeline};

// Synthetic fleet generator
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A trip position, one per elapsed second.
///
/// Coordinates are relative to the trip start, so the origin is where the
/// trip began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripPoint {
    pub x: f64,
    pub y: f64,
}

impl TripPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the trip origin.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &TripPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One raw trip as handed over by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTrip {
    pub driver_id: String,
    pub trip_id: u32,
    /// Untouched file contents, `x,y` per line
    pub text: String,
}

impl RawTrip {
    pub fn new(driver_id: impl Into<String>, trip_id: u32, text: impl Into<String>) -> Self {
        Self {
            driver_id: driver_id.into(),
            trip_id,
            text: text.into(),
        }
    }
}

/// Output of one feature extractor for one trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub trip_id: u32,
    pub value: f64,
}

impl FeatureRecord {
    pub fn new(trip_id: u32, value: f64) -> Self {
        Self { trip_id, value }
    }
}

/// Trips flagged as unusual for one feature of one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalySet {
    pub driver_id: String,
    /// Vote weight of the feature that produced this set
    pub weight: u32,
    /// Flagged trip IDs, ascending
    pub trip_ids: Vec<u32>,
}

/// Final label for one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub driver_id: String,
    pub trip_id: u32,
    pub is_false: bool,
}

// ============================================================================
// Configuration
// ============================================================================

/// Vote weight of each feature's anomaly set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    /// Default: 2
    pub acceleration: u32,
    /// Default: 1
    pub duration: u32,
    /// Default: 1
    pub distance: u32,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            acceleration: 2,
            duration: 1,
            distance: 1,
        }
    }
}

impl FeatureWeights {
    pub fn weight_of(&self, feature: Feature) -> u32 {
        match feature {
            Feature::Acceleration => self.acceleration,
            Feature::Duration => self.duration,
            Feature::Distance => self.distance,
        }
    }
}

/// Configuration for the whole pipeline.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Trip IDs 1..=N reported per driver.
    /// Default: 200
    pub trips_per_driver: u32,

    /// Velocity (distance units per second) below which the vehicle counts as stopped.
    /// Default: 0.2
    pub stop_velocity: f64,

    /// Minimum number of strictly accelerating seconds for an acceleration event.
    /// Default: 3
    pub min_acceleration_secs: u32,

    /// Reassignment passes of the three-way clustering.
    /// Default: 7
    pub clustering_iterations: u32,

    /// Summed suspicion weight at which a trip is labelled false.
    /// Default: 3
    pub false_weight_threshold: u32,

    /// Per-feature vote weights.
    pub weights: FeatureWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trips_per_driver: 200,
            stop_velocity: 0.2,
            min_acceleration_secs: 3,
            clustering_iterations: 7,
            false_weight_threshold: 3,
            weights: FeatureWeights::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| FalseTripError::io("reading configuration", path, e))?;
        let config: PipelineConfig =
            serde_json::from_str(&contents).map_err(|e| FalseTripError::config(path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run can make sense of.
    pub fn validate(&self) -> Result<()> {
        if self.trips_per_driver == 0 {
            return Err(FalseTripError::invalid_config(
                "trips_per_driver must be at least 1",
            ));
        }
        if self.clustering_iterations == 0 {
            return Err(FalseTripError::invalid_config(
                "clustering_iterations must be at least 1",
            ));
        }
        if !self.stop_velocity.is_finite() || self.stop_velocity < 0.0 {
            return Err(FalseTripError::invalid_config(format!(
                "stop_velocity must be a non-negative number, got {}",
                self.stop_velocity
            )));
        }
        Ok(())
    }
}
