//! Per-trip feature extraction.
//!
//! Each [`Feature`] turns one raw trip into a single scalar:
//! - `Distance` - straight-line distance of the destination from the origin
//! - `Duration` - elapsed seconds, counted from raw lines
//! - `Acceleration` - mean acceleration over stop-and-go events
//!
//! Extraction never fails. Degenerate trips produce 0 (or a negative
//! duration for blobs without lines), which the detector treats like any
//! other value.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::trip::{ParsedTrip, parse_trip};
use crate::{PipelineConfig, TripPoint};

/// Feature identity. Also names the feature's intermediate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Acceleration,
    Duration,
    Distance,
}

impl Feature {
    /// All features, in the order the pipeline runs them.
    pub const ALL: [Feature; 3] = [Feature::Acceleration, Feature::Duration, Feature::Distance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Acceleration => "acceleration",
            Feature::Duration => "duration",
            Feature::Distance => "distance",
        }
    }

    /// Extract this feature from a raw trip blob.
    pub fn extract(&self, text: &str, config: &PipelineConfig) -> f64 {
        self.extract_parsed(&parse_trip(text), config)
    }

    /// Extract this feature from an already parsed trip.
    pub fn extract_parsed(&self, trip: &ParsedTrip, config: &PipelineConfig) -> f64 {
        match self {
            Feature::Distance => trip.destination.map(|p| p.norm()).unwrap_or(0.0),
            Feature::Duration => {
                let duration = trip.duration();
                if duration < 0.0 {
                    debug!(
                        "[Features] Negative duration {} ({} segments), passing through",
                        duration, trip.segment_count
                    );
                }
                duration
            }
            Feature::Acceleration => average_acceleration(
                &velocities(&trip.points),
                config.stop_velocity,
                config.min_acceleration_secs,
            ),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acceleration" => Ok(Feature::Acceleration),
            "duration" | "time" => Ok(Feature::Duration),
            "distance" => Ok(Feature::Distance),
            other => Err(format!("unknown feature '{other}'")),
        }
    }
}

/// Per-second velocities: distance between consecutive points.
pub fn velocities(points: &[TripPoint]) -> Vec<f64> {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).collect()
}

/// Acceleration samples from stop-and-go events.
///
/// An event starts at a velocity below `stop_velocity`. The scan then follows
/// the deceleration down to its minimum (`init`), counts the strictly
/// increasing seconds that follow (`dt`) and records `(reached - init) / dt`
/// when `dt >= min_secs`. Scanning resumes after the sample that ended the
/// increase, so events never overlap.
///
/// One sample of look-ahead is always held: the last velocity of the trip
/// only ever ends a run, it never joins one.
pub fn acceleration_samples(velocities: &[f64], stop_velocity: f64, min_secs: u32) -> Vec<f64> {
    let n = velocities.len();
    let mut samples = Vec::new();
    let mut i = 0;

    while i < n {
        let mut curr = velocities[i];
        i += 1;

        if curr >= stop_velocity || i >= n {
            continue;
        }

        let mut init = curr;
        let mut next = velocities[i];
        i += 1;

        // Still slowing down (or standing)
        while i < n && next <= curr {
            curr = next;
            init = curr;
            next = velocities[i];
            i += 1;
        }

        // Speeding up
        let mut dt: u32 = 0;
        while i < n && next > curr {
            dt += 1;
            curr = next;
            next = velocities[i];
            i += 1;
        }

        if dt >= min_secs && dt > 0 {
            samples.push((curr - init) / dt as f64);
        }
    }

    samples
}

/// Mean of [`acceleration_samples`], 0 when the trip has no events.
pub fn average_acceleration(velocities: &[f64], stop_velocity: f64, min_secs: u32) -> f64 {
    let samples = acceleration_samples(velocities, stop_velocity, min_secs);
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}
