//! Synthetic driver fleet generator for benchmarking and demos.
//!
//! Each driver gets a habitual profile (cruise speed, how hard they pull away
//! from a stop, how long their trips last). Genuine trips follow it; a fixed
//! number of injected trips per driver follow a very different profile, which
//! gives ground truth for the detector.
//!
//! Feature-gated behind `synthetic`.
//!
//! # Example
//!
//! ```rust
//! use falsetrips::synthetic::SyntheticFleet;
//!
//! let fleet = SyntheticFleet {
//!     driver_count: 2,
//!     trips_per_driver: 20,
//!     injected_per_driver: 2,
//!     seed: 7,
//! };
//!
//! let dataset = fleet.generate();
//! assert_eq!(dataset.trips.len(), 40);
//! assert_eq!(dataset.injected.len(), 4);
//! ```

use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::RawTrip;
use crate::error::{FalseTripError, Result};

// ============================================================================
// Types
// ============================================================================

/// How one kind of trip is driven.
#[derive(Debug, Clone, Copy)]
pub struct DrivingProfile {
    /// Cruise speed in distance units per second.
    pub cruise_speed: f64,
    /// Seconds spent accelerating from a stop to cruise speed.
    pub launch_secs: u32,
    /// Inclusive range of trip lengths in seconds.
    pub trip_secs: (u32, u32),
    /// Largest heading change between legs, in radians.
    pub max_turn: f64,
}

/// Fleet generation parameters.
#[derive(Debug, Clone)]
pub struct SyntheticFleet {
    pub driver_count: usize,
    pub trips_per_driver: u32,
    /// Trips per driver drawn from a foreign profile.
    pub injected_per_driver: u32,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

/// A generated fleet with ground truth.
pub struct SyntheticDataset {
    /// All trips, ordered by driver then trip ID.
    pub trips: Vec<RawTrip>,
    /// (driver, trip) pairs drawn from the foreign profile.
    pub injected: BTreeSet<(String, u32)>,
}

impl Default for SyntheticFleet {
    fn default() -> Self {
        Self {
            driver_count: 10,
            trips_per_driver: 200,
            injected_per_driver: 10,
            seed: 42,
        }
    }
}

// ============================================================================
// Trip Generation
// ============================================================================

/// Per-second speeds of one trip: stop, launch, cruise, brake, repeated.
fn speed_profile(profile: &DrivingProfile, rng: &mut StdRng) -> Vec<f64> {
    let total = rng.gen_range(profile.trip_secs.0..=profile.trip_secs.1) as usize;
    let launch = profile.launch_secs.max(1) as usize;
    let mut speeds = Vec::with_capacity(total);

    while speeds.len() < total {
        // Standing at a light
        let stop = rng.gen_range(2..8);
        speeds.extend(std::iter::repeat_n(0.0, stop));

        for k in 1..=launch {
            speeds.push(profile.cruise_speed * k as f64 / launch as f64);
        }

        let cruise = rng.gen_range(30..120);
        for _ in 0..cruise {
            let jitter: f64 = rng.gen_range(-0.05..0.05);
            speeds.push(profile.cruise_speed * (1.0 + jitter));
        }

        let brake = rng.gen_range(4..8);
        for k in (0..brake).rev() {
            speeds.push(profile.cruise_speed * k as f64 / brake as f64);
        }
    }

    speeds.truncate(total);
    speeds
}

/// Render one trip in the on-disk format, header line included.
fn render_trip(profile: &DrivingProfile, rng: &mut StdRng) -> String {
    let speeds = speed_profile(profile, rng);

    let mut heading: f64 = rng.gen_range(0.0..(2.0 * PI));
    let (mut x, mut y) = (0.0_f64, 0.0_f64);

    let mut text = String::with_capacity(speeds.len() * 16);
    text.push_str("x,y\n");
    let _ = writeln!(text, "{x:.2},{y:.2}");

    for speed in speeds {
        if speed == 0.0 {
            heading += rng.gen_range(-profile.max_turn..=profile.max_turn);
        }
        x += speed * heading.cos();
        y += speed * heading.sin();
        let _ = writeln!(text, "{x:.2},{y:.2}");
    }
    text
}

impl SyntheticFleet {
    /// Generate every driver's trips.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trips = Vec::with_capacity(self.driver_count * self.trips_per_driver as usize);
        let mut injected = BTreeSet::new();

        for driver_idx in 0..self.driver_count {
            let driver_id = (driver_idx + 1).to_string();

            let habitual = DrivingProfile {
                cruise_speed: rng.gen_range(10.0..18.0),
                launch_secs: rng.gen_range(6..10),
                trip_secs: (600, 1200),
                max_turn: PI / 2.0,
            };
            let foreign = DrivingProfile {
                cruise_speed: habitual.cruise_speed * 2.5,
                launch_secs: 4,
                trip_secs: (2500, 3000),
                max_turn: 0.05,
            };

            let count = self.trips_per_driver as usize;
            let injected_count = (self.injected_per_driver as usize).min(count);
            let foreign_ids: BTreeSet<u32> = sample(&mut rng, count, injected_count)
                .into_iter()
                .map(|i| i as u32 + 1)
                .collect();

            for trip_id in 1..=self.trips_per_driver {
                let is_foreign = foreign_ids.contains(&trip_id);
                let profile = if is_foreign { &foreign } else { &habitual };
                trips.push(RawTrip::new(
                    driver_id.clone(),
                    trip_id,
                    render_trip(profile, &mut rng),
                ));
                if is_foreign {
                    injected.insert((driver_id.clone(), trip_id));
                }
            }
        }

        SyntheticDataset { trips, injected }
    }
}

impl SyntheticDataset {
    /// Write the trips under `root` as `<driver>/<trip>.csv`.
    pub fn write_to_dir(&self, root: &Path) -> Result<()> {
        for trip in &self.trips {
            let dir = root.join(&trip.driver_id);
            fs::create_dir_all(&dir)
                .map_err(|e| FalseTripError::io("creating driver folder", &dir, e))?;
            let path = dir.join(format!("{}.csv", trip.trip_id));
            fs::write(&path, &trip.text)
                .map_err(|e| FalseTripError::io("writing trip", &path, e))?;
        }
        Ok(())
    }
}
