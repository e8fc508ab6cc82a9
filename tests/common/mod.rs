//! Shared trip builders for integration tests.
//!
//! Trips move along the x axis only, so each per-second speed is exactly the
//! velocity the extractor sees.

#![allow(dead_code)]

use falsetrips::RawTrip;

/// Trip IDs planted with a foreign driving profile.
pub const FAKE_TRIPS: [u32; 6] = [3, 50, 77, 120, 160, 199];

/// Render per-second speeds as a trip file with an `x,y` header.
pub fn trip_text(speeds: &[f64]) -> String {
    let mut x = 0.0;
    let mut text = String::from("x,y\n0.00,0.00\n");
    for speed in speeds {
        x += speed;
        text.push_str(&format!("{:.2},0.00\n", x));
    }
    text
}

/// Habitual trip: short stop, launch to 10 over 6-10 s, cruise ~400 s.
pub fn genuine_speeds(trip_id: u32) -> Vec<f64> {
    let launch = 6 + trip_id % 5;
    let mut speeds = vec![0.0; 3];
    speeds.extend((1..=launch).map(|k| 10.0 * k as f64 / launch as f64));
    speeds.extend(std::iter::repeat_n(10.0, 400 + (trip_id % 20) as usize));
    speeds
}

/// Foreign trip: hard launch to 30 in 4 s, cruise ~2000 s.
pub fn fake_speeds(trip_id: u32) -> Vec<f64> {
    let mut speeds = vec![0.0; 3];
    speeds.extend((1..=4).map(|k| 30.0 * k as f64 / 4.0));
    speeds.extend(std::iter::repeat_n(30.0, 2000 + (trip_id % 7) as usize));
    speeds
}

/// 200 trips for one driver with [`FAKE_TRIPS`] planted.
pub fn driver_trips(driver_id: &str) -> Vec<RawTrip> {
    (1..=200)
        .map(|trip_id| {
            let speeds = if FAKE_TRIPS.contains(&trip_id) {
                fake_speeds(trip_id)
            } else {
                genuine_speeds(trip_id)
            };
            RawTrip::new(driver_id, trip_id, trip_text(&speeds))
        })
        .collect()
}
