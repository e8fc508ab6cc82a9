//! Input root discovery.
//!
//! The input root holds one directory per driver, named by the driver ID, and
//! inside it one file per trip named `<tripId>.<ext>`:
//!
//! ```text
//! drivers/
//!   1/
//!     1.csv
//!     2.csv
//!   2/
//!     1.csv
//! ```
//!
//! Only an unreadable root is fatal. Stray files, unreadable driver folders
//! and trip files without an integer ID are skipped with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::RawTrip;
use crate::error::{FalseTripError, Result};

/// Where one trip lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TripLocation {
    pub driver_id: String,
    pub trip_id: u32,
    pub path: PathBuf,
}

/// Trip ID from a file name: the integer before the first `.`.
pub fn trip_id_from_file_name(file_name: &str) -> Option<u32> {
    let stem = file_name.split('.').next()?;
    stem.trim().parse().ok()
}

/// List every trip under `root`, sorted by driver then trip.
pub fn discover_trips(root: &Path) -> Result<Vec<TripLocation>> {
    if !root.is_dir() {
        return Err(FalseTripError::InputRoot {
            path: root.to_path_buf(),
        });
    }

    let entries =
        fs::read_dir(root).map_err(|e| FalseTripError::io("listing input root", root, e))?;

    let mut locations = Vec::new();
    for entry in entries.flatten() {
        let driver_dir = entry.path();
        if !driver_dir.is_dir() {
            continue;
        }
        let Some(driver_id) = driver_dir.file_name().and_then(|n| n.to_str()) else {
            warn!("[Source] Skipping non UTF-8 driver folder {}", driver_dir.display());
            continue;
        };

        let trips = match fs::read_dir(&driver_dir) {
            Ok(trips) => trips,
            Err(e) => {
                warn!("[Source] Cannot list {}: {}", driver_dir.display(), e);
                continue;
            }
        };

        for trip in trips.flatten() {
            let path = trip.path();
            if !path.is_file() {
                continue;
            }
            let trip_id = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(trip_id_from_file_name);
            match trip_id {
                Some(trip_id) => locations.push(TripLocation {
                    driver_id: driver_id.to_string(),
                    trip_id,
                    path,
                }),
                None => warn!("[Source] No trip ID in file name {}", path.display()),
            }
        }
    }

    locations.sort();
    Ok(locations)
}

/// Read every trip under `root`.
///
/// Files are read as UTF-8 with invalid bytes replaced, so a damaged file only
/// loses the affected lines.
pub fn load_trips(root: &Path) -> Result<Vec<RawTrip>> {
    let locations = discover_trips(root)?;

    let trips: Vec<RawTrip> = locations
        .into_iter()
        .filter_map(|loc| match fs::read(&loc.path) {
            Ok(bytes) => Some(RawTrip::new(
                loc.driver_id,
                loc.trip_id,
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
            Err(e) => {
                warn!("[Source] Skipping unreadable trip {}: {}", loc.path.display(), e);
                None
            }
        })
        .collect();

    info!(
        "[Source] Loaded {} trips from {}",
        trips.len(),
        root.display()
    );
    Ok(trips)
}
