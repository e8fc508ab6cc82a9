//! Weighted verdict aggregation.
//!
//! Every feature's anomaly set votes for its trips with the feature's weight.
//! A trip is labelled false once its summed weight reaches the configured
//! threshold. With the default weights (acceleration 2, duration 1,
//! distance 1) and threshold 3 a false trip needs the acceleration vote plus
//! at least one other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{AnomalySet, PipelineConfig, Verdict};

/// All verdicts of one driver, trip IDs 1..=N ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverVerdicts {
    pub driver_id: String,
    pub verdicts: Vec<Verdict>,
}

impl DriverVerdicts {
    pub fn false_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_false).count()
    }
}

/// Summed suspicion weight per trip ID across anomaly sets.
///
/// Each listed entry adds its set's weight, so an ID listed twice in one set
/// counts twice. Sums saturate at `u32::MAX`.
pub fn suspicion_weights<'a>(sets: impl IntoIterator<Item = &'a AnomalySet>) -> HashMap<u32, u32> {
    let mut weights: HashMap<u32, u32> = HashMap::new();
    for set in sets {
        for &trip_id in &set.trip_ids {
            let total = weights.entry(trip_id).or_insert(0);
            *total = total.saturating_add(set.weight);
        }
    }
    weights
}

/// Verdicts for trip IDs 1..=N of one driver.
///
/// Flagged IDs outside that range are ignored; IDs never flagged are genuine.
pub fn aggregate_driver(
    driver_id: &str,
    sets: &[AnomalySet],
    config: &PipelineConfig,
) -> DriverVerdicts {
    let weights = suspicion_weights(sets);

    let verdicts = (1..=config.trips_per_driver)
        .map(|trip_id| Verdict {
            driver_id: driver_id.to_string(),
            trip_id,
            is_false: weights.get(&trip_id).copied().unwrap_or(0) >= config.false_weight_threshold,
        })
        .collect();

    DriverVerdicts {
        driver_id: driver_id.to_string(),
        verdicts,
    }
}
