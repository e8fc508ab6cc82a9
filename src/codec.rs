//! Line formats for records passed between stages.
//!
//! - feature record: `driver<TAB>trip:value`
//! - anomaly set: `driver<TAB>weight<TAB>id,id,id`
//!
//! Trip ID lists are forgiving: tokens that are not integers are dropped so a
//! damaged entry costs one trip, not the whole driver.

use crate::error::{FalseTripError, OptionExt, Result};
use crate::{AnomalySet, FeatureRecord};

const ENTRY_DELIM: char = '\t';
const ID_DELIM: &str = ",";
const VALUE_DELIM: char = ':';

/// Join trip IDs with commas.
pub fn encode_trip_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(ID_DELIM)
}

/// Parse a comma-joined trip ID list, skipping tokens that are not integers.
pub fn parse_trip_ids(written: &str) -> Vec<u32> {
    written
        .split(ID_DELIM)
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .collect()
}

pub fn encode_feature_record(driver_id: &str, record: &FeatureRecord) -> String {
    format!(
        "{driver_id}{ENTRY_DELIM}{}{VALUE_DELIM}{}",
        record.trip_id, record.value
    )
}

/// Parse a feature record line into its driver and record.
pub fn parse_feature_record(line: &str) -> Result<(String, FeatureRecord)> {
    let (driver_id, data) = line
        .split_once(ENTRY_DELIM)
        .ok_or_malformed(line, "missing driver field")?;
    let (trip_id, value) = data
        .split_once(VALUE_DELIM)
        .ok_or_malformed(line, "missing trip:value separator")?;

    let trip_id = trip_id
        .trim()
        .parse::<u32>()
        .map_err(|_| FalseTripError::malformed(line, "trip ID is not an integer"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| FalseTripError::malformed(line, "feature value is not a number"))?;

    Ok((driver_id.to_string(), FeatureRecord::new(trip_id, value)))
}

pub fn encode_anomaly_set(set: &AnomalySet) -> String {
    format!(
        "{}{ENTRY_DELIM}{}{ENTRY_DELIM}{}",
        set.driver_id,
        set.weight,
        encode_trip_ids(&set.trip_ids)
    )
}

/// Parse an anomaly-set line.
///
/// The trip list may be empty or partly damaged; the driver and weight
/// fields must be present.
pub fn parse_anomaly_set(line: &str) -> Result<AnomalySet> {
    let mut fields = line.splitn(3, ENTRY_DELIM);

    let driver_id = fields
        .next()
        .filter(|d| !d.is_empty())
        .ok_or_malformed(line, "missing driver field")?;
    let weight = fields
        .next()
        .ok_or_malformed(line, "missing weight field")?
        .trim()
        .parse::<u32>()
        .map_err(|_| FalseTripError::malformed(line, "weight is not an integer"))?;
    let trip_ids = fields.next().map(parse_trip_ids).unwrap_or_default();

    Ok(AnomalySet {
        driver_id: driver_id.to_string(),
        weight,
        trip_ids,
    })
}
