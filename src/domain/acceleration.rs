//! Conversion of raw e-obs tri-axial acceleration bursts into calibrated samples.
//!
//! Each event carries `eobs_accelerations_raw` as space separated `X Y Z X Y Z ...`
//! counts, a burst start `timestamp` and the per-axis sampling frequency. Counts
//! are centred on 2048 and scaled by a slope that depends on the tag generation.

use super::NormalizedRecord;
use crate::common::error::{MovebankError, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const ZERO_COUNT: f64 = 2048.0;
const STANDARD_GRAVITY: f64 = 9.81;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelerationUnit {
    #[default]
    MetersPerSecondSquared,
    G,
}

impl AccelerationUnit {
    fn factor(&self) -> f64 {
        match self {
            AccelerationUnit::MetersPerSecondSquared => STANDARD_GRAVITY,
            AccelerationUnit::G => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    #[default]
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    pub timestamp: String,
    pub deployment_id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Slope per count for a tag, keyed by its local identifier.
pub fn slope_for_tag(tag_local_identifier: u64, sensitivity: Sensitivity) -> f64 {
    match tag_local_identifier {
        // e-obs 1st generation
        0..=2241 => match sensitivity {
            Sensitivity::High => 0.001,
            Sensitivity::Low => 0.0027,
        },
        // e-obs 2nd generation
        2242..=4117 => 0.0022,
        _ => 1.0 / 512.0,
    }
}

fn field<'a>(record: &'a NormalizedRecord, name: &str) -> Result<&'a str> {
    record
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| MovebankError::MissingField(name.to_string()))
}

/// Expand every burst into timestamped samples. The slope is taken from the
/// first event's tag; all events are expected to come from one tag.
pub fn transform_raw_acceleration(
    events: &[NormalizedRecord],
    unit: AccelerationUnit,
    sensitivity: Sensitivity,
) -> Result<Vec<AccelerationSample>> {
    let Some(first) = events.first() else {
        return Ok(Vec::new());
    };

    let tag: u64 = field(first, "tag_local_identifier")?
        .trim()
        .parse()
        .map_err(|e| MovebankError::invalid_field("tag_local_identifier", format!("{e}")))?;
    let scale = slope_for_tag(tag, sensitivity) * unit.factor();

    let mut out = Vec::new();
    for event in events {
        let deployment_id = field(event, "deployment_id")?;
        let frequency: f64 = field(event, "eobs_acceleration_sampling_frequency_per_axis")?
            .trim()
            .parse()
            .map_err(|e| {
                MovebankError::invalid_field("eobs_acceleration_sampling_frequency_per_axis", format!("{e}"))
            })?;
        if frequency <= 0.0 {
            return Err(MovebankError::invalid_field(
                "eobs_acceleration_sampling_frequency_per_axis",
                "sampling frequency must be positive",
            ));
        }
        let start = NaiveDateTime::parse_from_str(field(event, "timestamp")?, TIMESTAMP_FORMAT)
            .map_err(|e| MovebankError::invalid_field("timestamp", format!("{e}")))?;
        let raw = field(event, "eobs_accelerations_raw")?
            .split_whitespace()
            .map(|v| v.parse::<i64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| MovebankError::invalid_field("eobs_accelerations_raw", format!("{e}")))?;

        let step_micros = 1_000_000.0 / frequency;
        for (i, xyz) in raw.chunks_exact(3).enumerate() {
            let at = start + Duration::microseconds((step_micros * i as f64).round() as i64);
            out.push(AccelerationSample {
                timestamp: at.format(OUTPUT_FORMAT).to_string(),
                deployment_id: deployment_id.to_string(),
                x: (xyz[0] as f64 - ZERO_COUNT) * scale,
                y: (xyz[1] as f64 - ZERO_COUNT) * scale,
                z: (xyz[2] as f64 - ZERO_COUNT) * scale,
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst(tag: &str, raw: &str) -> NormalizedRecord {
        [
            ("tag_local_identifier", tag),
            ("deployment_id", "5"),
            ("eobs_acceleration_sampling_frequency_per_axis", "10"),
            ("timestamp", "2020-06-01 12:00:00.000"),
            ("eobs_accelerations_raw", raw),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn slopes_follow_tag_generation() {
        assert_eq!(slope_for_tag(100, Sensitivity::High), 0.001);
        assert_eq!(slope_for_tag(100, Sensitivity::Low), 0.0027);
        assert_eq!(slope_for_tag(3000, Sensitivity::Low), 0.0022);
        assert_eq!(slope_for_tag(5000, Sensitivity::High), 1.0 / 512.0);
    }

    #[test]
    fn bursts_expand_into_interpolated_samples() {
        let events = vec![burst("5000", "2048 2560 1536 2048 2048 2048 99")];

        let samples = transform_raw_acceleration(&events, AccelerationUnit::G, Sensitivity::High).unwrap();

        // trailing incomplete triple is dropped
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, "2020-06-01 12:00:00.000");
        assert_eq!(samples[1].timestamp, "2020-06-01 12:00:00.100");
        assert_eq!(samples[0].x, 0.0);
        assert_eq!(samples[0].y, 1.0);
        assert_eq!(samples[0].z, -1.0);
        assert_eq!(samples[1].deployment_id, "5");
    }

    #[test]
    fn meters_per_second_squared_scales_by_gravity() {
        let events = vec![burst("5000", "2560 2048 2048")];
        let samples = transform_raw_acceleration(&events, AccelerationUnit::default(), Sensitivity::High).unwrap();
        assert!((samples[0].x - 9.81).abs() < 1e-9);
    }

    #[test]
    fn garbage_counts_are_rejected() {
        let events = vec![burst("5000", "2048 abc 2048")];
        let err = transform_raw_acceleration(&events, AccelerationUnit::G, Sensitivity::High).unwrap_err();
        assert_eq!(err.kind(), "invalid_field");
    }

    #[test]
    fn no_events_no_samples() {
        assert!(transform_raw_acceleration(&[], AccelerationUnit::G, Sensitivity::Low).unwrap().is_empty());
    }
}
